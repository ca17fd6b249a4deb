use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::error::{Error, Result};
use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Copies `input` into the real part of `output`, multiplying point-wise by
/// `weights`. The imaginary part and any tail of `output` are zeroed.
pub fn copy_weighted_to_complex<T: Float>(input: &[T], weights: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    assert_eq!(input.len(), weights.len());
    input
        .iter()
        .zip(weights)
        .zip(output.iter_mut())
        .for_each(|((i, w), o)| {
            o.re = *i * *w;
            o.im = T::zero();
        });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Writes |x| for the first `output.len()` complex values of `input` into `output`.
pub fn copy_modulus_to_real<T: Float>(input: &[Complex<T>], output: &mut [T]) {
    assert!(output.len() <= input.len());
    output
        .iter_mut()
        .zip(input)
        .for_each(|(o, c)| *o = c.norm());
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Mean power of `signal`: the sum of squares divided by the length.
pub fn get_power_level<T: Float>(signal: &[T]) -> T {
    if signal.is_empty() {
        return T::zero();
    }
    square_sum(signal) / T::from_usize(signal.len()).unwrap()
}

/// Euclidean norm of `arr`.
pub fn l2_norm<T: Float>(arr: &[T]) -> T {
    square_sum(arr).sqrt()
}

/// Averages interleaved multi-channel frames down to a single channel.
///
/// ```rust
/// use hps_pitch::utils::buffer::downmix;
///
/// let stereo = [1.0, 3.0, -2.0, 0.0];
/// assert_eq!(downmix(&stereo, 2).unwrap(), vec![2.0, -1.0]);
/// ```
pub fn downmix<T: Float>(interleaved: &[T], channels: usize) -> Result<Vec<T>> {
    if channels == 0 || interleaved.len() % channels != 0 {
        return Err(Error::InvalidShape { channels });
    }
    let scale = T::one() / T::from_usize(channels).unwrap();
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().copied().sum::<T>() * scale)
        .collect())
}

/// Converts raw 16-bit PCM amplitudes to floats without rescaling.
pub fn i16_to_float<T: Float>(samples: &[i16]) -> Vec<T> {
    samples.iter().map(|&s| T::from_i16(s).unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_level() {
        assert_eq!(get_power_level(&[1.0_f64, -1.0, 2.0, 0.0]), 1.5);
        assert_eq!(get_power_level::<f32>(&[]), 0.0);
    }

    #[test]
    fn weighted_copy_zeroes_tail() {
        let mut out = vec![Complex::new(9.0_f64, 9.0); 4];
        copy_weighted_to_complex(&[1.0, 2.0], &[0.5, 2.0], &mut out);
        assert_eq!(out[0], Complex::new(0.5, 0.0));
        assert_eq!(out[1], Complex::new(4.0, 0.0));
        assert_eq!(out[2], Complex::zero());
        assert_eq!(out[3], Complex::zero());
    }

    #[test]
    fn modulus() {
        let input = [Complex::new(3.0_f64, 4.0), Complex::new(0.0, -2.0), Complex::new(1.0, 1.0)];
        let mut out = [0.0; 2];
        copy_modulus_to_real(&input, &mut out);
        assert_eq!(out, [5.0, 2.0]);
    }

    #[test]
    fn downmix_rejects_ragged_frames() {
        assert_eq!(
            downmix(&[1.0_f64, 2.0, 3.0], 2),
            Err(Error::InvalidShape { channels: 2 })
        );
        assert!(downmix::<f64>(&[1.0], 0).is_err());
        assert_eq!(downmix(&[1.0_f64, 2.0], 1).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn raw_pcm_is_not_rescaled() {
        let out: Vec<f32> = i16_to_float(&[i16::MIN, 0, 1000]);
        assert_eq!(out, vec![-32768.0, 0.0, 1000.0]);
    }
}
