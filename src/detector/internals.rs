use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::float::Float;
use crate::utils::buffer::{copy_modulus_to_real, copy_weighted_to_complex, l2_norm};
use crate::utils::buffer::{new_complex_buffer, new_real_buffer};
use crate::utils::window::hann_window;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch<T>
where
    T: Float,
{
    /// Estimated fundamental in Hz. Zero when no spectral energy survived.
    pub frequency: T,
    /// Mean power of the analysed window.
    pub power: T,
}

/// Data structure to hold the buffers and the FFT plan needed for pitch
/// computation. Everything is allocated once, sized for a window of `size`
/// samples, and reused for every window.
pub struct DetectorInternals<T>
where
    T: Float,
{
    pub size: usize,
    pub num_hps: usize,
    pub window: Vec<T>,
    pub fft: Arc<dyn Fft<T>>,
    pub signal_complex: Vec<Complex<T>>,
    pub scratch: Vec<Complex<T>>,
    pub spectrum: Vec<T>,
    pub interpolated: Vec<T>,
    pub hps: Vec<T>,
}

impl<T> DetectorInternals<T>
where
    T: Float,
{
    pub fn new(size: usize, num_hps: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let spectrum_len = size / 2;

        DetectorInternals {
            size,
            num_hps,
            window: hann_window(size),
            scratch: new_complex_buffer(fft.get_inplace_scratch_len()),
            fft,
            signal_complex: new_complex_buffer(size),
            spectrum: new_real_buffer(spectrum_len),
            interpolated: new_real_buffer(spectrum_len * num_hps),
            hps: new_real_buffer(spectrum_len * num_hps),
        }
    }
}

/// Taper `signal` with `window`, transform it and write the magnitudes of the
/// non-negative frequency bins to `result`. `result` holds `signal.len() / 2` bins.
pub fn magnitude_spectrum<T>(
    signal: &[T],
    window: &[T],
    fft: &dyn Fft<T>,
    signal_complex: &mut [Complex<T>],
    scratch: &mut [Complex<T>],
    result: &mut [T],
) where
    T: Float,
{
    assert_eq!(signal_complex.len(), fft.len());
    assert_eq!(result.len(), signal.len() / 2);

    copy_weighted_to_complex(signal, window, signal_complex);
    fft.process_with_scratch(signal_complex, scratch);
    copy_modulus_to_real(signal_complex, result);
}

/// Upsample `spectrum` by `factor` with linear interpolation. Sample `j` of
/// `result` lies at fractional bin `j / factor`; positions past the last bin
/// repeat its value.
pub fn interpolate<T>(spectrum: &[T], factor: usize, result: &mut [T])
where
    T: Float,
{
    assert_eq!(result.len(), spectrum.len() * factor);
    let Some(&last) = spectrum.last() else {
        return;
    };

    let factor_t = T::from_usize(factor).unwrap();
    result.iter_mut().enumerate().for_each(|(j, r)| {
        let i = j / factor;
        *r = match spectrum.get(i + 1) {
            Some(&next) => {
                let frac = T::from_usize(j % factor).unwrap() / factor_t;
                spectrum[i] + (next - spectrum[i]) * frac
            }
            None => last,
        };
    });
}

/// Scale `arr` to unit L2 norm. Returns `false`, leaving `arr` untouched, if
/// it has no energy.
pub fn normalize<T: Float>(arr: &mut [T]) -> bool {
    let norm = l2_norm(arr);
    if norm == T::zero() {
        return false;
    }
    arr.iter_mut().for_each(|a| *a = *a / norm);
    true
}

/// Fold `spectrum` onto itself `num_hps` times: on pass `k` the running
/// product, truncated to `ceil(len / k)` bins, is multiplied by every `k`-th
/// bin of `spectrum`. If a pass would leave nothing but zeros the fold stops
/// and the previous product is kept.
///
/// The product is written to `result`; the number of valid bins is returned.
pub fn harmonic_product_spectrum<T>(spectrum: &[T], num_hps: usize, result: &mut [T]) -> usize
where
    T: Float,
{
    assert_eq!(spectrum.len(), result.len());
    result.copy_from_slice(spectrum);
    let mut len = spectrum.len();

    for k in 1..=num_hps {
        let next_len = (spectrum.len() + k - 1) / k;
        let downsampled = spectrum.iter().step_by(k);

        let survives = result[..next_len]
            .iter()
            .zip(downsampled.clone())
            .any(|(&r, &s)| r * s != T::zero());
        if !survives {
            log::trace!("Harmonic fold stopped at k={} of {}", k, num_hps);
            break;
        }

        result[..next_len]
            .iter_mut()
            .zip(downsampled)
            .for_each(|(r, &s)| *r = *r * s);
        len = next_len;
    }

    len
}

/// Index of the first maximum of `arr`.
pub fn argmax<T: Float>(arr: &[T]) -> Option<usize> {
    arr.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, T)>, (i, &v)| match best {
            Some((_, b)) if !(v > b) => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_of_centered_sine() {
        const SIZE: usize = 64;
        let internals = &mut DetectorInternals::<f64>::new(SIZE, 1);
        let signal: Vec<f64> = (0..SIZE)
            .map(|n| (2.0 * std::f64::consts::PI * 8.0 * n as f64 / SIZE as f64).sin())
            .collect();

        magnitude_spectrum(
            &signal,
            &internals.window,
            internals.fft.as_ref(),
            &mut internals.signal_complex,
            &mut internals.scratch,
            &mut internals.spectrum,
        );

        assert_eq!(internals.spectrum.len(), SIZE / 2);
        assert_eq!(argmax(&internals.spectrum), Some(8));
        assert!(internals.spectrum.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn interpolation_is_linear_and_holds_last_value() {
        let mut result = vec![0.0; 8];
        interpolate(&[0.0, 4.0], 4, &mut result);
        assert_eq!(result, vec![0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0, 4.0]);

        let mut result = vec![0.0; 3];
        interpolate(&[1.0, 2.0, 5.0], 1, &mut result);
        assert_eq!(result, vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn normalize_rejects_silence() {
        let mut silent = vec![0.0_f64; 4];
        assert!(!normalize(&mut silent));
        let mut arr = vec![3.0_f64, 4.0];
        assert!(normalize(&mut arr));
        assert_eq!(arr, vec![0.6, 0.8]);
    }

    #[test]
    fn product_spectrum_corrects_octave_error() {
        // Strong second harmonic at bin 20, weaker fundamental at bin 10,
        // third harmonic at 30.
        let mut spectrum = vec![0.0_f64; 64];
        spectrum[10] = 0.5;
        spectrum[20] = 1.0;
        spectrum[30] = 0.4;
        assert_eq!(argmax(&spectrum), Some(20));

        let mut result = vec![0.0; 64];
        let len = harmonic_product_spectrum(&spectrum, 3, &mut result);
        assert_eq!(len, 22);
        assert_eq!(argmax(&result[..len]), Some(10));
    }

    #[test]
    fn product_spectrum_keeps_last_nonzero_fold() {
        // Nothing lines up at the third harmonic, so only k=1,2 are applied.
        let mut spectrum = vec![0.0_f64; 40];
        spectrum[10] = 0.5;
        spectrum[20] = 1.0;

        let mut result = vec![0.0; 40];
        let len = harmonic_product_spectrum(&spectrum, 5, &mut result);
        assert_eq!(len, 20);
        assert_eq!(argmax(&result[..len]), Some(10));
        assert_eq!(result[10], 0.5 * 0.5 * 1.0);
    }

    #[test]
    fn single_harmonic_only_squares() {
        let spectrum = vec![0.1_f64, 0.7, 0.2];
        let mut result = vec![0.0; 3];
        let len = harmonic_product_spectrum(&spectrum, 1, &mut result);
        assert_eq!(len, 3);
        assert_eq!(argmax(&result[..len]), Some(1));
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1.0_f32, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax::<f64>(&[]), None);
    }
}
