//! Spectral noise suppression: a hard low-frequency cut followed by an
//! adaptive floor estimated separately for each octave band.

use crate::config::HpsConfig;
use crate::float::Float;
use crate::utils::buffer::square_sum;

pub struct NoiseSuppressor<T>
where
    T: Float,
{
    low_cut_bin: usize,
    /// Half-open bin ranges, one per adjacent pair of band boundaries.
    bands: Vec<(usize, usize)>,
    threshold: T,
}

impl<T> NoiseSuppressor<T>
where
    T: Float,
{
    /// Converts the configured frequencies into bin ranges. Band ends beyond
    /// the spectrum are clamped to its length.
    pub fn new(config: &HpsConfig<T>) -> Self {
        let bands = config
            .octave_bands
            .windows(2)
            .map(|pair| (config.bin_index(pair[0]), config.bin_index(pair[1])))
            .collect();

        NoiseSuppressor {
            low_cut_bin: config.bin_index(config.low_cut),
            bands,
            threshold: config.white_noise_threshold,
        }
    }

    pub fn bands(&self) -> &[(usize, usize)] {
        &self.bands
    }

    /// Zeroes everything below the low cut, then every bin that does not
    /// exceed `threshold` times the RMS magnitude of its band.
    ///
    /// A band without bins has no energy and suppresses nothing.
    pub fn suppress(&self, spectrum: &mut [T]) {
        let len = spectrum.len();
        spectrum[..self.low_cut_bin.min(len)]
            .iter_mut()
            .for_each(|s| *s = T::zero());

        for &(start, end) in &self.bands {
            let end = end.min(len);
            if start >= end {
                continue;
            }
            let band = &mut spectrum[start..end];
            let floor = self.threshold * band_rms(band);
            band.iter_mut()
                .filter(|s| !(**s > floor))
                .for_each(|s| *s = T::zero());
        }
    }
}

/// Root-mean-square magnitude of a non-empty band.
fn band_rms<T: Float>(band: &[T]) -> T {
    (square_sum(band) / T::from_usize(band.len()).unwrap()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HpsConfig<f64> {
        // 1 Hz per bin, 100 bins.
        HpsConfig::default()
            .with_sample_rate(200)
            .with_window_size(200)
            .with_low_cut(10.)
            .with_octave_bands(vec![10., 20., 40., 80., 160.])
    }

    #[test]
    fn bands_are_clamped_to_spectrum() {
        let suppressor = NoiseSuppressor::new(&config());
        assert_eq!(suppressor.bands(), &[(10, 20), (20, 40), (40, 80), (80, 100)]);
    }

    #[test]
    fn low_cut_zeroes_rumble() {
        let suppressor = NoiseSuppressor::new(&config());
        let mut spectrum = vec![1.0; 100];
        suppressor.suppress(&mut spectrum);
        assert!(spectrum[..10].iter().all(|&s| s == 0.0));
        // Flat bands sit exactly on their RMS, well above 0.2 of it.
        assert!(spectrum[10..].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn weak_bins_fall_below_band_floor() {
        let suppressor = NoiseSuppressor::new(&config());
        let mut spectrum = vec![0.01; 100];
        spectrum[30] = 10.0;
        spectrum[31] = 0.5;
        suppressor.suppress(&mut spectrum);
        // RMS of band 20..40 is sqrt((100 + 0.25 + 18 * 1e-4) / 20) ~ 2.24
        assert_eq!(spectrum[30], 10.0);
        assert_eq!(spectrum[31], 0.5);
        assert_eq!(spectrum[25], 0.0);
        // The other bands are flat and untouched.
        assert_eq!(spectrum[15], 0.01);
        assert_eq!(spectrum[90], 0.01);
    }

    #[test]
    fn suppression_is_idempotent() {
        let suppressor = NoiseSuppressor::new(&config());
        let mut spectrum: Vec<f64> = (0..100)
            .map(|i| ((i * 37 % 11) as f64).powi(2) * 0.1)
            .collect();
        suppressor.suppress(&mut spectrum);
        let once = spectrum.clone();
        suppressor.suppress(&mut spectrum);
        assert_eq!(once, spectrum);
    }

    #[test]
    fn empty_band_is_skipped() {
        let config = config().with_octave_bands(vec![10.5, 10.9, 30.]);
        let suppressor = NoiseSuppressor::new(&config);
        assert_eq!(suppressor.bands(), &[(10, 10), (10, 30)]);
        let mut spectrum = vec![1.0; 100];
        suppressor.suppress(&mut spectrum);
        assert!(spectrum[10..].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn huge_frequencies_clamp_to_spectrum() {
        let config = config().with_octave_bands(vec![10., 1e20]);
        assert!(config.validate().is_ok());
        let suppressor = NoiseSuppressor::new(&config);
        assert_eq!(suppressor.bands(), &[(10, 100)]);

        let suppressor = NoiseSuppressor::new(&config.with_low_cut(1e20));
        let mut spectrum = vec![1.0; 100];
        suppressor.suppress(&mut spectrum);
        assert!(spectrum.iter().all(|&s| s == 0.0));
    }
}
