//! Tunables for the HPS pitch tracker.

use crate::error::{Error, Result};
use crate::float::Float;

/// Default octave band boundaries in Hz, doubling from 50 Hz.
pub const OCTAVE_BANDS: [f64; 10] = [
    50., 100., 200., 400., 800., 1600., 3200., 6400., 12800., 25600.,
];

/// Configuration for the HPS pipeline.
///
/// Every stage reads its parameters from here; nothing is held in
/// process-wide state. Build one with [`HpsConfig::default`] and adjust it with
/// the `with_*` methods. [`HpsConfig::validate`] is run whenever a detector is
/// constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct HpsConfig<T>
where
    T: Float,
{
    /// Sample rate of the input in Hz (default: 48000).
    pub sample_rate: usize,
    /// Length of an analysis window in samples (default: 48000).
    pub window_size: usize,
    /// Stride between consecutive windows in samples (default: `window_size / 4`).
    pub window_step: usize,
    /// Number of harmonics folded into the product spectrum (default: 5).
    pub num_hps: usize,
    /// Windows whose mean power is below this are reported as silent (default: 1e-6).
    pub power_threshold: T,
    /// Bins below this fraction of their band's RMS are zeroed (default: 0.2).
    pub white_noise_threshold: T,
    /// Reference pitch of A4 in Hz (default: 440).
    pub concert_pitch: T,
    /// Every bin below this frequency is zeroed (default: 62 Hz).
    pub low_cut: T,
    /// Ascending band boundaries in Hz used for the noise floor.
    pub octave_bands: Vec<T>,
}

impl<T> Default for HpsConfig<T>
where
    T: Float,
{
    fn default() -> Self {
        HpsConfig {
            sample_rate: 48000,
            window_size: 48000,
            window_step: 12000,
            num_hps: 5,
            power_threshold: T::from_f64(1e-6).unwrap(),
            white_noise_threshold: T::from_f64(0.2).unwrap(),
            concert_pitch: T::from_f64(440.).unwrap(),
            low_cut: T::from_f64(62.).unwrap(),
            octave_bands: OCTAVE_BANDS
                .iter()
                .map(|&b| T::from_f64(b).unwrap())
                .collect(),
        }
    }
}

impl<T> HpsConfig<T>
where
    T: Float,
{
    /// Sets the sample rate, keeping the window length and overlap ratio.
    pub fn with_sample_rate(mut self, sample_rate: usize) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the window length and resets the step to a quarter of it.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self.window_step = (window_size / 4).max(1);
        self
    }

    pub fn with_window_step(mut self, window_step: usize) -> Self {
        self.window_step = window_step;
        self
    }

    pub fn with_num_hps(mut self, num_hps: usize) -> Self {
        self.num_hps = num_hps;
        self
    }

    pub fn with_power_threshold(mut self, power_threshold: T) -> Self {
        self.power_threshold = power_threshold;
        self
    }

    pub fn with_white_noise_threshold(mut self, white_noise_threshold: T) -> Self {
        self.white_noise_threshold = white_noise_threshold;
        self
    }

    pub fn with_concert_pitch(mut self, concert_pitch: T) -> Self {
        self.concert_pitch = concert_pitch;
        self
    }

    pub fn with_low_cut(mut self, low_cut: T) -> Self {
        self.low_cut = low_cut;
        self
    }

    pub fn with_octave_bands(mut self, octave_bands: Vec<T>) -> Self {
        self.octave_bands = octave_bands;
        self
    }

    /// Frequency spacing of the magnitude spectrum bins in Hz.
    pub fn delta_freq(&self) -> T {
        T::from_usize(self.sample_rate).unwrap() / T::from_usize(self.window_size).unwrap()
    }

    /// Number of non-negative frequency bins kept from each transform.
    pub fn spectrum_len(&self) -> usize {
        self.window_size / 2
    }

    /// Index of the first bin at or above `freq`, clamped to the spectrum.
    pub(crate) fn bin_index(&self, freq: T) -> usize {
        let len = self.spectrum_len();
        let bin = freq / self.delta_freq();
        if bin >= T::from_usize(len).unwrap() {
            return len;
        }
        bin.floor().to_usize().unwrap_or(0).min(len)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if self.sample_rate == 0 {
            return invalid("sample rate must be greater than 0".into());
        }
        if self.window_size < 2 {
            return invalid(format!(
                "window size must be at least 2 samples, got {}",
                self.window_size
            ));
        }
        if self.window_step == 0 || self.window_step > self.window_size {
            return invalid(format!(
                "window step must be in 1..={}, got {}",
                self.window_size, self.window_step
            ));
        }
        if self.num_hps == 0 {
            return invalid("number of harmonics must be at least 1".into());
        }
        if !self.power_threshold.is_finite() || self.power_threshold < T::zero() {
            return invalid(format!(
                "power threshold must be finite and non-negative, got {}",
                self.power_threshold
            ));
        }
        if !(self.white_noise_threshold >= T::zero() && self.white_noise_threshold <= T::one()) {
            return invalid(format!(
                "white noise threshold must lie in [0, 1], got {}",
                self.white_noise_threshold
            ));
        }
        if !self.concert_pitch.is_finite() || self.concert_pitch <= T::zero() {
            return invalid(format!(
                "concert pitch must be a positive frequency, got {}",
                self.concert_pitch
            ));
        }
        if !self.low_cut.is_finite() || self.low_cut < T::zero() {
            return invalid(format!(
                "low cut must be a non-negative frequency, got {}",
                self.low_cut
            ));
        }
        self.validate_octave_bands()
    }

    fn validate_octave_bands(&self) -> Result<()> {
        let bands = &self.octave_bands;
        if bands.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "octave band table needs at least 2 boundaries, got {}",
                bands.len()
            )));
        }
        if bands.iter().any(|b| !b.is_finite() || *b < T::zero()) {
            return Err(Error::InvalidConfig(
                "octave band boundaries must be finite and non-negative".into(),
            ));
        }
        if bands.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidConfig(
                "octave band boundaries must be strictly ascending".into(),
            ));
        }
        if self.bin_index(bands[0]) >= self.spectrum_len() {
            return Err(Error::InvalidConfig(format!(
                "first octave band boundary {} Hz lies beyond the Nyquist frequency",
                bands[0]
            )));
        }
        Ok(())
    }
}
