//! Pitch detection with the Harmonic Product Spectrum.
//!
//! The magnitude spectrum of a periodic sound has peaks at the fundamental
//! $f_0$ and at its harmonics $2f_0, 3f_0, \ldots$, and the strongest peak is
//! often a harmonic rather than the fundamental. If the spectrum $X$ is
//! compressed by integer factors and the copies are multiplied,
//! $$ Y(\omega) = \prod_{k=1}^{K} |X(k\omega)|, $$
//! the harmonics of $f_0$ all land on $f_0$ and reinforce each other while
//! isolated peaks are multiplied by near-zero values.
//!
//! ## Implementation
//! Each window goes through the following steps:
//!
//!   1. A power gate: windows whose mean power is below the threshold are silent.
//!   2. A Hann taper followed by an [FFT](https://en.wikipedia.org/wiki/Fast_Fourier_transform),
//!      keeping the magnitudes of the non-negative frequencies.
//!   3. Noise suppression, see [NoiseSuppressor].
//!   4. Linear interpolation to `num_hps` times the bin resolution and
//!      normalization to unit energy.
//!   5. The harmonic fold and a search for its maximum.

use crate::config::HpsConfig;
use crate::detector::internals::{argmax, harmonic_product_spectrum, interpolate, normalize};
use crate::detector::internals::{magnitude_spectrum, DetectorInternals, Pitch};
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::buffer::get_power_level;
use crate::utils::filters::NoiseSuppressor;

pub struct HpsDetector<T>
where
    T: Float,
{
    config: HpsConfig<T>,
    internals: DetectorInternals<T>,
    suppressor: NoiseSuppressor<T>,
}

impl<T> HpsDetector<T>
where
    T: Float,
{
    /// Validates `config` and allocates every buffer a window needs.
    pub fn new(config: HpsConfig<T>) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "HPS detector: {} Hz, window {} step {}, {} harmonics",
            config.sample_rate,
            config.window_size,
            config.window_step,
            config.num_hps
        );

        let internals = DetectorInternals::new(config.window_size, config.num_hps);
        let suppressor = NoiseSuppressor::new(&config);
        Ok(HpsDetector {
            config,
            internals,
            suppressor,
        })
    }

    pub fn config(&self) -> &HpsConfig<T> {
        &self.config
    }

    /// Estimate the fundamental of one analysis window.
    ///
    /// Returns `Ok(None)` when the window is below the power threshold. A
    /// window whose spectrum is wiped out by noise suppression yields a pitch
    /// with a frequency of zero.
    pub fn get_pitch(&mut self, signal: &[T]) -> Result<Option<Pitch<T>>> {
        if signal.len() != self.internals.size {
            return Err(Error::WindowLength {
                expected: self.internals.size,
                actual: signal.len(),
            });
        }

        let power = get_power_level(signal);
        if !power.is_finite() {
            return Err(Error::NonFinite { stage: "samples" });
        }
        if power < self.config.power_threshold {
            return Ok(None);
        }

        let internals = &mut self.internals;
        magnitude_spectrum(
            signal,
            &internals.window,
            internals.fft.as_ref(),
            &mut internals.signal_complex,
            &mut internals.scratch,
            &mut internals.spectrum,
        );
        if internals.spectrum.iter().any(|s| !s.is_finite()) {
            return Err(Error::NonFinite { stage: "spectrum" });
        }

        self.suppressor.suppress(&mut internals.spectrum);

        interpolate(
            &internals.spectrum,
            internals.num_hps,
            &mut internals.interpolated,
        );
        if !normalize(&mut internals.interpolated) {
            return Ok(Some(Pitch {
                frequency: T::zero(),
                power,
            }));
        }

        let len = harmonic_product_spectrum(
            &internals.interpolated,
            internals.num_hps,
            &mut internals.hps,
        );
        let frequency = argmax(&internals.hps[..len])
            .map(|index| self.bin_to_freq(index))
            .unwrap_or_else(T::zero);

        Ok(Some(Pitch { frequency, power }))
    }

    /// Convert an index of the interpolated spectrum to Hz.
    fn bin_to_freq(&self, index: usize) -> T {
        T::from_usize(index).unwrap() * self.config.delta_freq()
            / T::from_usize(self.config.num_hps).unwrap()
    }
}
