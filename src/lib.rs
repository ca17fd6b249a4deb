//! # HPS Pitch
//! *hps_pitch* tracks the pitch of a mono audio buffer with the
//! Harmonic Product Spectrum and labels each analysis window with the
//! nearest equal-tempered note.
//!
//! # Pipeline
//! The buffer is cut into overlapping windows, and every window runs through
//! the same stages:
//!
//!   * a power gate that reports quiet windows as silent,
//!   * a Hann-tapered FFT ([detector::internals::magnitude_spectrum]),
//!   * noise suppression ([utils::filters::NoiseSuppressor]),
//!   * the harmonic product spectrum ([detector::hps]),
//!   * note naming ([note]).
//!
//! Every tunable lives in [HpsConfig]; there is no global state.
//!
//! # Examples
//! ```
//! use hps_pitch::{analyze, HpsConfig, SampleBuffer};
//!
//! fn main() {
//!     const SAMPLE_RATE: usize = 8000;
//!
//!     // Signal coming from some source (microphone, decoded file, etc...)
//!     let dt = 1.0 / SAMPLE_RATE as f64;
//!     let freq = 440.0;
//!     let signal: Vec<f64> = (0..2 * SAMPLE_RATE)
//!         .map(|x| 0.5 * (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
//!         .collect();
//!
//!     let config = HpsConfig::default()
//!         .with_sample_rate(SAMPLE_RATE)
//!         .with_window_size(SAMPLE_RATE);
//!     let buffer = SampleBuffer::mono(&signal, SAMPLE_RATE).unwrap();
//!
//!     for detection in analyze(&buffer, config).unwrap() {
//!         println!("{:.2}s: {}", detection.start_time, detection);
//!     }
//! }
//! ```

pub use analysis::{analyze, analyze_into, Detection, NoteSink, SampleBuffer, StreamingAnalyzer};
pub use config::HpsConfig;
pub use detector::internals::Pitch;
pub use error::{Error, Result};
pub use note::{freq_to_note, Note, PitchClass};

pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod float;
pub mod note;
pub mod utils;
