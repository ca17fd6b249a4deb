//! Drives the detector over a whole buffer, or over a stream of chunks, and
//! turns each window into a [`Detection`].

use std::fmt;

use crate::config::HpsConfig;
use crate::detector::hps::HpsDetector;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::note::{freq_to_note, Note};
use crate::utils::window::Windower;

/// An immutable mono sample buffer and its sample rate.
#[derive(Debug, Clone, Copy)]
pub struct SampleBuffer<'a, T> {
    samples: &'a [T],
    sample_rate: usize,
}

impl<'a, T> SampleBuffer<'a, T> {
    /// Wraps decoded samples. Only single-channel, non-empty input is
    /// accepted; use [`downmix`](crate::utils::buffer::downmix) first for
    /// anything else.
    pub fn new(samples: &'a [T], sample_rate: usize, channels: usize) -> Result<Self> {
        if channels != 1 {
            return Err(Error::InvalidShape { channels });
        }
        if samples.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(SampleBuffer {
            samples,
            sample_rate,
        })
    }

    pub fn mono(samples: &'a [T], sample_rate: usize) -> Result<Self> {
        Self::new(samples, sample_rate, 1)
    }

    pub fn samples(&self) -> &'a [T] {
        self.samples
    }

    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Result for one analysis window.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection<T>
where
    T: Float,
{
    /// Position of the window in the sequence of windows.
    pub index: usize,
    /// Offset of the window's first sample in the input.
    pub start_sample: usize,
    /// Offset of the window's first sample in seconds.
    pub start_time: T,
    /// Estimated fundamental in Hz, zero for silent windows.
    pub frequency: T,
    /// Nearest note, `None` for silent windows.
    pub note: Option<Note<T>>,
}

impl<T> Detection<T>
where
    T: Float,
{
    /// Note label, or `"None"` when no note was found.
    pub fn label(&self) -> String {
        self.note
            .as_ref()
            .map_or_else(|| "None".to_string(), |note| note.label())
    }

    pub fn is_silent(&self) -> bool {
        self.note.is_none()
    }
}

impl<T> fmt::Display for Detection<T>
where
    T: Float,
{
    /// `C4 261.6/261.6`: label, estimate and note frequency rounded to 0.1 Hz.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.note {
            Some(note) => write!(
                f,
                "{} {:.1}/{:.1}",
                note,
                self.frequency.to_f64().unwrap_or(0.),
                note.frequency.to_f64().unwrap_or(0.)
            ),
            None => f.write_str("None"),
        }
    }
}

/// Receives detections in window order.
pub trait NoteSink<T>
where
    T: Float,
{
    fn accept(&mut self, detection: Detection<T>);
}

impl<T> NoteSink<T> for Vec<Detection<T>>
where
    T: Float,
{
    fn accept(&mut self, detection: Detection<T>) {
        self.push(detection);
    }
}

impl<T, F> NoteSink<T> for F
where
    T: Float,
    F: FnMut(Detection<T>),
{
    fn accept(&mut self, detection: Detection<T>) {
        self(detection)
    }
}

/// Per-window stage shared by the batch and streaming drivers.
struct WindowAnalyzer<T>
where
    T: Float,
{
    detector: HpsDetector<T>,
    next_index: usize,
}

impl<T> WindowAnalyzer<T>
where
    T: Float,
{
    fn new(config: HpsConfig<T>) -> Result<Self> {
        Ok(WindowAnalyzer {
            detector: HpsDetector::new(config)?,
            next_index: 0,
        })
    }

    fn config(&self) -> &HpsConfig<T> {
        self.detector.config()
    }

    /// Analyse the window starting at `start_sample`. Windows with
    /// non-finite values are logged and yield nothing.
    fn analyze(&mut self, window: &[T], start_sample: usize) -> Result<Option<Detection<T>>> {
        let index = self.next_index;
        self.next_index += 1;

        let pitch = match self.detector.get_pitch(window) {
            Ok(pitch) => pitch,
            Err(e @ Error::NonFinite { .. }) => {
                log::warn!("Skipping window {} at sample {}: {}", index, start_sample, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let config = self.detector.config();
        let frequency = pitch.map_or_else(T::zero, |p| p.frequency);
        let detection = Detection {
            index,
            start_sample,
            start_time: T::from_usize(start_sample).unwrap()
                / T::from_usize(config.sample_rate).unwrap(),
            frequency,
            note: freq_to_note(frequency, config.concert_pitch),
        };
        log::debug!("Window {} at sample {}: {}", index, start_sample, detection);
        Ok(Some(detection))
    }
}

fn check_sample_rate<T: Float>(config: &HpsConfig<T>, actual: usize) -> Result<()> {
    if config.sample_rate != actual {
        return Err(Error::SampleRateMismatch {
            expected: config.sample_rate,
            actual,
        });
    }
    Ok(())
}

/// Analyse every full window of `buffer` and pass the detections to `sink`.
/// Returns the number of detections delivered.
pub fn analyze_into<T, S>(
    buffer: &SampleBuffer<T>,
    config: HpsConfig<T>,
    sink: &mut S,
) -> Result<usize>
where
    T: Float,
    S: NoteSink<T> + ?Sized,
{
    check_sample_rate(&config, buffer.sample_rate())?;
    let mut analyzer = WindowAnalyzer::new(config)?;
    let (size, step) = (analyzer.config().window_size, analyzer.config().window_step);

    let mut delivered = 0;
    let mut windows = Windower::new(buffer.samples(), size, step);
    loop {
        let start = windows.position();
        let Some(window) = windows.next_window() else {
            break;
        };
        if let Some(detection) = analyzer.analyze(window, start)? {
            sink.accept(detection);
            delivered += 1;
        }
    }
    Ok(delivered)
}

/// Analyse every full window of `buffer`.
///
/// ```rust
/// use hps_pitch::{analyze, HpsConfig, SampleBuffer};
///
/// let config = HpsConfig::default().with_sample_rate(8000).with_window_size(8000);
/// let samples: Vec<f64> = (0..16000)
///     .map(|n| 0.5 * (2.0 * std::f64::consts::PI * 440.0 * n as f64 / 8000.0).sin())
///     .collect();
/// let buffer = SampleBuffer::mono(&samples, 8000).unwrap();
///
/// let notes = analyze(&buffer, config).unwrap();
/// assert_eq!(notes.len(), 5);
/// assert!(notes.iter().all(|d| d.label() == "A4"));
/// ```
pub fn analyze<T: Float>(
    buffer: &SampleBuffer<T>,
    config: HpsConfig<T>,
) -> Result<Vec<Detection<T>>> {
    let mut detections: Vec<Detection<T>> = Vec::new();
    analyze_into(buffer, config, &mut detections)?;
    Ok(detections)
}

/// Incremental analysis of audio arriving in chunks of any size.
///
/// Samples are buffered until a full window is available. Fed the same
/// samples, it produces the same detections as [`analyze`].
pub struct StreamingAnalyzer<T>
where
    T: Float,
{
    analyzer: WindowAnalyzer<T>,
    pending: Vec<T>,
    /// Offset in the stream of `pending[0]`.
    pending_start: usize,
}

impl<T> StreamingAnalyzer<T>
where
    T: Float,
{
    pub fn new(config: HpsConfig<T>) -> Result<Self> {
        let analyzer = WindowAnalyzer::new(config)?;
        let capacity = analyzer.config().window_size;
        Ok(StreamingAnalyzer {
            analyzer,
            pending: Vec::with_capacity(capacity),
            pending_start: 0,
        })
    }

    pub fn config(&self) -> &HpsConfig<T> {
        self.analyzer.config()
    }

    /// Number of samples waiting for the next window to fill.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append `chunk` and analyse every window it completes. Returns the
    /// number of detections passed to `sink`.
    pub fn push<S>(&mut self, chunk: &[T], sink: &mut S) -> Result<usize>
    where
        S: NoteSink<T> + ?Sized,
    {
        let (size, step) = (self.config().window_size, self.config().window_step);
        self.pending.extend_from_slice(chunk);

        let mut delivered = 0;
        while self.pending.len() >= size {
            if let Some(detection) = self
                .analyzer
                .analyze(&self.pending[..size], self.pending_start)?
            {
                sink.accept(detection);
                delivered += 1;
            }
            self.pending.drain(..step);
            self.pending_start += step;
        }
        Ok(delivered)
    }

    /// Drop buffered samples and restart window numbering.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.pending_start = 0;
        self.analyzer.next_index = 0;
    }
}
