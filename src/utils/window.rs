//! Overlapping analysis windows and the tapering function applied to them.

use crate::float::Float;

/// Slices a sample buffer into fixed-length windows that start `step` samples
/// apart. A trailing chunk shorter than `size` is never emitted.
///
/// ```rust
/// use hps_pitch::utils::window::Windower;
///
/// let samples: Vec<f32> = (0..10).map(|x| x as f32).collect();
/// let windows: Vec<&[f32]> = Windower::new(&samples, 4, 3).collect();
/// assert_eq!(windows, vec![&[0., 1., 2., 3.][..], &[3., 4., 5., 6.][..], &[6., 7., 8., 9.][..]]);
/// ```
pub struct Windower<'a, T> {
    samples: &'a [T],
    size: usize,
    step: usize,
    cursor: usize,
}

impl<'a, T> Windower<'a, T> {
    pub fn new(samples: &'a [T], size: usize, step: usize) -> Self {
        assert!(size > 0, "Window size must be greater than 0");
        assert!(step > 0, "Window step must be greater than 0");
        Windower {
            samples,
            size,
            step,
            cursor: 0,
        }
    }

    /// Returns the next window and advances the cursor by one step, or `None`
    /// once fewer than `size` samples remain.
    pub fn next_window(&mut self) -> Option<&'a [T]> {
        let end = self.cursor.checked_add(self.size)?;
        if end > self.samples.len() {
            return None;
        }
        let window = &self.samples[self.cursor..end];
        self.cursor += self.step;
        Some(window)
    }

    /// Offset of the next window into the buffer.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<'a, T> Iterator for Windower<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        self.next_window()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = window_count(
            self.samples.len().saturating_sub(self.cursor),
            self.size,
            self.step,
        );
        (remaining, Some(remaining))
    }
}

impl<'a, T> ExactSizeIterator for Windower<'a, T> {}

/// Number of windows a buffer of `len` samples yields.
pub fn window_count(len: usize, size: usize, step: usize) -> usize {
    if len < size {
        0
    } else {
        (len - size) / step + 1
    }
}

/// Symmetric Hann window of length `size`:
///
/// > w(n) = 0.5 - 0.5 cos(2 pi n / (size - 1))
///
/// A length of one yields `[1]`.
pub fn hann_window<T: Float>(size: usize) -> Vec<T> {
    if size <= 1 {
        return vec![T::one(); size];
    }
    let half = T::from_f64(0.5).unwrap();
    let two_pi = T::from_f64(2.0 * std::f64::consts::PI).unwrap();
    let denom = T::from_usize(size - 1).unwrap();
    (0..size)
        .map(|n| half - half * (two_pi * T::from_usize(n).unwrap() / denom).cos())
        .collect()
}
