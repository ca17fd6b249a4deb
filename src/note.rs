//! Equal-tempered note naming.
//!
//! A frequency is classified by its nearest semitone relative to the concert
//! pitch, using the closed form
//!
//! > n = round(12 * log2(f / concert_pitch))
//!
//! so the mapping is exact for every octave without consulting a table.

use std::fmt;

use crate::float::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class of the note `semitones` away from A.
    pub fn from_semitone_offset(semitones: i32) -> Self {
        // A sits nine semitones above C.
        Self::ALL[(semitones + 9).rem_euclid(12) as usize]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A note of the equal-tempered scale together with its reference frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note<T>
where
    T: Float,
{
    pub pitch_class: PitchClass,
    pub octave: i32,
    /// Signed distance from the concert pitch in semitones.
    pub semitones: i32,
    /// Exact frequency of the note in Hz.
    pub frequency: T,
}

impl<T> Note<T>
where
    T: Float,
{
    /// The note `semitones` away from the concert pitch (A4).
    pub fn from_semitones(semitones: i32, concert_pitch: T) -> Self {
        Note {
            pitch_class: PitchClass::from_semitone_offset(semitones),
            octave: 4 + (semitones + 9).div_euclid(12),
            semitones,
            frequency: note_to_freq(semitones, concert_pitch),
        }
    }

    /// Label such as `A4` or `C#-1`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl<T> fmt::Display for Note<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Nearest semitone offset of `freq` from `concert_pitch`, or `None` when
/// `freq` is not a positive finite frequency.
pub fn freq_to_semitones<T: Float>(freq: T, concert_pitch: T) -> Option<i32> {
    if !freq.is_finite() || freq <= T::zero() {
        return None;
    }
    let twelve = T::from_usize(12).unwrap();
    (twelve * (freq / concert_pitch).log2()).round().to_i32()
}

/// Frequency in Hz of the note `semitones` away from `concert_pitch`.
pub fn note_to_freq<T: Float>(semitones: i32, concert_pitch: T) -> T {
    let twelve = T::from_usize(12).unwrap();
    let two = T::from_usize(2).unwrap();
    concert_pitch * two.powf(T::from_i32(semitones).unwrap() / twelve)
}

/// The nearest note to `freq`. Zero, negative or non-finite input means
/// there is no note.
///
/// ```rust
/// use hps_pitch::note::freq_to_note;
///
/// let note = freq_to_note(261.63_f64, 440.0).unwrap();
/// assert_eq!(note.to_string(), "C4");
/// assert!((note.frequency - 261.6256).abs() < 1e-3);
/// assert!(freq_to_note(0.0_f64, 440.0).is_none());
/// ```
pub fn freq_to_note<T: Float>(freq: T, concert_pitch: T) -> Option<Note<T>> {
    freq_to_semitones(freq, concert_pitch).map(|n| Note::from_semitones(n, concert_pitch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_pitch_is_a4() {
        let note = freq_to_note(440.0_f64, 440.0).unwrap();
        assert_eq!(note.label(), "A4");
        assert_eq!(note.pitch_class, PitchClass::A);
        assert_eq!(note.frequency, 440.0);
    }

    #[test]
    fn octave_boundaries() {
        let label = |n: i32| Note::from_semitones(n, 440.0_f64).label();
        assert_eq!(label(2), "B4");
        assert_eq!(label(3), "C5");
        assert_eq!(label(-9), "C4");
        assert_eq!(label(-10), "B3");
        assert_eq!(label(-57), "C0");
        assert_eq!(label(-58), "B-1");
        assert_eq!(label(1), "A#4");
    }

    #[test]
    fn round_trip_over_eight_octaves() {
        for k in -48..=48 {
            let freq = note_to_freq(k, 440.0_f64);
            assert_eq!(freq_to_semitones(freq, 440.0), Some(k));
        }
    }

    #[test]
    fn rounds_to_nearest_semitone() {
        // A quarter tone below A4 plus a little still lands on A4.
        let note = freq_to_note(440.0_f64 * 2f64.powf(-0.49 / 12.0), 440.0).unwrap();
        assert_eq!(note.label(), "A4");
        let note = freq_to_note(445.0_f32, 440.0).unwrap();
        assert_eq!(note.label(), "A4");
        assert_eq!(note.frequency, 440.0);
    }

    #[test]
    fn alternate_concert_pitch() {
        let note = freq_to_note(432.0_f64, 432.0).unwrap();
        assert_eq!(note.label(), "A4");
        assert_eq!(note.frequency, 432.0);
    }

    #[test]
    fn no_note_for_degenerate_input() {
        assert!(freq_to_note(0.0_f64, 440.0).is_none());
        assert!(freq_to_note(-3.0_f64, 440.0).is_none());
        assert!(freq_to_note(f64::NAN, 440.0).is_none());
        assert!(freq_to_note(f64::INFINITY, 440.0).is_none());
    }
}
