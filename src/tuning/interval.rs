#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tuning::Pitch;

/*
Interval Classes (12-TET)
=========================

Western interval names pair a quality with a scale degree:

  degree   1  2  3  4  5  6  7  8 (octave) 9 ...
  perfect  0        5  7           12
  major       2  4        9  11       14
  minor       1  3        8  10       13

Degrees above 7 wrap: degree 9 is degree 2 plus an octave. Diminished is
one semitone below perfect/minor, augmented one above perfect/major, so
a diminished fifth and an augmented fourth are both 6 semitones.

Not every pairing exists: there is no "major fifth" or "perfect third".
Those return None from `semitones()`.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalClass {
    Perfect(u32),
    Major(u32),
    Minor(u32),
    Diminished(u32),
    Augmented(u32),
}

const PERFECT: [Option<u32>; 7] = [Some(0), None, None, Some(5), Some(7), None, None];
const MAJOR: [Option<u32>; 7] = [None, Some(2), Some(4), None, None, Some(9), Some(11)];

impl IntervalClass {
    /// Canonical name for a semitone distance: the tritone is a
    /// diminished fifth.
    pub fn from_semitones(semitones: u32) -> Self {
        let octave_degrees = (semitones / 12) * 7;
        match semitones % 12 {
            0 => IntervalClass::Perfect(1 + octave_degrees),
            1 => IntervalClass::Minor(2 + octave_degrees),
            2 => IntervalClass::Major(2 + octave_degrees),
            3 => IntervalClass::Minor(3 + octave_degrees),
            4 => IntervalClass::Major(3 + octave_degrees),
            5 => IntervalClass::Perfect(4 + octave_degrees),
            6 => IntervalClass::Diminished(5 + octave_degrees),
            7 => IntervalClass::Perfect(5 + octave_degrees),
            8 => IntervalClass::Minor(6 + octave_degrees),
            9 => IntervalClass::Major(6 + octave_degrees),
            10 => IntervalClass::Minor(7 + octave_degrees),
            _ => IntervalClass::Major(7 + octave_degrees),
        }
    }

    pub fn degree(self) -> u32 {
        match self {
            IntervalClass::Perfect(d)
            | IntervalClass::Major(d)
            | IntervalClass::Minor(d)
            | IntervalClass::Diminished(d)
            | IntervalClass::Augmented(d) => d,
        }
    }

    /// Semitone size, or `None` for a quality the degree does not take.
    pub fn semitones(self) -> Option<u32> {
        let degree = self.degree();
        if degree == 0 {
            return None;
        }
        let index = ((degree - 1) % 7) as usize;
        let octave = ((degree - 1) / 7) * 12;
        let perfect = PERFECT[index];
        let major = MAJOR[index];

        let within = match self {
            IntervalClass::Perfect(_) => perfect,
            IntervalClass::Major(_) => major,
            IntervalClass::Minor(_) => major.map(|s| s - 1),
            IntervalClass::Diminished(_) => perfect.or(major.map(|s| s - 1))?.checked_sub(1),
            IntervalClass::Augmented(_) => perfect.or(major).map(|s| s + 1),
        }?;
        Some(within + octave)
    }

    /// Same size in 12-TET, regardless of spelling.
    pub fn is_enharmonic(self, other: IntervalClass) -> bool {
        match (self.semitones(), other.semitones()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Equal-tempered size in octaves.
    pub fn pitch(self) -> Option<Pitch> {
        self.semitones().map(|s| s as Pitch / 12.0)
    }
}

/// Triad qualities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chord {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl Chord {
    pub fn intervals(self) -> [IntervalClass; 3] {
        use IntervalClass::*;
        match self {
            Chord::Major => [Perfect(1), Major(3), Perfect(5)],
            Chord::Minor => [Perfect(1), Minor(3), Perfect(5)],
            Chord::Diminished => [Perfect(1), Minor(3), Diminished(5)],
            Chord::Augmented => [Perfect(1), Major(3), Augmented(5)],
        }
    }

    pub fn semitones(self) -> [u32; 3] {
        match self {
            Chord::Major => [0, 4, 7],
            Chord::Minor => [0, 3, 7],
            Chord::Diminished => [0, 3, 6],
            Chord::Augmented => [0, 4, 8],
        }
    }

    /// Equal-tempered pitches of the triad on `root`.
    pub fn pitches(self, root: Pitch) -> [Pitch; 3] {
        self.semitones().map(|s| root + s as Pitch / 12.0)
    }
}
