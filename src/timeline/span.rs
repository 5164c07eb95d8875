//! Half-open time span on the prep clock.

use std::fmt::Display;

use crate::units::{minutes, Minutes};

/// Half-open range `[start, end)` in engine minutes.
///
/// Two spans overlap only when they share an interior point, so back-to-back
/// tasks on the same equipment never conflict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    start: Minutes,
    end: Minutes,
}

impl Span {
    /// Creates span `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub const fn new(start: Minutes, end: Minutes) -> Self {
        assert!(start.value() <= end.value(), "Span start must be <= end");
        Self { start, end }
    }

    pub const fn from_f64(start: f64, end: f64) -> Self {
        Self::new(minutes(start), minutes(end))
    }

    pub const fn start(&self) -> Minutes {
        self.start
    }

    pub const fn end(&self) -> Minutes {
        self.end
    }

    pub fn duration(&self) -> Minutes {
        self.end - self.start
    }

    /// True if the spans share an interior point.
    pub const fn overlaps(&self, other: &Span) -> bool {
        self.start.value() < other.end.value() && other.start.value() < self.end.value()
    }

    /// Returns true if `position` ∈ `[start, end)`.
    pub const fn contains(&self, position: Minutes) -> bool {
        self.start.value() <= position.value() && position.value() < self.end.value()
    }

    /// Shifts the span so it begins at `start`, keeping its duration.
    pub fn rebased(&self, start: Minutes) -> Span {
        Span::new(start, start + self.duration())
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.1}, {:.1})", self.start.value(), self.end.value())
    }
}

impl serde::Serialize for Span {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Span", 2)?;
        s.serialize_field("start", &self.start.value())?;
        s.serialize_field("end", &self.end.value())?;
        s.end()
    }
}

impl<'de> serde::Deserialize<'de> for Span {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: f64,
            end: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.start > raw.end {
            return Err(serde::de::Error::custom("Span start must be <= end"));
        }
        Ok(Self::new(minutes(raw.start), minutes(raw.end)))
    }
}
