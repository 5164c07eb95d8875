//! Minute-based engine time.
//!
//! All scheduling math runs on `Quantity<Minute>` counted from t=0; there is
//! no wall clock inside the engine. Timelines carry a chrono anchor so a
//! caller can project engine minutes onto real time.

use qtty::{Minute, Quantity};

/// Engine time and duration type: f64-backed minutes from the start of prep.
pub type Minutes = Quantity<Minute>;

/// Convenience constructor for a minute quantity.
#[inline]
pub const fn minutes(value: f64) -> Minutes {
    Quantity::new(value)
}

/// Serde adapter serializing a minute quantity as a flat f64.
///
/// Used via `#[serde(with = "crate::units::minute_repr")]` on every
/// serializable field holding engine time, so snapshots and chart JSON carry
/// plain numbers instead of a wrapper object.
pub mod minute_repr {
    use super::Minutes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(quantity: &Minutes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(quantity.value())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Minutes, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Minutes::new)
    }
}
