//! ASCOM driver interface boundary.
//!
//! ASCOM exposes telescope mounts through a late-bound automation object:
//! property and method names are resolved dynamically at call time. This
//! module replaces that dynamic dispatch with a narrow explicit trait,
//! [`AscomDriver`], with one method per driver member the adapter uses.
//! Each platform backend (COM on Windows, Alpaca over HTTP, the in-process
//! simulator) implements the trait once; everything above it is typed.
//!
//! # Unit conventions
//!
//! Bit-exact with ASCOM: right ascension is in **hours**, every other
//! angle is in **degrees**. Jog offsets are in **arcminutes**. The
//! `Slewing` and `Tracking` properties are surfaced as the driver's raw
//! integer flags so the adapter can preserve their exact polarity
//! (`0` encodes "not slewing", `1` encodes "tracking").

use thiserror::Error;

/// Error produced by a driver property or method invocation.
///
/// This is the single type in which vendor-side failures cross the driver
/// boundary; the original driver message is carried verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{call}: {message}")]
pub struct DriverError {
    /// The driver member that failed (e.g. `"SlewToCoordinatesAsync"`).
    pub call: &'static str,
    /// Message reported by the driver.
    pub message: String,
}

impl DriverError {
    /// Wrap a driver-side failure message.
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Result type for driver invocations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Cardinal jog directions for small manual offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum JogDirection {
    East,
    West,
    North,
    South,
}

/// Interface to an ASCOM-style telescope driver.
///
/// One method per driver member the mount adapter uses. Implementations
/// are not expected to be thread-safe; the adapter serializes access.
///
/// Property reads take `&mut self` because late-bound backends may need
/// to perform I/O (and the simulator advances its model) on every read.
pub trait AscomDriver: Send {
    /// Set the driver's `Connected` property.
    fn set_connected(&mut self, connected: bool) -> DriverResult<()>;

    /// `RightAscension` property, in hours.
    fn right_ascension(&mut self) -> DriverResult<f64>;

    /// `Declination` property, in degrees.
    fn declination(&mut self) -> DriverResult<f64>;

    /// `Azimuth` property, in degrees.
    fn azimuth(&mut self) -> DriverResult<f64>;

    /// `Altitude` property, in degrees.
    ///
    /// Some drivers report stale values unless [`refresh_alt_az`](Self::refresh_alt_az)
    /// is called first.
    fn altitude(&mut self) -> DriverResult<f64>;

    /// `GetAzAlt` refresh call required by some drivers before reading
    /// `Altitude`/`Azimuth`.
    fn refresh_alt_az(&mut self) -> DriverResult<()>;

    /// Raw `Slewing` flag. The driver encodes "not slewing" as `0`.
    fn slewing(&mut self) -> DriverResult<i32>;

    /// Raw `Tracking` flag. The driver encodes "tracking" as `1`.
    fn tracking(&mut self) -> DriverResult<i32>;

    /// Set the `Tracking` property.
    fn set_tracking(&mut self, enabled: bool) -> DriverResult<()>;

    /// `AtPark` property.
    fn at_park(&mut self) -> DriverResult<bool>;

    /// `CanSlewAsync` capability.
    fn can_slew_async(&mut self) -> DriverResult<bool>;

    /// `CanSetTracking` capability.
    fn can_set_tracking(&mut self) -> DriverResult<bool>;

    /// `IsSlewComplete` poll target for an asynchronous slew.
    fn is_slew_complete(&mut self) -> DriverResult<bool>;

    /// `SlewToCoordinatesAsync`: begin a slew and return immediately.
    fn slew_to_coordinates_async(&mut self, ra_hours: f64, dec_degrees: f64) -> DriverResult<()>;

    /// `AbortSlew`: stop mount motion.
    fn abort_slew(&mut self) -> DriverResult<()>;

    /// `Park`: move to the storage position.
    fn park(&mut self) -> DriverResult<()>;

    /// `FindHome`: drive to the home position (used when unparking).
    fn find_home(&mut self) -> DriverResult<()>;

    /// `Sync`: align the mount's coordinate model to the given position.
    fn sync_to_coordinates(&mut self, ra_hours: f64, dec_degrees: f64) -> DriverResult<()>;

    /// `Jog`: offset the mount by `arcminutes` in the given direction.
    fn jog(&mut self, arcminutes: f64, direction: JogDirection) -> DriverResult<()>;

    /// `Quit`: shut the driver down.
    fn quit(&mut self) -> DriverResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::new("SlewToCoordinatesAsync", "position outside limits");
        assert_eq!(
            err.to_string(),
            "SlewToCoordinatesAsync: position outside limits"
        );
    }

    #[test]
    fn test_jog_direction_parse() {
        assert_eq!(JogDirection::from_str("east").unwrap(), JogDirection::East);
        assert_eq!(JogDirection::from_str("North").unwrap(), JogDirection::North);
        assert!(JogDirection::from_str("up").is_err());
    }
}
