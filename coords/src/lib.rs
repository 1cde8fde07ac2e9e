//! Angle and sky coordinate value types for mount control.
//!
//! Telescope drivers disagree about units: ASCOM reports right ascension
//! in hours and everything else in degrees. [`Angle`] is the single
//! conversion point, so driver code can say what unit a raw value is in
//! exactly once and everything downstream works in typed angles.
//!
//! # Example
//!
//! ```
//! use coords::{Angle, Equatorial};
//!
//! // RA arrives from the driver in hours, Dec in degrees.
//! let pos = Equatorial::from_ra_dec(Angle::from_hours(5.5), Angle::from_degrees(-5.39));
//! assert_eq!(pos.ra.degrees(), 82.5);
//! println!("{pos}");
//! ```

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Hours of right ascension per degree of arc.
const DEGREES_PER_HOUR: f64 = 15.0;

/// Arcseconds per degree.
const ARCSECONDS_PER_DEGREE: f64 = 3600.0;

/// An angle, stored internally in degrees.
///
/// Construct from whatever unit the source uses; read back in whatever
/// unit the destination wants. `Display` renders sexagesimal
/// (`DD:MM:SS.SS`), which is what observers expect in logs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle {
    degrees: f64,
}

impl Angle {
    /// Zero angle.
    pub const ZERO: Angle = Angle { degrees: 0.0 };

    /// Create an angle from decimal degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self { degrees }
    }

    /// Create an angle from decimal hours (1 h = 15 deg).
    pub fn from_hours(hours: f64) -> Self {
        Self {
            degrees: hours * DEGREES_PER_HOUR,
        }
    }

    /// Create an angle from radians.
    pub fn from_radians(radians: f64) -> Self {
        Self {
            degrees: radians.to_degrees(),
        }
    }

    /// Create an angle from arcseconds.
    pub fn from_arcseconds(arcseconds: f64) -> Self {
        Self {
            degrees: arcseconds / ARCSECONDS_PER_DEGREE,
        }
    }

    /// Value in decimal degrees.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Value in decimal hours.
    pub fn hours(&self) -> f64 {
        self.degrees / DEGREES_PER_HOUR
    }

    /// Value in radians.
    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Value in arcseconds.
    pub fn arcseconds(&self) -> f64 {
        self.degrees * ARCSECONDS_PER_DEGREE
    }

    /// Value in arcminutes.
    pub fn arcminutes(&self) -> f64 {
        self.degrees * 60.0
    }

    /// Normalize into `[0, 360)` degrees.
    pub fn normalized_360(&self) -> Self {
        let mut d = self.degrees % 360.0;
        if d < 0.0 {
            d += 360.0;
        }
        Self { degrees: d }
    }

    /// Normalize into `[-180, 180)` degrees.
    pub fn normalized_180(&self) -> Self {
        let d = (self.degrees + 180.0).rem_euclid(360.0) - 180.0;
        Self { degrees: d }
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.degrees + rhs.degrees)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.degrees - rhs.degrees)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle::from_degrees(-self.degrees)
    }
}

impl fmt::Display for Angle {
    /// Sexagesimal `[-]DD:MM:SS.SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.degrees < 0.0 { "-" } else { "" };
        // Round at the displayed precision (hundredths of an arcsecond)
        // before splitting, so 59.999" carries into the next minute
        // instead of rendering as 60.00.
        let total = (self.degrees.abs() * ARCSECONDS_PER_DEGREE * 100.0).round() as u64;
        let centis = total % 6000;
        let m = (total / 6000) % 60;
        let d = total / 360_000;
        write!(f, "{sign}{d:02}:{m:02}:{:02}.{:02}", centis / 100, centis % 100)
    }
}

/// An equatorial (RA/Dec) sky position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    /// Right ascension.
    pub ra: Angle,
    /// Declination.
    pub dec: Angle,
}

impl Equatorial {
    /// Build a position from right ascension and declination.
    pub fn from_ra_dec(ra: Angle, dec: Angle) -> Self {
        Self { ra, dec }
    }
}

impl fmt::Display for Equatorial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RA {} Dec {}", self.ra, self.dec)
    }
}

/// A horizontal (Alt/Az) sky position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    /// Altitude above the horizon.
    pub alt: Angle,
    /// Azimuth, measured east from north.
    pub az: Angle,
}

impl Horizontal {
    /// Build a position from altitude and azimuth.
    pub fn from_alt_az(alt: Angle, az: Angle) -> Self {
        Self { alt, az }
    }
}

impl fmt::Display for Horizontal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alt {} Az {}", self.alt, self.az)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hours_to_degrees() {
        let a = Angle::from_hours(5.5);
        assert_relative_eq!(a.degrees(), 82.5, epsilon = 1e-12);
        assert_relative_eq!(a.hours(), 5.5, epsilon = 1e-12);
    }

    #[test]
    fn test_arcseconds_round_trip() {
        let a = Angle::from_arcseconds(1.53);
        assert_relative_eq!(a.arcseconds(), 1.53, epsilon = 1e-10);
        assert_relative_eq!(a.degrees(), 1.53 / 3600.0, epsilon = 1e-12);
    }

    #[test]
    fn test_radians() {
        let a = Angle::from_radians(std::f64::consts::PI);
        assert_relative_eq!(a.degrees(), 180.0, epsilon = 1e-10);
    }

    #[test]
    fn test_normalized_360() {
        assert_relative_eq!(
            Angle::from_degrees(-30.0).normalized_360().degrees(),
            330.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            Angle::from_degrees(725.0).normalized_360().degrees(),
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_normalized_180() {
        assert_relative_eq!(
            Angle::from_degrees(270.0).normalized_180().degrees(),
            -90.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            Angle::from_degrees(-190.0).normalized_180().degrees(),
            170.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_arithmetic() {
        let sum = Angle::from_degrees(10.0) + Angle::from_hours(1.0);
        assert_relative_eq!(sum.degrees(), 25.0, epsilon = 1e-12);
        let diff = Angle::from_degrees(10.0) - Angle::from_degrees(4.0);
        assert_relative_eq!(diff.degrees(), 6.0, epsilon = 1e-12);
        assert_relative_eq!((-Angle::from_degrees(2.0)).degrees(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sexagesimal_display() {
        let a = Angle::from_degrees(82.5);
        assert_eq!(a.to_string(), "82:30:00.00");
        let b = Angle::from_degrees(-5.391);
        assert_eq!(b.to_string(), "-05:23:27.60");
    }

    #[test]
    fn test_sexagesimal_display_carries_rounding() {
        // 15 deg 59' 59.999" rounds up through seconds and minutes.
        let a = Angle::from_degrees(15.0 + 59.0 / 60.0 + 59.999 / 3600.0);
        assert_eq!(a.to_string(), "16:00:00.00");
        let b = Angle::from_degrees(-0.9999999);
        assert_eq!(b.to_string(), "-01:00:00.00");
        // Just below the rounding threshold stays put.
        let c = Angle::from_degrees(59.99 / 3600.0);
        assert_eq!(c.to_string(), "00:00:59.99");
    }

    #[test]
    fn test_equatorial_display() {
        let pos = Equatorial::from_ra_dec(Angle::from_hours(5.5), Angle::from_degrees(-5.39));
        assert_eq!(pos.to_string(), "RA 82:30:00.00 Dec -05:23:24.00");
    }
}
