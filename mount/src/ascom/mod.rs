//! ASCOM telescope mount support.
//!
//! Two layers, mirroring how vendor drivers are organized:
//!
//! - [`driver`] - the narrow typed interface standing in for the ASCOM
//!   automation object, plus the boundary error type
//! - [`telescope`] - the adapter translating generic mount commands into
//!   driver calls

pub mod driver;
pub mod telescope;

pub use driver::{AscomDriver, DriverError, DriverResult, JogDirection};
pub use telescope::AscomTelescope;
