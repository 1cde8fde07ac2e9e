//! Telescope mount drivers and ASCOM adapter.
//!
//! This crate bridges a generic mount-control interface to vendor
//! telescope drivers. The real motion planning, limit enforcement, and
//! tracking all live inside the driver; this layer translates commands,
//! units, and errors.
//!
//! # Layout
//!
//! - [`interface`] - the [`MountControl`] trait the framework programs against
//! - [`ascom`] - typed driver interface ([`AscomDriver`]) and the adapter
//!   ([`AscomTelescope`]) implementing `MountControl` over it
//! - [`sim`] - in-process simulated driver for development and tests
//! - [`event`] - slew/sync notifications for subscribers
//! - [`config`] - driver id and poll-loop settings
//!
//! # Example
//!
//! ```
//! use coords::{Angle, Equatorial};
//! use mount::{AscomTelescope, MountConfig, MountControl, SimTelescope};
//!
//! let scope = AscomTelescope::new(SimTelescope::new(), MountConfig::default());
//! scope.open()?;
//! scope.sync_ra_dec(Equatorial::from_ra_dec(
//!     Angle::from_hours(12.0),
//!     Angle::from_degrees(45.0),
//! ))?;
//! println!("pointing at {}", scope.get_position_ra_dec()?);
//! scope.close()?;
//! # Ok::<(), mount::MountError>(())
//! ```

pub mod ascom;
pub mod config;
pub mod error;
pub mod event;
pub mod interface;
pub mod sim;

pub use ascom::{AscomDriver, AscomTelescope, DriverError, DriverResult, JogDirection};
pub use config::{ConfigError, MountConfig};
pub use error::{MountError, MountResult};
pub use event::{MountEvent, SlewOutcome};
pub use interface::MountControl;
pub use sim::{SimTelescope, SIM_DRIVER_ID};
