//! Mount-level error taxonomy.
//!
//! Every failure that crosses the driver boundary is translated into
//! [`MountError`] at the call site. Vendor error representations never
//! reach callers of the mount interface.

use std::time::Duration;

use thiserror::Error;

use crate::ascom::DriverError;

/// Errors reported by mount operations.
#[derive(Error, Debug)]
pub enum MountError {
    /// A driver property or method invocation failed.
    ///
    /// Carries the originating call and the driver's message; this is the
    /// only form in which driver failures are visible to callers.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Operation attempted before `open()` succeeded (or after `close()`).
    #[error("mount is not connected")]
    NotConnected,

    /// A slew was requested while one is already in progress.
    ///
    /// The pending slew's target and cancellation state are untouched.
    #[error("a slew is already in progress")]
    SlewInProgress,

    /// The slew poll loop gave up waiting for driver completion.
    #[error("slew did not complete within {0:?}")]
    SlewTimeout(Duration),

    /// The driver lacks a capability required by the requested operation.
    #[error("driver does not support {0}")]
    Unsupported(&'static str),
}

/// Result type for mount operations.
pub type MountResult<T> = Result<T, MountError>;
