//! Generic mount control interface.

use std::sync::mpsc::Receiver;

use coords::{Angle, Equatorial, Horizontal};

use crate::error::MountResult;
use crate::event::{MountEvent, SlewOutcome};

/// Interface for telescope mount control.
///
/// Abstracts the mount for the surrounding framework and tools: callers
/// program against this trait, not against a particular driver adapter.
///
/// Methods take `&self`; implementations use interior mutability so that
/// [`abort_slew`](Self::abort_slew) can be called from another thread
/// while [`slew_to_ra_dec`](Self::slew_to_ra_dec) blocks its caller.
pub trait MountControl {
    /// Connect to the mount and bring it to a ready state (unparked,
    /// tracking if supported).
    fn open(&self) -> MountResult<()>;

    /// Disconnect from the mount. Driver-side shutdown failures are
    /// logged, not propagated.
    fn close(&self) -> MountResult<()>;

    /// Current right ascension.
    fn get_ra(&self) -> MountResult<Angle>;

    /// Current declination.
    fn get_dec(&self) -> MountResult<Angle>;

    /// Current azimuth.
    fn get_az(&self) -> MountResult<Angle>;

    /// Current altitude.
    fn get_alt(&self) -> MountResult<Angle>;

    /// Current equatorial position.
    fn get_position_ra_dec(&self) -> MountResult<Equatorial>;

    /// Current horizontal position.
    fn get_position_alt_az(&self) -> MountResult<Horizontal>;

    /// Last requested slew target, or the current position if no slew has
    /// been requested yet.
    fn get_target_ra_dec(&self) -> MountResult<Equatorial>;

    /// Whether the mount is currently slewing.
    fn is_slewing(&self) -> MountResult<bool>;

    /// Whether sidereal tracking is on.
    fn is_tracking(&self) -> MountResult<bool>;

    /// Whether the mount is parked.
    fn is_parked(&self) -> MountResult<bool>;

    /// Slew to an equatorial position, blocking until the slew completes,
    /// is aborted, or fails.
    fn slew_to_ra_dec(&self, target: Equatorial) -> MountResult<SlewOutcome>;

    /// Cancel an in-progress slew. Returns `Ok(false)` if no slew was
    /// active (nothing to abort).
    fn abort_slew(&self) -> MountResult<bool>;

    /// Move the mount to its storage position.
    fn park(&self) -> MountResult<()>;

    /// Leave the storage position: home the mount, then enable tracking.
    fn unpark(&self) -> MountResult<()>;

    /// Enable sidereal tracking. No-op if the driver cannot control
    /// tracking.
    fn start_tracking(&self) -> MountResult<()>;

    /// Disable sidereal tracking. No-op if the driver cannot control
    /// tracking.
    fn stop_tracking(&self) -> MountResult<()>;

    /// Align the mount's coordinate model to a known position.
    fn sync_ra_dec(&self, position: Equatorial) -> MountResult<()>;

    /// Jog east by an offset.
    fn move_east(&self, offset: Angle) -> MountResult<()>;

    /// Jog west by an offset.
    fn move_west(&self, offset: Angle) -> MountResult<()>;

    /// Jog north by an offset.
    fn move_north(&self, offset: Angle) -> MountResult<()>;

    /// Jog south by an offset.
    fn move_south(&self, offset: Angle) -> MountResult<()>;

    /// Subscribe to mount event notifications.
    fn subscribe(&self) -> Receiver<MountEvent>;
}
