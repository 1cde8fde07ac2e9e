//! ASCOM telescope mount adapter.
//!
//! Translates the generic [`MountControl`] surface into calls on an
//! [`AscomDriver`], converting units at the boundary (ASCOM reports RA in
//! hours, everything else in degrees) and translating every driver
//! failure into [`MountError`].
//!
//! # Slewing
//!
//! Slews are issued asynchronously to the driver and then waited out with
//! a sleep-poll loop (default 200 ms interval). Mount motion takes
//! seconds to minutes, so poll latency is irrelevant next to mechanical
//! settling time and a callback mechanism would buy nothing. Cancellation
//! is cooperative: [`abort_slew`](MountControl::abort_slew) raises a flag
//! the poll loop observes on its next tick, giving worst-case abort
//! latency of one interval.
//!
//! The driver handle sits behind a mutex that is locked per call and
//! never held across a poll sleep, so `abort_slew` can run from another
//! thread while `slew_to_ra_dec` blocks its caller.
//!
//! # Example
//!
//! ```
//! use coords::{Angle, Equatorial};
//! use mount::{AscomTelescope, MountConfig, MountControl, SimTelescope};
//!
//! let scope = AscomTelescope::new(SimTelescope::new(), MountConfig {
//!     idle_interval_ms: 1,
//!     ..MountConfig::default()
//! });
//! scope.open()?;
//!
//! let target = Equatorial::from_ra_dec(Angle::from_hours(5.5), Angle::from_degrees(-5.39));
//! let outcome = scope.slew_to_ra_dec(target)?;
//! println!("slew finished: {outcome:?}, now at {}", scope.get_position_ra_dec()?);
//!
//! scope.close()?;
//! # Ok::<(), mount::MountError>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use coords::{Angle, Equatorial, Horizontal};
use tracing::{debug, error, info, warn};

use crate::ascom::driver::{AscomDriver, DriverResult, JogDirection};
use crate::config::MountConfig;
use crate::error::{MountError, MountResult};
use crate::event::{EventBus, MountEvent, SlewOutcome};
use crate::interface::MountControl;

/// Maps a requested target to the final commanded position, applying
/// mount-specific corrections (flexure models, refraction, ...).
type PositionHook = Box<dyn Fn(Equatorial) -> Equatorial + Send + Sync>;

/// Mount adapter over an ASCOM-style driver.
///
/// Generic over the driver so the same adapter runs against the COM
/// backend on an observatory machine and [`SimTelescope`](crate::SimTelescope)
/// everywhere else.
pub struct AscomTelescope<D: AscomDriver> {
    driver: Mutex<D>,
    config: MountConfig,
    /// Last requested slew or sync target.
    target: Mutex<Option<Equatorial>>,
    connected: AtomicBool,
    /// Guards the one-slew-at-a-time invariant on the adapter side.
    slew_active: AtomicBool,
    /// Cooperative cancellation flag, observed by the poll loop.
    abort: AtomicBool,
    events: EventBus,
    position_hook: Option<PositionHook>,
}

impl<D: AscomDriver> AscomTelescope<D> {
    /// Wrap a driver with the given configuration.
    pub fn new(driver: D, config: MountConfig) -> Self {
        Self {
            driver: Mutex::new(driver),
            config,
            target: Mutex::new(None),
            connected: AtomicBool::new(false),
            slew_active: AtomicBool::new(false),
            abort: AtomicBool::new(false),
            events: EventBus::new(),
            position_hook: None,
        }
    }

    /// Install a hook computing the final commanded position for a slew.
    ///
    /// Without a hook the requested target is commanded unchanged.
    pub fn with_position_hook(
        mut self,
        hook: impl Fn(Equatorial) -> Equatorial + Send + Sync + 'static,
    ) -> Self {
        self.position_hook = Some(Box::new(hook));
        self
    }

    /// Invoke a driver member, translating its error at the boundary.
    ///
    /// The lock is scoped to the single call; nothing holds the driver
    /// across a sleep.
    fn driver_call<T>(&self, f: impl FnOnce(&mut D) -> DriverResult<T>) -> MountResult<T> {
        let mut driver = self.driver.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut driver).map_err(MountError::from)
    }

    fn ensure_connected(&self) -> MountResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MountError::NotConnected)
        }
    }

    fn commanded_position(&self, target: Equatorial) -> Equatorial {
        match &self.position_hook {
            Some(hook) => hook(target),
            None => target,
        }
    }

    fn jog(&self, offset: Angle, direction: JogDirection) -> MountResult<()> {
        self.ensure_connected()?;
        if self.slew_active.load(Ordering::SeqCst) {
            return Err(MountError::SlewInProgress);
        }
        debug!("jog {direction} by {:.2}'", offset.arcminutes());
        self.driver_call(|d| d.jog(offset.arcminutes(), direction))
    }

    fn set_tracking_if_supported(&self, enabled: bool) -> MountResult<()> {
        self.ensure_connected()?;
        if !self.driver_call(|d| d.can_set_tracking())? {
            debug!("driver cannot control tracking, ignoring request");
            return Ok(());
        }
        self.driver_call(|d| d.set_tracking(enabled))
    }

    /// The slew protocol proper; runs with the `slew_active` guard held.
    fn run_slew(&self, target: Equatorial) -> MountResult<SlewOutcome> {
        if self.is_slewing()? {
            return Err(MountError::SlewInProgress);
        }

        *self.target.lock().unwrap_or_else(|e| e.into_inner()) = Some(target);
        self.abort.store(false, Ordering::SeqCst);

        if !self.driver_call(|d| d.can_slew_async())? {
            return Err(MountError::Unsupported("asynchronous slew"));
        }

        let commanded = self.commanded_position(target);
        info!("slew begin: {commanded}");
        self.events.emit(MountEvent::SlewBegin { target: commanded });

        if let Err(e) = self.driver_call(|d| {
            d.slew_to_coordinates_async(commanded.ra.hours(), commanded.dec.degrees())
        }) {
            error!("slew command failed: {e}");
            self.emit_error_complete(commanded);
            return Err(e);
        }

        let deadline = Instant::now() + self.config.slew_timeout();
        let outcome = loop {
            // Cancellation is checked before the driver on every tick.
            if self.abort.load(Ordering::SeqCst) {
                break SlewOutcome::Aborted;
            }
            match self.driver_call(|d| d.is_slew_complete()) {
                // A requested abort wins even if the driver reports the
                // motion finished while it was being stopped.
                Ok(true) if self.abort.load(Ordering::SeqCst) => break SlewOutcome::Aborted,
                Ok(true) => break SlewOutcome::Complete,
                Ok(false) => {}
                Err(e) => {
                    error!("driver failed mid-slew: {e}");
                    self.stop_driver_motion();
                    self.emit_error_complete(commanded);
                    return Err(e);
                }
            }
            if Instant::now() >= deadline {
                warn!("slew timed out after {:?}", self.config.slew_timeout());
                self.stop_driver_motion();
                self.emit_error_complete(commanded);
                return Err(MountError::SlewTimeout(self.config.slew_timeout()));
            }
            thread::sleep(self.config.idle_interval());
        };

        let position = match self.get_position_ra_dec() {
            Ok(p) => p,
            Err(e) => {
                self.emit_error_complete(commanded);
                return Err(e);
            }
        };
        info!("slew complete: {position} ({outcome:?})");
        self.events
            .emit(MountEvent::SlewComplete { position, outcome });
        Ok(outcome)
    }

    /// Best-effort stop of driver-side motion after a failed slew. The
    /// mount may still be moving when the poll loop gives up; left alone,
    /// its raised `Slewing` flag would reject every later slew request.
    fn stop_driver_motion(&self) {
        if let Err(e) = self.driver_call(|d| d.abort_slew()) {
            warn!("could not stop driver-side slew: {e}");
        }
    }

    /// Announce a failed slew, reporting the best position estimate
    /// available (current if readable, else the commanded one).
    fn emit_error_complete(&self, commanded: Equatorial) {
        let position = self.get_position_ra_dec().unwrap_or(commanded);
        self.events.emit(MountEvent::SlewComplete {
            position,
            outcome: SlewOutcome::Error,
        });
    }
}

impl<D: AscomDriver> MountControl for AscomTelescope<D> {
    fn open(&self) -> MountResult<()> {
        info!("connecting to driver {}", self.config.driver_id);
        if let Err(e) = self.driver_call(|d| d.set_connected(true)) {
            error!("could not connect to driver {}: {e}", self.config.driver_id);
            return Err(e);
        }
        self.connected.store(true, Ordering::SeqCst);
        self.unpark()
    }

    fn close(&self) -> MountResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        if let Err(e) = self.driver_call(|d| d.quit()) {
            // Shutdown failures are logged and swallowed; nothing useful
            // can be done with them at stop time.
            error!("driver shutdown failed: {e}");
        }
        Ok(())
    }

    fn get_ra(&self) -> MountResult<Angle> {
        self.ensure_connected()?;
        let hours = self.driver_call(|d| d.right_ascension())?;
        Ok(Angle::from_hours(hours))
    }

    fn get_dec(&self) -> MountResult<Angle> {
        self.ensure_connected()?;
        let degrees = self.driver_call(|d| d.declination())?;
        Ok(Angle::from_degrees(degrees))
    }

    fn get_az(&self) -> MountResult<Angle> {
        self.ensure_connected()?;
        let degrees = self.driver_call(|d| d.azimuth())?;
        Ok(Angle::from_degrees(degrees))
    }

    fn get_alt(&self) -> MountResult<Angle> {
        self.ensure_connected()?;
        // Some drivers only update Altitude on an explicit refresh.
        self.driver_call(|d| d.refresh_alt_az())?;
        let degrees = self.driver_call(|d| d.altitude())?;
        Ok(Angle::from_degrees(degrees))
    }

    fn get_position_ra_dec(&self) -> MountResult<Equatorial> {
        Ok(Equatorial::from_ra_dec(self.get_ra()?, self.get_dec()?))
    }

    fn get_position_alt_az(&self) -> MountResult<Horizontal> {
        Ok(Horizontal::from_alt_az(self.get_alt()?, self.get_az()?))
    }

    fn get_target_ra_dec(&self) -> MountResult<Equatorial> {
        let target = *self.target.lock().unwrap_or_else(|e| e.into_inner());
        match target {
            Some(t) => Ok(t),
            None => self.get_position_ra_dec(),
        }
    }

    fn is_slewing(&self) -> MountResult<bool> {
        self.ensure_connected()?;
        // The driver encodes "not slewing" as 0.
        let raw = self.driver_call(|d| d.slewing())?;
        Ok(raw != 0)
    }

    fn is_tracking(&self) -> MountResult<bool> {
        self.ensure_connected()?;
        let raw = self.driver_call(|d| d.tracking())?;
        Ok(raw == 1)
    }

    fn is_parked(&self) -> MountResult<bool> {
        self.ensure_connected()?;
        self.driver_call(|d| d.at_park())
    }

    fn slew_to_ra_dec(&self, target: Equatorial) -> MountResult<SlewOutcome> {
        self.ensure_connected()?;
        if self.slew_active.swap(true, Ordering::SeqCst) {
            return Err(MountError::SlewInProgress);
        }
        let result = self.run_slew(target);
        self.slew_active.store(false, Ordering::SeqCst);
        result
    }

    fn abort_slew(&self) -> MountResult<bool> {
        self.ensure_connected()?;
        if !self.slew_active.load(Ordering::SeqCst) && !self.is_slewing()? {
            return Ok(false);
        }
        info!("aborting slew");
        self.abort.store(true, Ordering::SeqCst);
        // Give the poll loop one interval to observe the flag and leave
        // its wait before the mount stops moving underneath it.
        thread::sleep(self.config.idle_interval());
        self.driver_call(|d| d.abort_slew())?;
        Ok(true)
    }

    fn park(&self) -> MountResult<()> {
        self.ensure_connected()?;
        info!("parking mount");
        self.driver_call(|d| d.park())
    }

    fn unpark(&self) -> MountResult<()> {
        self.ensure_connected()?;
        info!("unparking mount: homing, then tracking");
        self.driver_call(|d| d.find_home())?;
        self.start_tracking()
    }

    fn start_tracking(&self) -> MountResult<()> {
        self.set_tracking_if_supported(true)
    }

    fn stop_tracking(&self) -> MountResult<()> {
        self.set_tracking_if_supported(false)
    }

    fn sync_ra_dec(&self, position: Equatorial) -> MountResult<()> {
        self.ensure_connected()?;
        self.driver_call(|d| d.sync_to_coordinates(position.ra.hours(), position.dec.degrees()))?;
        *self.target.lock().unwrap_or_else(|e| e.into_inner()) = Some(position);
        info!("synced to {position}");
        self.events.emit(MountEvent::SyncComplete { position });
        Ok(())
    }

    fn move_east(&self, offset: Angle) -> MountResult<()> {
        self.jog(offset, JogDirection::East)
    }

    fn move_west(&self, offset: Angle) -> MountResult<()> {
        self.jog(offset, JogDirection::West)
    }

    fn move_north(&self, offset: Angle) -> MountResult<()> {
        self.jog(offset, JogDirection::North)
    }

    fn move_south(&self, offset: Angle) -> MountResult<()> {
        self.jog(offset, JogDirection::South)
    }

    fn subscribe(&self) -> Receiver<MountEvent> {
        self.events.subscribe()
    }
}
