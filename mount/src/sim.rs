//! In-process simulated telescope driver.
//!
//! Stands in for the vendor driver during development and in tests:
//! slews complete after a configurable number of `IsSlewComplete` polls,
//! capability flags are settable, and specific calls can be scripted to
//! fail. Handles are cheap clones of shared state, so a test can keep one
//! to inspect call counters while the adapter owns another.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::ascom::{AscomDriver, DriverError, DriverResult, JogDirection};

/// Registry id the simulator answers to.
pub const SIM_DRIVER_ID: &str = "ScopeSim.Telescope";

/// Alt/Az the simulator reports after `FindHome`.
const HOME_ALT_DEG: f64 = 45.0;
const HOME_AZ_DEG: f64 = 180.0;

#[derive(Debug)]
struct SimState {
    connected: bool,
    ra_hours: f64,
    dec_degrees: f64,
    alt_degrees: f64,
    az_degrees: f64,
    alt_az_fresh: bool,
    // Raw ASCOM flag encodings: Slewing 0 = idle, Tracking 1 = on.
    slewing_raw: i32,
    tracking_raw: i32,
    parked: bool,
    can_slew_async: bool,
    can_set_tracking: bool,
    slew_ticks: u32,
    ticks_remaining: u32,
    slew_target: Option<(f64, f64)>,
    fail_connect: bool,
    fail_slew: bool,
    fail_quit: bool,
    fail_poll_after: Option<u32>,
    polls_seen: u32,
    abort_calls: u32,
    jog_calls: u32,
    tracking_writes: u32,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            connected: false,
            ra_hours: 0.0,
            dec_degrees: 0.0,
            alt_degrees: HOME_ALT_DEG,
            az_degrees: HOME_AZ_DEG,
            alt_az_fresh: false,
            slewing_raw: 0,
            tracking_raw: 0,
            parked: true,
            can_slew_async: true,
            can_set_tracking: true,
            slew_ticks: 3,
            ticks_remaining: 0,
            slew_target: None,
            fail_connect: false,
            fail_slew: false,
            fail_quit: false,
            fail_poll_after: None,
            polls_seen: 0,
            abort_calls: 0,
            jog_calls: 0,
            tracking_writes: 0,
        }
    }
}

/// Simulated ASCOM telescope driver.
///
/// Starts parked, tracking off, pointed at RA 0h Dec 0°.
#[derive(Debug, Clone, Default)]
pub struct SimTelescope {
    state: Arc<Mutex<SimState>>,
}

impl SimTelescope {
    /// Create a simulator with default behavior (slews complete after
    /// three polls, all capabilities enabled).
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of `IsSlewComplete` polls before a slew finishes.
    pub fn with_slew_ticks(self, ticks: u32) -> Self {
        self.lock().slew_ticks = ticks;
        self
    }

    /// Override the `CanSlewAsync` capability.
    pub fn with_can_slew_async(self, can: bool) -> Self {
        self.lock().can_slew_async = can;
        self
    }

    /// Override the `CanSetTracking` capability.
    pub fn with_can_set_tracking(self, can: bool) -> Self {
        self.lock().can_set_tracking = can;
        self
    }

    /// Make `Connected = true` fail.
    pub fn failing_connect(self) -> Self {
        self.lock().fail_connect = true;
        self
    }

    /// Make `SlewToCoordinatesAsync` fail.
    pub fn failing_slew(self) -> Self {
        self.lock().fail_slew = true;
        self
    }

    /// Make `Quit` fail.
    pub fn failing_quit(self) -> Self {
        self.lock().fail_quit = true;
        self
    }

    /// Make `IsSlewComplete` fail once, after it has been polled `n` times.
    pub fn failing_poll_after(self, n: u32) -> Self {
        self.lock().fail_poll_after = Some(n);
        self
    }

    /// Directly set the raw `Slewing` flag (for polarity tests).
    pub fn set_slewing_raw(&self, raw: i32) {
        self.lock().slewing_raw = raw;
    }

    /// Directly set the reported RA/Dec.
    pub fn set_position(&self, ra_hours: f64, dec_degrees: f64) {
        let mut state = self.lock();
        state.ra_hours = ra_hours;
        state.dec_degrees = dec_degrees;
    }

    /// Times `AbortSlew` was invoked.
    pub fn abort_calls(&self) -> u32 {
        self.lock().abort_calls
    }

    /// Times `Jog` was invoked.
    pub fn jog_calls(&self) -> u32 {
        self.lock().jog_calls
    }

    /// Times the `Tracking` property was written.
    pub fn tracking_writes(&self) -> u32 {
        self.lock().tracking_writes
    }

    /// Whether the driver believes it is connected.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }
}

impl AscomDriver for SimTelescope {
    fn set_connected(&mut self, connected: bool) -> DriverResult<()> {
        let mut state = self.lock();
        if connected && state.fail_connect {
            return Err(DriverError::new("Connected", "simulated connect failure"));
        }
        state.connected = connected;
        Ok(())
    }

    fn right_ascension(&mut self) -> DriverResult<f64> {
        Ok(self.lock().ra_hours)
    }

    fn declination(&mut self) -> DriverResult<f64> {
        Ok(self.lock().dec_degrees)
    }

    fn azimuth(&mut self) -> DriverResult<f64> {
        Ok(self.lock().az_degrees)
    }

    fn altitude(&mut self) -> DriverResult<f64> {
        let state = self.lock();
        if !state.alt_az_fresh {
            return Err(DriverError::new("Altitude", "read before GetAzAlt refresh"));
        }
        Ok(state.alt_degrees)
    }

    fn refresh_alt_az(&mut self) -> DriverResult<()> {
        self.lock().alt_az_fresh = true;
        Ok(())
    }

    fn slewing(&mut self) -> DriverResult<i32> {
        Ok(self.lock().slewing_raw)
    }

    fn tracking(&mut self) -> DriverResult<i32> {
        Ok(self.lock().tracking_raw)
    }

    fn set_tracking(&mut self, enabled: bool) -> DriverResult<()> {
        let mut state = self.lock();
        state.tracking_writes += 1;
        state.tracking_raw = i32::from(enabled);
        Ok(())
    }

    fn at_park(&mut self) -> DriverResult<bool> {
        Ok(self.lock().parked)
    }

    fn can_slew_async(&mut self) -> DriverResult<bool> {
        Ok(self.lock().can_slew_async)
    }

    fn can_set_tracking(&mut self) -> DriverResult<bool> {
        Ok(self.lock().can_set_tracking)
    }

    fn is_slew_complete(&mut self) -> DriverResult<bool> {
        let mut state = self.lock();
        state.polls_seen += 1;
        if let Some(after) = state.fail_poll_after {
            if state.polls_seen > after {
                // One-shot fault: the next slew behaves normally.
                state.fail_poll_after = None;
                return Err(DriverError::new("IsSlewComplete", "simulated driver fault"));
            }
        }
        if state.slewing_raw == 0 {
            return Ok(true);
        }
        state.ticks_remaining = state.ticks_remaining.saturating_sub(1);
        if state.ticks_remaining == 0 {
            if let Some((ra, dec)) = state.slew_target.take() {
                state.ra_hours = ra;
                state.dec_degrees = dec;
            }
            state.slewing_raw = 0;
            debug!("sim: slew complete");
            return Ok(true);
        }
        Ok(false)
    }

    fn slew_to_coordinates_async(&mut self, ra_hours: f64, dec_degrees: f64) -> DriverResult<()> {
        let mut state = self.lock();
        if state.fail_slew {
            return Err(DriverError::new(
                "SlewToCoordinatesAsync",
                "position outside limits",
            ));
        }
        state.slew_target = Some((ra_hours, dec_degrees));
        state.ticks_remaining = state.slew_ticks.max(1);
        state.slewing_raw = 1;
        state.polls_seen = 0;
        debug!("sim: slew to RA {ra_hours} h Dec {dec_degrees} deg");
        Ok(())
    }

    fn abort_slew(&mut self) -> DriverResult<()> {
        let mut state = self.lock();
        state.abort_calls += 1;
        state.slewing_raw = 0;
        state.ticks_remaining = 0;
        state.slew_target = None;
        Ok(())
    }

    fn park(&mut self) -> DriverResult<()> {
        let mut state = self.lock();
        state.parked = true;
        state.tracking_raw = 0;
        Ok(())
    }

    fn find_home(&mut self) -> DriverResult<()> {
        let mut state = self.lock();
        state.parked = false;
        state.alt_degrees = HOME_ALT_DEG;
        state.az_degrees = HOME_AZ_DEG;
        Ok(())
    }

    fn sync_to_coordinates(&mut self, ra_hours: f64, dec_degrees: f64) -> DriverResult<()> {
        let mut state = self.lock();
        state.ra_hours = ra_hours;
        state.dec_degrees = dec_degrees;
        Ok(())
    }

    fn jog(&mut self, arcminutes: f64, direction: JogDirection) -> DriverResult<()> {
        let mut state = self.lock();
        state.jog_calls += 1;
        let degrees = arcminutes / 60.0;
        match direction {
            JogDirection::East => state.ra_hours += degrees / 15.0,
            JogDirection::West => state.ra_hours -= degrees / 15.0,
            JogDirection::North => state.dec_degrees += degrees,
            JogDirection::South => state.dec_degrees -= degrees,
        }
        Ok(())
    }

    fn quit(&mut self) -> DriverResult<()> {
        let mut state = self.lock();
        if state.fail_quit {
            return Err(DriverError::new("Quit", "simulated shutdown failure"));
        }
        state.connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slew_completes_after_configured_ticks() {
        let mut sim = SimTelescope::new().with_slew_ticks(2);
        sim.slew_to_coordinates_async(5.5, -5.39).unwrap();
        assert_eq!(sim.slewing().unwrap(), 1);
        assert!(!sim.is_slew_complete().unwrap());
        assert!(sim.is_slew_complete().unwrap());
        assert_eq!(sim.slewing().unwrap(), 0);
        assert_relative_eq!(sim.right_ascension().unwrap(), 5.5);
        assert_relative_eq!(sim.declination().unwrap(), -5.39);
    }

    #[test]
    fn test_altitude_requires_refresh() {
        let mut sim = SimTelescope::new();
        assert!(sim.altitude().is_err());
        sim.refresh_alt_az().unwrap();
        assert_relative_eq!(sim.altitude().unwrap(), HOME_ALT_DEG);
    }

    #[test]
    fn test_jog_accumulates() {
        let mut sim = SimTelescope::new();
        sim.jog(30.0, JogDirection::North).unwrap();
        sim.jog(30.0, JogDirection::North).unwrap();
        assert_relative_eq!(sim.declination().unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(sim.jog_calls(), 2);
    }

    #[test]
    fn test_abort_freezes_position() {
        let mut sim = SimTelescope::new().with_slew_ticks(5);
        sim.slew_to_coordinates_async(10.0, 20.0).unwrap();
        assert!(!sim.is_slew_complete().unwrap());
        sim.abort_slew().unwrap();
        assert_eq!(sim.slewing().unwrap(), 0);
        assert_relative_eq!(sim.right_ascension().unwrap(), 0.0);
    }

    #[test]
    fn test_clone_shares_state() {
        let mut sim = SimTelescope::new();
        let handle = sim.clone();
        sim.set_tracking(true).unwrap();
        assert_eq!(handle.tracking_writes(), 1);
    }
}
