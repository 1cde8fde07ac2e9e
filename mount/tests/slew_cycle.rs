//! End-to-end observing cycle against the simulated driver.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use coords::{Angle, Equatorial};
use mount::{
    AscomTelescope, MountConfig, MountControl, MountEvent, SimTelescope, SlewOutcome,
};

fn fast_config() -> MountConfig {
    MountConfig {
        idle_interval_ms: 1,
        slew_timeout_s: 5,
        ..MountConfig::default()
    }
}

fn radec(ra_hours: f64, dec_degrees: f64) -> Equatorial {
    Equatorial::from_ra_dec(Angle::from_hours(ra_hours), Angle::from_degrees(dec_degrees))
}

/// A full night, condensed: open, slew to two targets, nudge, sync,
/// abort a third slew, park, close. State flags and events must line up
/// at every step.
#[test]
fn observing_cycle() {
    let sim = SimTelescope::new().with_slew_ticks(3);
    let scope = Arc::new(AscomTelescope::new(sim.clone(), fast_config()));
    let events = scope.subscribe();

    scope.open().unwrap();
    assert!(!scope.is_parked().unwrap());
    assert!(scope.is_tracking().unwrap());

    // First target.
    let m42 = radec(5.588, -5.39);
    assert_eq!(scope.slew_to_ra_dec(m42).unwrap(), SlewOutcome::Complete);
    let pos = scope.get_position_ra_dec().unwrap();
    assert_relative_eq!(pos.ra.hours(), 5.588, epsilon = 1e-12);
    assert_relative_eq!(pos.dec.degrees(), -5.39, epsilon = 1e-12);

    // Center the field with a couple of jogs, then sync the model.
    scope.move_east(Angle::from_arcseconds(120.0)).unwrap();
    scope.move_north(Angle::from_arcseconds(60.0)).unwrap();
    scope.sync_ra_dec(m42).unwrap();
    assert_relative_eq!(
        scope.get_position_ra_dec().unwrap().dec.degrees(),
        -5.39,
        epsilon = 1e-12
    );

    // Second target.
    let m31 = radec(0.712, 41.27);
    assert_eq!(scope.slew_to_ra_dec(m31).unwrap(), SlewOutcome::Complete);
    assert_relative_eq!(
        scope.get_target_ra_dec().unwrap().ra.hours(),
        0.712,
        epsilon = 1e-12
    );

    // Third slew never completes on its own and gets aborted from
    // another thread. Builder handles share state, so retuning the clone
    // retunes the driver the adapter owns.
    let sim = sim.with_slew_ticks(u32::MAX);
    let aborter = {
        let scope = Arc::clone(&scope);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(15));
            scope.abort_slew().unwrap()
        })
    };
    let outcome = scope.slew_to_ra_dec(radec(12.0, 80.0)).unwrap();
    assert!(aborter.join().unwrap());
    assert_eq!(outcome, SlewOutcome::Aborted);
    assert_eq!(sim.abort_calls(), 1);

    scope.park().unwrap();
    assert!(scope.is_parked().unwrap());
    scope.close().unwrap();

    // Event stream: begin/complete per slew (the aborted one included),
    // plus the sync, in order.
    let collected: Vec<MountEvent> = events.try_iter().collect();
    let mut begins = 0;
    let mut completes = 0;
    let mut syncs = 0;
    for event in &collected {
        match event {
            MountEvent::SlewBegin { .. } => begins += 1,
            MountEvent::SlewComplete { .. } => completes += 1,
            MountEvent::SyncComplete { .. } => syncs += 1,
        }
    }
    assert_eq!(begins, 3);
    assert_eq!(completes, 3);
    assert_eq!(syncs, 1);
    assert!(matches!(
        collected.last(),
        Some(MountEvent::SlewComplete {
            outcome: SlewOutcome::Aborted,
            ..
        })
    ));
}
