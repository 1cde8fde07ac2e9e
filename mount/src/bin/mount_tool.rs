//! CLI tool for exercising the mount adapter against the simulated driver.
//!
//! Subcommands:
//! - `status`: query position and state flags
//! - `slew`: slew to RA/Dec, optionally aborting mid-flight
//! - `park` / `unpark`: storage position control
//! - `track`: turn sidereal tracking on or off
//! - `sync`: align the mount model to a known position
//! - `jog`: offset the mount by arcminutes in a cardinal direction

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tracing::info;

use coords::{Angle, Equatorial};
use mount::{
    AscomTelescope, JogDirection, MountConfig, MountControl, MountEvent, SimTelescope,
    SIM_DRIVER_ID,
};

/// Telescope mount control tool
#[derive(Parser, Debug)]
#[command(name = "mount_tool")]
#[command(about = "Control tool for the telescope mount adapter")]
#[command(version)]
struct Args {
    /// Path to a mount config file (defaults to ~/.mount_config/mount.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query position and state flags
    Status,

    /// Slew to an equatorial position
    Slew {
        /// Target right ascension in decimal hours
        #[arg(long)]
        ra: f64,

        /// Target declination in decimal degrees
        #[arg(long)]
        dec: f64,

        /// Abort the slew after this many milliseconds (demo of
        /// cross-thread cancellation)
        #[arg(long)]
        abort_after: Option<u64>,
    },

    /// Park the mount at its storage position
    Park,

    /// Unpark: home the mount and resume tracking
    Unpark,

    /// Turn sidereal tracking on or off
    Track {
        /// `on` or `off`
        state: String,
    },

    /// Sync the mount's coordinate model to a known position
    Sync {
        /// Right ascension in decimal hours
        #[arg(long)]
        ra: f64,

        /// Declination in decimal degrees
        #[arg(long)]
        dec: f64,
    },

    /// Jog the mount by an offset
    Jog {
        /// Direction: east, west, north, or south
        direction: String,

        /// Offset in arcminutes
        #[arg(long, default_value = "1.0")]
        arcmin: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MountConfig::load_from(path)?,
        None => MountConfig::load()?,
    };

    if config.driver_id != SIM_DRIVER_ID {
        bail!(
            "unknown driver id {:?}: only {SIM_DRIVER_ID} is available in-process",
            config.driver_id
        );
    }

    let scope = Arc::new(AscomTelescope::new(SimTelescope::new(), config));
    let events = scope.subscribe();
    scope.open()?;

    match args.command {
        Command::Status => {
            let radec = scope.get_position_ra_dec()?;
            let altaz = scope.get_position_alt_az()?;
            println!("position : {radec}");
            println!("horizon  : {altaz}");
            println!("target   : {}", scope.get_target_ra_dec()?);
            println!("slewing  : {}", scope.is_slewing()?);
            println!("tracking : {}", scope.is_tracking()?);
            println!("parked   : {}", scope.is_parked()?);
        }

        Command::Slew {
            ra,
            dec,
            abort_after,
        } => {
            let target = Equatorial::from_ra_dec(Angle::from_hours(ra), Angle::from_degrees(dec));

            if let Some(delay_ms) = abort_after {
                let scope = Arc::clone(&scope);
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(delay_ms));
                    if let Err(e) = scope.abort_slew() {
                        eprintln!("abort failed: {e}");
                    }
                });
            }

            let outcome = scope.slew_to_ra_dec(target)?;
            println!("slew outcome: {outcome:?}");
            for event in events.try_iter() {
                match event {
                    MountEvent::SlewBegin { target } => println!("  begin    -> {target}"),
                    MountEvent::SlewComplete { position, outcome } => {
                        println!("  complete -> {position} ({outcome:?})");
                    }
                    MountEvent::SyncComplete { position } => {
                        println!("  synced   -> {position}");
                    }
                }
            }
        }

        Command::Park => {
            scope.park()?;
            info!("mount parked");
        }

        Command::Unpark => {
            scope.unpark()?;
            info!("mount unparked, tracking on");
        }

        Command::Track { state } => match state.as_str() {
            "on" => scope.start_tracking()?,
            "off" => scope.stop_tracking()?,
            other => bail!("expected `on` or `off`, got {other:?}"),
        },

        Command::Sync { ra, dec } => {
            let position =
                Equatorial::from_ra_dec(Angle::from_hours(ra), Angle::from_degrees(dec));
            scope.sync_ra_dec(position)?;
            println!("synced to {position}");
        }

        Command::Jog { direction, arcmin } => {
            let Ok(direction) = JogDirection::from_str(&direction) else {
                let options: Vec<String> =
                    JogDirection::iter().map(|d| d.to_string()).collect();
                bail!("unknown direction {direction:?}, expected one of {options:?}");
            };
            let offset = Angle::from_arcseconds(arcmin * 60.0);
            match direction {
                JogDirection::East => scope.move_east(offset)?,
                JogDirection::West => scope.move_west(offset)?,
                JogDirection::North => scope.move_north(offset)?,
                JogDirection::South => scope.move_south(offset)?,
            }
            println!("jogged {direction} by {arcmin}'");
        }
    }

    scope.close()?;
    Ok(())
}
