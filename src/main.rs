//! CLI entry point.
//!
//! Wires a concrete [`subtlety::x11rb::X11rbConn`] connection, loads the
//! TOML configuration file that stands in for the scripted collaborator
//! (see [`subtlety::config`]), and runs the [`subtlety::WindowManager`]
//! event loop until it is told to stop.

use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use subtlety::config::{ConfigBuilder, ConfigFile};
use subtlety::core::bindings::GrabTable;
use subtlety::core::registry::Registry;
use subtlety::core::WindowManager;
use subtlety::x11rb::X11rbConn;
use subtlety::{Error, Result};

/// A manually-tiling, keyboard-driven X11 window manager.
#[derive(Parser, Debug)]
#[command(name = "subtlety", version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (default: `$HOME/.config/subtlety/subtlety.toml`).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// X display to connect to (default: `$DISPLAY`).
    #[arg(short = 'd', long = "display", value_name = "DISPLAY")]
    display: Option<String>,

    /// Parse and validate the configuration file, then exit without
    /// opening a display connection.
    #[arg(short = 'k', long = "check-only")]
    check_only: bool,

    /// Disable Xrandr probing; fall back to Xinerama or a single screen.
    #[arg(short = 'n', long = "no-randr")]
    no_randr: bool,

    /// Replace a currently running window manager instead of refusing to
    /// start when the `WM_S<screen>` selection is already owned.
    #[arg(short = 'r', long = "replace")]
    replace: bool,

    /// Directory to search for sublets. The core only tracks sublet
    /// registrations; resolving this path to running scripts is the
    /// interpreter's job, out of scope for the engine.
    #[arg(short = 's', long = "sublet-dir", value_name = "DIR")]
    sublet_dir: Option<PathBuf>,

    /// Log-level directive(s) passed to `tracing-subscriber`'s env filter,
    /// e.g. `info` or `subtlety=debug`.
    #[arg(short = 'l', long = "level", value_name = "LEVELS")]
    level: Option<String>,

    /// Shorthand for `-l debug`.
    #[arg(short = 'D', long = "debug")]
    debug: bool,
}

impl Cli {
    fn log_directive(&self) -> String {
        if self.debug {
            "debug".into()
        } else {
            self.level.clone().unwrap_or_else(|| "warn".into())
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let home = std::env::var("HOME")
            .map_err(|_| Error::Config("$HOME is not set and no -c FILE was given".into()))?;
        Ok(PathBuf::from(home).join(".config/subtlety/subtlety.toml"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    subtlety::init_logging(&cli.log_directive());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Parse the config file and seed a fresh [Registry]/[GrabTable] from it.
/// A reference to a nonexistent gravity/view/tag is a hard error in both
/// check-only and normal startup, since a dangling reference at seed time
/// can never resolve later.
fn seed(file: &ConfigFile) -> Result<(Registry, GrabTable, subtlety::core::registry::GravityId)> {
    let mut registry = Registry::new();
    let mut grabs = GrabTable::new();
    let default_gravity = ConfigBuilder::seed(&mut registry, &mut grabs, file)?;

    if registry.tags().len() <= 1 {
        return Err(Error::NoTags);
    }

    Ok((registry, grabs, default_gravity))
}

fn run(cli: &Cli) -> Result<()> {
    let path = cli.config_path()?;
    let file = ConfigFile::load(&path)?;
    let (registry, grabs, default_gravity) = seed(&file)?;

    if cli.check_only {
        info!(config = %path.display(), "configuration is valid");
        return Ok(());
    }

    let config = ConfigBuilder::build_config(&file);
    let mut flags = ConfigBuilder::build_flags(&file);
    if cli.no_randr {
        flags.xrandr = false;
    }

    let (conn, _screen_num) = x11rb::connect(cli.display.as_deref())
        .map_err(|e| Error::Display(e.to_string()))?;
    let xconn = X11rbConn::new(conn, !flags.xrandr).map_err(Error::from)?;

    let mut wm = WindowManager::new(xconn, config)?;
    wm.state.registry = registry;
    wm.state.flags = flags;
    wm.state.default_gravity = Some(default_gravity);
    wm.grabs = grabs;

    if wm.run(cli.replace)? {
        let exe = std::env::current_exe()?;
        let err = std::process::Command::new(exe).args(std::env::args_os().skip(1)).exec();
        return Err(Error::Display(format!("failed to re-exec for restart: {err}")));
    }

    Ok(())
}
