//! FPC bring-up bench console.
//!
//! Attaches one sensor on the simulated platform and reads operator lines
//! from stdin:
//!
//! ```text
//! <attribute> <payload>   write a control attribute
//! state                   print the power state and reset line level
//! events                  print and clear the recorded hardware events
//! detach                  detach the sensor and exit
//! quit                    exit (the sensor is detached on the way out)
//! ```
//!
//! Logging is controlled through `RUST_LOG` (default `info`).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use fpc_bringup::{ControlCommand, DeviceBuilder, DeviceHandle};
use fpc_core::{BringupConfig, PlatformKind};
use fpc_hardware::JitterDelay;
use fpc_hardware::mock::{MockPlatform, MockPlatformHandle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    platform: Option<PlatformKind>,
}

fn print_help() {
    println!("fpc-cli {}", fpc_core::VERSION);
    println!();
    println!("USAGE:");
    println!("    fpc-cli [--config <file.json>] [--platform hikey|mtk|qcom]");
    println!();
    println!("COMMANDS (stdin):");
    for name in ControlCommand::ATTRIBUTE_NAMES {
        println!("    {name} <payload>");
    }
    println!("    state | events | detach | quit");
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "-c" | "--config" => {
                let path = iter.next().context("--config requires a path argument")?;
                args.config = Some(PathBuf::from(path));
            }
            "-p" | "--platform" => {
                let kind = iter.next().context("--platform requires a platform name")?;
                args.platform = Some(kind.parse()?);
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    Ok(Some(args))
}

fn load_config(args: &Args) -> anyhow::Result<BringupConfig> {
    let mut config = match &args.config {
        Some(path) => BringupConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BringupConfig::default(),
    };
    if let Some(platform) = args.platform {
        config.platform = platform;
    }
    Ok(config)
}

/// Outcome of one console line.
enum Step {
    Continue,
    Exit,
}

fn run_line(line: &str, device: &DeviceHandle, hw: &MockPlatformHandle) -> anyhow::Result<Step> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, payload) = line.split_once(' ').unwrap_or((line, ""));

    match word {
        "" => {}
        "state" => {
            let level = device
                .reset_line_level()
                .map_or_else(|| "n/a".to_string(), |level| level.to_string());
            println!("{}: {} (RST {})", device.name(), device.power_state(), level);
        }
        "events" => {
            for event in hw.events() {
                println!("{event:?}");
            }
            hw.clear_events();
        }
        "detach" | "quit" | "exit" => return Ok(Step::Exit),
        attribute => {
            let command: ControlCommand = attribute.parse()?;
            let consumed = device.store(command, payload)?;
            println!("ok ({consumed} bytes)");
        }
    }
    Ok(Step::Continue)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let config = load_config(&args)?;

    let (platform, hw) = MockPlatform::new();
    let device = DeviceBuilder::new(Arc::new(platform))
        .with_config(config)
        .with_delay(Arc::new(JitterDelay))
        .attach()
        .context("attach failed")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        match run_line(&line, &device, &hw) {
            Ok(Step::Continue) => {}
            Ok(Step::Exit) => break,
            Err(e) => {
                error!("{line:?}: {e:#}");
                println!("error: {e}");
            }
        }
        stdout.flush()?;
    }

    device.detach();
    info!("bye");
    Ok(())
}
