use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use admintools_core::{HOTKEY_PREFIX, HostEvent, Hotkey, MenuItemId, PLUGIN_NAME, log_filter};
use admintools_engine::{Engine, EngineSnapshot, EventPump, PumpError, PumpHandle};
use admintools_host_sim::{MoveCommand, Scenario, ScenarioError, SimHost, Step};
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "admintools", about = "AdminTools move policy runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replays a scenario file against a simulated host.
    Replay {
        scenario: PathBuf,
        /// Settle rounds allowed per settle step before giving up.
        #[arg(long, default_value_t = 16)]
        max_rounds: usize,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Lists the plugin's menu entries and hotkeys.
    Triggers,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Pump(#[from] PumpError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("moves still pending after {rounds} settle rounds at step {step}")]
    Unsettled { step: usize, rounds: usize },
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    issued: Vec<MoveCommand>,
    snapshot: EngineSnapshot,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("admintools error: {err}");
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::new(log_filter()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            scenario,
            max_rounds,
            json,
        } => {
            let output = replay(&scenario, max_rounds).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(())
            } else {
                print_replay(&output)
            }
        }
        Command::Triggers => print_triggers(),
    }
}

async fn replay(path: &Path, max_rounds: usize) -> Result<ReplayOutput, CliError> {
    let scenario = Scenario::load(path)?;
    info!(
        scenario = %path.display(),
        steps = scenario.steps.len(),
        plugin = PLUGIN_NAME,
        "replaying scenario"
    );

    let host = Arc::new(SimHost::new(scenario.world));
    let pump = EventPump::spawn(Engine::new(host.clone()));

    for (index, step) in scenario.steps.into_iter().enumerate() {
        match step {
            Step::Event { event } => pump.deliver(event)?,
            Step::SelfMove {
                participant,
                channel,
            } => deliver_all(&pump, host.self_move(participant, channel))?,
            Step::Connect {
                participant,
                durable_id,
                channel,
            } => deliver_all(&pump, host.connect(participant, durable_id, channel))?,
            Step::Disconnect { participant } => deliver_all(&pump, host.disconnect(participant))?,
            Step::Settle => settle(&host, &pump, index, max_rounds).await?,
        }
        pump.flush().await?;
    }

    let snapshot = pump.shutdown().await?;
    Ok(ReplayOutput {
        issued: host.issued_moves(),
        snapshot,
    })
}

fn deliver_all(pump: &PumpHandle, events: Vec<HostEvent>) -> Result<(), CliError> {
    for event in events {
        pump.deliver(event)?;
    }
    Ok(())
}

/// Feeds server notifications back until no queued moves remain.
async fn settle(
    host: &SimHost,
    pump: &PumpHandle,
    step: usize,
    max_rounds: usize,
) -> Result<(), CliError> {
    for round in 0..max_rounds {
        pump.flush().await?;
        let events = host.settle();
        if events.is_empty() {
            info!(step, rounds = round, "world settled");
            return Ok(());
        }
        deliver_all(pump, events)?;
    }

    Err(CliError::Unsettled {
        step,
        rounds: max_rounds,
    })
}

fn print_replay(output: &ReplayOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();

    for command in &output.issued {
        writeln!(
            stdout,
            "move participant={} to channel={} (connection {})",
            command.participant, command.destination, command.connection
        )?;
    }

    match output.snapshot.follow_target {
        Some(target) => writeln!(stdout, "following: {target}")?,
        None => writeln!(stdout, "following: none")?,
    }
    for entry in &output.snapshot.locks {
        writeln!(stdout, "locked: {} -> channel {}", entry.durable_id, entry.pin)?;
    }

    stdout.flush()?;
    Ok(())
}

fn print_triggers() -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "menu items:")?;
    for spec in MenuItemId::catalogue() {
        writeln!(
            stdout,
            "  {:>2}  {:<11}  {}{}",
            spec.id.id(),
            format!("{:?}", spec.kind).to_lowercase(),
            spec.label,
            if spec.enabled { "" } else { " (initially disabled)" }
        )?;
    }

    writeln!(stdout, "hotkeys:")?;
    for hotkey in Hotkey::ALL {
        writeln!(
            stdout,
            "  {HOTKEY_PREFIX}.{:<22}  {}",
            hotkey.keyword(),
            hotkey.description()
        )?;
    }

    stdout.flush()?;
    Ok(())
}
