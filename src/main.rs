// Harbormaster - AutoDJ backend for a station's Liquidsoap engine
// Regenerates the engine script from station settings and pokes the running engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harbormaster::{
    liquidsoap::engine_command, AppConfig, ControlChannel, ScriptGenerator, StationFile,
    StationPaths, StationPorts,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "harbormaster")]
#[command(about = "Generate Liquidsoap configs for a station and drive the running engine")]
struct Args {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the rotating log file
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write playlist files and the engine script for a station
    Generate {
        /// Station definition (.toml or .json)
        station: PathBuf,
        #[arg(long)]
        playlist_dir: Option<PathBuf>,
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Send a raw command to a station's running engine
    Command {
        station: PathBuf,
        command: String,
    },
    /// Skip the track currently playing
    Skip { station: PathBuf },
    /// Print the ports derived for a station id
    Ports { station_id: u32 },
    /// Print the command line the supervisor should run for a station
    EngineCommand { station: PathBuf },
}

fn init_logging(log_dir: &Path, dev: bool) -> Result<Option<WorkerGuard>> {
    // Base filter: info level for general logs, debug for harbormaster
    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,harbormaster=debug"));

    if dev {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_env_filter(base_filter)
            .init();
        return Ok(None);
    }

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(log_dir, "harbormaster.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(Some(guard))
}

fn station_paths(
    config: &AppConfig,
    short_name: &str,
    playlist_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> StationPaths {
    let defaults = config.station_paths(short_name);
    StationPaths::new(
        playlist_dir.unwrap_or(defaults.playlist_dir),
        config_dir.unwrap_or(defaults.config_dir),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Keep the guard alive so buffered log lines get flushed on exit
    let _guard = init_logging(&config.log_directory, args.dev)?;
    info!("harbormaster starting up");

    match args.command {
        Command::Generate {
            station,
            playlist_dir,
            config_dir,
        } => {
            let mut file = StationFile::new(station);
            let station = file.load()?;
            let paths = station_paths(&config, &station.short_name(), playlist_dir, config_dir);

            let generator = ScriptGenerator::new(config.deployment.clone());
            match generator.generate(&station, &paths, &mut file) {
                Ok(generated) => {
                    for notice in &generated.notices {
                        println!("note: {}", notice);
                    }
                    println!("Wrote {}", generated.path.display());
                }
                Err(e) => {
                    error!("Generation failed for station {}: {}", station.id, e);
                    return Err(e.into());
                }
            }
        }
        Command::Command { station, command } => {
            let station = StationFile::new(station).load()?;
            let channel = ControlChannel::for_station(&config.deployment, &config.control, station.id)?;
            for line in channel.send(&command).await? {
                println!("{}", line);
            }
        }
        Command::Skip { station } => {
            let station = StationFile::new(station).load()?;
            let channel = ControlChannel::for_station(&config.deployment, &config.control, station.id)?;
            for line in channel.skip().await? {
                println!("{}", line);
            }
        }
        Command::Ports { station_id } => {
            let ports = StationPorts::for_station(station_id)?;
            println!("telnet {}", ports.telnet);
            println!("stream {}", ports.stream);
        }
        Command::EngineCommand { station } => {
            let station = StationFile::new(station).load()?;
            let paths = config.station_paths(&station.short_name());
            println!("{}", engine_command(&config.deployment, &paths));
        }
    }

    Ok(())
}
