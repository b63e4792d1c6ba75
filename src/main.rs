use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sitrep::{
    config::AppConfig,
    engine::{EngineBuilder, EngineSettings, IntelEngine},
    reports::ReportLoader,
    snapshot::SnapshotWriter,
    timeline::PlanetId,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Planet intel decoder and turn reconstructor")]
struct Cli {
    /// Path to the configuration YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the reconstructed state of one turn as JSON
    Show {
        #[arg(long)]
        reports: PathBuf,
        #[arg(long)]
        turn: i64,
        /// Limit output to a single planet
        #[arg(long)]
        planet: Option<u32>,
    },
    /// Write a JSON snapshot for every turn in a range
    Snapshot {
        #[arg(long)]
        reports: PathBuf,
        #[arg(long, default_value_t = 1)]
        from: i64,
        /// Defaults to the last turn with reports
        #[arg(long)]
        to: Option<i64>,
        /// Overrides snapshot.output_dir from the config
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Serve turn frames over HTTP
    Serve {
        #[arg(long)]
        reports: PathBuf,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    init_tracing(&config.logging.level);

    match cli.command {
        Command::Show {
            reports,
            turn,
            planet,
        } => {
            let engine = load_engine(&config, &reports)?;
            let json = match planet {
                Some(planet) => {
                    serde_json::to_string_pretty(&engine.planet(PlanetId::new(planet), turn))?
                }
                None => serde_json::to_string_pretty(&engine.frame(turn))?,
            };
            println!("{json}");
        }
        Command::Snapshot {
            reports,
            from,
            to,
            output_dir,
        } => {
            let engine = load_engine(&config, &reports)?;
            let to = to.unwrap_or_else(|| i64::from(engine.last_turn()));
            let writer = SnapshotWriter::new(output_dir.unwrap_or(config.snapshot.output_dir));
            let mut written = 0;
            for turn in from.max(1)..=to {
                writer
                    .write(&engine.frame(turn))
                    .with_context(|| format!("Failed to write snapshot for turn {turn}"))?;
                written += 1;
            }
            info!(game = engine.game(), written, "snapshots complete");
        }
        Command::Serve {
            reports,
            host,
            port,
        } => {
            let engine = load_engine(&config, &reports)?;
            web::run(WebServerConfig { engine, host, port }).await?;
        }
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_engine(config: &AppConfig, reports: &Path) -> Result<IntelEngine> {
    let set = ReportLoader::new(".").load(reports)?;
    let timeline = set.build_timeline()?;
    let codebook = config.load_codebook().context("Failed to load code book")?;
    Ok(EngineBuilder::new(EngineSettings {
        game: set.name.clone(),
        radial: config.radial,
    })
    .with_codebook(codebook)
    .with_timeline(timeline)
    .build())
}
