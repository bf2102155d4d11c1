use std::path::PathBuf;

use anyhow::Result;
use cities::{config::Config, documents::Format, pipeline};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// Attach the IATA codes of nearby airports to GeoNames cities.
#[derive(Debug, Parser)]
struct Cli {
    /// YAML file with defaults for every option below
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Gazetteer to cities document
    Cities,
    /// Cities document plus airport registry to the updated document
    Airports,
    /// Both stages
    Run,
}

#[derive(Debug, Args)]
struct Overrides {
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,
    #[arg(long, global = true)]
    cities: Option<PathBuf>,
    #[arg(long, global = true)]
    airports: Option<PathBuf>,
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    /// Match radius in kilometres
    #[arg(long, global = true)]
    radius: Option<f64>,
    #[arg(long, global = true)]
    format: Option<Format>,
    /// Skip the markdown reports
    #[arg(long, global = true)]
    no_report: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(x) = self.gazetteer {
            config.gazetteer = x;
        }
        if let Some(x) = self.cities {
            config.cities = x;
        }
        if let Some(x) = self.airports {
            config.airports = x;
        }
        if let Some(x) = self.output {
            config.output = x;
        }
        if let Some(x) = self.radius {
            config.match_radius_km = x;
        }
        if let Some(x) = self.format {
            config.format = x;
        }
        if self.no_report {
            config.report = false;
        }
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    match cli.command {
        Command::Cities => {
            pipeline::cities(&config)?;
        }
        Command::Airports => {
            let (cities, rejected) = pipeline::load_cities(&config.cities)?;
            pipeline::airports(&config, cities, &rejected)?;
        }
        Command::Run => {
            pipeline::run(&config)?;
        }
    }

    Ok(())
}
