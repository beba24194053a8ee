use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use subscription_oracle::analysis::{
    plan_analysis_window, run_analysis, solve, weigh_request, AnalysisReport, AnalysisRequest,
    SolveRequest, WindowPlan,
};
use subscription_oracle::config::{Config, ConfigOverrides};
use subscription_oracle::optimizer::{OptimizationResult, Strategy};
use subscription_oracle::output::csv::{games_to_csv, pauses_to_csv, result_to_csv};
use subscription_oracle::output::json::render_json;
use subscription_oracle::output::table::{
    render_report, render_result_table, render_weights_table, render_window_plan,
};
use subscription_oracle::server::run_server;
use subscription_oracle::types::Game;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "subscription-oracle",
    about = "Pick the cheapest streaming packages that cover your team's games"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(short = 'n', long = "max-packages")]
    max_packages: Option<usize>,
    #[arg(short, long)]
    strategy: Option<Strategy>,
    /// Accept highlight-only offers as coverage.
    #[arg(long)]
    highlights: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Annealing wall-clock limit in seconds.
    #[arg(long = "time-limit")]
    time_limit: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Full pipeline: window planning, weighting and package selection.
    Optimize {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Package selection over already weighted games.
    Solve {
        #[arg(short, long)]
        input: PathBuf,
    },
    Pauses {
        #[arg(short, long)]
        input: PathBuf,
    },
    Weights {
        #[arg(short, long)]
        input: PathBuf,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        strategy: cli.strategy,
        max_packages: cli.max_packages,
        allow_highlights: cli.highlights,
        seed: cli.seed,
        time_limit_secs: cli.time_limit,
    });

    match &cli.command {
        Commands::Optimize { input } => {
            let request: AnalysisRequest = load_input(input)?;
            let report = tokio::task::spawn_blocking(move || run_analysis(&request, &config))
                .await
                .context("optimizer task failed")??;
            print_report(&report, cli.output)?;
        }
        Commands::Solve { input } => {
            let request: SolveRequest = load_input(input)?;
            let result = tokio::task::spawn_blocking(move || solve(&request, &config))
                .await
                .context("optimizer task failed")?;
            print_result(&result, cli.output)?;
        }
        Commands::Pauses { input } => {
            let request: AnalysisRequest = load_input(input)?;
            let plan = plan_analysis_window(&request, &config)?;
            print_window_plan(&plan, cli.output)?;
        }
        Commands::Weights { input } => {
            let request: AnalysisRequest = load_input(input)?;
            let games = weigh_request(&request, &config)?;
            print_weights(&games, cli.output)?;
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
    }

    Ok(())
}

fn load_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading input: {}", path.display()))?;
    let parsed = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing input JSON: {}", path.display()))?;
    info!("loaded input from {}", path.display());
    Ok(parsed)
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_report(report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => print!("{}", result_to_csv(&report.result)?),
    }
    Ok(())
}

fn print_result(result: &OptimizationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_result_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => print!("{}", result_to_csv(result)?),
    }
    Ok(())
}

fn print_window_plan(plan: &WindowPlan, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_window_plan(plan)),
        OutputFormat::Json => println!("{}", render_json(plan)?),
        OutputFormat::Csv => print!("{}", pauses_to_csv(&plan.window.pauses)?),
    }
    Ok(())
}

fn print_weights(games: &[Game], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_weights_table(games)),
        OutputFormat::Json => println!("{}", render_json(games)?),
        OutputFormat::Csv => {
            if games.is_empty() {
                warn!("no games matched the requested teams");
            }
            print!("{}", games_to_csv(games)?);
        }
    }
    Ok(())
}
