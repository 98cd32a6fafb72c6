use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use crossterm::style::Stylize;
use lead_scout::api_client::BusinessApiClient;
use lead_scout::config::config::API_URL_ENV;
use lead_scout::config::Config;
use lead_scout::data::business::SearchCriteria;
use lead_scout::data::data_exporter::DataExporter;
use lead_scout::table_display::display_results;
use lead_scout::utils::{dual_logging, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lead-scout")]
#[command(version)]
#[command(about = "Find business leads by industry and location", long_about = None)]
struct Cli {
    /// Base URL of the business search API
    #[arg(long, global = true, env = API_URL_ENV, value_name = "URL")]
    api_url: Option<String>,

    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print the results
    Search {
        #[arg(long)]
        industry: String,

        #[arg(long)]
        location: String,

        #[arg(long, value_name = "KM")]
        radius_km: Option<u32>,

        #[arg(long, value_name = "NUM")]
        max_results: Option<u32>,

        /// Export every result to CSV (config export directory if DIR is omitted)
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },

    /// Check that the API is reachable
    Health,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented default config file
    Init {
        #[arg(long)]
        force: bool,
    },

    /// Print the config file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_interactive(cli.api_url.as_deref()),
        Some(Commands::Search {
            industry,
            location,
            radius_km,
            max_results,
            export,
        }) => {
            logging::init_cli_logging(cli.verbose);
            let config = load_config();
            let api_url = config.resolve_api_url(cli.api_url.as_deref());

            let criteria = SearchCriteria::new(&industry, &location)?
                .with_radius_km(radius_km.unwrap_or_else(|| config.search.radius_km()))
                .with_max_results(max_results.unwrap_or_else(|| config.search.max_results()));

            let export_dir = export.map(|dir| dir.unwrap_or_else(|| config.export_dir()));
            run_search(&api_url, criteria, export_dir)
        }
        Some(Commands::Health) => {
            logging::init_cli_logging(cli.verbose);
            let config = load_config();
            run_health(&config.resolve_api_url(cli.api_url.as_deref()))
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force } => init_config(force),
            ConfigAction::Path => {
                println!("{}", Config::get_config_path()?.display());
                Ok(())
            }
        },
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(target: "config", "Using default config: {:#}", e);
            Config::default()
        }
    }
}

fn run_interactive(api_url_override: Option<&str>) -> Result<()> {
    let log_buffer = logging::init_tracing_with_dual_logging();
    if let Some(file_logger) = dual_logging::get_file_logger() {
        eprintln!("Debug logs will be written to:");
        eprintln!("   {}", file_logger.log_path().display());
    }

    let config = load_config();
    let api_url = config.resolve_api_url(api_url_override);
    tracing::info!(target: "ui", "Starting lead-scout against {}", api_url);

    let result = lead_scout::ui::tui_app::run_tui(config, &api_url, Some(log_buffer));

    if let Some(file_logger) = dual_logging::get_file_logger() {
        file_logger.flush();
    }
    result
}

fn run_search(api_url: &str, criteria: SearchCriteria, export_dir: Option<PathBuf>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = BusinessApiClient::new(api_url);

    println!(
        "{}",
        format!("Searching for {}...", criteria.describe()).cyan()
    );
    let response = runtime.block_on(client.search_businesses(&criteria))?;
    display_results(&response);

    if let Some(dir) = export_dir {
        let summary = DataExporter::export_all(&response.businesses, &dir)?;
        println!("{}", summary.describe().green());
    }

    Ok(())
}

fn run_health(api_url: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = BusinessApiClient::new(api_url);

    let status = runtime
        .block_on(client.health_check())
        .with_context(|| format!("API at {} is not reachable", api_url))?;
    println!("{}", format!("{}: {}", api_url, status.status).green());
    for (key, value) in &status.extra {
        println!("  {}: {}", key, value);
    }

    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::get_config_path()?;
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Could not write {}", path.display()))?;

    println!("Configuration file created at: {}", path.display());
    Ok(())
}
