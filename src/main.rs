use anyhow::{Context, Result, bail};
use api_client::YahooClient;
use clap::{Parser, Subcommand};
use configuration::OutputFormat;
use core_types::CrashYear;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;
mod session;

use session::Session;

/// The main entry point for the CrashScope application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables (e.g. RUST_LOG) from a .env file, if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON reports on stdout stay machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config))?;
    let format = cli.format.unwrap_or(config.output.format);

    // Reject unknown years before spending time on the download
    if let Commands::Report(args) = &cli.command {
        if let Some(year) = args
            .years
            .iter()
            .find(|y| !config.history.crash_years.contains(y))
        {
            bail!("crash year {} is not in the configured crash_years", year);
        }
    }

    let client = YahooClient::new(&config.data_source)?;
    let session = start_session(&config, &client).await?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(&session, args, format),
        Commands::Session => handle_session(&session, format).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Explore how a market index and its sectors behaved around major crashes.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml")]
    config: String,

    /// Output format; overrides `[output].format` from the configuration.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the crash report for one or more crash years.
    Report(ReportArgs),
    /// Download once, then answer crash-year selections from stdin.
    Session,
}

#[derive(Parser)]
struct ReportArgs {
    /// Crash year to report on (e.g., 2008). Repeatable; defaults to every configured year.
    #[arg(long = "year", short)]
    years: Vec<CrashYear>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Downloads the configured history behind a spinner.
async fn start_session(
    config: &configuration::settings::Config,
    client: &YahooClient,
) -> Result<Session> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!(
        "Downloading {} symbols from {} to {}...",
        config.universe.instruments().len(),
        config.history.start,
        config.history.end
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    match Session::start(config, client).await {
        Ok(session) => {
            spinner.finish_with_message("Price history downloaded.");
            Ok(session)
        }
        Err(e) => {
            spinner.abandon_with_message("Download failed.");
            Err(e)
        }
    }
}

fn handle_report(session: &Session, args: ReportArgs, format: OutputFormat) -> Result<()> {
    let years = if args.years.is_empty() {
        session.years().to_vec()
    } else {
        args.years
    };
    for year in years {
        let report = session.report(year)?;
        println!("{}", render::render(&report, format)?);
    }
    Ok(())
}

/// Reads crash years from stdin until `q` or end of input.
///
/// A bad selection is reported and the loop continues; the downloaded history
/// is never refetched.
async fn handle_session(session: &Session, format: OutputFormat) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprintln!("Select a crash year ({}) or 'q' to quit:", session.years_label());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") {
            break;
        }
        match select(session, input, format) {
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("{:#}", e),
        }
    }
    Ok(())
}

fn select(session: &Session, input: &str, format: OutputFormat) -> Result<String> {
    let year: CrashYear = input.parse()?;
    let report = session.report(year)?;
    render::render(&report, format)
}
