//! Casejudge CLI
//!
//! A command-line tool for running and verifying code submissions.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use casejudge::{
    Config, EXAMPLE_CONFIG, OverallStatus, ResourceLimits, RunnerRegistry, TestCase,
    VerificationRequest, Verifier,
};
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

mod server;

#[derive(Parser)]
#[command(name = "casejudge")]
#[command(about = "A tool for verifying code submissions against test cases")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: casejudge.toml)
        #[arg(short, long, default_value = "casejudge.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a program once
    Run {
        /// Source file to run
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language ID (e.g., python)
        #[arg(short, long, default_value = "python")]
        language: String,

        /// Input file (default: empty input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Time limit in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Verify a program against test cases and print the verdict as JSON
    Verify {
        /// Source file to verify
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language ID (e.g., python)
        #[arg(short, long, default_value = "python")]
        language: String,

        /// Problem whose test cases are fetched from the problem store
        #[arg(short, long)]
        problem: Option<String>,

        /// JSON file with a list of {"input", "output"} test cases
        #[arg(long, conflicts_with = "problem")]
        cases: Option<PathBuf>,

        /// Time limit per test case in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// List available languages
    Languages,

    /// Show effective configuration
    ShowConfig,

    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:5005")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Run {
            source,
            language,
            input,
            timeout,
        } => run_once(&config, &source, &language, input.as_deref(), timeout).await,
        Commands::Verify {
            source,
            language,
            problem,
            cases,
            timeout,
        } => {
            run_verify(
                &config,
                &source,
                language,
                problem,
                cases.as_deref(),
                timeout,
            )
            .await
        }
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
        Commands::Serve { addr } => {
            let verifier = Verifier::from_config(&config).context("failed to set up verifier")?;
            server::serve(verifier, addr).await
        }
    }
}

/// Only explicitly given values, so they don't override language limits
fn user_limits(timeout: Option<u64>) -> Result<Option<ResourceLimits>> {
    let Some(secs) = timeout else {
        return Ok(None);
    };
    let limits = ResourceLimits::unset().with_timeout_secs(secs);
    limits.validate().context("invalid --timeout")?;
    Ok(Some(limits))
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read source file '{}'", path.display()))
}

async fn run_once(
    config: &Config,
    source: &Path,
    language_id: &str,
    input: Option<&Path>,
    timeout: Option<u64>,
) -> Result<()> {
    let limits = user_limits(timeout)?;
    let registry = RunnerRegistry::from_config(config);
    let runner = registry.get(language_id).context("unknown language")?;

    let code = read_source(source).await?;
    let input_data = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .context("failed to read input file")?,
        None => String::new(),
    };

    info!(language = language_id, "running program");
    let result = runner.run(&code, &input_data, limits.as_ref()).await;

    print!("{}", result.stdout);
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }

    // Log execution info via tracing (stderr), keeping stdout clean for piping
    info!(
        exit_code = result.exit_code,
        timed_out = result.timed_out,
        "execution result"
    );

    if result.is_success() {
        Ok(())
    } else {
        std::process::exit(if result.exit_code > 0 { result.exit_code } else { 1 });
    }
}

async fn run_verify(
    config: &Config,
    source: &Path,
    language: String,
    problem: Option<String>,
    cases: Option<&Path>,
    timeout: Option<u64>,
) -> Result<()> {
    let verifier = Verifier::from_config(config).context("failed to set up verifier")?;

    let mut request = VerificationRequest::new(read_source(source).await?).with_language(language);
    request.problem_id = problem;
    request.limits = user_limits(timeout)?;
    if let Some(path) = cases {
        request = request.with_test_cases(read_cases(path).await?);
    }

    let verdict = verifier.verify(&request).await;
    let json = serde_json::to_string_pretty(&verdict).context("failed to serialize verdict")?;
    println!("{json}");

    if verdict.status == OverallStatus::Success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn read_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read test cases from '{}'", path.display()))?;
    serde_json::from_str(&content).context("test case file must be a JSON list of {input, output}")
}

fn list_languages(config: &Config) {
    println!("Available languages:\n");

    let mut languages: Vec<_> = config.languages.iter().collect();
    languages.sort_by_key(|(id, _)| *id);

    for (id, lang) in languages {
        let syntax = if lang.syntax_check.is_some() {
            "syntax check"
        } else {
            "no syntax check"
        };
        println!("  {:<15} {} ({})", id, lang.name, syntax);
    }
}

fn show_config(config: &Config) {
    println!("Default resource limits:");
    println!("  Timeout: {:?} s", config.default_limits.timeout_secs);
    println!("  Max output: {:?} KB", config.default_limits.max_output);
    println!();
    println!("Max parallel cases: {}", config.max_parallel);
    match config.problem_store.base_url {
        Some(ref url) => println!(
            "Problem store: {url} (timeout {} s)",
            config.problem_store.request_timeout_secs
        ),
        None => println!("Problem store: none"),
    }
    println!();
    println!("Languages configured: {}", config.languages.len());
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
