//! Caseforge CLI - command-line interface for Caseforge
//!
//! Locates files across GitHub repositories and requests test-case
//! recommendations without going through the HTTP service.

use anyhow::{bail, Context};
use caseforge_core::{init_logging, CaseforgeConfig, LoggingConfig};
use caseforge_recommend::{PipelineOutcome, RecommendationPipeline};
use caseforge_repo::{ApiClientConfig, FileLocator, GitHubApiClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "caseforge")]
#[command(about = "Test-case recommendations for files anywhere in your GitHub account")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment file loaded before configuration
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find every copy of a file across repositories and branches
    Locate {
        /// Exact file name, e.g. report.py
        filename: String,

        /// Print the full search outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask for test-case recommendations for a file
    Recommend {
        /// Exact file name, e.g. report.py
        filename: String,

        /// Number of test cases to ask for
        #[arg(short = 'n', long)]
        top_n: Option<i64>,
    },

    /// Configuration management
    Config {
        /// Write a default configuration file (to PATH, or the user config directory)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        init: Option<Option<PathBuf>>,

        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let level = if cli.verbose { "debug" } else { "warn" };
    init_logging(&LoggingConfig::with_level(level))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Locate { filename, json } => {
            let config = load_config(cli.config.as_ref())?;
            handle_locate(&filename, json, &config).await?;
        }
        Commands::Recommend { filename, top_n } => {
            let config = load_config(cli.config.as_ref())?;
            handle_recommend(&filename, top_n, &config).await?;
        }
        Commands::Config { init, show } => {
            if let Some(path) = init {
                handle_config_init(path)?;
            }
            if show {
                let config = load_config(cli.config.as_ref())?;
                println!("{}", serde_json::to_string_pretty(&redacted(config))?);
            }
        }
    }

    Ok(())
}

/// Explicit path, then the default locations, then built-in defaults
fn load_config(config_path: Option<&PathBuf>) -> anyhow::Result<CaseforgeConfig> {
    let path = match config_path {
        Some(path) => Some(path.clone()),
        None => default_config_paths().into_iter().find(|p| p.exists()),
    };

    match &path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No configuration file found, using defaults"),
    }

    Ok(CaseforgeConfig::load(path)?)
}

fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|d| d.join("caseforge").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".caseforge").join("config.toml")),
        Some(PathBuf::from("caseforge.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn redacted(mut config: CaseforgeConfig) -> CaseforgeConfig {
    if config.github.token.is_some() {
        config.github.token = Some("***".to_string());
    }
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some("***".to_string());
    }
    config
}

async fn handle_locate(filename: &str, json: bool, config: &CaseforgeConfig) -> anyhow::Result<()> {
    let host = GitHubApiClient::new(ApiClientConfig::from_github_config(&config.github))?;
    let locator = FileLocator::new(Arc::new(host), config.github.scope());
    let outcome = locator.locate(filename).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.matches.is_empty() {
        println!("{} not found in any repo/branch", filename);
    }
    for (i, file_match) in outcome.matches.iter().enumerate() {
        let marker = if i == 0 { "*" } else { " " };
        println!("{} {}", marker, file_match);
    }
    for failure in &outcome.failures {
        eprintln!("skipped {}: {}", failure.repository, failure.reason);
    }
    println!(
        "{} repositories, {} branches scanned",
        outcome.repositories_scanned, outcome.branches_scanned
    );
    Ok(())
}

async fn handle_recommend(
    filename: &str,
    top_n: Option<i64>,
    config: &CaseforgeConfig,
) -> anyhow::Result<()> {
    if filename.is_empty() {
        bail!("Missing filename");
    }

    let pipeline = RecommendationPipeline::from_config(config).await?;
    let outcome = pipeline.run(filename, top_n).await?;

    for failure in outcome.failures() {
        eprintln!("skipped {}: {}", failure.repository, failure.reason);
    }

    match outcome {
        PipelineOutcome::NotFound { filename, .. } => {
            bail!("{} not found in any repo/branch", filename)
        }
        PipelineOutcome::Completed {
            file_match,
            artifacts,
            response,
            ..
        } => {
            info!(file_match = %file_match, artifacts, "Recommendation completed");
            println!("{}", serde_json::to_string_pretty(&response.into_json())?);
            Ok(())
        }
    }
}

fn handle_config_init(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
            .context("No configuration directory available; pass a PATH")?
            .join("caseforge")
            .join("config.toml"),
    };

    if path.exists() {
        bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    CaseforgeConfig::default().save_to_file(&path)?;
    println!("Configuration initialized at: {}", path.display());
    println!("Set GITHUB_TOKEN and OPENAI_API_KEY, or edit the file directly.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_args() {
        let cli = Cli::parse_from(["caseforge", "recommend", "report.py", "-n", "5"]);
        match cli.command {
            Commands::Recommend { filename, top_n } => {
                assert_eq!(filename, "report.py");
                assert_eq!(top_n, Some(5));
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_config_init_with_and_without_path() {
        let cli = Cli::parse_from(["caseforge", "config", "--init"]);
        assert!(matches!(cli.command, Commands::Config { init: Some(None), .. }));

        let cli = Cli::parse_from(["caseforge", "config", "--init", "cf.toml"]);
        match cli.command {
            Commands::Config { init, .. } => {
                assert_eq!(init, Some(Some(PathBuf::from("cf.toml"))))
            }
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["caseforge", "locate", "a.py", "--verbose", "--config", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = CaseforgeConfig::default();
        config.github.token = Some("ghp_secret".to_string());
        let shown = redacted(config);
        assert_eq!(shown.github.token.as_deref(), Some("***"));
        assert!(shown.llm.api_key.is_none());
    }
}
