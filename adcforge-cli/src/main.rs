//! adcforge CLI
//!
//! Command-line interface for inspecting Application Default Credentials
//! resolution.
//!
//! # Usage
//!
//! ```bash
//! # Resolve credentials the way a client library would
//! adcforge resolve
//!
//! # Force a service account with custom scopes and print the header
//! adcforge resolve --service-account --scopes https://www.googleapis.com/auth/devstorage.read_only --print-header
//!
//! # Classify a credentials file
//! adcforge inspect ~/.config/gcloud/application_default_credentials.json
//!
//! # Check for a metadata server
//! adcforge probe
//!
//! # List every source in precedence order
//! adcforge sources
//! ```

mod config;
mod report;

use std::path::{Path, PathBuf};

use adcforge_core::{
    CredentialFactory, CredentialProvider, Credentials, DefaultCredentialsResolver,
    LocatedSource, MetadataProbe, OsFileOpener, ProbeOverride, ServiceAccountOptions, Source,
    io::read_credential_file,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::CliConfig;
use crate::report::CredentialSummary;

#[derive(Parser)]
#[command(name = "adcforge")]
#[command(about = "Application Default Credentials resolution and diagnostics")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to <config dir>/adcforge/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve Application Default Credentials
    Resolve {
        /// OAuth scopes for service accounts (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        scopes: Vec<String>,

        /// Subject to impersonate with a service account
        #[arg(long)]
        subject: Option<String>,

        /// Require a service account from the explicit or well-known path
        #[arg(long)]
        service_account: bool,

        /// Fetch a token and print the Authorization header value
        #[arg(long)]
        print_header: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Classify a credentials file and print its non-secret fields
    Inspect {
        /// Path to the credentials file
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Report whether a compute environment is detected
    Probe,

    /// List every credential source in precedence order
    Sources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    init_logging(cli.verbose, &config.log_level);
    if let Some(path) = &config.config_path {
        debug!("loaded configuration from {:?}", path);
    }

    match cli.command {
        Commands::Resolve {
            scopes,
            subject,
            service_account,
            print_header,
            format,
        } => {
            let options = ServiceAccountOptions {
                scopes: (!scopes.is_empty()).then_some(scopes),
                subject,
            };
            resolve(&config, &options, service_account, print_header, format)
        }
        Commands::Inspect { path, format } => inspect(&config, &path, format),
        Commands::Probe => probe(&config),
        Commands::Sources => sources(&config),
    }
}

fn init_logging(verbose: bool, level: &str) {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve(
    config: &CliConfig,
    options: &ServiceAccountOptions,
    service_account: bool,
    print_header: bool,
    format: OutputFormat,
) -> Result<()> {
    let resolver = DefaultCredentialsResolver::from_config(config.adc.clone());

    let (creds, source) = if service_account {
        let creds: Credentials = resolver.service_account_from_default_paths(options)?.into();
        (creds, None)
    } else {
        let located = resolver.locate()?;
        let source = located.source();
        let creds = match located {
            LocatedSource::File { file, .. } => resolver.factory().from_file(&file, options)?,
            LocatedSource::AmbientCompute { metadata_root } => {
                resolver.factory().compute_engine(&metadata_root)
            }
        };
        (creds, Some(source))
    };

    let mut summary = CredentialSummary::new(&creds, source);
    if print_header {
        let header = creds
            .authorization_header()
            .with_context(|| format!("Failed to obtain an access token for {}", creds.kind_name()))?;
        summary = summary.with_authorization(header);
    }

    print_summary(&summary, format)
}

fn inspect(config: &CliConfig, path: &Path, format: OutputFormat) -> Result<()> {
    let factory = CredentialFactory::from_config(&config.adc);
    let file = read_credential_file(&OsFileOpener, path)?;
    let creds = factory.from_file(&file, &ServiceAccountOptions::default())?;

    print_summary(&CredentialSummary::new(&creds, None), format)
}

fn probe(config: &CliConfig) -> Result<()> {
    let resolver = DefaultCredentialsResolver::from_config(config.adc.clone());
    let root = resolver.metadata_root();

    match resolver.probe_override() {
        ProbeOverride::Unset => {
            let probe = MetadataProbe::new(config.adc.probe_timeout());
            match probe.check(&root) {
                Ok(true) => println!("compute environment: present (metadata server at {})", root),
                Ok(false) => println!(
                    "compute environment: absent ({} did not identify as a metadata server)",
                    root
                ),
                Err(e) => println!("compute environment: absent ({} unreachable: {})", root, e),
            }
        }
        forced => {
            let state = if forced == ProbeOverride::ForcePresent {
                "present"
            } else {
                "absent"
            };
            println!(
                "compute environment: {} (forced by {})",
                state, config.adc.probe_override_env_var
            );
        }
    }

    Ok(())
}

fn sources(config: &CliConfig) -> Result<()> {
    let resolver = DefaultCredentialsResolver::from_config(config.adc.clone());

    for (index, (source, description)) in Source::ALL
        .iter()
        .zip(resolver.consulted())
        .enumerate()
    {
        println!("{}. {}: {}", index + 1, source, description);
    }

    Ok(())
}

fn print_summary(summary: &CredentialSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", summary.to_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(summary).context("Failed to render summary as JSON")?
        ),
    }
    Ok(())
}
