/// License server binary - issue, validate and serve HMAC-signed licenses
///
/// Usage:
///   license-server generate -s SECRET -M plan=pro
///   license-server validate -s SECRET <LICENSE>
///   license-server serve -s SECRET -k API_KEY -p 3000
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use license_server::config::{ServerConfig, load_config};
use license_server::license::{IssueRequest, issue, parse_date, parse_meta_pair};
use license_server::verification::{RemoteVerdict, generate_shared_secret, validate_remote};
use license_server::{
    LicenseAssertion, LicenseRecord, canonicalize, envelope, server, sign, validate_assertion,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "license-server")]
#[command(about = "Simple HMAC license server")]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a license
    Generate {
        /// Start date of the license (defaults to today)
        #[arg(short = 'f', long, value_parser = parse_cli_date)]
        valid_from: Option<NaiveDate>,
        /// End date of the license (defaults to 30 days after the start)
        #[arg(short = 'u', long, value_parser = parse_cli_date)]
        valid_until: Option<NaiveDate>,
        /// Metadata to add to the license, as KEY=value
        #[arg(short = 'M', value_parser = parse_meta_pair)]
        meta: Vec<(String, String)>,
        /// HMAC signing secret
        #[arg(short, long, env = "HMAC_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Validate a license locally, or against a running server
    Validate {
        /// License string
        license: String,
        /// HMAC signing secret
        #[arg(short, long, env = "HMAC_SECRET", hide_env_values = true)]
        secret: Option<String>,
        /// Ask this license server instead of checking locally
        #[arg(long)]
        server: Option<String>,
    },
    /// Start the license server
    Serve {
        /// JSON configuration file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// API key required by /generate
        #[arg(short = 'k', long = "key", env = "LICENSE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// HMAC signing secret
        #[arg(short, long, env = "HMAC_SECRET", hide_env_values = true)]
        secret: Option<String>,
        /// Listen port
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
        /// Listen address
        #[arg(long)]
        bind: Option<IpAddr>,
    },
    /// Print a new random shared secret
    Keygen,
    /// Sign a license record read from a JSON file
    Sign {
        file: PathBuf,
        /// HMAC signing secret
        #[arg(short, long, env = "HMAC_SECRET", hide_env_values = true)]
        secret: String,
        /// Print the full base64 envelope instead of the bare signature
        #[arg(long)]
        envelope: bool,
    },
    /// Print the canonical string of a license record read from a JSON file
    Canonicalize { file: PathBuf },
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate {
            valid_from,
            valid_until,
            meta,
            secret,
        } => {
            let request = IssueRequest {
                valid_from,
                valid_until,
                meta: meta.into_iter().collect(),
            };
            let issued = issue(request, secret.as_bytes(), today())?;
            info!(
                id = issued.assertion.license.id.as_deref().unwrap_or_default(),
                "license generated"
            );
            println!("Your license key is:\n{}", issued.encoded);
            Ok(())
        }
        Command::Validate {
            license,
            secret,
            server,
        } => match (server, secret) {
            (Some(url), _) => validate_with_server(&url, &license),
            (None, Some(secret)) => validate_locally(&license, &secret),
            (None, None) => bail!("pass --secret (or set HMAC_SECRET) or --server"),
        },
        Command::Serve {
            config,
            api_key,
            secret,
            port,
            bind,
        } => {
            let mut server_config = match config {
                Some(path) => load_config(&path)?,
                None => ServerConfig::new("", ""),
            };
            server_config.apply_overrides(secret, api_key, port, bind);
            server_config.validate()?;
            debug!(config = ?server_config, "starting license server");

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(server::serve(server_config))?;
            Ok(())
        }
        Command::Keygen => {
            println!("{}", generate_shared_secret());
            Ok(())
        }
        Command::Sign {
            file,
            secret,
            envelope: as_envelope,
        } => {
            let license = read_record(&file)?;
            let signature = sign(&license, secret.as_bytes())?;
            if as_envelope {
                println!("{}", envelope::encode(&LicenseAssertion { license, signature })?);
            } else {
                println!("{signature}");
            }
            Ok(())
        }
        Command::Canonicalize { file } => {
            let license = read_record(&file)?;
            println!("{}", canonicalize(&license));
            Ok(())
        }
    }
}

fn validate_locally(encoded: &str, secret: &str) -> Result<()> {
    let assertion = envelope::decode(encoded)?;
    let verdict = validate_assertion(&assertion, secret.as_bytes(), today())?;
    let id = assertion.license.id.as_deref().unwrap_or_default();
    if !verdict.is_valid() {
        bail!("license {id} is not valid: {verdict}");
    }
    println!(
        "✅ License {id} is valid ({} to {})",
        assertion.license.valid_from, assertion.license.valid_until
    );
    Ok(())
}

fn validate_with_server(url: &str, encoded: &str) -> Result<()> {
    match validate_remote(url, encoded)? {
        RemoteVerdict::Valid => {
            println!("✅ License accepted by {url}");
            Ok(())
        }
        RemoteVerdict::Rejected { message } => bail!("license rejected by {url}: {message}"),
    }
}

fn read_record(path: &Path) -> Result<LicenseRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
