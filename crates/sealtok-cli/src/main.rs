mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sealtok_core::{BackendKind, TokenConfig};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::token::{IssueOptions, VerifyOptions};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "sealtok.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "sealtok",
    version,
    about = "Issue and verify expiring sealed tokens"
)]
struct Cli {
    /// Path to a sealtok.yaml configuration file
    #[arg(long, short = 'c', global = true, env = "SEALTOK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key management (generate)
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Token management (issue/verify)
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate seal/open key material for a backend
    Generate {
        /// Backend the keys are for: symmetric, sealed-box or signed-box
        #[arg(long, default_value = "symmetric")]
        backend: BackendKind,

        /// Output directory for the key files (prints to stdout if not specified)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a new expiring token
    Issue {
        /// Backend to seal with (defaults to the configured backend)
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Seal key (hex string or path to key file)
        #[arg(long, env = "SEALTOK_SEAL_KEY")]
        key: Option<String>,

        /// Token lifetime (e.g. "30s", "15m", "24h"); defaults to the configured lifetime
        #[arg(long)]
        expires: Option<String>,

        /// Payload as a UTF-8 string
        #[arg(long)]
        payload: Option<String>,

        /// Read the payload bytes from a file
        #[arg(long = "payload-file")]
        payload_file: Option<PathBuf>,

        /// Associated data the token is bound to
        #[arg(long = "ad")]
        associated_data: Option<String>,

        /// Output file for the token (prints to stdout if not specified)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Verify a token and show its contents
    Verify {
        /// The token string or path to a token file
        token: String,

        /// Backend the token was sealed with (defaults to the configured backend)
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Open key (hex string or path to key file)
        #[arg(long, env = "SEALTOK_OPEN_KEY")]
        key: Option<String>,

        /// Associated data the token was bound to
        #[arg(long = "ad")]
        associated_data: Option<String>,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TokenConfig> {
    match path {
        Some(path) => TokenConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            TokenConfig::load(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("Failed to load config: {DEFAULT_CONFIG_FILE}"))
        }
        None => Ok(TokenConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    debug!(backend = %config.backend, "configuration loaded");

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { backend, output } => {
                commands::keys::generate(backend, output)?
            }
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                backend,
                key,
                expires,
                payload,
                payload_file,
                associated_data,
                output,
            } => commands::token::issue(
                IssueOptions {
                    backend,
                    key,
                    expires,
                    payload,
                    payload_file,
                    associated_data,
                    output,
                },
                &config,
            )?,

            TokenCommand::Verify {
                token,
                backend,
                key,
                associated_data,
                json,
            } => commands::token::verify(
                VerifyOptions {
                    backend,
                    key,
                    token,
                    associated_data,
                    json,
                },
                &config,
            )?,
        },
    }

    Ok(())
}
