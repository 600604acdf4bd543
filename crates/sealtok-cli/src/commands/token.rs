//! Token commands.
//!
//! `sealtok token issue` - Issue a new expiring token.
//! `sealtok token verify` - Verify a token and show its contents.

use anyhow::Context;
use chrono::Utc;
use sealtok_backend::{
    BoxPublicKey, BoxSecretKey, HexKey, SealedBox, SignedBox, SignedOpenKey, SignedSealKey,
    Symmetric, SymmetricKey,
};
use sealtok_core::config::parse_duration;
use sealtok_core::{BackendKind, KeyConfig, Token, TokenConfig};
use sealtok_service::{IssuePolicy, SealingBackend, TokenError, TokenService, armor, dearmor};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for `sealtok token issue`.
#[derive(Debug, Default)]
pub struct IssueOptions {
    pub backend: Option<BackendKind>,
    pub key: Option<String>,
    pub expires: Option<String>,
    pub payload: Option<String>,
    pub payload_file: Option<PathBuf>,
    pub associated_data: Option<String>,
    pub output: Option<PathBuf>,
}

/// Arguments for `sealtok token verify`.
#[derive(Debug, Default)]
pub struct VerifyOptions {
    pub backend: Option<BackendKind>,
    pub key: Option<String>,
    pub token: String,
    pub associated_data: Option<String>,
    pub json: bool,
}

/// Resolve a key from the command line, falling back to the configured source.
///
/// The key string can be:
/// - A path to a file containing a hex-encoded key
/// - A hex-encoded key directly (e.g., from SEALTOK_SEAL_KEY env var)
fn resolve_key<K: HexKey>(
    key: Option<String>,
    configured: Option<String>,
    role: &str,
) -> anyhow::Result<K> {
    let key_str = key.or(configured).with_context(|| {
        format!(
            "{role} key not provided. Either pass --key <hex|path>, set SEALTOK_{}_KEY, \
             or configure keys in sealtok.yaml",
            role.to_uppercase()
        )
    })?;

    // If it looks like a file path and the file exists, load from file
    let path = Path::new(&key_str);
    if path.exists() {
        return K::load_from_file(path)
            .with_context(|| format!("Failed to load {role} key from file: {}", path.display()));
    }

    // Otherwise, treat it as a hex-encoded key
    K::from_hex(key_str.trim()).with_context(|| format!("Failed to parse {role} key"))
}

/// Read the configured key for `role`, unless an explicit key was given.
///
/// Configured keys belong to `config.backend`; using them with another backend
/// would reinterpret the key bytes, so that is refused.
fn configured_key(
    explicit: Option<&str>,
    backend: BackendKind,
    config: &TokenConfig,
    resolve: impl FnOnce(&KeyConfig) -> std::io::Result<Option<String>>,
    role: &str,
) -> anyhow::Result<Option<String>> {
    if explicit.is_some() {
        return Ok(None);
    }

    let configured = resolve(&config.keys)
        .with_context(|| format!("Failed to read configured {role} key"))?;
    if configured.is_some() && backend != config.backend {
        anyhow::bail!(
            "the configured {role} key is for the {} backend, not {backend}; \
             pass --key to use a different backend",
            config.backend
        );
    }
    Ok(configured)
}

/// Load a token from a file if the argument is a path, otherwise use it as-is.
fn read_token_arg(token: &str) -> anyhow::Result<String> {
    if Path::new(token).exists() {
        Ok(fs::read_to_string(token)?.trim().to_string())
    } else {
        Ok(token.trim().to_string())
    }
}

fn issue_armored<B: SealingBackend>(
    backend: B,
    key: &B::SealKey,
    policy: IssuePolicy,
    lifetime: chrono::Duration,
    payload: Option<&[u8]>,
    associated_data: Option<&[u8]>,
) -> Result<String, TokenError> {
    let service = TokenService::new(backend).with_policy(policy);
    let wire = service.issue(key, lifetime, payload, associated_data)?;
    Ok(armor(&wire))
}

/// Issue a new token.
pub fn issue(options: IssueOptions, config: &TokenConfig) -> anyhow::Result<()> {
    let backend = options.backend.unwrap_or(config.backend);
    let lifetime = match options.expires.as_deref() {
        Some(expires) => parse_duration("expires", expires)?,
        None => config.default_lifetime()?,
    };
    let policy = IssuePolicy::from_config(config)?;

    let payload = match (&options.payload, &options.payload_file) {
        (Some(_), Some(_)) => anyhow::bail!("--payload and --payload-file are mutually exclusive"),
        (Some(text), None) => Some(text.clone().into_bytes()),
        (None, Some(path)) => Some(
            fs::read(path)
                .with_context(|| format!("Failed to read payload file: {}", path.display()))?,
        ),
        (None, None) => None,
    };
    let payload = payload.as_deref();
    let associated_data = options.associated_data.as_deref().map(str::as_bytes);

    let configured = configured_key(
        options.key.as_deref(),
        backend,
        config,
        KeyConfig::resolve_seal_key,
        "seal",
    )?;
    let token = match backend {
        BackendKind::Symmetric => {
            let key: SymmetricKey = resolve_key(options.key, configured, "seal")?;
            issue_armored(Symmetric, &key, policy, lifetime, payload, associated_data)?
        }
        BackendKind::SealedBox => {
            let key: BoxPublicKey = resolve_key(options.key, configured, "seal")?;
            issue_armored(SealedBox, &key, policy, lifetime, payload, associated_data)?
        }
        BackendKind::SignedBox => {
            let key: SignedSealKey = resolve_key(options.key, configured, "seal")?;
            issue_armored(SignedBox, &key, policy, lifetime, payload, associated_data)?
        }
    };

    if let Some(output_path) = options.output {
        fs::write(&output_path, &token)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Backend: {backend}");
        println!("  Expires in: {}", format_lifetime(lifetime));
    } else {
        println!("{token}");
    }

    Ok(())
}

fn redeem_armored<B: SealingBackend>(
    backend: B,
    key: &B::OpenKey,
    wire: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Token, TokenError> {
    TokenService::new(backend).redeem(key, wire, associated_data)
}

/// Machine-readable verification result.
#[derive(Debug, Serialize)]
struct VerifyReport {
    status: &'static str,
    backend: String,
    expiration_timestamp: i64,
    expires_at: Option<String>,
    payload_len: usize,
    payload: String,
}

impl VerifyReport {
    fn new(status: &'static str, backend: BackendKind, token: &Token) -> Self {
        Self {
            status,
            backend: backend.to_string(),
            expiration_timestamp: token.expiration_timestamp(),
            expires_at: token.expiration_time().map(|t| t.to_rfc3339()),
            payload_len: token.payload().len(),
            payload: String::from_utf8_lossy(token.payload()).into_owned(),
        }
    }
}

/// Verify a token.
pub fn verify(options: VerifyOptions, config: &TokenConfig) -> anyhow::Result<()> {
    let backend = options.backend.unwrap_or(config.backend);
    let token_str = read_token_arg(&options.token)?;
    let wire = dearmor(&token_str)?;
    let associated_data = options.associated_data.as_deref().map(str::as_bytes);

    let configured = configured_key(
        options.key.as_deref(),
        backend,
        config,
        KeyConfig::resolve_open_key,
        "open",
    )?;
    let result = match backend {
        BackendKind::Symmetric => {
            let key: SymmetricKey = resolve_key(options.key, configured, "open")?;
            redeem_armored(Symmetric, &key, &wire, associated_data)
        }
        BackendKind::SealedBox => {
            let key: BoxSecretKey = resolve_key(options.key, configured, "open")?;
            redeem_armored(SealedBox, &key, &wire, associated_data)
        }
        BackendKind::SignedBox => {
            let key: SignedOpenKey = resolve_key(options.key, configured, "open")?;
            redeem_armored(SignedBox, &key, &wire, associated_data)
        }
    };

    match result {
        Ok(token) => {
            if options.json {
                let report = VerifyReport::new("valid", backend, &token);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✔ Token is valid");
                println!();
                print_details(backend, &token);
                if let Some(remaining) = token.remaining(Utc::now()) {
                    println!("  Remaining: {}", format_lifetime(remaining));
                }
            }
            Ok(())
        }
        Err(err) => {
            if let Some(token) = err.expired_token() {
                if options.json {
                    let report = VerifyReport::new("expired", backend, token);
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("✖ Token expired (contents shown for diagnostics only)");
                    println!();
                    print_details(backend, token);
                }
            }
            Err(err).context("Token verification failed")
        }
    }
}

fn print_details(backend: BackendKind, token: &Token) {
    println!("Token Details:");
    println!("  Backend: {backend}");
    match token.expiration_time() {
        Some(expires_at) => println!("  Expires at: {}", expires_at.to_rfc3339()),
        None => println!("  Expires at: {} ms since epoch", token.expiration_timestamp()),
    }
    if token.payload().is_empty() {
        println!("  Payload: (empty)");
    } else {
        println!(
            "  Payload ({} bytes): {}",
            token.payload().len(),
            String::from_utf8_lossy(token.payload())
        );
    }
}

fn format_lifetime(duration: chrono::Duration) -> String {
    let millis = duration.num_milliseconds();
    if millis % 1_000 != 0 {
        return format!("{millis}ms");
    }
    let secs = millis / 1_000;
    if secs % 3_600 == 0 && secs != 0 {
        format!("{}h", secs / 3_600)
    } else if secs % 60 == 0 && secs != 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}
