//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing program ids, mint, or custodial
//! key abort startup.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, bail};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer, read_keypair_file};

use crate::service::version_resolver::ProgramIds;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Custodial signer of migration credit transfers.
///
/// `Debug` prints the public key only.
#[derive(Clone)]
pub struct CustodialAuthority(Arc<Keypair>);

impl CustodialAuthority {
    /// Wraps a keypair.
    #[must_use]
    pub fn new(keypair: Keypair) -> Self {
        Self(Arc::new(keypair))
    }

    /// The signing keypair.
    #[must_use]
    pub fn keypair(&self) -> &Keypair {
        &self.0
    }

    /// Public key of the authority.
    #[must_use]
    pub fn pubkey(&self) -> Pubkey {
        self.0.pubkey()
    }
}

impl fmt::Debug for CustodialAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustodialAuthority")
            .field(&self.pubkey())
            .finish()
    }
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`StakingConfig::from_env`].
#[derive(Debug, Clone)]
pub struct StakingConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Ledger JSON-RPC endpoint.
    pub rpc_url: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Program ids of both staking layouts.
    pub programs: ProgramIds,

    /// Staked and reward token mint.
    pub token_mint: Pubkey,

    /// Token decimal count.
    pub token_decimals: u8,

    /// Path of the migration fairness snapshot.
    pub migration_snapshot_path: PathBuf,

    /// Signer of migration credit transfers.
    pub custodial_authority: CustodialAuthority,

    /// Log output format.
    pub log_format: LogFormat,
}

impl StakingConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults for optional keys. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing, an address does not
    /// parse, or the custodial keypair cannot be loaded.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("LISTEN_ADDR is not a socket address")?;

        let rpc_url = std::env::var("RPC_URL")
            .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string());
        let rpc_timeout_secs = parse_env("RPC_TIMEOUT_SECS", 30);
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 30);

        let programs = ProgramIds {
            legacy: required_pubkey("LEGACY_PROGRAM_ID")?,
            sustainable: required_pubkey("SUSTAINABLE_PROGRAM_ID")?,
        };
        let token_mint = required_pubkey("TOKEN_MINT")?;
        let token_decimals = parse_env("TOKEN_DECIMALS", 6);

        let migration_snapshot_path = std::env::var("MIGRATION_SNAPSHOT_PATH")
            .unwrap_or_else(|_| "data/migration-snapshot.json".to_string())
            .into();

        let custodial_authority = CustodialAuthority::new(load_custodial_keypair()?);

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            rpc_url,
            rpc_timeout_secs,
            request_timeout_secs,
            programs,
            token_mint,
            token_decimals,
            migration_snapshot_path,
            custodial_authority,
            log_format,
        })
    }
}

/// Loads the custodial keypair from a JSON keypair file or a base58 secret.
fn load_custodial_keypair() -> anyhow::Result<Keypair> {
    if let Ok(path) = std::env::var("MIGRATION_AUTHORITY_KEYPAIR_PATH") {
        return read_keypair_file(&path)
            .map_err(|e| anyhow::anyhow!("failed to read keypair from {path}: {e}"));
    }
    if let Ok(secret) = std::env::var("MIGRATION_AUTHORITY_SECRET") {
        return keypair_from_base58(&secret);
    }
    bail!("MIGRATION_AUTHORITY_KEYPAIR_PATH or MIGRATION_AUTHORITY_SECRET must be set")
}

/// Decodes a base58 64-byte secret key.
fn keypair_from_base58(secret: &str) -> anyhow::Result<Keypair> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .context("MIGRATION_AUTHORITY_SECRET is not base58")?;
    Keypair::from_bytes(&bytes).context("MIGRATION_AUTHORITY_SECRET is not a 64-byte keypair")
}

/// Reads a required base58 public key.
fn required_pubkey(key: &str) -> anyhow::Result<Pubkey> {
    let value = std::env::var(key).with_context(|| format!("{key} must be set"))?;
    Pubkey::from_str(value.trim()).with_context(|| format!("{key} is not a valid address"))
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn base58_secret_round_trips() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let Ok(decoded) = keypair_from_base58(&encoded) else {
            panic!("decode failed");
        };
        assert_eq!(decoded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn short_secret_is_rejected() {
        let encoded = bs58::encode([1u8; 16]).into_string();
        assert!(keypair_from_base58(&encoded).is_err());
        assert!(keypair_from_base58("0OIl").is_err());
    }

    #[test]
    fn authority_debug_hides_secret() {
        let keypair = Keypair::new();
        let secret = bs58::encode(keypair.to_bytes()).into_string();
        let authority = CustodialAuthority::new(keypair);
        let rendered = format!("{authority:?}");
        assert!(rendered.contains(&authority.pubkey().to_string()));
        assert!(!rendered.contains(&secret));
    }

    #[test]
    fn parse_env_falls_back_to_default() {
        assert_eq!(parse_env("SSE_STAKING_TEST_UNSET_KEY", 42u64), 42);
    }
}
