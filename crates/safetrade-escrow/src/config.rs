//! Escrow service configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Escrow admin service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Admin bearer tokens accepted by the static resolver
    pub admin_tokens: Vec<String>,
    /// Require deposit → shipping → settlement ordering as a hard
    /// precondition instead of the historical permissive behavior
    pub enforce_step_order: bool,
    /// Page size for get_list when the caller omits a limit
    pub default_list_limit: usize,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
            admin_tokens: Vec::new(),
            enforce_step_order: false,
            default_list_limit: crate::DEFAULT_LIST_LIMIT,
        }
    }
}

impl EscrowConfig {
    /// Load configuration from environment and .env
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Platform PORT variable takes priority
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        if let Ok(host) = std::env::var("SAFETRADE_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("SAFETRADE_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        if let Ok(tokens) = std::env::var("SAFETRADE_ADMIN_TOKENS") {
            cfg.admin_tokens = tokens
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(val) = std::env::var("SAFETRADE_ENFORCE_STEP_ORDER") {
            if let Ok(v) = val.parse() {
                cfg.enforce_step_order = v;
            }
        }
        if let Ok(val) = std::env::var("SAFETRADE_DEFAULT_LIST_LIMIT") {
            if let Ok(v) = val.parse() {
                cfg.default_list_limit = v;
            }
        }

        Ok(cfg)
    }
}
