//! Settings types.
//!
//! Everything except secrets round-trips through JSON so the loader can
//! deep-merge a user file over compiled defaults. Secrets are skipped by serde
//! and filled in separately from the file's `secrets` object and the
//! environment.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Root settings for the service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WallSettings {
    /// HTTP bind settings.
    pub server: ServerSettings,
    /// Webhook receiver settings.
    pub chainhook: ChainhookSettings,
    /// Target network and contract deployment.
    pub network: NetworkSettings,
    /// Third-party API proxies.
    pub upstream: UpstreamSettings,
}

impl WallSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        if self.chainhook.print_event_type.trim().is_empty() {
            return Err(crate::SettingsError::InvalidValue(
                "chainhook.printEventType must not be empty".into(),
            ));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(crate::SettingsError::InvalidValue(
                "upstream.timeoutMs must be greater than 0".into(),
            ));
        }
        for (name, url) in [
            ("upstream.stacksMainnetUrl", &self.upstream.stacks_mainnet_url),
            ("upstream.stacksTestnetUrl", &self.upstream.stacks_testnet_url),
            ("upstream.talentUrl", &self.upstream.talent_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(crate::SettingsError::InvalidValue(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Fallback shared secret used when none is configured.
pub const DEFAULT_CHAINHOOK_SECRET: &str = "secret-token";

/// Chainhook delivery settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainhookSettings {
    /// Bearer token the indexer must present.
    #[serde(skip)]
    pub secret: Option<SecretString>,
    /// Receipt event `type` that marks a contract print event. Matched exactly.
    pub print_event_type: String,
    /// Required `data.topic` for print events that carry one.
    pub print_topic: String,
}

impl Default for ChainhookSettings {
    fn default() -> Self {
        Self {
            secret: None,
            print_event_type: "SmartContractEvent".to_string(),
            print_topic: "print".to_string(),
        }
    }
}

/// Stacks network the deployment targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Stacks mainnet.
    Mainnet,
    /// Stacks testnet.
    #[default]
    Testnet,
}

impl Network {
    /// Parse a network name, case-insensitive.
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet"),
            Self::Testnet => f.write_str("testnet"),
        }
    }
}

/// Network selector and contract deployment per network.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSettings {
    /// Default network for proxies and the dashboard.
    pub network: Network,
    /// Contract deployer address on mainnet.
    pub mainnet_contract: String,
    /// Contract deployer address on testnet.
    pub testnet_contract: String,
    /// Contract name.
    pub contract_name: String,
}

impl NetworkSettings {
    /// Contract address for the selected network.
    pub fn contract_address(&self) -> &str {
        match self.network {
            Network::Mainnet => &self.mainnet_contract,
            Network::Testnet => &self.testnet_contract,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            mainnet_contract: "SP1TN1ERKXEM2H9TKKWGPGZVNVNEKS92M7MAMP23P".to_string(),
            testnet_contract: "ST1TN1ERKXEM2H9TKKWGPGZVNVNEKS92M7MAMP23P".to_string(),
            contract_name: "jackpot-wall".to_string(),
        }
    }
}

/// Upstream API endpoints and credentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamSettings {
    /// Per-request timeout for upstream calls.
    pub timeout_ms: u64,
    /// Hiro Stacks API base URL for mainnet.
    pub stacks_mainnet_url: String,
    /// Hiro Stacks API base URL for testnet.
    pub stacks_testnet_url: String,
    /// Talent Protocol API base URL.
    pub talent_url: String,
    /// Hiro API key, sent as `x-api-key` when set.
    #[serde(skip)]
    pub hiro_api_key: Option<SecretString>,
    /// Talent Protocol API key. The reputation proxy refuses to run without it.
    #[serde(skip)]
    pub talent_api_key: Option<SecretString>,
}

impl UpstreamSettings {
    /// Stacks API base URL for a network.
    pub fn stacks_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.stacks_mainnet_url,
            Network::Testnet => &self.stacks_testnet_url,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            stacks_mainnet_url: "https://api.mainnet.hiro.so".to_string(),
            stacks_testnet_url: "https://api.testnet.hiro.so".to_string(),
            talent_url: "https://api.talentprotocol.com".to_string(),
            hiro_api_key: None,
            talent_api_key: None,
        }
    }
}
