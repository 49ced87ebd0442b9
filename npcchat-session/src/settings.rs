//! Startup wiring: config discovery, logging, and component construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use npcchat_core::config::{LlmConfig, NpcChatConfig};
use npcchat_core::registry::PlayerRegistry;
use npcchat_llm::{LlmClient, LlmProvider, TextGenerator};

use crate::driver::SessionDriver;
use crate::reply::ReplyGenerator;

// Besides the API key, these two are the only environment inputs. Both only
// choose which files are read; neither changes how messages are processed.

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "NPCCHAT_CONFIG";
/// Environment variable overriding `input.messages_path`.
pub const MESSAGES_ENV: &str = "NPCCHAT_MESSAGES";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "npcchat.toml";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise every npcchat crate logs at `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "npcchat={default_level},npcchat_core={default_level},npcchat_llm={default_level},npcchat_session={default_level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load config from `$NPCCHAT_CONFIG`, else `./npcchat.toml`, else defaults.
///
/// # Errors
/// Fails if a named or discovered file cannot be read or is invalid.
pub fn load_config() -> anyhow::Result<NpcChatConfig> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    load_config_at(explicit.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
}

/// Load config from `explicit` if given, else from `discovered` if it exists.
///
/// # Errors
/// Fails if the chosen file cannot be read or is invalid.
pub fn load_config_at(explicit: Option<&Path>, discovered: &Path) -> anyhow::Result<NpcChatConfig> {
    let path = match explicit {
        Some(path) => path,
        None if discovered.exists() => discovered,
        None => return Ok(NpcChatConfig::default()),
    };
    NpcChatConfig::from_file(path).with_context(|| format!("loading config from {}", path.display()))
}

/// Message log path: `$NPCCHAT_MESSAGES` if set, else the configured one.
#[must_use]
pub fn messages_path(config: &NpcChatConfig) -> PathBuf {
    messages_path_or(config, std::env::var_os(MESSAGES_ENV).map(PathBuf::from))
}

/// Message log path: `override_path` if given, else the configured one.
#[must_use]
pub fn messages_path_or(config: &NpcChatConfig, override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| PathBuf::from(&config.input.messages_path))
}

/// Build the HTTP text generator, reading the API key from the environment.
///
/// # Errors
/// Fails only for an unknown provider name; a missing key degrades to no
/// backend so every reply uses the fallback line.
pub fn build_client(config: &LlmConfig) -> anyhow::Result<LlmClient> {
    let api_key = std::env::var(&config.api_key_env).ok();
    let provider = LlmProvider::from_settings(&config.provider, &config.base_url, api_key)?;
    info!(
        provider = provider.name(),
        model = %config.model,
        timeout_ms = config.request_timeout_ms,
        "text generator configured"
    );
    Ok(LlmClient::new(provider, &config.model, config.max_retries))
}

/// Assemble a driver from config around any generator.
#[must_use]
pub fn build_driver(config: &NpcChatConfig, generator: Arc<dyn TextGenerator>) -> SessionDriver {
    let replies = ReplyGenerator::from_config(generator, config);
    let registry = PlayerRegistry::with_history_capacity(config.npc.history_capacity);
    SessionDriver::with_registry(replies, registry)
        .with_max_concurrent_players(config.session.max_concurrent_players)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_discovered_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_at(None, &dir.path().join("npcchat.toml")).expect("defaults");
        assert_eq!(config.npc.name, "Gregor");
    }

    #[test]
    fn discovered_file_is_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("npcchat.toml");
        std::fs::write(&path, "[npc]\nname = \"Brunhild\"\n").expect("write");
        let config = load_config_at(None, &path).expect("valid");
        assert_eq!(config.npc.name, "Brunhild");
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config_at(Some(&dir.path().join("absent.toml")), Path::new("unused"))
            .expect_err("should fail");
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn messages_path_prefers_override() {
        let config = NpcChatConfig::default();
        assert_eq!(messages_path_or(&config, None), PathBuf::from("players.json"));
        assert_eq!(
            messages_path_or(&config, Some(PathBuf::from("/tmp/gate.json"))),
            PathBuf::from("/tmp/gate.json")
        );
    }

    #[test]
    fn none_provider_builds_unavailable_client() {
        let config = LlmConfig {
            provider: "none".into(),
            ..LlmConfig::default()
        };
        let client = build_client(&config).expect("valid provider");
        assert!(!client.is_available());
    }

    #[test]
    fn unknown_provider_is_error() {
        let config = LlmConfig {
            provider: "telepathy".into(),
            ..LlmConfig::default()
        };
        assert!(build_client(&config).is_err());
    }

    #[test]
    fn driver_respects_history_capacity() {
        let mut config = NpcChatConfig::default();
        config.npc.history_capacity = 2;
        let driver = build_driver(&config, Arc::new(LlmClient::none()));
        assert_eq!(driver.registry().history_capacity(), 2);
    }
}
