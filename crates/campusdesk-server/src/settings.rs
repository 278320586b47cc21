//! Server configuration: a TOML file layered under `CAMPUSDESK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use campusdesk_ai::GeminiConfig;
use campusdesk_core::config::RoutingConfig;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "CAMPUSDESK";

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Absent, or present with an empty key, runs offline.
  #[serde(default)]
  pub gemini:     Option<GeminiConfig>,
  #[serde(default)]
  pub routing:    RoutingConfig,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/campusdesk/campusdesk.db") }

impl ServerConfig {
  /// Read `path` (optional) and then the environment, e.g.
  /// `CAMPUSDESK_PORT=9000` or `CAMPUSDESK_GEMINI__API_KEY=...`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder().add_source(config::File::from(path).required(false)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    builder
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    ServerConfig::from_builder(
      config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert!(cfg.gemini.is_none());
    assert_eq!(cfg.routing, RoutingConfig::default());
  }

  #[test]
  fn nested_sections_are_read() {
    let cfg = parse(
      r#"
        port = 9000
        store_path = "/var/lib/campusdesk.db"

        [gemini]
        api_key = "secret"

        [routing]
        confidence_threshold = 0.5
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/campusdesk.db"));
    let gemini = cfg.gemini.unwrap();
    assert_eq!(gemini.api_key, "secret");
    assert_eq!(gemini.model, "gemini-1.5-flash");
    assert_eq!(cfg.routing.confidence_threshold, 0.5);
    assert_eq!(cfg.routing.top_k, 4);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/cd.db")),
      PathBuf::from(home).join("data/cd.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/cd.db")), PathBuf::from("/abs/cd.db"));
  }
}
