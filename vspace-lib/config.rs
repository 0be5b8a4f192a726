use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid virtual space config: {0}")]
  BadConfig(#[from] toml::de::Error),
}

/// Engine settings.
///
/// Deserialized from the `[virtual-space]` table of the editor's config; the
/// editor owns loading and merging of the files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
  /// Tell the user when a document is saved while padding is present.
  pub notify_on_save:          bool,
  /// Tell the user once when a wrapping indent mode cannot be emulated.
  pub advise_unsupported_wrap: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      notify_on_save:          true,
      advise_unsupported_wrap: true,
    }
  }
}

impl Config {
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_config_uses_defaults() {
    assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
  }

  #[test]
  fn kebab_case_keys() {
    let config = Config::from_toml_str("notify-on-save = false").unwrap();
    assert!(!config.notify_on_save);
    assert!(config.advise_unsupported_wrap);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(matches!(
      Config::from_toml_str("multi-cursor = true"),
      Err(ConfigError::BadConfig(_))
    ));
  }
}
