//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/staticfs-gen/staticfs-gen.toml`
//! 3. Local config: `--config <file>`, or `./.staticfs-gen.toml` when present
//! 4. Environment variables: `STATICFS_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{EmitOptions, EntryOrder};
use crate::util::path::expand_env_vars;

/// File name of the local config looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".staticfs-gen.toml";

/// Emission framing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmitConfig {
    /// Headers for the include block (e.g., ["vfs.h"])
    pub includes: Vec<String>,
    /// Return type of every handler
    pub handler_return_type: String,
    /// Parameter list of every handler
    pub handler_params: String,
    /// Symbol the root directory is exposed under
    pub root_symbol: String,
    /// C type of the root symbol
    pub root_type: String,
    /// Entry order inside a directory record
    pub order: EntryOrder,
}

impl Default for EmitConfig {
    fn default() -> Self {
        let defaults = EmitOptions::default();
        Self {
            includes: defaults.includes,
            handler_return_type: defaults.handler_return_type,
            handler_params: defaults.handler_params,
            root_symbol: defaults.root_symbol,
            root_type: defaults.root_type,
            order: defaults.order,
        }
    }
}

/// Raw emit config for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawEmitConfig {
    pub includes: Option<Vec<String>>,
    pub handler_return_type: Option<String>,
    pub handler_params: Option<String>,
    pub root_symbol: Option<String>,
    pub root_type: Option<String>,
    pub order: Option<EntryOrder>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub manifest_extension: Option<String>,
    #[serde(default)]
    pub emit: RawEmitConfig,
}

impl EmitConfig {
    /// Merge include lists: ordered union with negation support.
    ///
    /// - Items from overlay are appended after the base items
    /// - Items prefixed with `!` remove the corresponding item
    /// - Duplicates are dropped, first occurrence wins
    ///
    /// # Examples
    /// ```ignore
    /// merge_includes(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_includes(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_includes(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for item in base.iter().chain(overlay.iter().filter(|o| !o.starts_with('!'))) {
            if !result.contains(item) {
                result.push(item.clone());
            }
        }
        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.retain(|item| item != negated);
            }
        }
        result
    }

    /// Overlay wins for scalars; includes use `merge_includes`.
    pub fn merge(&self, overlay: &RawEmitConfig) -> Self {
        let mut merged = self.apply_scalars(overlay);
        if let Some(includes) = &overlay.includes {
            merged.includes = Self::merge_includes(&self.includes, includes);
        }
        merged
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge()`, a global include list REPLACES the default one.
    pub fn apply_global(&self, global: &RawEmitConfig) -> Self {
        let mut merged = self.apply_scalars(global);
        if let Some(includes) = &global.includes {
            merged.includes = includes.clone();
        }
        merged
    }

    fn apply_scalars(&self, overlay: &RawEmitConfig) -> Self {
        Self {
            includes: self.includes.clone(),
            handler_return_type: overlay
                .handler_return_type
                .clone()
                .unwrap_or_else(|| self.handler_return_type.clone()),
            handler_params: overlay
                .handler_params
                .clone()
                .unwrap_or_else(|| self.handler_params.clone()),
            root_symbol: overlay
                .root_symbol
                .clone()
                .unwrap_or_else(|| self.root_symbol.clone()),
            root_type: overlay
                .root_type
                .clone()
                .unwrap_or_else(|| self.root_type.clone()),
            order: overlay.order.unwrap_or(self.order),
        }
    }

    /// Options handed to the emitter.
    pub fn to_options(&self) -> EmitOptions {
        EmitOptions {
            includes: self.includes.clone(),
            handler_return_type: self.handler_return_type.clone(),
            handler_params: self.handler_params.clone(),
            root_symbol: self.root_symbol.clone(),
            root_type: self.root_type.clone(),
            order: self.order,
        }
    }
}

/// Unified configuration for staticfs-gen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Extension of manifests picked up from directory sources (default: "fs")
    pub manifest_extension: String,
    /// Generated file framing
    pub emit: EmitConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest_extension: "fs".into(),
            emit: EmitConfig::default(),
        }
    }
}

/// Get the XDG config directory for staticfs-gen.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "staticfs-gen").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("staticfs-gen.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            manifest_extension: overlay
                .manifest_extension
                .clone()
                .unwrap_or_else(|| self.manifest_extension.clone()),
            emit: self.emit.merge(&overlay.emit),
        }
    }

    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            manifest_extension: global
                .manifest_extension
                .clone()
                .unwrap_or_else(|| self.manifest_extension.clone()),
            emit: self.emit.apply_global(&global.emit),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file (`~` and `$VAR` are expanded).
    ///   When `None`, `./.staticfs-gen.toml` is used if it exists.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = match local {
            Some(path) => {
                let expanded = PathBuf::from(expand_env_vars(&path.to_string_lossy()));
                if !expanded.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", expanded.display()),
                    });
                }
                Some(expanded)
            }
            None => Some(PathBuf::from(LOCAL_CONFIG_FILE)).filter(|p| p.exists()),
        };
        Self::load_layers(global.as_deref(), local.as_deref())
    }

    /// Load settings from explicit global and local files, then env overrides.
    ///
    /// # Merge Semantics
    /// - Defaults → Global: includes REPLACE
    /// - Global → Local: includes UNION with `!name` removal
    /// - Any → Env vars: REPLACE
    pub fn load_layers(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            debug!("loading global config {}", global_path.display());
            let raw = load_raw_settings(global_path)?;
            current = current.apply_global(&raw);
        }

        if let Some(local_path) = local {
            debug!("loading local config {}", local_path.display());
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Apply STATICFS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("STATICFS")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("emit.includes")
                .try_parsing(false),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("manifest_extension") {
            settings.manifest_extension = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("emit.includes") {
            settings.emit.includes = val;
        }
        if let Ok(val) = config.get_string("emit.handler_return_type") {
            settings.emit.handler_return_type = val;
        }
        if let Ok(val) = config.get_string("emit.handler_params") {
            settings.emit.handler_params = val;
        }
        if let Ok(val) = config.get_string("emit.root_symbol") {
            settings.emit.root_symbol = val;
        }
        if let Ok(val) = config.get_string("emit.root_type") {
            settings.emit.root_type = val;
        }
        if let Ok(val) = config.get_string("emit.order") {
            settings.emit.order = parse_order(&val)?;
        }

        Ok(settings)
    }

    /// Reject values that would produce uncompilable output.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| {
            ApplicationError::Config {
                message: e.to_string(),
            }
        })?;

        for (key, value) in [
            ("emit.root_symbol", &self.emit.root_symbol),
            ("emit.root_type", &self.emit.root_type),
        ] {
            if !identifier.is_match(value) {
                return Err(ApplicationError::Config {
                    message: format!("{key} must be a C identifier, got '{value}'"),
                });
            }
        }
        if self.emit.handler_return_type.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "emit.handler_return_type must not be empty".into(),
            });
        }
        if self.manifest_extension.is_empty() || self.manifest_extension.contains('.') {
            return Err(ApplicationError::Config {
                message: format!(
                    "manifest_extension must be a bare extension, got '{}'",
                    self.manifest_extension
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# staticfs-gen configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/staticfs-gen/staticfs-gen.toml
#   Local:  ./.staticfs-gen.toml or --config <file>
#   Env:    STATICFS_* environment variables (e.g. STATICFS_EMIT__ORDER=sorted)
#
# Local `includes` are merged with the global list; "!name" removes one.

# Extension of manifests found in directory sources
# manifest_extension = "fs"

[emit]
# includes = ["vfs.h"]
# handler_return_type = "int"
# handler_params = "int argc, const char** argv"
# root_symbol = "staticfs_root"
# root_type = "vnode_t"
# Entry order inside a directory: "insertion" or "sorted"
# order = "insertion"
"#
        .to_string()
    }
}

fn parse_order(value: &str) -> Result<EntryOrder, ApplicationError> {
    match value.to_ascii_lowercase().as_str() {
        "insertion" => Ok(EntryOrder::Insertion),
        "sorted" => Ok(EntryOrder::Sorted),
        other => Err(ApplicationError::Config {
            message: format!("unknown entry order '{other}' (expected insertion or sorted)"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_layers_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None).expect("load defaults");
        assert_eq!(settings.manifest_extension, "fs");
        assert_eq!(settings.emit.includes, vec!["vfs.h".to_string()]);
        assert_eq!(settings.emit.to_options(), EmitOptions::default());
    }

    #[test]
    fn given_negated_include_when_merging_then_removes_it() {
        let base = vec!["vfs.h".to_string(), "stdint.h".to_string()];
        let overlay = vec!["!vfs.h".to_string(), "board.h".to_string()];
        assert_eq!(
            EmitConfig::merge_includes(&base, &overlay),
            vec!["stdint.h".to_string(), "board.h".to_string()]
        );
    }

    #[test]
    fn given_invalid_root_symbol_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.emit.root_symbol = "static-root".into();
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_order_names_when_parsing_then_case_insensitive() {
        assert_eq!(parse_order("Sorted").unwrap(), EntryOrder::Sorted);
        assert_eq!(parse_order("insertion").unwrap(), EntryOrder::Insertion);
        assert!(parse_order("random").is_err());
    }

    #[test]
    fn given_default_settings_when_to_toml_then_roundtrips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("order = \"insertion\""));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
