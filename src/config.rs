use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use uds_design_tokens_core::{DocumentSelection, Result, TokenError};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "uds-tokens.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub css: CssConfig,
    pub tailwind: TailwindConfig,
    pub validate: ValidateConfig,
    pub figma: FigmaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub dir: PathBuf,
    pub suffix: String,
    pub load_order: Vec<String>,
    pub variant_markers: Vec<String>,
    pub always_include: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CssConfig {
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TailwindConfig {
    pub output_dir: PathBuf,
    pub primitives: String,
    pub core: String,
    pub reserved_namespaces: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateConfig {
    pub preview_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FigmaConfig {
    pub response: PathBuf,
}

impl Config {
    /// Built-in defaults with the user file, if any, merged on top. An
    /// explicit path must exist; the implicit `uds-tokens.toml` may not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let user = match path {
            Some(path) => Some(read_table(path)?),
            None if Path::new(CONFIG_FILE).exists() => Some(read_table(Path::new(CONFIG_FILE))?),
            None => None,
        };
        Self::from_overrides(user)
    }

    /// The built-in defaults alone.
    pub fn defaults() -> Result<Self> {
        Self::from_overrides(None)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Self::from_overrides(Some(parse_table(text)?))
    }

    fn from_overrides(user: Option<toml::Table>) -> Result<Self> {
        let mut table = parse_table(DEFAULT_CONFIG)?;
        if let Some(user) = user {
            merge_tables(&mut table, user);
        }
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| TokenError::Config(e.to_string()))
    }

    pub fn selection(&self) -> DocumentSelection {
        DocumentSelection {
            suffix: self.input.suffix.clone(),
            load_order: self.input.load_order.clone(),
            variant_markers: self.input.variant_markers.clone(),
            always_include: self.input.always_include.clone(),
        }
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    debug!(path = %path.display(), "reading config");
    let text = std::fs::read_to_string(path).map_err(|source| TokenError::io(path, source))?;
    parse_table(&text)
}

fn parse_table(text: &str) -> Result<toml::Table> {
    toml::from_str(text).map_err(|e: toml::de::Error| TokenError::Config(e.to_string()))
}

/// Tables merge key by key; any other value replaces what was there.
fn merge_tables(target: &mut toml::Table, source: toml::Table) {
    for (key, value) in source {
        match value {
            toml::Value::Table(incoming) => match target.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    target.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_parses() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.input.dir, PathBuf::from("tokens"));
        assert_eq!(config.validate.preview_limit, 10);
        assert_eq!(config.selection(), DocumentSelection::default());
    }

    #[test]
    fn user_values_merge_over_defaults() {
        let config = Config::from_toml(
            r#"
            [input]
            dir = "design/tokens"

            [tailwind]
            reserved_namespaces = ["system"]
            "#,
        )
        .unwrap();
        assert_eq!(config.input.dir, PathBuf::from("design/tokens"));
        assert_eq!(config.input.suffix, ".tokens.json");
        assert_eq!(config.tailwind.reserved_namespaces, vec!["system".to_string()]);
        assert_eq!(config.css.output, PathBuf::from("src/styles/tokens.css"));
    }

    #[test]
    fn wrong_types_are_config_errors() {
        let err = Config::from_toml("[validate]\npreview_limit = \"many\"").unwrap_err();
        assert!(matches!(err, TokenError::Config(_)));
    }
}
