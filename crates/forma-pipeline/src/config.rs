//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `FORMA_MAX_DEPTH`, `FORMA_NODE_BUDGET`, `FORMA_CHUNK_SIZE`
//! 2. Project-local: `.forma/config.toml`
//! 3. Global: `~/.forma/config.toml`
//!
//! Files are merged table by table before deserializing, so a project file
//! only needs the keys it changes.

use crate::score::ScoringConfig;
use forma_constraint::{FixerConfig, ValidationConfig};
use forma_core::{FormaError, Result};
use forma_gen::QueueConfig;
use forma_render::RenderConfig;
use forma_resolve::ResolverConfig;
use forma_tokens::MatchThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml::Table;

/// Resolved configuration for one pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormaConfig {
    pub validation: ValidationConfig,
    pub scoring: ScoringConfig,
    pub resolver: ResolverConfig,
    pub tokens: MatchThresholds,
    pub fixer: FixerConfig,
    pub render: RenderConfig,
    pub generation: QueueConfig,
}

impl FormaConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(global_path) = Self::global_config_path() {
            layers.push(global_path);
        }
        layers.push(PathBuf::from(".forma/config.toml"));
        Self::load_layers(&layers)
    }

    /// Merge the given files in order (later wins), then apply env overrides.
    /// Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = Table::new();
        for path in paths.iter().filter(|p| p.exists()) {
            let layer = Self::load_table(path)?;
            merge_tables(&mut merged, layer);
        }

        let mut config: FormaConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| FormaError::Config(e.to_string()))?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FormaError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::load_layers(&[path.to_path_buf()])
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".forma").join("config.toml"))
    }

    fn load_table(path: &Path) -> Result<Table> {
        let content = std::fs::read_to_string(path)?;
        content.parse::<Table>().map_err(|e| {
            FormaError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(depth) = env_usize("FORMA_MAX_DEPTH")? {
            self.validation.max_depth = depth;
        }
        if let Some(budget) = env_usize("FORMA_NODE_BUDGET")? {
            self.render.node_budget = budget;
        }
        if let Some(chunk) = env_usize("FORMA_CHUNK_SIZE")? {
            self.render.chunk_size = chunk;
        }
        Ok(())
    }
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| {
                FormaError::Config(format!("{} must be a positive integer, got '{}'", name, value))
            }),
        Err(_) => Ok(None),
    }
}

/// Recursive merge; scalar and array values in `overlay` replace `base`
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                    continue;
                }
                base.insert(key, toml::Value::Table(incoming));
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("forma_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_config_from_file() {
        let config_str = r#"
[scoring]
auto_apply_threshold = 0.95

[resolver]
fallback_candidates = 3

[tokens]
color = 6.5

[fixer]
root_width = 1280.0

[generation]
max_retries = 5
"#;
        let path = temp_config(config_str);
        let config = FormaConfig::load_from_file(&path).unwrap();

        assert_eq!(config.scoring.auto_apply_threshold, 0.95);
        assert_eq!(config.scoring.preview_threshold, 0.6);
        assert_eq!(config.resolver.fallback_candidates, 3);
        assert_eq!(config.tokens.color, 6.5);
        assert_eq!(config.tokens.spacing, MatchThresholds::default().spacing);
        assert_eq!(config.fixer.root_width, 1280.0);
        assert_eq!(config.generation.max_retries, 5);
        assert_eq!(config.render.font_family, "Inter");

        cleanup(&path);
    }

    #[test]
    fn test_project_layer_overrides_global() {
        let global = temp_config(
            r#"
[render]
font_family = "Roboto"
chunk_size = 25

[scoring]
preview_threshold = 0.5
"#,
        );
        let project = temp_config(
            r#"
[render]
font_family = "Inter Display"
"#,
        );

        let config = FormaConfig::load_layers(&[global.clone(), project.clone()]).unwrap();
        assert_eq!(config.render.font_family, "Inter Display");
        assert_eq!(config.render.chunk_size, 25);
        assert_eq!(config.scoring.preview_threshold, 0.5);

        cleanup(&global);
        cleanup(&project);
    }

    #[test]
    fn test_env_var_override() {
        let path = temp_config("[validation]\nmax_depth = 4\n");

        std::env::set_var("FORMA_MAX_DEPTH", "12");
        let config = FormaConfig::load_from_file(&path);
        std::env::remove_var("FORMA_MAX_DEPTH");

        assert_eq!(config.unwrap().validation.max_depth, 12);
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let path = temp_config("[render\nchunk_size = ");
        let err = FormaConfig::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), forma_core::ErrorKind::Config);
        cleanup(&path);
    }

    #[test]
    fn test_missing_layers_use_defaults() {
        let missing = std::env::temp_dir()
            .join(format!("forma_missing_{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let config = FormaConfig::load_layers(&[missing]).unwrap();
        assert_eq!(config.render.font_family, "Inter");
        assert_eq!(config.fixer, FixerConfig::default());
    }
}
