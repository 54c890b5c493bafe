use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn path_env_or(var: &str, default: &str) -> PathBuf {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub analysis: AnalysisConfig,
    pub repo_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub staging_dir: PathBuf,
    pub output_path: PathBuf,
    /// Used when the parent directory of `output_path` does not exist.
    pub fallback_output_path: PathBuf,
    pub max_sheet_rows: usize,
}

/// Settings for the downstream analysis step that consumes the extraction output.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub prompts_dir: PathBuf,
    pub analyzer_bin: String,
    pub model: String,
    /// Short model names resolved to full model ids before invoking the tool.
    pub model_aliases: HashMap<String, String>,
    pub max_turns: u32,
}

impl AnalysisConfig {
    /// Full model id for `name`; unknown names pass through unchanged.
    pub fn resolve_model(&self, name: &str) -> String {
        self.model_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

pub fn default_model_aliases() -> HashMap<String, String> {
    HashMap::from([
        ("opus".to_string(), "claude-opus-4-6".to_string()),
        ("sonnet".to_string(), "claude-sonnet-4-5-20250929".to_string()),
    ])
}

/// `alias=model-id` pairs separated by commas, layered over the defaults.
fn model_aliases_from_env(var: &str) -> HashMap<String, String> {
    let mut aliases = default_model_aliases();
    if let Ok(value) = env::var(var) {
        for pair in value.split(',').filter(|p| !p.trim().is_empty()) {
            match pair.split_once('=') {
                Some((alias, id)) if !alias.trim().is_empty() && !id.trim().is_empty() => {
                    aliases.insert(alias.trim().to_string(), id.trim().to_string());
                }
                _ => tracing::warn!("Invalid model alias '{}' in {}. Ignoring.", pair, var),
            }
        }
    }
    aliases
}

pub const DEFAULT_STAGING_DIR: &str = "00_inbox";
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/extracted_texts.json";
pub const DEFAULT_FALLBACK_OUTPUT_PATH: &str = "extracted_texts.json";
pub const DEFAULT_MAX_SHEET_ROWS: usize = 500;

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            fallback_output_path: PathBuf::from(DEFAULT_FALLBACK_OUTPUT_PATH),
            max_sheet_rows: DEFAULT_MAX_SHEET_ROWS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig {
                staging_dir: path_env_or("INBOX_DIR", DEFAULT_STAGING_DIR),
                output_path: path_env_or("INBOX_OUTPUT_PATH", DEFAULT_OUTPUT_PATH),
                fallback_output_path: path_env_or(
                    "INBOX_FALLBACK_OUTPUT_PATH",
                    DEFAULT_FALLBACK_OUTPUT_PATH,
                ),
                max_sheet_rows: parse_env_or("INBOX_MAX_SHEET_ROWS", DEFAULT_MAX_SHEET_ROWS),
            },
            analysis: AnalysisConfig {
                prompts_dir: path_env_or("INBOX_PROMPTS_DIR", "scripts/prompts"),
                analyzer_bin: env::var("INBOX_ANALYZER_BIN")
                    .unwrap_or_else(|_| "claude".to_string()),
                model: env::var("INBOX_MODEL").unwrap_or_else(|_| "opus".to_string()),
                model_aliases: model_aliases_from_env("INBOX_MODEL_ALIASES"),
                max_turns: parse_env_or("INBOX_MAX_TURNS", 30),
            },
            repo_root: path_env_or("INBOX_REPO_ROOT", "."),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Staging directory resolved against the repository root.
    pub fn staging_dir(&self) -> PathBuf {
        self.repo_root.join(&self.extraction.staging_dir)
    }
}
