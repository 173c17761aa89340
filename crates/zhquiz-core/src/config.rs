//! Quiz configuration.
//!
//! Assembled once at startup from `zhquiz.toml` (or defaults) and passed down
//! explicitly; nothing in the session reads file locations from elsewhere.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Direction, DictionaryKind, Limit, Script};

/// Dictionary file locations, one per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryPaths {
    #[serde(default = "default_word_dict")]
    pub word: PathBuf,
    #[serde(default = "default_char_dict")]
    pub character: PathBuf,
    #[serde(default = "default_grammar_list")]
    pub grammar: PathBuf,
}

impl DictionaryPaths {
    pub fn get(&self, kind: DictionaryKind) -> &Path {
        match kind {
            DictionaryKind::Word => &self.word,
            DictionaryKind::Character => &self.character,
            DictionaryKind::Grammar => &self.grammar,
        }
    }
}

impl Default for DictionaryPaths {
    fn default() -> Self {
        Self {
            word: default_word_dict(),
            character: default_char_dict(),
            grammar: default_grammar_list(),
        }
    }
}

/// Top-level zhquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub dictionaries: DictionaryPaths,
    /// Append-only result log.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Rewrite rules for Chinese-script answers.
    #[serde(default = "default_chinese_rules")]
    pub chinese_rules: PathBuf,
    /// Rewrite rules for English-script answers.
    #[serde(default = "default_english_rules")]
    pub english_rules: PathBuf,
    #[serde(default = "default_direction")]
    pub default_direction: String,
    #[serde(default = "default_limit")]
    pub default_limit: String,
    /// Print correct/incorrect after every answer.
    #[serde(default = "default_true")]
    pub feedback: bool,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_word_dict() -> PathBuf {
    PathBuf::from("chinese.toml")
}
fn default_char_dict() -> PathBuf {
    PathBuf::from("characters.toml")
}
fn default_grammar_list() -> PathBuf {
    PathBuf::from("grammar.toml")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("chinese.log")
}
fn default_chinese_rules() -> PathBuf {
    PathBuf::from("chinese.reg")
}
fn default_english_rules() -> PathBuf {
    PathBuf::from("english.reg")
}
fn default_direction() -> String {
    "chinese-to-english".to_string()
}
fn default_limit() -> String {
    "unbounded".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            dictionaries: DictionaryPaths::default(),
            log_file: default_log_file(),
            chinese_rules: default_chinese_rules(),
            english_rules: default_english_rules(),
            default_direction: default_direction(),
            default_limit: default_limit(),
            feedback: true,
            base_dir: PathBuf::from("."),
        }
    }
}

impl QuizConfig {
    /// Resolve a configured path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = PathBuf::from(resolve_env_vars(&path.to_string_lossy()));
        if expanded.is_absolute() {
            expanded
        } else {
            self.base_dir.join(expanded)
        }
    }

    pub fn dictionary_path(&self, kind: DictionaryKind) -> PathBuf {
        self.resolve(self.dictionaries.get(kind))
    }

    pub fn rules_path(&self, script: Script) -> PathBuf {
        match script {
            Script::Chinese => self.resolve(&self.chinese_rules),
            Script::English => self.resolve(&self.english_rules),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.log_file)
    }

    pub fn direction(&self) -> Result<Direction> {
        self.default_direction
            .parse()
            .map_err(|e: String| anyhow::anyhow!("invalid default_direction: {e}"))
    }

    pub fn limit(&self) -> Result<Limit> {
        self.default_limit
            .parse()
            .map_err(|e: String| anyhow::anyhow!("invalid default_limit: {e}"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        // Substituted text is never expanded again.
        from = start + value.len();
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `zhquiz.toml` in the current directory
/// 2. `~/.config/zhquiz/config.toml`
///
/// `ZHQUIZ_LOG_FILE` overrides the log location.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("zhquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let mut config = toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            config.base_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            config
        }
        None => QuizConfig::default(),
    };

    if let Ok(log) = std::env::var("ZHQUIZ_LOG_FILE") {
        config.log_file = PathBuf::from(log);
    }

    match &config_path {
        Some(path) => tracing::debug!("loaded configuration from {}", path.display()),
        None => tracing::debug!("no config file found, using defaults"),
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("zhquiz"))
}
