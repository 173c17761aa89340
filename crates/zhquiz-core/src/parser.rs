//! TOML dictionary and rule-file parser.
//!
//! Loads dictionaries into a `DictionaryStore`, compiles the rewrite rule sets
//! into an `AnswerMatcher`, and validates dictionaries for common mistakes.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::QuizConfig;
use crate::matcher::{AnswerMatcher, Rewrite, RuleSet};
use crate::model::{AcceptedForm, DictionaryItem, DictionaryKind, Script};
use crate::store::DictionaryStore;

/// Intermediate TOML structure for dictionary files.
#[derive(Debug, Deserialize)]
struct TomlDictionaryFile {
    #[serde(default)]
    dictionary: Option<TomlDictionaryHeader>,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlDictionaryHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    id: String,
    #[serde(default)]
    chinese: Vec<String>,
    #[serde(default)]
    english: Vec<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlRuleFile {
    #[serde(default)]
    rewrite: Vec<TomlRewrite>,
}

#[derive(Debug, Deserialize)]
struct TomlRewrite {
    pattern: String,
    #[serde(default)]
    replace: String,
}

/// A parsed dictionary file.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub name: String,
    pub kind: DictionaryKind,
    /// Items in file order, duplicates included.
    pub items: Vec<DictionaryItem>,
}

/// Parse a dictionary file.
///
/// `kind` is the kind the caller expects; it may be omitted when the file
/// declares one in its `[dictionary]` header.
pub fn parse_dictionary(path: &Path, kind: Option<DictionaryKind>) -> Result<Dictionary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dictionary: {}", path.display()))?;

    parse_dictionary_str(&content, path, kind)
}

/// Parse a TOML string into a `Dictionary` (useful for testing).
pub fn parse_dictionary_str(
    content: &str,
    source_path: &Path,
    kind: Option<DictionaryKind>,
) -> Result<Dictionary> {
    let parsed: TomlDictionaryFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.dictionary.unwrap_or(TomlDictionaryHeader {
        name: None,
        kind: None,
    });

    let declared = header
        .kind
        .map(|k| k.parse::<DictionaryKind>().map_err(|e| anyhow::anyhow!("{}", e)))
        .transpose()
        .with_context(|| format!("invalid dictionary kind in {}", source_path.display()))?;

    let kind = match (declared, kind) {
        (Some(declared), Some(expected)) if declared != expected => anyhow::bail!(
            "{} declares kind '{declared}' but is configured as the {expected} dictionary",
            source_path.display()
        ),
        (Some(k), _) | (None, Some(k)) => k,
        (None, None) => anyhow::bail!(
            "{} does not declare a dictionary kind",
            source_path.display()
        ),
    };

    let items = parsed
        .items
        .into_iter()
        .map(|raw| {
            let chinese = parse_forms(&raw.chinese, Script::Chinese)
                .with_context(|| format!("item '{}': invalid chinese pattern", raw.id))?;
            let english = parse_forms(&raw.english, Script::English)
                .with_context(|| format!("item '{}': invalid english pattern", raw.id))?;
            Ok(DictionaryItem {
                id: raw.id,
                kind,
                chinese,
                english,
                note: raw.note.filter(|n| !n.trim().is_empty()),
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("in {}", source_path.display()))?;

    let name = header.name.unwrap_or_else(|| {
        source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| kind.to_string())
    });

    Ok(Dictionary { name, kind, items })
}

fn parse_forms(raw: &[String], script: Script) -> Result<Vec<AcceptedForm>> {
    raw.iter()
        .filter(|r| !r.trim().is_empty())
        .map(|r| AcceptedForm::parse(r, script).with_context(|| format!("pattern {r}")))
        .collect()
}

/// Load the dictionaries for `kinds` into one store.
pub fn load_store(config: &QuizConfig, kinds: &BTreeSet<DictionaryKind>) -> Result<DictionaryStore> {
    let mut store = DictionaryStore::new();

    for &kind in kinds {
        let path = config.dictionary_path(kind);
        let dictionary = parse_dictionary(&path, Some(kind))?;
        let total = dictionary.items.len();
        let mut loaded = 0usize;
        for item in dictionary.items {
            let id = item.id.clone();
            if store.insert(item) {
                loaded += 1;
            } else {
                tracing::warn!("{}: skipping duplicate item '{}'", path.display(), id);
            }
        }
        tracing::debug!("loaded {loaded}/{total} {kind} items from {}", path.display());
    }

    Ok(store)
}

/// Parse a single rule file into a `RuleSet`.
pub fn parse_rule_set(path: &Path) -> Result<RuleSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file: {}", path.display()))?;

    parse_rule_set_str(&content, path)
}

/// Parse a TOML string into a `RuleSet` (useful for testing).
pub fn parse_rule_set_str(content: &str, source_path: &Path) -> Result<RuleSet> {
    let parsed: TomlRuleFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let rewrites = parsed
        .rewrite
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            Rewrite::new(&r.pattern, r.replace).with_context(|| {
                format!(
                    "rule {} in {}: invalid pattern {}",
                    i + 1,
                    source_path.display(),
                    r.pattern
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RuleSet::new(rewrites))
}

/// Compile both rule sets named by the config into an `AnswerMatcher`.
///
/// A missing rule file means no rewrites for that script.
pub fn load_matcher(config: &QuizConfig) -> Result<AnswerMatcher> {
    let load = |script: Script| -> Result<RuleSet> {
        let path = config.rules_path(script);
        if !path.exists() {
            tracing::warn!(
                "{script} rule file {} not found, using exact matching only",
                path.display()
            );
            return Ok(RuleSet::default());
        }
        let rules = parse_rule_set(&path)?;
        tracing::debug!("loaded {} {script} rewrite rules", rules.len());
        Ok(rules)
    };

    Ok(AnswerMatcher::new(
        load(Script::Chinese)?,
        load(Script::English)?,
    ))
}

/// A warning from dictionary validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a dictionary for common issues.
pub fn validate_dictionary(dictionary: &Dictionary) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if dictionary.items.is_empty() {
        warnings.push(ValidationWarning {
            item_id: None,
            message: "dictionary has no items".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for item in &dictionary.items {
        if !seen_ids.insert(&item.id) {
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message: format!("duplicate item ID: {}", item.id),
            });
        }
    }

    for item in &dictionary.items {
        for script in [Script::Chinese, Script::English] {
            let forms = item.forms(script);
            let message = if forms.is_empty() {
                format!("no {script} forms; item is never asked")
            } else if item.literals(script).is_empty() {
                format!("{script} side has only patterns; item cannot be prompted in {script}")
            } else {
                continue;
            };
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message,
            });
        }
    }

    warnings
}
