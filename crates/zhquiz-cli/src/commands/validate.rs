//! The `zhquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use zhquiz_core::model::DictionaryKind;
use zhquiz_core::parser;

pub fn execute(dictionary_path: PathBuf, kind: Option<String>) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<DictionaryKind>().map_err(|e| anyhow::anyhow!("{e}")))
        .transpose()?;
    let dictionary = parser::parse_dictionary(&dictionary_path, kind)?;

    println!(
        "Dictionary: {} ({} {} items)",
        dictionary.name,
        dictionary.items.len(),
        dictionary.kind
    );

    let warnings = parser::validate_dictionary(&dictionary);
    for w in &warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dictionary valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
