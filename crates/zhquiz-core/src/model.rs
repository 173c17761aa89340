//! Core data model types for zhquiz.
//!
//! Dictionary items, the two scripts an item is written in, and the resolved
//! session `Mode` that says what to study and how.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The category a study item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryKind {
    Word,
    Character,
    Grammar,
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryKind::Word => write!(f, "word"),
            DictionaryKind::Character => write!(f, "character"),
            DictionaryKind::Grammar => write!(f, "grammar"),
        }
    }
}

impl FromStr for DictionaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word" | "words" => Ok(DictionaryKind::Word),
            "character" | "characters" | "char" | "chars" => Ok(DictionaryKind::Character),
            "grammar" => Ok(DictionaryKind::Grammar),
            other => Err(format!("unknown dictionary kind: {other}")),
        }
    }
}

/// Parse a comma-separated list of dictionary kinds (e.g. "word,grammar").
pub fn parse_kinds(s: &str) -> Result<BTreeSet<DictionaryKind>, String> {
    let kinds = s
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect::<Result<BTreeSet<_>, _>>()?;
    if kinds.is_empty() {
        return Err("at least one dictionary kind is required".to_string());
    }
    Ok(kinds)
}

/// Which writing system a piece of text is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Chinese,
    English,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Script::Chinese => write!(f, "chinese"),
            Script::English => write!(f, "english"),
        }
    }
}

/// Which side of an item is shown and which side must be typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    ChineseToEnglish,
    EnglishToChinese,
}

impl Direction {
    /// The script shown to the user.
    pub fn prompt_script(self) -> Script {
        match self {
            Direction::ChineseToEnglish => Script::Chinese,
            Direction::EnglishToChinese => Script::English,
        }
    }

    /// The script the user answers in.
    pub fn answer_script(self) -> Script {
        match self {
            Direction::ChineseToEnglish => Script::English,
            Direction::EnglishToChinese => Script::Chinese,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ChineseToEnglish => write!(f, "chinese-to-english"),
            Direction::EnglishToChinese => write!(f, "english-to-chinese"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chinese-to-english" | "chinesetoenglish" | "c2e" | "zh-en" => {
                Ok(Direction::ChineseToEnglish)
            }
            "english-to-chinese" | "englishtochinese" | "e2c" | "en-zh" => {
                Ok(Direction::EnglishToChinese)
            }
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// One accepted representation of an item on one side.
///
/// Written in dictionary files either as plain text (a literal) or wrapped in
/// slashes, `/colou?r/`, for a pattern that must match the whole answer.
#[derive(Debug, Clone)]
pub enum AcceptedForm {
    Literal(String),
    Pattern(Regex),
}

impl AcceptedForm {
    /// Parse a raw form. Patterns on the English side are case-insensitive.
    pub fn parse(raw: &str, script: Script) -> Result<Self, regex::Error> {
        let trimmed = raw.trim();
        match trimmed
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(body) if !body.is_empty() => {
                let flags = match script {
                    Script::English => "(?i)",
                    Script::Chinese => "",
                };
                Regex::new(&format!("{flags}^(?:{body})$")).map(AcceptedForm::Pattern)
            }
            _ => Ok(AcceptedForm::Literal(trimmed.to_string())),
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            AcceptedForm::Literal(text) => Some(text),
            AcceptedForm::Pattern(_) => None,
        }
    }
}

/// A single study item from one of the dictionaries.
#[derive(Debug, Clone)]
pub struct DictionaryItem {
    /// Identifier, unique within its dictionary.
    pub id: String,
    pub kind: DictionaryKind,
    pub chinese: Vec<AcceptedForm>,
    pub english: Vec<AcceptedForm>,
    /// Free-form hint shown alongside feedback (e.g. pinyin).
    pub note: Option<String>,
}

impl DictionaryItem {
    /// Accepted forms for one side.
    pub fn forms(&self, script: Script) -> &[AcceptedForm] {
        match script {
            Script::Chinese => &self.chinese,
            Script::English => &self.english,
        }
    }

    /// Literal forms for one side, in dictionary order.
    pub fn literals(&self, script: Script) -> Vec<&str> {
        self.forms(script)
            .iter()
            .filter_map(AcceptedForm::as_literal)
            .collect()
    }

    /// Text to display when this side is the prompt, if it has any literal form.
    pub fn prompt_text(&self, script: Script) -> Option<String> {
        let literals = self.literals(script);
        if literals.is_empty() {
            None
        } else {
            Some(literals.join(" / "))
        }
    }

    /// Whether the item can be asked in `direction`: something to show, something to accept.
    pub fn is_eligible(&self, direction: Direction) -> bool {
        self.prompt_text(direction.prompt_script()).is_some()
            && !self.forms(direction.answer_script()).is_empty()
    }
}

/// How many items a session asks at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unbounded,
    Max(NonZeroUsize),
}

impl Limit {
    pub fn max(self) -> Option<usize> {
        match self {
            Limit::Unbounded => None,
            Limit::Max(n) => Some(n.get()),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unbounded => write!(f, "unbounded"),
            Limit::Max(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for Limit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") || s.eq_ignore_ascii_case("all") {
            return Ok(Limit::Unbounded);
        }
        s.parse::<NonZeroUsize>()
            .map(Limit::Max)
            .map_err(|_| format!("limit must be a positive integer or 'unbounded', got '{s}'"))
    }
}

/// Order in which selected items are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Random permutation drawn from the caller's RNG.
    #[default]
    Shuffled,
    /// By kind, then identifier. No randomness.
    Sorted,
}

/// Resolved session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub kinds: BTreeSet<DictionaryKind>,
    pub direction: Direction,
    pub limit: Limit,
    pub order: Order,
}

impl Mode {
    pub fn new(kinds: BTreeSet<DictionaryKind>, direction: Direction, limit: Limit) -> Self {
        Self {
            kinds,
            direction,
            limit,
            order: Order::Shuffled,
        }
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(chinese: &[&str], english: &[&str]) -> DictionaryItem {
        DictionaryItem {
            id: "w1".into(),
            kind: DictionaryKind::Word,
            chinese: chinese
                .iter()
                .map(|s| AcceptedForm::parse(s, Script::Chinese).unwrap())
                .collect(),
            english: english
                .iter()
                .map(|s| AcceptedForm::parse(s, Script::English).unwrap())
                .collect(),
            note: None,
        }
    }

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(DictionaryKind::Character.to_string(), "character");
        assert_eq!("chars".parse::<DictionaryKind>().unwrap(), DictionaryKind::Character);
        assert_eq!("Words".parse::<DictionaryKind>().unwrap(), DictionaryKind::Word);
        assert!("idioms".parse::<DictionaryKind>().is_err());
    }

    #[test]
    fn parse_kind_list() {
        let kinds = parse_kinds("grammar, word").unwrap();
        assert_eq!(
            kinds.into_iter().collect::<Vec<_>>(),
            vec![DictionaryKind::Word, DictionaryKind::Grammar]
        );
        assert!(parse_kinds("").is_err());
        assert!(parse_kinds("word,nonsense").is_err());
    }

    #[test]
    fn direction_scripts() {
        assert_eq!(Direction::ChineseToEnglish.prompt_script(), Script::Chinese);
        assert_eq!(Direction::ChineseToEnglish.answer_script(), Script::English);
        assert_eq!("e2c".parse::<Direction>().unwrap(), Direction::EnglishToChinese);
        assert_eq!(
            Direction::EnglishToChinese.to_string().parse::<Direction>().unwrap(),
            Direction::EnglishToChinese
        );
    }

    #[test]
    fn limit_parse() {
        assert_eq!("unbounded".parse::<Limit>().unwrap(), Limit::Unbounded);
        assert_eq!("ALL".parse::<Limit>().unwrap(), Limit::Unbounded);
        assert_eq!("5".parse::<Limit>().unwrap().max(), Some(5));
        assert!("0".parse::<Limit>().is_err());
        assert!("-3".parse::<Limit>().is_err());
    }

    #[test]
    fn slashed_form_is_pattern() {
        assert!(matches!(
            AcceptedForm::parse("/colou?r/", Script::English).unwrap(),
            AcceptedForm::Pattern(_)
        ));
        assert!(matches!(
            AcceptedForm::parse("and/or", Script::English).unwrap(),
            AcceptedForm::Literal(_)
        ));
        assert!(matches!(
            AcceptedForm::parse("//", Script::English).unwrap(),
            AcceptedForm::Literal(_)
        ));
        assert!(AcceptedForm::parse("/(unclosed/", Script::English).is_err());
    }

    #[test]
    fn eligibility_requires_prompt_literal_and_answer() {
        let full = item(&["你好"], &["hello"]);
        assert!(full.is_eligible(Direction::ChineseToEnglish));
        assert!(full.is_eligible(Direction::EnglishToChinese));

        let no_english = item(&["你好"], &[]);
        assert!(!no_english.is_eligible(Direction::ChineseToEnglish));
        assert!(!no_english.is_eligible(Direction::EnglishToChinese));

        let pattern_only = item(&["你好"], &["/hi+/"]);
        assert!(pattern_only.is_eligible(Direction::ChineseToEnglish));
        assert!(!pattern_only.is_eligible(Direction::EnglishToChinese));
    }

    #[test]
    fn prompt_text_joins_literals() {
        let it = item(&["你好", "您好"], &["hello", "/hi+/"]);
        assert_eq!(it.prompt_text(Script::Chinese).unwrap(), "你好 / 您好");
        assert_eq!(it.prompt_text(Script::English).unwrap(), "hello");
    }
}
