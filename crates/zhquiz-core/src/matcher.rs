//! Answer grading.
//!
//! A submission is normalised, rewritten by the script's rule set, and then
//! compared with each accepted form of the item. Rule sets are compiled once
//! at startup and never change afterwards.

use regex::Regex;

use crate::model::{AcceptedForm, Script};

/// One regex rewrite applied during normalisation.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pattern: Regex,
    replacement: String,
}

impl Rewrite {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }
}

/// Ordered rewrites that collapse spelling variants to one canonical text.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rewrites: Vec<Rewrite>,
}

impl RuleSet {
    pub fn new(rewrites: Vec<Rewrite>) -> Self {
        Self { rewrites }
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }

    /// Apply every rewrite in order.
    pub fn apply(&self, text: &str) -> String {
        self.rewrites.iter().fold(text.to_string(), |acc, rule| {
            rule.pattern
                .replace_all(&acc, rule.replacement.as_str())
                .into_owned()
        })
    }
}

/// Grades typed answers against accepted forms.
#[derive(Debug, Clone, Default)]
pub struct AnswerMatcher {
    chinese: RuleSet,
    english: RuleSet,
}

impl AnswerMatcher {
    pub fn new(chinese: RuleSet, english: RuleSet) -> Self {
        Self { chinese, english }
    }

    fn rules(&self, script: Script) -> &RuleSet {
        match script {
            Script::Chinese => &self.chinese,
            Script::English => &self.english,
        }
    }

    /// Whether `submitted` is one of the accepted forms.
    ///
    /// Empty (or whitespace-only) submissions never match.
    pub fn matches(&self, submitted: &str, accepted: &[AcceptedForm], script: Script) -> bool {
        let base = base_normalize(submitted, script);
        if base.is_empty() {
            return false;
        }
        let canonical = self.canonicalize(&base, script);

        accepted.iter().any(|form| match form {
            AcceptedForm::Literal(text) => {
                let expected = self.canonicalize(&base_normalize(text, script), script);
                !expected.is_empty() && expected == canonical
            }
            AcceptedForm::Pattern(re) => re.is_match(&base) || re.is_match(&canonical),
        })
    }

    /// The text a submission is compared as, after all normalisation.
    pub fn normalize(&self, text: &str, script: Script) -> String {
        self.canonicalize(&base_normalize(text, script), script)
    }

    fn canonicalize(&self, base: &str, script: Script) -> String {
        let rules = self.rules(script);
        if rules.is_empty() {
            return base.to_string();
        }
        let rewritten = rules.apply(base);
        match script {
            Script::English => collapse_whitespace(&rewritten),
            Script::Chinese => rewritten.trim().to_string(),
        }
    }
}

/// Trim; on the English side also lowercase and collapse inner whitespace.
fn base_normalize(text: &str, script: Script) -> String {
    match script {
        Script::Chinese => text.trim().to_string(),
        Script::English => collapse_whitespace(text).to_lowercase(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(raw: &[&str], script: Script) -> Vec<AcceptedForm> {
        raw.iter()
            .map(|r| AcceptedForm::parse(r, script).unwrap())
            .collect()
    }

    fn english_rules() -> RuleSet {
        RuleSet::new(vec![
            Rewrite::new(r"^(to|the|a|an)\s+", "").unwrap(),
            Rewrite::new(r"[.!?]+$", "").unwrap(),
        ])
    }

    #[test]
    fn empty_submission_never_matches() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["hello", "/.*/"], Script::English);
        assert!(!matcher.matches("", &accepted, Script::English));
        assert!(!matcher.matches("   ", &accepted, Script::English));
        assert!(!matcher.matches("", &forms(&["你好"], Script::Chinese), Script::Chinese));
    }

    #[test]
    fn english_is_case_insensitive() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["ni hao"], Script::English);
        assert!(matcher.matches("Ni Hao", &accepted, Script::English));
        assert!(matcher.matches("  NI   hao ", &accepted, Script::English));
        assert!(!matcher.matches("nihao", &accepted, Script::English));
    }

    #[test]
    fn chinese_is_trimmed_and_exact() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["你好"], Script::Chinese);
        assert!(matcher.matches("你好 ", &accepted, Script::Chinese));
        assert!(!matcher.matches("您好", &accepted, Script::Chinese));
        assert!(!matcher.matches("你 好", &accepted, Script::Chinese));
    }

    #[test]
    fn chinese_comparison_keeps_case() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["T恤"], Script::Chinese);
        assert!(matcher.matches("T恤", &accepted, Script::Chinese));
        assert!(!matcher.matches("t恤", &accepted, Script::Chinese));
    }

    #[test]
    fn any_alternative_matches() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["hello", "hi"], Script::English);
        assert!(matcher.matches("hi", &accepted, Script::English));
        assert!(!matcher.matches("hey", &accepted, Script::English));
    }

    #[test]
    fn pattern_forms_match_whole_answer() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["/colou?r/"], Script::English);
        assert!(matcher.matches("color", &accepted, Script::English));
        assert!(matcher.matches("Colour", &accepted, Script::English));
        assert!(!matcher.matches("colors", &accepted, Script::English));
    }

    #[test]
    fn chinese_pattern_is_case_sensitive() {
        let matcher = AnswerMatcher::default();
        let accepted = forms(&["/(卡拉)?OK/"], Script::Chinese);
        assert!(matcher.matches("卡拉OK", &accepted, Script::Chinese));
        assert!(matcher.matches("OK", &accepted, Script::Chinese));
        assert!(!matcher.matches("ok", &accepted, Script::Chinese));
    }

    #[test]
    fn rewrites_apply_to_both_sides() {
        let matcher = AnswerMatcher::new(RuleSet::default(), english_rules());
        let accepted = forms(&["to eat"], Script::English);
        assert!(matcher.matches("eat", &accepted, Script::English));
        assert!(matcher.matches("To eat!", &accepted, Script::English));
        assert!(!matcher.matches("drink", &accepted, Script::English));
    }

    #[test]
    fn rewrites_do_not_touch_other_script() {
        let matcher = AnswerMatcher::new(RuleSet::default(), english_rules());
        assert_eq!(matcher.normalize("the 书", Script::Chinese), "the 书");
        assert_eq!(matcher.normalize("The Book.", Script::English), "book");
    }

    #[test]
    fn chinese_rules_collapse_variants() {
        let chinese = RuleSet::new(vec![Rewrite::new("們", "们").unwrap()]);
        let matcher = AnswerMatcher::new(chinese, RuleSet::default());
        let accepted = forms(&["我们"], Script::Chinese);
        assert!(matcher.matches("我們", &accepted, Script::Chinese));
    }

    #[test]
    fn rewrite_to_empty_is_not_a_match() {
        let matcher = AnswerMatcher::new(RuleSet::default(), english_rules());
        let accepted = forms(&["!"], Script::English);
        assert!(!matcher.matches("?", &accepted, Script::English));
    }
}
