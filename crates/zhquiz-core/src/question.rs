//! A single question and its graded outcome.

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::matcher::AnswerMatcher;
use crate::model::{DictionaryItem, DictionaryKind, Direction};

/// One dictionary item asked in one direction.
#[derive(Debug, Clone)]
pub struct Question<'a> {
    item: &'a DictionaryItem,
    direction: Direction,
    prompt: String,
}

impl<'a> Question<'a> {
    /// Bind an item to a direction. The item must be eligible for it.
    pub fn new(item: &'a DictionaryItem, direction: Direction) -> Self {
        let prompt = item
            .prompt_text(direction.prompt_script())
            .unwrap_or_default();
        Self {
            item,
            direction,
            prompt,
        }
    }

    pub fn item(&self) -> &'a DictionaryItem {
        self.item
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Literal answers, for showing the user what was expected.
    pub fn expected(&self) -> Vec<String> {
        self.item
            .literals(self.direction.answer_script())
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Show the prompt, read one line, and grade it.
    ///
    /// Returns [`QuizError::InputExhausted`] if the input ends before a line
    /// is read. A blank line is an answer (and always wrong), and so is a line
    /// that is not valid UTF-8; it is graded after lossy decoding.
    pub fn ask<I, O>(
        &self,
        input: &mut I,
        output: &mut O,
        matcher: &AnswerMatcher,
    ) -> Result<QuizResult, QuizError>
    where
        I: BufRead + ?Sized,
        O: Write + ?Sized,
    {
        write!(output, "[{}] {}\n> ", self.item.kind, self.prompt).map_err(QuizError::Terminal)?;
        output.flush().map_err(QuizError::Terminal)?;

        let mut line = Vec::new();
        let read = input
            .read_until(b'\n', &mut line)
            .map_err(QuizError::Terminal)?;
        if read == 0 {
            return Err(QuizError::InputExhausted);
        }
        let answer = String::from_utf8_lossy(&line)
            .trim_end_matches(['\r', '\n'])
            .to_string();

        let correct = matcher.matches(
            &answer,
            self.item.forms(self.direction.answer_script()),
            self.direction.answer_script(),
        );
        tracing::debug!(
            "{} '{}' answered {:?}: {}",
            self.item.kind,
            self.item.id,
            answer,
            if correct { "correct" } else { "incorrect" }
        );

        Ok(QuizResult {
            item_id: self.item.id.clone(),
            kind: self.item.kind,
            direction: self.direction,
            prompt: self.prompt.clone(),
            answer,
            correct,
            answered_at: Utc::now(),
        })
    }
}

/// The graded outcome of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub item_id: String,
    pub kind: DictionaryKind,
    pub direction: Direction,
    pub prompt: String,
    /// What the user typed, without the line terminator.
    pub answer: String,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}
