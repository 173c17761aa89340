//! Study session orchestration.
//!
//! Drives selection, asking and logging for one session and keeps the running
//! per-kind tallies that are reported at the end.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::logger::ResultSink;
use crate::matcher::AnswerMatcher;
use crate::model::{DictionaryKind, Mode};
use crate::question::{Question, QuizResult};
use crate::selector::{select, Selection};
use crate::store::DictionaryStore;

/// Correct/incorrect counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub incorrect: usize,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction answered correctly; 0.0 when nothing was answered.
    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.correct as f64 / self.total() as f64
        }
    }
}

/// Per-kind tallies for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub per_kind: BTreeMap<DictionaryKind, Tally>,
}

impl SessionSummary {
    pub fn record(&mut self, result: &QuizResult) {
        self.per_kind
            .entry(result.kind)
            .or_default()
            .record(result.correct);
    }

    pub fn get(&self, kind: DictionaryKind) -> Tally {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Tally {
        self.per_kind
            .values()
            .fold(Tally::default(), |acc, t| Tally {
                correct: acc.correct + t.correct,
                incorrect: acc.incorrect + t.incorrect,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.total().total() == 0
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionEnd {
    /// Every selected question was asked.
    #[default]
    Completed,
    /// The input ended early; results so far stand.
    InputExhausted,
    /// Nothing could be selected.
    NothingToAsk,
    /// The terminal failed mid-session.
    Aborted,
}

/// Everything a finished session hands back.
#[derive(Debug)]
pub struct SessionReport {
    pub summary: SessionSummary,
    pub end: SessionEnd,
    /// Non-fatal warnings and the fatal error, if any, in the order they happened.
    pub errors: Vec<QuizError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionReport {
    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(QuizError::is_fatal)
    }

    /// The first fatal error, if the session failed.
    pub fn fatal_error(&self) -> Option<&QuizError> {
        self.errors.iter().find(|e| e.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &QuizError> {
        self.errors.iter().filter(|e| !e.is_fatal())
    }
}

/// Progress reporting trait.
pub trait SessionObserver {
    fn on_question(&self, number: usize, total: usize);
    fn on_log_error(&self, error: &QuizError);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_question(&self, _: usize, _: usize) {}
    fn on_log_error(&self, _: &QuizError) {}
}

enum State<'a> {
    Selecting,
    Questioning(Selection<'a>),
    Summarizing(SessionEnd),
    Done,
}

/// Runs study sessions against one store, matcher and result sink.
pub struct SessionRunner<'a> {
    store: &'a DictionaryStore,
    matcher: &'a AnswerMatcher,
    sink: &'a dyn ResultSink,
    feedback: bool,
}

impl<'a> SessionRunner<'a> {
    pub fn new(
        store: &'a DictionaryStore,
        matcher: &'a AnswerMatcher,
        sink: &'a dyn ResultSink,
    ) -> Self {
        Self {
            store,
            matcher,
            sink,
            feedback: true,
        }
    }

    /// Whether to print correct/incorrect after each answer.
    pub fn with_feedback(mut self, feedback: bool) -> Self {
        self.feedback = feedback;
        self
    }

    /// Run one session to completion.
    ///
    /// Questions are asked strictly one after another; each result is tallied
    /// and logged before the next prompt. A log failure is kept as a warning
    /// and the session carries on.
    pub fn run<R, I, O>(
        &self,
        mode: &Mode,
        rng: &mut R,
        input: &mut I,
        output: &mut O,
        observer: &dyn SessionObserver,
    ) -> SessionReport
    where
        R: Rng + ?Sized,
        I: BufRead + ?Sized,
        O: Write + ?Sized,
    {
        let mut report = SessionReport {
            summary: SessionSummary::default(),
            end: SessionEnd::Completed,
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        let mut total = 0usize;
        let mut asked = 0usize;
        let mut state = State::Selecting;
        loop {
            state = match state {
                State::Selecting => match select(self.store, mode, &mut *rng) {
                    Ok(selection) => {
                        total = selection.len();
                        tracing::info!("starting session with {total} questions");
                        State::Questioning(selection)
                    }
                    Err(e) => {
                        report.errors.push(e);
                        report.end = SessionEnd::NothingToAsk;
                        State::Done
                    }
                },
                State::Questioning(mut selection) => match selection.next() {
                    None => State::Summarizing(SessionEnd::Completed),
                    Some(question) => {
                        asked += 1;
                        observer.on_question(asked, total);
                        match self.step(&question, &mut *input, &mut *output, observer, &mut report) {
                            Ok(()) => State::Questioning(selection),
                            Err(end) => State::Summarizing(end),
                        }
                    }
                },
                State::Summarizing(end) => {
                    report.end = end;
                    let total = report.summary.total();
                    tracing::info!(
                        "session finished: {}/{} correct",
                        total.correct,
                        total.total()
                    );
                    State::Done
                }
                State::Done => break,
            };
        }

        report.finished_at = Utc::now();
        report
    }

    /// Ask one question, then tally, log and acknowledge the answer.
    ///
    /// `Err` carries the reason the session has to stop.
    fn step<I, O>(
        &self,
        question: &Question<'_>,
        input: &mut I,
        output: &mut O,
        observer: &dyn SessionObserver,
        report: &mut SessionReport,
    ) -> Result<(), SessionEnd>
    where
        I: BufRead + ?Sized,
        O: Write + ?Sized,
    {
        let result = match question.ask(input, &mut *output, self.matcher) {
            Ok(result) => result,
            Err(QuizError::InputExhausted) => {
                tracing::info!("input ended, finishing session early");
                return Err(SessionEnd::InputExhausted);
            }
            Err(e) => {
                report.errors.push(e);
                return Err(SessionEnd::Aborted);
            }
        };

        report.summary.record(&result);
        if let Err(e) = self.sink.log(&result) {
            tracing::warn!("{e}");
            observer.on_log_error(&e);
            report.errors.push(e);
        }

        self.give_feedback(question, &result, output).map_err(|e| {
            report.errors.push(e);
            SessionEnd::Aborted
        })
    }

    fn give_feedback<O>(
        &self,
        question: &Question<'_>,
        result: &QuizResult,
        output: &mut O,
    ) -> Result<(), QuizError>
    where
        O: Write + ?Sized,
    {
        if !self.feedback {
            return Ok(());
        }
        let expected = question.expected();
        let line = if result.correct {
            "correct".to_string()
        } else if expected.is_empty() {
            // Pattern-only answers have nothing printable to suggest.
            "incorrect".to_string()
        } else {
            format!("incorrect, expected: {}", expected.join(" / "))
        };
        let written = match &question.item().note {
            Some(note) => writeln!(output, "  {line} ({note})"),
            None => writeln!(output, "  {line}"),
        };
        written.map_err(QuizError::Terminal)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::io::Cursor;
    use std::num::NonZeroUsize;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::logger::{read_log, ResultLogger};
    use crate::model::{AcceptedForm, DictionaryItem, Direction, Limit, Order, Script};

    /// Collects results in memory, optionally failing every write.
    #[derive(Default)]
    struct MemorySink {
        logged: RefCell<Vec<QuizResult>>,
        fail: bool,
    }

    impl ResultSink for MemorySink {
        fn log(&self, result: &QuizResult) -> Result<(), QuizError> {
            if self.fail {
                return Err(QuizError::LogWrite {
                    path: "unwritable.log".into(),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                });
            }
            self.logged.borrow_mut().push(result.clone());
            Ok(())
        }
    }

    fn word(id: &str, chinese: &str, english: &str) -> DictionaryItem {
        DictionaryItem {
            id: id.into(),
            kind: DictionaryKind::Word,
            chinese: vec![AcceptedForm::Literal(chinese.into())],
            english: vec![AcceptedForm::Literal(english.into())],
            note: None,
        }
    }

    fn hello_store() -> DictionaryStore {
        let mut store = DictionaryStore::new();
        store.insert(word("w1", "你好", "hello"));
        store
    }

    fn word_mode(limit: usize) -> Mode {
        Mode::new(
            BTreeSet::from([DictionaryKind::Word]),
            Direction::ChineseToEnglish,
            Limit::Max(NonZeroUsize::new(limit).unwrap()),
        )
    }

    fn run(
        store: &DictionaryStore,
        sink: &dyn ResultSink,
        mode: &Mode,
        input: impl AsRef<[u8]>,
    ) -> (SessionReport, String) {
        let matcher = AnswerMatcher::default();
        let runner = SessionRunner::new(store, &matcher, sink);
        let mut input = Cursor::new(input.as_ref().to_vec());
        let mut output = Vec::new();
        let report = runner.run(
            mode,
            &mut StdRng::seed_from_u64(3),
            &mut input,
            &mut output,
            &NoopObserver,
        );
        (report, String::from_utf8(output).unwrap())
    }

    #[test]
    fn correct_answer_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chinese.log");
        let logger = ResultLogger::new(&path);
        let store = hello_store();

        let (report, output) = run(&store, &logger, &word_mode(1), "hello\n");

        assert_eq!(report.end, SessionEnd::Completed);
        assert_eq!(
            report.summary.get(DictionaryKind::Word),
            Tally {
                correct: 1,
                incorrect: 0
            }
        );
        assert!(report.errors.is_empty());
        assert!(output.contains("[word] 你好"));
        assert!(output.contains("\n  correct\n"));

        let records = read_log(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].correct);
        assert_eq!(records[0].item_id, "w1");
    }

    #[test]
    fn incorrect_answer_scenario() {
        let sink = MemorySink::default();
        let store = hello_store();

        let (report, output) = run(&store, &sink, &word_mode(1), "goodbye\n");

        assert_eq!(
            report.summary.get(DictionaryKind::Word),
            Tally {
                correct: 0,
                incorrect: 1
            }
        );
        assert!(output.contains("incorrect, expected: hello"));
        let logged = sink.logged.borrow();
        assert_eq!(logged.len(), 1);
        assert!(!logged[0].correct);
        assert_eq!(logged[0].answer, "goodbye");
    }

    #[test]
    fn pattern_only_answer_omits_expected() {
        let sink = MemorySink::default();
        let mut store = DictionaryStore::new();
        store.insert(DictionaryItem {
            id: "w1".into(),
            kind: DictionaryKind::Word,
            chinese: vec![AcceptedForm::Literal("颜色".into())],
            english: vec![AcceptedForm::parse("/colou?r/", Script::English).unwrap()],
            note: None,
        });

        let (report, output) = run(&store, &sink, &word_mode(1), "shade\n");

        assert_eq!(report.summary.get(DictionaryKind::Word).incorrect, 1);
        assert!(output.ends_with("\n  incorrect\n"), "{output}");
        assert!(!output.contains("expected"));
    }

    #[test]
    fn undecodable_answer_is_graded_and_session_continues() {
        let sink = MemorySink::default();
        let mut store = hello_store();
        store.insert(word("w2", "谢谢", "thanks"));
        let mode = Mode::new(
            BTreeSet::from([DictionaryKind::Word]),
            Direction::EnglishToChinese,
            Limit::Unbounded,
        )
        .with_order(Order::Sorted);

        // GBK-encoded 你好, then UTF-8 谢谢
        let input: &[u8] = b"\xc4\xe3\xba\xc3\n\xe8\xb0\xa2\xe8\xb0\xa2\n";
        let (report, _) = run(&store, &sink, &mode, input);

        assert_eq!(report.end, SessionEnd::Completed);
        assert!(!report.is_fatal());
        assert_eq!(
            report.summary.get(DictionaryKind::Word),
            Tally {
                correct: 1,
                incorrect: 1
            }
        );
        let logged = sink.logged.borrow();
        assert_eq!(logged.len(), 2);
        assert!(!logged[0].correct);
        assert!(logged[1].correct);
    }

    #[test]
    fn closed_input_ends_early_without_results() {
        let sink = MemorySink::default();
        let store = hello_store();

        let (report, _) = run(&store, &sink, &word_mode(1), "");

        assert_eq!(report.end, SessionEnd::InputExhausted);
        assert!(report.summary.is_empty());
        assert!(!report.is_fatal());
        assert!(sink.logged.borrow().is_empty());
    }

    #[test]
    fn partial_results_survive_early_end() {
        let sink = MemorySink::default();
        let mut store = hello_store();
        store.insert(word("w2", "谢谢", "thanks"));
        store.insert(word("w3", "再见", "goodbye"));
        let mode = Mode::new(
            BTreeSet::from([DictionaryKind::Word]),
            Direction::ChineseToEnglish,
            Limit::Unbounded,
        )
        .with_order(Order::Sorted);

        let (report, _) = run(&store, &sink, &mode, "hello\nwrong\n");

        assert_eq!(report.end, SessionEnd::InputExhausted);
        assert_eq!(report.summary.total().total(), 2);
        let logged = sink.logged.borrow();
        let ids: Vec<_> = logged.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2"]);
        assert!(logged[0].correct);
        assert!(!logged[1].correct);
    }

    #[test]
    fn empty_selection_is_fatal_with_empty_summary() {
        let sink = MemorySink::default();
        let store = hello_store();
        let mode = Mode::new(
            BTreeSet::from([DictionaryKind::Grammar]),
            Direction::ChineseToEnglish,
            Limit::Unbounded,
        );

        let (report, output) = run(&store, &sink, &mode, "hello\n");

        assert_eq!(report.end, SessionEnd::NothingToAsk);
        assert!(report.summary.is_empty());
        assert!(report.is_fatal());
        assert!(matches!(
            report.fatal_error(),
            Some(QuizError::EmptySelection { .. })
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn log_failure_does_not_stop_grading() {
        let sink = MemorySink {
            fail: true,
            ..MemorySink::default()
        };
        let mut store = hello_store();
        store.insert(word("w2", "谢谢", "thanks"));
        let mode = Mode::new(
            BTreeSet::from([DictionaryKind::Word]),
            Direction::ChineseToEnglish,
            Limit::Unbounded,
        )
        .with_order(Order::Sorted);

        let (report, _) = run(&store, &sink, &mode, "hello\nthanks\n");

        assert_eq!(report.end, SessionEnd::Completed);
        assert_eq!(report.summary.get(DictionaryKind::Word).correct, 2);
        assert_eq!(report.warnings().count(), 2);
        assert!(!report.is_fatal());
    }

    #[test]
    fn feedback_can_be_disabled() {
        let sink = MemorySink::default();
        let store = hello_store();
        let matcher = AnswerMatcher::default();
        let runner = SessionRunner::new(&store, &matcher, &sink).with_feedback(false);
        let mut input = Cursor::new(b"goodbye\n".to_vec());
        let mut output = Vec::new();
        runner.run(
            &word_mode(1),
            &mut StdRng::seed_from_u64(0),
            &mut input,
            &mut output,
            &NoopObserver,
        );
        assert_eq!(String::from_utf8(output).unwrap(), "[word] 你好\n> ");
    }

    #[test]
    fn tally_accuracy() {
        let mut tally = Tally::default();
        assert_eq!(tally.accuracy(), 0.0);
        tally.record(true);
        tally.record(false);
        tally.record(true);
        tally.record(true);
        assert_eq!(tally.total(), 4);
        assert!((tally.accuracy() - 0.75).abs() < f64::EPSILON);
    }
}
