//! zhquiz-core: selection, grading and result logging for the zhquiz drill.
//!
//! This crate holds the study-session loop: which items are asked, how a typed
//! answer is graded against the accepted Chinese and English forms, and how
//! every outcome is appended to the progress log.

pub mod config;
pub mod error;
pub mod logger;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod question;
pub mod selector;
pub mod session;
pub mod statistics;
pub mod store;

pub use error::QuizError;
