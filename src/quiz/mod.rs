//! Quiz engine: snapshot pool, session cursor, and answer matching.
//!
//! A session moves `Setup → InProgress → Finished`. Setup is the start
//! request itself; [`session::QuizSession::start`] is the transition into
//! `InProgress` and fails when the selected books yield no words. The pool
//! is a shuffled snapshot taken at that moment and is never touched by
//! later store changes.

pub mod answer;
pub mod registry;
pub mod session;

pub use registry::QuizRegistry;
pub use session::{Direction, QuizError, QuizSession, QuizWord, Question, Verdict};
