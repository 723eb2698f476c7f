//! AlgoViz CLI
//!
//! Learning sessions in the terminal: pick an algorithm, watch it step by
//! step, take its quiz, and move on to the next one in the category.
//!
//! - [`SessionConfig`]: input sizes, pace and demo values
//! - [`LearningSession`]: run, quiz, record, advance
//! - [`ConsoleObserver`]: text rendering of step events
//! - [`logging`]: subscriber setup for the binary

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod session;

pub use config::{SessionConfig, DEFAULT_BASE_DELAY};
pub use console::{describe, render_bars, ConsoleObserver};
pub use error::{Result, SessionError};
pub use session::{Answerer, LearningSession, Lesson, SessionObserver, MAX_PROMPTS};
