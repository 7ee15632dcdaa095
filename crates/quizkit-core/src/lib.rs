//! quizkit-core — Quiz session engine, scoring, and store interfaces.
//!
//! This crate defines the quiz data model, the single-attempt state
//! machine, pure scoring and review functions, and the traits through
//! which the engine talks to the external quiz store.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod results;
pub mod scoring;
pub mod session;
pub mod traits;

pub use engine::{Completion, QuizEngine, Step};
pub use error::{DataIntegrityWarning, PersistenceWarning, StoreError, ValidationError};
pub use model::{Question, QuizDefinition};
pub use results::{CompletionRecord, QuizResult};
pub use session::{Advance, QuizSession, SessionState};
