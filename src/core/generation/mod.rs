//! Letter generation orchestration

pub mod coordinator;
pub mod outcome;

pub use coordinator::{LetterCoordinator, LetterRequest};
pub use outcome::LetterOutcome;
