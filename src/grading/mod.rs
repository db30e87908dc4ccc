// src/grading/mod.rs

pub mod comparator;
pub mod engine;
pub mod unlock;

pub use comparator::compare;
pub use engine::{DEFAULT_PASSING_THRESHOLD, GradeDetail, GradeError, GradeResult, SubmittedAnswer, grade};
pub use unlock::resolve_next_module;
