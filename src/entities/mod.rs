//! Entity type definitions

pub mod submission;

pub use submission::{Course, FieldUpdate, Submission, SubmissionFields, ValidationError};
