pub mod submission;

pub use submission::{Journal, Submission};
