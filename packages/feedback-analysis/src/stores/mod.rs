//! Feedback source implementations.

pub mod memory;

pub use memory::MemoryFeedbackSource;
