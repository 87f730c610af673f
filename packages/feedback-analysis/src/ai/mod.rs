//! Classifier implementations.
//!
//! This module provides the reference `TextGenerator` implementation.
//! Applications can use it directly or implement their own.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiGenerator;
