//! Data types for the feedback analysis library.

pub mod bulk;
pub mod classification;
pub mod config;
pub mod extraction;
