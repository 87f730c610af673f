//! Classification pipeline.
//!
//! - [`prompts`] - prompt text for each operation
//! - [`contracts`] - the JSON objects the classifier is asked to return
//! - [`parse`] / [`lenient`] - tolerant reply parsing
//! - [`analyzer`] - the four public operations

pub mod analyzer;
pub mod contracts;
pub mod lenient;
pub mod parse;
pub mod prompts;

pub use analyzer::FeedbackAnalyzer;
pub use contracts::{BulkContract, ExternalContract, PageContract, SingleContract};
pub use parse::{find_json_object, parse_json, strip_code_fences};
pub use prompts::{
    format_bulk_prompt, format_external_prompt, format_page_prompt, format_single_prompt,
    BULK_PROMPT, EXTERNAL_PROMPT, PAGE_PROMPT, SINGLE_PROMPT,
};
