//! # brswap - Bril branch swapper
//!
//! > "Haha, you thought"
//!
//! Rewrites a Bril program so that every `br` jumps the other way, and makes
//! each one announce it first by printing a constant.
//!
//! ## Passes
//!
//! | Step   | Module          | Effect                                     |
//! |--------|-----------------|--------------------------------------------|
//! | decode | [`ir::codec`]   | JSON text to [`ir::Program`]               |
//! | names  | [`ir::fresh`]   | reserve existing names, mint fresh ones    |
//! | swap   | [`ir::swap`]    | swap targets, inject `const` + `print`     |
//! | encode | [`ir::codec`]   | [`ir::Program`] back to indented JSON      |
//!
//! The [`report`] module is the companion step that compares benchmark runs.

pub mod config;
pub mod ir;
pub mod report;

use thiserror::Error;

pub use config::SwapConfig;
pub use ir::{Program, SwapStats};

/// brswap error types
#[derive(Error, Debug)]
pub enum BrswapError {
    #[error("Parse error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Render error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed program: {message}")]
    MalformedProgram { message: String },

    #[error("Malformed record in function '{function}' at instruction {index}: {message}")]
    MalformedRecord {
        function: String,
        index: usize,
        message: String,
    },

    #[error("Report error at line {line}: {message}")]
    ReportRow { line: usize, message: String },

    #[error("Report error: {message}")]
    Report { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for brswap operations
pub type Result<T> = std::result::Result<T, BrswapError>;

/// Swap every branch of a program given as JSON text
///
/// # Arguments
///
/// * `source` - The program in Bril's JSON form
/// * `config` - Name prefix, payload message and output indent
///
/// # Returns
///
/// A tuple of (rewritten_json, stats). The JSON has no trailing newline.
pub fn swap_source(source: &str, config: &SwapConfig) -> Result<(String, SwapStats)> {
    // Phase 1: Decode
    let program = ir::decode(source)?;

    // Phase 2: Rewrite
    let (program, stats) = ir::swap_all_branches(program, config)?;

    // Phase 3: Encode
    let json = ir::encode(program, config.indent)?;

    Ok((json, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_source_no_functions() {
        let (json, stats) = swap_source(r#"{"functions": []}"#, &SwapConfig::default()).unwrap();
        assert_eq!(json, "{\n  \"functions\": []\n}");
        assert_eq!(stats, SwapStats::default());
    }

    #[test]
    fn test_error_display() {
        let err = BrswapError::MalformedRecord {
            function: "main".to_string(),
            index: 3,
            message: "`br` must have exactly 2 labels, found 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed record in function 'main' at instruction 3: `br` must have exactly 2 labels, found 1"
        );

        let err = BrswapError::ReportRow {
            line: 2,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Report error at line 2: bad");
    }

    #[test]
    fn test_decode_error_is_reported() {
        let err = swap_source("not json", &SwapConfig::default()).unwrap_err();
        assert!(matches!(err, BrswapError::Decode(_)));
        assert!(err.to_string().starts_with("Parse error:"));
    }
}
