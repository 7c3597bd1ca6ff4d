//! Rewrite configuration
//!
//! The instrumentation payload lives here as data rather than in the
//! traversal, so the message can change without touching the rewriter.

use num_bigint::BigUint;
use serde_json::{Number, Value};

use crate::{BrswapError, Result};

/// Prefix for generated result names (`v0`, `v1`, ...)
pub const DEFAULT_PREFIX: &str = "v";

/// Message announced before every swapped branch
pub const DEFAULT_MESSAGE: &str = "Haha, you thought";

/// Spaces per indentation level in rendered output
pub const DEFAULT_INDENT: usize = 2;

/// Declared type of the injected constant
pub const PAYLOAD_TYPE: &str = "int";

/// Settings for one program rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapConfig {
    pub prefix: String,
    pub message: String,
    pub indent: usize,
}

impl SwapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Derive the payload for this configuration
    pub fn payload(&self) -> Result<Payload> {
        Payload::new(&self.message)
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        SwapConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            indent: DEFAULT_INDENT,
        }
    }
}

/// The message bytes read as one big-endian unsigned integer.
///
/// The default message is 17 bytes long, so the integer does not fit any
/// machine word; it is kept exact and emitted as an arbitrary-precision JSON
/// number.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    message: String,
    value: BigUint,
    literal: Value,
}

impl Payload {
    pub fn new(message: &str) -> Result<Self> {
        let value = BigUint::from_bytes_be(message.as_bytes());
        let number: Number = value.to_string().parse().map_err(BrswapError::Encode)?;
        Ok(Payload {
            message: message.to_string(),
            value,
            literal: Value::Number(number),
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// JSON literal for the `value` field of the injected constant
    pub fn literal(&self) -> &Value {
        &self.literal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_VALUE: &str = "24629807503661814862629413844970453297268";

    #[test]
    fn test_default_payload_value() {
        let payload = SwapConfig::default().payload().unwrap();
        assert_eq!(payload.message(), "Haha, you thought");
        assert_eq!(payload.value().to_string(), DEFAULT_VALUE);
        assert_eq!(serde_json::to_string(payload.literal()).unwrap(), DEFAULT_VALUE);
    }

    #[test]
    fn test_payload_is_big_endian() {
        let payload = Payload::new("AB").unwrap();
        assert_eq!(payload.value(), &BigUint::from(0x4142u32));
        assert_eq!(payload.literal(), &Value::from(0x4142u64));
    }

    #[test]
    fn test_empty_message_is_zero() {
        let payload = Payload::new("").unwrap();
        assert_eq!(serde_json::to_string(payload.literal()).unwrap(), "0");
    }

    #[test]
    fn test_builder() {
        let config = SwapConfig::new()
            .with_prefix("swap_")
            .with_message("hi")
            .with_indent(4);
        assert_eq!(config.prefix, "swap_");
        assert_eq!(config.message, "hi");
        assert_eq!(config.indent, 4);
        assert_eq!(SwapConfig::default().prefix, "v");
    }
}
