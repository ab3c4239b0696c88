//! Token counting and the credit cost model
//!
//! Counting uses the cl100k BPE vocabulary so the count that budgeted a query
//! matches the count used to settle it. The cost model weights output tokens
//! 2x input tokens.

use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Maximum input size accepted by the metering gate
pub const MAX_CONTEXT_TOKENS: usize = 1024;

/// Credits charged per input token
pub const INPUT_TOKEN_RATE: u64 = 1;

/// Credits charged per output token
pub const OUTPUT_TOKEN_RATE: u64 = 2;

/// Token counts for one request/response pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

static BPE: Lazy<Option<CoreBPE>> = Lazy::new(|| match cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::warn!(error = %e, "cl100k tokenizer unavailable, using byte estimate");
        None
    }
});

/// Count tokens in a string. Pure and deterministic: the same text always
/// yields the same count.
///
/// Falls back to a bytes/4 estimate if the embedded vocabulary cannot load,
/// which keeps counting deterministic within a process either way.
pub fn token_count(text: &str) -> usize {
    match BPE.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => text.len().div_ceil(4),
    }
}

/// Credit cost of a request/response pair: `input * 1 + output * 2`.
pub fn cost(usage: TokenUsage) -> u64 {
    usage.input * INPUT_TOKEN_RATE + usage.output * OUTPUT_TOKEN_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_weights_output_double() {
        assert_eq!(cost(TokenUsage { input: 0, output: 0 }), 0);
        assert_eq!(cost(TokenUsage { input: 10, output: 0 }), 10);
        assert_eq!(cost(TokenUsage { input: 0, output: 10 }), 20);
        assert_eq!(
            cost(TokenUsage {
                input: 7,
                output: 3
            }),
            13
        );
    }

    #[test]
    fn test_token_count_deterministic() {
        let text = "N.I.D.A.M online. Awaiting command.";
        assert_eq!(token_count(text), token_count(text));
    }

    #[test]
    fn test_token_count_empty() {
        assert_eq!(token_count(""), 0);
    }

    #[test]
    fn test_token_count_grows_with_text() {
        let short = token_count("hello");
        let long = token_count(&"hello world ".repeat(200));
        assert!(long > short);
        assert!(long > MAX_CONTEXT_TOKENS / 10);
    }
}
