//! Basis selection parser
//!
//! Turns user-entered text such as `"1,2,3"` or `"last-2, 1"` into zero-based
//! basis indices.
//!
//! # Grammar
//!
//! ```text
//! selection ::= token ("," token)*
//! token     ::= INTEGER            (1-based index, k -> k - 1)
//!             | "last" "-" INTEGER (N > 0, -> basis_count - N)
//! ```
//!
//! Whitespace around tokens is ignored. Parsing never fails outright: each token
//! becomes [`BasisToken::Valid`] or [`BasisToken::Invalid`], and
//! [`BasisSelector::resolve`] decides whether the whole selection is usable.
//!
//! # Example
//!
//! ```rust
//! use trajscope_core::selector::BasisSelector;
//!
//! let selector = BasisSelector::new(5);
//! assert_eq!(selector.resolve("last-2,1").unwrap(), vec![3, 0]);
//! ```

use thiserror::Error;

const LAST_KEYWORD: &str = "last";

/// Selection errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty basis selection")]
    Empty,

    #[error("malformed basis selector '{token}' at position {position}")]
    Malformed { token: String, position: usize },

    #[error("basis selector at position {position} resolves to {index}, expected 0..{count}")]
    OutOfRange {
        position: usize,
        index: i64,
        count: usize,
    },
}

/// Result of parsing one comma-separated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasisToken {
    /// Zero-based index, not yet range-checked (may be negative)
    Valid(i64),
    /// Raw token text that is neither an integer nor `last-N`
    Invalid(String),
}

impl BasisToken {
    fn from_text(text: &str, basis_count: usize) -> Self {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix(LAST_KEYWORD) {
            return match parse_last_offset(rest) {
                Some(n) => BasisToken::Valid((basis_count as i64).saturating_sub(n)),
                None => BasisToken::Invalid(text.to_string()),
            };
        }

        match text.parse::<i64>() {
            Ok(k) => BasisToken::Valid(k.saturating_sub(1)),
            Err(_) => BasisToken::Invalid(text.to_string()),
        }
    }
}

/// `"-N"` (N > 0) following the `last` keyword
fn parse_last_offset(rest: &str) -> Option<i64> {
    let digits = rest.trim_start().strip_prefix('-')?.trim_start();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().filter(|&n| n > 0)
}

/// Parser bound to the basis count of the currently loaded model.
#[derive(Debug, Clone, Copy)]
pub struct BasisSelector {
    basis_count: usize,
}

impl BasisSelector {
    pub fn new(basis_count: usize) -> Self {
        Self { basis_count }
    }

    pub fn basis_count(&self) -> usize {
        self.basis_count
    }

    /// Split `input` into per-token results, preserving order and duplicates.
    ///
    /// Blank input yields no tokens.
    pub fn parse(&self, input: &str) -> Vec<BasisToken> {
        if input.trim().is_empty() {
            return Vec::new();
        }
        input
            .split(',')
            .map(|token| BasisToken::from_text(token, self.basis_count))
            .collect()
    }

    /// Parse and validate: any malformed or out-of-range token rejects the selection.
    pub fn resolve(&self, input: &str) -> Result<Vec<usize>, SelectorError> {
        let tokens = self.parse(input);
        if tokens.is_empty() {
            return Err(SelectorError::Empty);
        }

        tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| match token {
                BasisToken::Invalid(token) => Err(SelectorError::Malformed {
                    token,
                    position: i + 1,
                }),
                BasisToken::Valid(index) => usize::try_from(index)
                    .ok()
                    .filter(|&idx| idx < self.basis_count)
                    .ok_or(SelectorError::OutOfRange {
                        position: i + 1,
                        index,
                        count: self.basis_count,
                    }),
            })
            .collect()
    }
}
