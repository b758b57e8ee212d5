//! Streaming tokenizer for the Rill scripting language.
//!
//! This crate is a standalone scanner with **zero `rill_*` dependencies**: it
//! turns source bytes into a stream of [`Token`]s one call at a time, with no
//! parser, no interner, and no diagnostics renderer attached. External tools
//! (an LSP, a formatter, a syntax highlighter) can depend on it directly
//! without pulling in the rest of a Rill toolchain.
//!
//! # Architecture
//!
//! [`Scanner::next_token`] is the only entry point that does real work; every
//! other public type exists to support it:
//!
//! - [`SourceBuffer`] / [`Cursor`]: a sentinel-terminated byte buffer and a
//!   cheap, `Copy` cursor over it.
//! - [`BracketStack`]: a fixed-capacity bit-stack tracking open brackets,
//!   including which `{` is really a template substitution's `${`.
//! - [`ExpressionContext`]: the caller-supplied oracle that resolves the one
//!   ambiguity a scanner alone can't — whether a `/` starts a division
//!   operator or a regular-expression literal.
//! - [`ScanError`] / [`ScanResult`]: errors ride alongside the token rather
//!   than replacing it, so a caller always has a position to anchor a
//!   diagnostic on even when a call didn't go cleanly.
//!
//! # Usage
//!
//! ```
//! use rill_lexer_core::{tokenize, OracleSignal};
//!
//! let mut oracle = || OracleSignal::ValueEnds;
//! let results = tokenize("let x = 1 + 2;", &mut oracle);
//! assert!(results.iter().all(|r| r.error.is_none()));
//! ```
//!
//! # Stability
//!
//! - [`TokenKind`]: `#[non_exhaustive]` — new variants may be added.
//! - [`Token`]: fields are stable.
//! - [`SourceBuffer`] / [`Cursor`]: API is stable.
//! - [`ScanError`]: may gain new variants as new failure modes are found.

mod cursor;
mod error;
mod oracle;
mod scanner;
mod source_buffer;
mod stack;
mod tag;

pub use cursor::Cursor;
pub use error::{ScanError, ScanResult};
pub use oracle::{ExpressionContext, OracleSignal};
pub use scanner::{tokenize, Scanner, Tokens};
pub use source_buffer::{EncodingIssue, EncodingIssueKind, SourceBuffer};
pub use stack::BracketStack;
pub use tag::{Token, TokenKind};
