//! # Language Configuration
//!
//! Editing assistance driven by VSCode-style `language-configuration.json`
//! data: what to insert when Enter is pressed, and whether a typed bracket or
//! quote is auto-closed, skipped over or passed through.
//!
//! ## Philosophy
//!
//! - **Pure decisions**: Engines take text snapshots and return a decision value
//! - **Deterministic**: Rules are evaluated in configured order, first match wins
//! - **Data, not code**: Rule and pair tables are loaded once and never mutated
//! - **Fail open on lookups**: A missing token never blocks a keystroke
//! - **Fail fast on contracts**: Bad offsets from the host are errors, not guesses
//!
//! ## Design
//!
//! The crate provides:
//! - EnterRuleEngine: On-enter rules and bracket indent heuristics
//! - AutoClosePairEngine: Auto-close, skip-over and pair deletion decisions
//! - LanguageConfiguration: Serde model of `language-configuration.json`
//! - LanguageAutoEdit: Maps a typed command to the final edit for the host
//! - Indentation utilities: Tab/space normalization and outdenting

pub mod auto_close;
pub mod auto_edit;
pub mod bracket;
pub mod config;
pub mod document;
pub mod error;
pub mod indentation;
pub mod on_enter;
pub mod regex_utils;

pub use auto_close::{
    AutoCloseDecision, AutoClosePairEngine, AutoDeleteDecision, LexicalToken, LineTokens,
    TokenSource,
};
pub use auto_edit::{EditCommand, LanguageAutoEdit};
pub use bracket::{AutoClosingPairConditional, BracketPair};
pub use config::LanguageConfiguration;
pub use document::{Document, Position};
pub use error::{LanguageConfigError, LanguageConfigResult};
pub use indentation::{IndentPreferences, IndentSettings};
pub use on_enter::{EnterAction, EnterRuleEngine, IndentAction, OnEnterRule, ResolvedEnterAction};
