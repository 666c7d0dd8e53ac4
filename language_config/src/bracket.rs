//! Bracket pair model

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{LanguageConfigError, LanguageConfigResult};
use crate::regex_utils::{compile, escape_literal, is_word_char};

/// A configured (open, close) delimiter pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BracketPair {
    open: String,
    close: String,
}

impl BracketPair {
    /// Creates a pair; both delimiters must be non-empty
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> LanguageConfigResult<Self> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err(LanguageConfigError::EmptyDelimiter { open, close });
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// `()`, `{}` and `[]`, used when a language configures no brackets
    pub fn defaults() -> Vec<BracketPair> {
        [("(", ")"), ("{", "}"), ("[", "]")]
            .into_iter()
            .map(|(open, close)| Self {
                open: open.to_string(),
                close: close.to_string(),
            })
            .collect()
    }
}

/// A bracket pair that auto-closes, except inside the listed scope kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoClosingPairConditional {
    pair: BracketPair,
    not_in: BTreeSet<String>,
}

impl AutoClosingPairConditional {
    pub fn new(pair: BracketPair, not_in: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            pair,
            not_in: not_in.into_iter().map(Into::into).collect(),
        }
    }

    /// A pair that auto-closes in every scope
    pub fn unconditional(pair: BracketPair) -> Self {
        Self {
            pair,
            not_in: BTreeSet::new(),
        }
    }

    pub fn pair(&self) -> &BracketPair {
        &self.pair
    }

    pub fn open(&self) -> &str {
        self.pair.open()
    }

    pub fn close(&self) -> &str {
        self.pair.close()
    }

    pub fn not_in(&self) -> &BTreeSet<String> {
        &self.not_in
    }
}

/// A bracket pair with its enter-heuristic patterns compiled.
///
/// The open pattern requires the open bracket at the tail of the text
/// (trailing whitespace allowed); the close pattern requires the close
/// bracket at the head (leading whitespace allowed). Word-like delimiters
/// get a `\b` on their outer side.
#[derive(Debug, Clone)]
pub(crate) struct ProcessedBracketPair {
    open: Regex,
    close: Regex,
}

impl ProcessedBracketPair {
    pub(crate) fn new(pair: &BracketPair) -> LanguageConfigResult<Self> {
        Ok(Self {
            open: compile(&open_bracket_pattern(pair.open()))?,
            close: compile(&close_bracket_pattern(pair.close()))?,
        })
    }

    pub(crate) fn match_open(&self, before_enter_text: &str) -> bool {
        self.open.is_match(before_enter_text)
    }

    pub(crate) fn match_close(&self, after_enter_text: &str) -> bool {
        self.close.is_match(after_enter_text)
    }
}

fn open_bracket_pattern(open: &str) -> String {
    let mut pattern = String::new();
    if open.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&escape_literal(open));
    pattern.push_str(r"\s*$");
    pattern
}

fn close_bracket_pattern(close: &str) -> String {
    let mut pattern = String::from(r"^\s*");
    pattern.push_str(&escape_literal(close));
    if close.chars().next_back().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}
