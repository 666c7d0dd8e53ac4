//! Pattern helpers shared by the enter and bracket engines
//!
//! Bracket patterns are generated from escaped literals and run on `regex`.
//! Rule patterns come from configuration files written for a backtracking
//! engine (look-ahead, backreferences) and run on `fancy_regex`.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::error::{LanguageConfigError, LanguageConfigResult};

/// Matches a lone character only when that character is not a word character
static NON_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B").expect("Invalid non-boundary regex"));

/// Escape a literal so it matches itself inside a pattern
pub fn escape_literal(literal: &str) -> String {
    regex::escape(literal)
}

/// Compile a generated pattern as authored (no implicit anchors)
pub fn compile(pattern: &str) -> LanguageConfigResult<Regex> {
    Regex::new(pattern).map_err(|source| LanguageConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compile a configured rule pattern with JavaScript-style flags.
///
/// `i`, `m` and `s` are honored; `g`, `u` and `y` have no meaning for a
/// find-anywhere test and are ignored.
pub fn compile_with_flags(pattern: &str, flags: &str) -> LanguageConfigResult<fancy_regex::Regex> {
    fancy_regex::RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|source| LanguageConfigError::InvalidRulePattern {
            pattern: pattern.to_string(),
            source: Box::new(source),
        })
}

/// Find-anywhere test for a rule pattern.
///
/// A match that aborts at run time (backtrack limit) counts as no match.
pub fn find_in(pattern: &fancy_regex::Regex, text: &str) -> bool {
    match pattern.is_match(text) {
        Ok(found) => found,
        Err(err) => {
            warn!(target: "language_config::regex", "pattern `{}` aborted: {err}", pattern.as_str());
            false
        }
    }
}

/// Whether `ch` counts as a word character for boundary assertions.
///
/// Probes the single character with `\B`: it only matches a lone
/// character when there is no word boundary on either side, i.e. when the
/// character is not a word character.
pub fn is_word_char(ch: char) -> bool {
    let mut probe = [0u8; 4];
    !NON_BOUNDARY.is_match(ch.encode_utf8(&mut probe))
}
