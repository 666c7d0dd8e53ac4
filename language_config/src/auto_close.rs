//! Auto-closing pairs: auto-close, skip-over and empty pair deletion
//!
//! Offsets are byte offsets into the document text and must sit on a
//! character boundary. Token lookups must reflect the document before the
//! pending keystroke.

use std::collections::BTreeSet;

use log::trace;

use crate::bracket::AutoClosingPairConditional;
use crate::document::check_offset;
use crate::error::LanguageConfigResult;

/// Characters before which auto-closing is allowed when none are configured
pub const DEFAULT_AUTO_CLOSE_BEFORE: &str = ";:.,=}])> \n\t";

/// A token span reported by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexicalToken {
    /// Start of the token relative to its line
    pub start_index: usize,
    /// Space-separated scope names, e.g. `"source.js string.quoted.double.js"`
    pub token_type: String,
}

impl LexicalToken {
    pub fn new(start_index: usize, token_type: impl Into<String>) -> Self {
        Self {
            start_index,
            token_type: token_type.into(),
        }
    }

    /// Whether any scope contains one of `kinds` as a run of whole segments.
    ///
    /// `string` and `quoted.double` both match `string.quoted.double.js`;
    /// `string` does not match `substring.x`.
    pub fn in_any_scope(&self, kinds: &BTreeSet<String>) -> bool {
        self.token_type
            .split_whitespace()
            .any(|scope| kinds.iter().any(|kind| scope_has_segments(scope, kind)))
    }
}

fn scope_has_segments(scope: &str, kind: &str) -> bool {
    if kind.is_empty() {
        return false;
    }
    scope.match_indices(kind).any(|(start, _)| {
        let end = start + kind.len();
        (start == 0 || scope[..start].ends_with('.'))
            && (end == scope.len() || scope[end..].starts_with('.'))
    })
}

/// Token lookup by document offset
pub trait TokenSource {
    fn token_at(&self, offset: usize) -> Option<LexicalToken>;
}

impl<F> TokenSource for F
where
    F: Fn(usize) -> Option<LexicalToken>,
{
    fn token_at(&self, offset: usize) -> Option<LexicalToken> {
        self(offset)
    }
}

/// Tokens of a single line, as a tokenizer reports them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTokens {
    line_offset: usize,
    tokens: Vec<LexicalToken>,
}

impl LineTokens {
    /// `tokens` must be ordered by strictly increasing `start_index`
    pub fn new(line_offset: usize, tokens: Vec<LexicalToken>) -> Self {
        Self {
            line_offset,
            tokens,
        }
    }
}

impl TokenSource for LineTokens {
    fn token_at(&self, offset: usize) -> Option<LexicalToken> {
        let column = offset.checked_sub(self.line_offset)?;
        self.tokens
            .iter()
            .take_while(|token| token.start_index <= column)
            .last()
            .cloned()
    }
}

/// What to do with a typed character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoCloseDecision {
    /// Insert the keystroke as typed
    PassThrough,
    /// Drop the keystroke, the caret moves past the existing text
    Suppress,
    /// Insert the keystroke followed by the close text
    InsertWithClose(String),
}

/// What to do with a backspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDeleteDecision {
    /// Delete a single character
    PassThrough,
    /// Delete the whole empty pair around the caret
    DeletePair { start: usize, length: usize },
}

/// Auto-closing pair decisions for one language
#[derive(Debug, Clone)]
pub struct AutoClosePairEngine {
    pairs: Vec<AutoClosingPairConditional>,
    auto_close_before: String,
}

impl AutoClosePairEngine {
    pub fn new(pairs: Vec<AutoClosingPairConditional>, auto_close_before: impl Into<String>) -> Self {
        Self {
            pairs,
            auto_close_before: auto_close_before.into(),
        }
    }

    pub fn pairs(&self) -> &[AutoClosingPairConditional] {
        &self.pairs
    }

    pub fn auto_close_before(&self) -> &str {
        &self.auto_close_before
    }

    /// Decides how `typed` is inserted at `offset` in `text`
    pub fn decide(
        &self,
        text: &str,
        offset: usize,
        typed: &str,
        tokens: &dyn TokenSource,
    ) -> LanguageConfigResult<AutoCloseDecision> {
        check_offset(text, offset)?;
        if typed.is_empty() {
            return Ok(AutoCloseDecision::PassThrough);
        }
        let (before, after) = text.split_at(offset);

        if let Some(pair) = self.find_opening_pair(before, typed) {
            let decision = if (typed == pair.open() && after.starts_with(pair.open()))
                || (typed == pair.close() && after.starts_with(pair.close()))
            {
                AutoCloseDecision::Suppress
            } else if self.is_auto_closing_allowed(text, offset, pair, tokens) {
                AutoCloseDecision::InsertWithClose(pair.close().to_string())
            } else {
                AutoCloseDecision::PassThrough
            };
            trace!(target: "language_config::auto_close", "{typed:?} at {offset}: {decision:?}");
            return Ok(decision);
        }

        // Typing over an existing close text, regardless of scope
        if self
            .pairs
            .iter()
            .any(|pair| pair.close() == typed && after.starts_with(typed))
        {
            trace!(target: "language_config::auto_close", "{typed:?} at {offset}: skip over");
            return Ok(AutoCloseDecision::Suppress);
        }

        Ok(AutoCloseDecision::PassThrough)
    }

    /// Decides whether a backspace at `offset` removes an empty pair
    pub fn decide_delete(&self, text: &str, offset: usize) -> LanguageConfigResult<AutoDeleteDecision> {
        check_offset(text, offset)?;
        let (before, after) = text.split_at(offset);
        let decision = self
            .pairs
            .iter()
            .find(|pair| before.ends_with(pair.open()) && after.starts_with(pair.close()))
            .map_or(AutoDeleteDecision::PassThrough, |pair| {
                AutoDeleteDecision::DeletePair {
                    start: offset - pair.open().len(),
                    length: pair.open().len() + pair.close().len(),
                }
            });
        Ok(decision)
    }

    /// First pair whose open text is completed by `typed`.
    ///
    /// A multi-character open text matches when the text before the caret
    /// already holds everything but the typed tail.
    fn find_opening_pair(&self, before: &str, typed: &str) -> Option<&AutoClosingPairConditional> {
        self.pairs.iter().find(|pair| {
            let open = pair.open();
            open == typed
                || (open.len() > typed.len()
                    && open.ends_with(typed)
                    && before.ends_with(&open[..open.len() - typed.len()]))
        })
    }

    fn is_auto_closing_allowed(
        &self,
        text: &str,
        offset: usize,
        pair: &AutoClosingPairConditional,
        tokens: &dyn TokenSource,
    ) -> bool {
        if let Some(next) = text[offset..].chars().next() {
            if !next.is_whitespace() && !self.auto_close_before.contains(next) {
                return false;
            }
        }

        if pair.not_in().is_empty() {
            return true;
        }
        // The token before the caret on the same line; anything else allows
        let Some(previous) = text[..offset].chars().next_back() else {
            return true;
        };
        if previous == '\n' || previous == '\r' {
            return true;
        }
        match tokens.token_at(offset - previous.len_utf8()) {
            Some(token) => !token.in_any_scope(pair.not_in()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::BracketPair;

    fn pair(open: &str, close: &str) -> AutoClosingPairConditional {
        AutoClosingPairConditional::unconditional(BracketPair::new(open, close).unwrap())
    }

    fn pair_not_in(open: &str, close: &str, not_in: &[&str]) -> AutoClosingPairConditional {
        AutoClosingPairConditional::new(BracketPair::new(open, close).unwrap(), not_in.iter().copied())
    }

    fn no_tokens(_: usize) -> Option<LexicalToken> {
        None
    }

    fn engine() -> AutoClosePairEngine {
        AutoClosePairEngine::new(
            vec![
                pair("(", ")"),
                pair("[", "]"),
                pair_not_in("\"", "\"", &["string"]),
                pair_not_in("/**", " */", &["string"]),
            ],
            DEFAULT_AUTO_CLOSE_BEFORE,
        )
    }

    #[test]
    fn test_insert_with_close() {
        let decision = engine().decide("foo", 3, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
    }

    #[test]
    fn test_skip_over_close() {
        let decision = engine().decide("foo()", 4, ")", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::Suppress);
    }

    #[test]
    fn test_close_without_match_passes_through() {
        let decision = engine().decide("foo(x", 5, ")", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::PassThrough);
    }

    #[test]
    fn test_open_before_same_open_is_suppressed() {
        let decision = engine().decide("(", 0, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::Suppress);
    }

    #[test]
    fn test_quote_skip_over() {
        let decision = engine().decide("\"abc\"", 4, "\"", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::Suppress);
    }

    #[test]
    fn test_adjacent_word_denies_auto_close() {
        let decision = engine().decide("foox", 3, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::PassThrough);
    }

    #[test]
    fn test_auto_close_before_listed_char() {
        let decision = engine().decide("foo;", 3, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
        let decision = engine().decide("foo bar", 3, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
    }

    #[test]
    fn test_scope_denies_auto_close() {
        let engine = AutoClosePairEngine::new(vec![pair_not_in("(", ")", &["string"])], "");
        let in_string = |offset: usize| {
            assert_eq!(offset, 5);
            Some(LexicalToken::new(0, "source.js string.quoted.double.js"))
        };
        let decision = engine.decide("x = \"a", 6, "(", &in_string).unwrap();
        assert_eq!(decision, AutoCloseDecision::PassThrough);

        let in_code = |_: usize| Some(LexicalToken::new(0, "source.js meta.function"));
        let decision = engine.decide("x = \"a", 6, "(", &in_code).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
    }

    #[test]
    fn test_scope_kind_is_not_a_substring_match() {
        let token = LexicalToken::new(0, "source.js substring.example");
        let kinds: BTreeSet<String> = ["string".to_string()].into();
        assert!(!token.in_any_scope(&kinds));
    }

    #[test]
    fn test_dotted_scope_kind() {
        let token = LexicalToken::new(0, "source.ts comment.line.double-slash.ts");
        let kinds: BTreeSet<String> = ["comment.line".to_string()].into();
        assert!(token.in_any_scope(&kinds));
        let kinds: BTreeSet<String> = ["line.double-slash".to_string()].into();
        assert!(token.in_any_scope(&kinds));
        let kinds: BTreeSet<String> = ["comment.block".to_string()].into();
        assert!(!token.in_any_scope(&kinds));
        let kinds: BTreeSet<String> = ["ment.line".to_string()].into();
        assert!(!token.in_any_scope(&kinds));
    }

    #[test]
    fn test_failed_lookup_allows() {
        let engine = AutoClosePairEngine::new(vec![pair_not_in("(", ")", &["string"])], "");
        let decision = engine.decide("a", 1, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
        let decision = engine.decide("", 0, "(", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
    }

    #[test]
    fn test_line_start_skips_token_lookup() {
        let engine = AutoClosePairEngine::new(vec![pair_not_in("(", ")", &["comment"])], "");
        let comment = |_: usize| Some(LexicalToken::new(0, "comment.line"));
        let decision = engine.decide("// x\n", 5, "(", &comment).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(")".into()));
    }

    #[test]
    fn test_multi_char_opener() {
        let decision = engine().decide("/*", 2, "*", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::InsertWithClose(" */".into()));
        let decision = engine().decide("x*", 2, "*", &no_tokens).unwrap();
        assert_eq!(decision, AutoCloseDecision::PassThrough);
    }

    #[test]
    fn test_line_tokens_lookup() {
        let tokens = LineTokens::new(
            10,
            vec![
                LexicalToken::new(0, "source"),
                LexicalToken::new(4, "string.quoted"),
                LexicalToken::new(9, "source"),
            ],
        );
        assert_eq!(tokens.token_at(9), None);
        assert_eq!(tokens.token_at(10).unwrap().token_type, "source");
        assert_eq!(tokens.token_at(16).unwrap().token_type, "string.quoted");
        assert_eq!(tokens.token_at(19).unwrap().token_type, "source");
    }

    #[test]
    fn test_offset_contract() {
        assert!(engine().decide("ab", 3, "(", &no_tokens).is_err());
        assert!(engine().decide("é", 1, "(", &no_tokens).is_err());
        assert!(engine().decide_delete("ab", 3).is_err());
    }

    #[test]
    fn test_delete_empty_pair() {
        let decision = engine().decide_delete("foo()", 4).unwrap();
        assert_eq!(decision, AutoDeleteDecision::DeletePair { start: 3, length: 2 });
        let decision = engine().decide_delete("foo(x)", 5).unwrap();
        assert_eq!(decision, AutoDeleteDecision::PassThrough);
        let decision = engine().decide_delete("/** */", 3).unwrap();
        assert_eq!(decision, AutoDeleteDecision::DeletePair { start: 0, length: 6 });
    }
}
