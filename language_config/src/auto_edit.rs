//! Command customization for the host editor
//!
//! Turns a pending keystroke (text typed at an offset) into the edit the
//! host should apply, using the enter and auto-close engines of one
//! language. The host applies `EditCommand` as is and places the caret at
//! `caret_offset` when `shifts_caret` is false.

use log::trace;

use crate::auto_close::{AutoCloseDecision, AutoClosePairEngine, AutoDeleteDecision, TokenSource};
use crate::config::LanguageConfiguration;
use crate::document::{check_offset, Document};
use crate::error::LanguageConfigResult;
use crate::indentation::{indentation_from_whitespace, normalize_indentation, outdent, IndentSettings};
use crate::on_enter::{EnterRuleEngine, IndentAction, ResolvedEnterAction};

/// Edit requested from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommand {
    /// Start of the replaced range
    pub offset: usize,
    /// Length of the replaced range
    pub length: usize,
    /// Replacement text
    pub text: String,
    /// Caret position after the edit
    pub caret_offset: usize,
    /// Whether the host should move the caret itself
    pub shifts_caret: bool,
}

impl EditCommand {
    /// Plain insertion, the host tracks the caret
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            offset,
            length: 0,
            caret_offset: offset + text.len(),
            text,
            shifts_caret: true,
        }
    }

    fn placed(offset: usize, length: usize, text: String, caret_offset: usize) -> Self {
        Self {
            offset,
            length,
            text,
            caret_offset,
            shifts_caret: false,
        }
    }
}

/// Whether `text` is a line delimiter, i.e. the Enter key
pub fn is_line_delimiter(text: &str) -> bool {
    matches!(text, "\n" | "\r\n" | "\r")
}

/// Text inserted for an enter action and the caret position within it
pub fn realize_enter(
    delimiter: &str,
    action: &ResolvedEnterAction,
    settings: &IndentSettings,
) -> (String, usize) {
    match action.indent_action {
        IndentAction::None | IndentAction::Indent => {
            let increased = normalize_indentation(
                &format!("{}{}", action.indentation, action.append_text),
                settings,
            );
            let text = format!("{delimiter}{increased}");
            let caret = text.len();
            (text, caret)
        }
        IndentAction::IndentOutdent => {
            let normal = normalize_indentation(&action.indentation, settings);
            let increased = normalize_indentation(
                &format!("{}{}", action.indentation, action.append_text),
                settings,
            );
            let caret = delimiter.len() + increased.len();
            (format!("{delimiter}{increased}{delimiter}{normal}"), caret)
        }
        IndentAction::Outdent => {
            let indentation = indentation_from_whitespace(&action.indentation, settings);
            let normalized = normalize_indentation(
                &format!("{indentation}{}", action.append_text),
                settings,
            );
            let text = format!("{delimiter}{}", outdent(&normalized, settings));
            let caret = text.len();
            (text, caret)
        }
    }
}

/// Editing assistance for one language
#[derive(Debug, Clone)]
pub struct LanguageAutoEdit {
    enter: EnterRuleEngine,
    auto_close: AutoClosePairEngine,
}

impl LanguageAutoEdit {
    pub fn new(enter: EnterRuleEngine, auto_close: AutoClosePairEngine) -> Self {
        Self { enter, auto_close }
    }

    pub fn from_configuration(config: &LanguageConfiguration) -> Self {
        Self::new(config.enter_rule_engine(), config.auto_close_pair_engine())
    }

    pub fn enter_engine(&self) -> &EnterRuleEngine {
        &self.enter
    }

    pub fn auto_close_engine(&self) -> &AutoClosePairEngine {
        &self.auto_close
    }

    /// Customizes `typed` inserted at `offset` of `text`
    pub fn customize(
        &self,
        text: &str,
        offset: usize,
        typed: &str,
        settings: &IndentSettings,
        tokens: &dyn TokenSource,
    ) -> LanguageConfigResult<EditCommand> {
        if typed.is_empty() {
            check_offset(text, offset)?;
            return Ok(EditCommand::insert(offset, ""));
        }
        if is_line_delimiter(typed) {
            return self.on_enter(text, offset, typed, settings);
        }

        let command = match self.auto_close.decide(text, offset, typed, tokens)? {
            AutoCloseDecision::PassThrough => EditCommand::insert(offset, typed),
            AutoCloseDecision::Suppress => {
                EditCommand::placed(offset, 0, String::new(), offset + typed.len())
            }
            AutoCloseDecision::InsertWithClose(close) => {
                EditCommand::placed(offset, 0, format!("{typed}{close}"), offset + typed.len())
            }
        };
        Ok(command)
    }

    /// Edit for a backspace with the caret at `caret`, `None` at the document start
    pub fn on_backspace(&self, text: &str, caret: usize) -> LanguageConfigResult<Option<EditCommand>> {
        let decision = self.auto_close.decide_delete(text, caret)?;
        let Some(previous) = text[..caret].chars().next_back() else {
            return Ok(None);
        };

        let command = match decision {
            AutoDeleteDecision::DeletePair { start, length } => {
                trace!(target: "language_config::auto_edit", "deleting pair at {start}");
                EditCommand::placed(start, length, String::new(), start)
            }
            AutoDeleteDecision::PassThrough => {
                let start = caret - previous.len_utf8();
                EditCommand {
                    offset: start,
                    length: previous.len_utf8(),
                    text: String::new(),
                    caret_offset: start,
                    shifts_caret: true,
                }
            }
        };
        Ok(Some(command))
    }

    fn on_enter(
        &self,
        text: &str,
        offset: usize,
        delimiter: &str,
        settings: &IndentSettings,
    ) -> LanguageConfigResult<EditCommand> {
        let document = Document::new(text);
        match self.enter.resolve(&document, offset)? {
            Some(action) => {
                trace!(target: "language_config::auto_edit", "enter action {:?}", action.indent_action);
                let (inserted, caret) = realize_enter(delimiter, &action, settings);
                Ok(EditCommand::placed(offset, 0, inserted, offset + caret))
            }
            None => {
                // Keep the caret line's indentation
                let indentation = document.leading_whitespace_at(offset)?;
                Ok(EditCommand::insert(offset, format!("{delimiter}{indentation}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auto_close::LexicalToken;

    const CONFIG: &str = r#"{
        "brackets": [["{", "}"], ["(", ")"]],
        "autoClosingPairs": [
            ["{", "}"],
            ["(", ")"],
            { "open": "\"", "close": "\"", "notIn": ["string"] }
        ],
        "onEnterRules": [
            {
                "beforeText": "^\\s*/\\*\\*[^*]*$",
                "afterText": "^\\s*\\*/$",
                "action": { "indent": "indentOutdent", "appendText": " * " }
            },
            {
                "beforeText": "^\\s*(return|break)\\b.*$",
                "action": { "indent": "outdent" }
            }
        ]
    }"#;

    fn auto_edit() -> LanguageAutoEdit {
        LanguageAutoEdit::from_configuration(&LanguageConfiguration::from_json_str(CONFIG).unwrap())
    }

    fn spaces() -> IndentSettings {
        IndentSettings::new(4, true).unwrap()
    }

    fn no_tokens(_: usize) -> Option<LexicalToken> {
        None
    }

    fn resolved(indent_action: IndentAction, append_text: &str, indentation: &str) -> ResolvedEnterAction {
        ResolvedEnterAction {
            indent_action,
            append_text: append_text.to_string(),
            remove_text: None,
            indentation: indentation.to_string(),
        }
    }

    #[test]
    fn test_realize_indent_round_trip() {
        let action = resolved(IndentAction::Indent, "", "\t");
        let (text, caret) = realize_enter("\n", &action, &spaces());
        assert_eq!(text, "\n    ");
        assert_eq!(caret, 5);

        let tabs = IndentSettings::new(4, false).unwrap();
        assert_eq!(normalize_indentation(&text[1..], &tabs), "\t");
    }

    #[test]
    fn test_realize_indent_outdent() {
        let action = resolved(IndentAction::IndentOutdent, "\t", "  ");
        let (text, caret) = realize_enter("\n", &action, &spaces());
        assert_eq!(text, "\n      \n  ");
        assert_eq!(caret, 7);
    }

    #[test]
    fn test_realize_outdent() {
        let action = resolved(IndentAction::Outdent, "", "        ");
        let (text, _) = realize_enter("\n", &action, &spaces());
        assert_eq!(text, "\n    ");

        let action = resolved(IndentAction::Outdent, "", "");
        let (text, _) = realize_enter("\r\n", &action, &spaces());
        assert_eq!(text, "\r\n");
    }

    #[test]
    fn test_enter_between_braces() {
        let text = "fn main() {}";
        let command = auto_edit()
            .customize(text, 11, "\n", &spaces(), &no_tokens)
            .unwrap();
        assert_eq!(command.text, "\n    \n");
        assert_eq!(command.caret_offset, 16);
        assert!(!command.shifts_caret);
    }

    #[test]
    fn test_enter_after_open_brace_with_tabs() {
        let text = "\tif x {";
        let tabs = IndentSettings::new(4, false).unwrap();
        let command = auto_edit()
            .customize(text, text.len(), "\n", &tabs, &no_tokens)
            .unwrap();
        assert_eq!(command.text, "\n\t\t");
    }

    #[test]
    fn test_enter_in_doc_comment() {
        let text = "  /** */";
        let command = auto_edit().customize(text, 5, "\n", &spaces(), &no_tokens).unwrap();
        assert_eq!(command.text, "\n   * \n  ");
        assert_eq!(command.caret_offset, 5 + "\n   * ".len());
    }

    #[test]
    fn test_enter_outdent_rule() {
        let text = "        return x;";
        let command = auto_edit()
            .customize(text, text.len(), "\n", &spaces(), &no_tokens)
            .unwrap();
        assert_eq!(command.text, "\n    ");
    }

    #[test]
    fn test_enter_fallback_keeps_indentation() {
        let text = "    let x = 1;";
        let command = auto_edit()
            .customize(text, text.len(), "\n", &spaces(), &no_tokens)
            .unwrap();
        assert_eq!(command, EditCommand::insert(text.len(), "\n    "));
    }

    #[test]
    fn test_typed_open_bracket() {
        let command = auto_edit().customize("foo", 3, "(", &spaces(), &no_tokens).unwrap();
        assert_eq!(command.text, "()");
        assert_eq!(command.caret_offset, 4);
        assert!(!command.shifts_caret);
    }

    #[test]
    fn test_typed_close_bracket_skips_over() {
        let command = auto_edit().customize("foo()", 4, ")", &spaces(), &no_tokens).unwrap();
        assert_eq!(command.text, "");
        assert_eq!(command.caret_offset, 5);
        assert!(!command.shifts_caret);
    }

    #[test]
    fn test_quote_in_string_passes_through() {
        let in_string = |_: usize| Some(LexicalToken::new(0, "string.quoted"));
        let command = auto_edit().customize("\"ab", 3, "\"", &spaces(), &in_string).unwrap();
        assert_eq!(command, EditCommand::insert(3, "\""));
    }

    #[test]
    fn test_plain_character() {
        let command = auto_edit().customize("foo", 3, "x", &spaces(), &no_tokens).unwrap();
        assert_eq!(command, EditCommand::insert(3, "x"));
    }

    #[test]
    fn test_empty_typed_text_is_noop() {
        let command = auto_edit().customize("foo", 1, "", &spaces(), &no_tokens).unwrap();
        assert_eq!(command, EditCommand::insert(1, ""));
        assert!(auto_edit().customize("foo", 9, "", &spaces(), &no_tokens).is_err());
    }

    #[test]
    fn test_backspace() {
        let edit = auto_edit();
        let command = edit.on_backspace("foo()", 4).unwrap().unwrap();
        assert_eq!(command.offset, 3);
        assert_eq!(command.length, 2);
        assert_eq!(command.caret_offset, 3);

        let command = edit.on_backspace("foé", 4).unwrap().unwrap();
        assert_eq!(command.offset, 2);
        assert_eq!(command.length, 2);

        assert_eq!(edit.on_backspace("foo", 0).unwrap(), None);
        assert!(edit.on_backspace("foo", 7).is_err());
    }
}
