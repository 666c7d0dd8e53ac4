//! On-enter rules and bracket indentation heuristics
//!
//! Evaluation order is fixed and first match wins:
//! 1. explicit `onEnterRules`, in configured order
//! 2. open bracket before the caret and its close bracket after it: indent-outdent
//! 3. open bracket before the caret: indent
//!
//! When nothing matches the caller applies its own default indentation.

use log::{trace, warn};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bracket::{BracketPair, ProcessedBracketPair};
use crate::document::Document;
use crate::error::LanguageConfigResult;
use crate::regex_utils::{compile_with_flags, find_in};

/// Indentation behavior applied on Enter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndentAction {
    /// Keep the current indentation
    None,
    /// Indent the new line one level
    Indent,
    /// Indent the new line and put the text after the caret on a line of its own
    IndentOutdent,
    /// Outdent the new line one level
    Outdent,
}

/// Action attached to an on-enter rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterAction {
    #[serde(rename = "indent")]
    pub indent_action: IndentAction,
    /// Text appended after the indentation of the new line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_text: Option<String>,
    /// Number of indentation characters removed from the new line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_text: Option<usize>,
}

impl EnterAction {
    pub fn new(indent_action: IndentAction) -> Self {
        Self {
            indent_action,
            append_text: None,
            remove_text: None,
        }
    }

    pub fn with_append_text(mut self, text: impl Into<String>) -> Self {
        self.append_text = Some(text.into());
        self
    }

    pub fn with_remove_text(mut self, count: usize) -> Self {
        self.remove_text = Some(count);
        self
    }
}

/// An enter action with the caret line's indentation filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnterAction {
    pub indent_action: IndentAction,
    pub append_text: String,
    pub remove_text: Option<usize>,
    pub indentation: String,
}

impl ResolvedEnterAction {
    /// Fills in defaults the way the enter action is applied.
    ///
    /// A missing `append_text` becomes one tab for `Indent` and
    /// `IndentOutdent`; an explicit one on `Indent` is prefixed with a tab.
    /// `remove_text` trims the end of `indentation`.
    pub fn new(action: &EnterAction, indentation: &str) -> Self {
        let append_text = match (&action.append_text, action.indent_action) {
            (None, IndentAction::Indent | IndentAction::IndentOutdent) => "\t".to_string(),
            (None, _) => String::new(),
            (Some(text), IndentAction::Indent) => format!("\t{text}"),
            (Some(text), _) => text.clone(),
        };
        let keep = indentation
            .chars()
            .count()
            .saturating_sub(action.remove_text.unwrap_or(0));
        Self {
            indent_action: action.indent_action,
            append_text,
            remove_text: action.remove_text,
            indentation: indentation.chars().take(keep).collect(),
        }
    }
}

/// A single entry of `onEnterRules`.
///
/// `before_text` must find a match in the text before the caret; the
/// optional patterns must also find a match in their inputs. Patterns are
/// used exactly as authored.
#[derive(Debug, Clone)]
pub struct OnEnterRule {
    before_text: Regex,
    after_text: Option<Regex>,
    previous_line_text: Option<Regex>,
    action: EnterAction,
}

impl OnEnterRule {
    pub fn new(before_text: Regex, action: EnterAction) -> Self {
        Self {
            before_text,
            after_text: None,
            previous_line_text: None,
            action,
        }
    }

    /// Compiles a rule from pattern strings
    pub fn from_patterns(
        before_text: &str,
        after_text: Option<&str>,
        previous_line_text: Option<&str>,
        action: EnterAction,
    ) -> LanguageConfigResult<Self> {
        let compile = |pattern: &str| compile_with_flags(pattern, "");
        Ok(Self {
            before_text: compile(before_text)?,
            after_text: after_text.map(compile).transpose()?,
            previous_line_text: previous_line_text.map(compile).transpose()?,
            action,
        })
    }

    pub fn with_after_text(mut self, pattern: Regex) -> Self {
        self.after_text = Some(pattern);
        self
    }

    pub fn with_previous_line_text(mut self, pattern: Regex) -> Self {
        self.previous_line_text = Some(pattern);
        self
    }

    pub fn action(&self) -> &EnterAction {
        &self.action
    }

    fn matches(&self, previous_line_text: &str, before_enter_text: &str, after_enter_text: &str) -> bool {
        find_in(&self.before_text, before_enter_text)
            && self
                .after_text
                .as_ref()
                .is_none_or(|re| find_in(re, after_enter_text))
            && self
                .previous_line_text
                .as_ref()
                .is_none_or(|re| find_in(re, previous_line_text))
    }
}

/// Decides the enter action for one language
#[derive(Debug, Clone)]
pub struct EnterRuleEngine {
    brackets: Vec<ProcessedBracketPair>,
    rules: Vec<OnEnterRule>,
}

impl EnterRuleEngine {
    /// Builds the engine; `None` brackets means `()`, `{}` and `[]`
    pub fn new(brackets: Option<&[BracketPair]>, rules: Vec<OnEnterRule>) -> Self {
        let defaults;
        let brackets = match brackets {
            Some(brackets) => brackets,
            None => {
                defaults = BracketPair::defaults();
                &defaults
            }
        };
        let brackets = brackets
            .iter()
            .filter_map(|pair| match ProcessedBracketPair::new(pair) {
                Ok(processed) => Some(processed),
                Err(err) => {
                    warn!(target: "language_config::on_enter", "skipping bracket pair {pair:?}: {err}");
                    None
                }
            })
            .collect();
        Self { brackets, rules }
    }

    pub fn rules(&self) -> &[OnEnterRule] {
        &self.rules
    }

    /// Enter action for the given text snapshots, or `None` to fall back
    pub fn decide(
        &self,
        previous_line_text: &str,
        before_enter_text: &str,
        after_enter_text: &str,
    ) -> Option<EnterAction> {
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.matches(previous_line_text, before_enter_text, after_enter_text))
        {
            trace!(target: "language_config::on_enter", "rule matched: {:?}", rule.action);
            return Some(rule.action.clone());
        }

        if !before_enter_text.is_empty() && !after_enter_text.is_empty() {
            let between = self.brackets.iter().any(|bracket| {
                bracket.match_open(before_enter_text) && bracket.match_close(after_enter_text)
            });
            if between {
                trace!(target: "language_config::on_enter", "caret between brackets");
                return Some(EnterAction::new(IndentAction::IndentOutdent));
            }
        }

        if !before_enter_text.is_empty()
            && self
                .brackets
                .iter()
                .any(|bracket| bracket.match_open(before_enter_text))
        {
            trace!(target: "language_config::on_enter", "caret after open bracket");
            return Some(EnterAction::new(IndentAction::Indent));
        }

        None
    }

    /// Derives the enter snapshots at `offset` and resolves the action
    pub fn resolve(
        &self,
        document: &Document<'_>,
        offset: usize,
    ) -> LanguageConfigResult<Option<ResolvedEnterAction>> {
        let row = document.line_of_offset(offset)?;
        let (before_enter_text, after_enter_text) = document.split_line_at(offset)?;
        let previous_line_text = match row {
            0 => "",
            _ => document.line_text(row - 1).unwrap_or_default(),
        };
        let indentation = document.leading_whitespace_at(offset)?;

        Ok(self
            .decide(previous_line_text, before_enter_text, after_enter_text)
            .map(|action| ResolvedEnterAction::new(&action, indentation)))
    }
}
