//! `language-configuration.json` model
//!
//! Files are JSON with comments and trailing commas, as shipped by VSCode
//! language extensions, and are parsed with `json5`.
//!
//! Only the keys that drive editing assistance are read: `brackets`,
//! `autoClosingPairs`, `autoCloseBefore` and `onEnterRules`. Other keys are
//! ignored. A malformed entry is logged and skipped so one bad rule never
//! disables the rest of the language.

use std::fs;
use std::io::Read;
use std::path::Path;

use fancy_regex::Regex;
use log::{debug, warn};
use serde::Deserialize;

use crate::auto_close::{AutoClosePairEngine, DEFAULT_AUTO_CLOSE_BEFORE};
use crate::bracket::{AutoClosingPairConditional, BracketPair};
use crate::error::LanguageConfigResult;
use crate::on_enter::{EnterAction, EnterRuleEngine, OnEnterRule};
use crate::regex_utils::compile_with_flags;

/// A pattern, either a bare source string or `{ "pattern", "flags" }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternEntry {
    Source(String),
    WithFlags {
        pattern: String,
        #[serde(default)]
        flags: String,
    },
}

impl PatternEntry {
    pub fn compile(&self) -> LanguageConfigResult<Regex> {
        match self {
            PatternEntry::Source(pattern) => compile_with_flags(pattern, ""),
            PatternEntry::WithFlags { pattern, flags } => compile_with_flags(pattern, flags),
        }
    }
}

/// One `onEnterRules` entry, before compilation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnEnterRuleEntry {
    pub before_text: PatternEntry,
    #[serde(default)]
    pub after_text: Option<PatternEntry>,
    #[serde(default)]
    pub previous_line_text: Option<PatternEntry>,
    pub action: EnterAction,
}

impl OnEnterRuleEntry {
    pub fn compile(&self) -> LanguageConfigResult<OnEnterRule> {
        let mut rule = OnEnterRule::new(self.before_text.compile()?, self.action.clone());
        if let Some(after_text) = &self.after_text {
            rule = rule.with_after_text(after_text.compile()?);
        }
        if let Some(previous_line_text) = &self.previous_line_text {
            rule = rule.with_previous_line_text(previous_line_text.compile()?);
        }
        Ok(rule)
    }
}

/// One `autoClosingPairs` entry: `["(", ")"]` or `{ "open", "close", "notIn" }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AutoClosingPairEntry {
    Pair(String, String),
    Conditional {
        open: String,
        close: String,
        #[serde(default, rename = "notIn")]
        not_in: Vec<String>,
    },
}

impl AutoClosingPairEntry {
    pub fn build(&self) -> LanguageConfigResult<AutoClosingPairConditional> {
        match self {
            AutoClosingPairEntry::Pair(open, close) => Ok(AutoClosingPairConditional::unconditional(
                BracketPair::new(open.as_str(), close.as_str())?,
            )),
            AutoClosingPairEntry::Conditional {
                open,
                close,
                not_in,
            } => Ok(AutoClosingPairConditional::new(
                BracketPair::new(open.as_str(), close.as_str())?,
                not_in.iter().cloned(),
            )),
        }
    }
}

/// Editing-assistance part of a language configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfiguration {
    #[serde(default)]
    pub brackets: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub auto_closing_pairs: Option<Vec<AutoClosingPairEntry>>,
    #[serde(default)]
    pub auto_close_before: Option<String>,
    #[serde(default)]
    pub on_enter_rules: Option<Vec<OnEnterRuleEntry>>,
}

impl LanguageConfiguration {
    pub fn from_json_str(json: &str) -> LanguageConfigResult<Self> {
        Ok(json5::from_str(json)?)
    }

    pub fn from_reader(mut reader: impl Read) -> LanguageConfigResult<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    /// Reads a `language-configuration.json` file
    pub fn load(path: impl AsRef<Path>) -> LanguageConfigResult<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(target: "language_config::config", "loaded {}", path.display());
        Ok(config)
    }

    /// Valid configured brackets, `None` if the key is absent
    pub fn bracket_pairs(&self) -> Option<Vec<BracketPair>> {
        self.brackets.as_ref().map(|brackets| {
            brackets
                .iter()
                .filter_map(|(open, close)| match BracketPair::new(open.as_str(), close.as_str()) {
                    Ok(pair) => Some(pair),
                    Err(err) => {
                        warn!(target: "language_config::config", "skipping bracket: {err}");
                        None
                    }
                })
                .collect()
        })
    }

    /// Valid compiled `onEnterRules`, in configured order
    pub fn on_enter_rules(&self) -> Vec<OnEnterRule> {
        self.on_enter_rules
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(index, entry)| match entry.compile() {
                Ok(rule) => Some(rule),
                Err(err) => {
                    warn!(target: "language_config::config", "skipping onEnterRules[{index}]: {err}");
                    None
                }
            })
            .collect()
    }

    /// Auto-closing pairs; falls back to `brackets` when none are configured
    pub fn auto_closing_pairs(&self) -> Vec<AutoClosingPairConditional> {
        match &self.auto_closing_pairs {
            Some(entries) => entries
                .iter()
                .filter_map(|entry| match entry.build() {
                    Ok(pair) => Some(pair),
                    Err(err) => {
                        warn!(target: "language_config::config", "skipping auto-closing pair: {err}");
                        None
                    }
                })
                .collect(),
            None => self
                .bracket_pairs()
                .unwrap_or_default()
                .into_iter()
                .map(AutoClosingPairConditional::unconditional)
                .collect(),
        }
    }

    pub fn auto_close_before(&self) -> &str {
        self.auto_close_before
            .as_deref()
            .unwrap_or(DEFAULT_AUTO_CLOSE_BEFORE)
    }

    pub fn enter_rule_engine(&self) -> EnterRuleEngine {
        let brackets = self.bracket_pairs();
        let engine = EnterRuleEngine::new(brackets.as_deref(), self.on_enter_rules());
        debug!(target: "language_config::config", "enter engine with {} rules", engine.rules().len());
        engine
    }

    pub fn auto_close_pair_engine(&self) -> AutoClosePairEngine {
        let engine = AutoClosePairEngine::new(self.auto_closing_pairs(), self.auto_close_before());
        debug!(target: "language_config::config", "auto-close engine with {} pairs", engine.pairs().len());
        engine
    }
}
