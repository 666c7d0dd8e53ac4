//! Indentation settings and whitespace normalization

use serde::{Deserialize, Serialize};

use crate::error::{LanguageConfigError, LanguageConfigResult};

const DEFAULT_TAB_WIDTH: usize = 4;
const DEFAULT_INSERT_SPACES: bool = true;

/// Effective tab width and tabs-vs-spaces policy for one edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndentSettings {
    tab_width: usize,
    insert_spaces: bool,
}

impl IndentSettings {
    /// Creates settings, rejecting a zero tab width
    pub fn new(tab_width: usize, insert_spaces: bool) -> LanguageConfigResult<Self> {
        if tab_width == 0 {
            return Err(LanguageConfigError::InvalidTabWidth(tab_width));
        }
        Ok(Self {
            tab_width,
            insert_spaces,
        })
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    pub fn insert_spaces(&self) -> bool {
        self.insert_spaces
    }

    /// One level of indentation as it would be typed
    pub fn indent_unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_width)
        } else {
            "\t".to_string()
        }
    }
}

impl Default for IndentSettings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            insert_spaces: DEFAULT_INSERT_SPACES,
        }
    }
}

/// Indentation preferences from one store (editor-local or global).
///
/// Unset fields fall through to the next store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentPreferences {
    #[serde(default)]
    pub tab_width: Option<usize>,
    #[serde(default)]
    pub insert_spaces: Option<bool>,
}

impl IndentPreferences {
    /// Resolves these (editor) preferences against the global store
    pub fn resolve(&self, global: &IndentPreferences) -> LanguageConfigResult<IndentSettings> {
        let tab_width = self
            .tab_width
            .or(global.tab_width)
            .unwrap_or(DEFAULT_TAB_WIDTH);
        let insert_spaces = self
            .insert_spaces
            .or(global.insert_spaces)
            .unwrap_or(DEFAULT_INSERT_SPACES);
        IndentSettings::new(tab_width, insert_spaces)
    }
}

fn is_indent_char(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// The space/tab prefix of `text`
pub fn leading_whitespace(text: &str) -> &str {
    let end = text.find(|ch| !is_indent_char(ch)).unwrap_or(text.len());
    &text[..end]
}

/// Re-expresses the whitespace prefix of `text` under `settings`.
///
/// A tab counts as `tab_width` columns. The non-whitespace suffix is kept
/// as is.
pub fn normalize_indentation(text: &str, settings: &IndentSettings) -> String {
    let prefix = leading_whitespace(text);
    let mut columns: usize = prefix
        .chars()
        .map(|ch| if ch == '\t' { settings.tab_width } else { 1 })
        .sum();

    let mut result = String::with_capacity(text.len());
    if !settings.insert_spaces {
        result.extend(std::iter::repeat('\t').take(columns / settings.tab_width));
        columns %= settings.tab_width;
    }
    result.extend(std::iter::repeat(' ').take(columns));
    result.push_str(&text[prefix.len()..]);
    result
}

/// Removes one indentation level from the front of `text`, if present
pub fn outdent<'a>(text: &'a str, settings: &IndentSettings) -> &'a str {
    if let Some(rest) = text.strip_prefix('\t') {
        return rest;
    }
    if settings.insert_spaces {
        if let Some(rest) = text.strip_prefix(settings.indent_unit().as_str()) {
            return rest;
        }
    }
    text
}

/// Longest prefix of `whitespace` made of whole indentation units
pub fn indentation_from_whitespace<'a>(whitespace: &'a str, settings: &IndentSettings) -> &'a str {
    let spaces = " ".repeat(settings.tab_width);
    let mut rest = whitespace;
    loop {
        if let Some(next) = rest.strip_prefix('\t') {
            rest = next;
        } else if settings.insert_spaces && rest.starts_with(spaces.as_str()) {
            rest = &rest[spaces.len()..];
        } else {
            break;
        }
    }
    &whitespace[..whitespace.len() - rest.len()]
}
