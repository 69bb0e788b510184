mod tests;
mod utils;

pub use utils::*;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{MendError, Result};
use crate::tools::repair::{repair_text, RepairConfig, MAX_PASSES};

/// Glyphs stripped before repair: the replacement character and the bullet.
pub const DEFAULT_PLACEHOLDER_GLYPHS: [&str; 2] = ["\u{FFFD}", "\u{2022}"];

/// Placeholder glyphs that survive repair and carry no meaning.
///
/// The default list is deliberately short. Grow it with
/// [`PlaceholderGlyphs::with_glyph`] or through the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceholderGlyphs(Vec<String>);

impl Default for PlaceholderGlyphs {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_GLYPHS)
    }
}

impl PlaceholderGlyphs {
    pub fn new<I, S>(glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        glyphs
            .into_iter()
            .fold(Self(Vec::new()), |set, glyph| set.with_glyph(glyph))
    }

    /// Add a glyph. Empty strings and duplicates are ignored.
    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        let glyph = glyph.into();
        if !glyph.is_empty() && !self.0.contains(&glyph) {
            self.0.push(glyph);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Remove every occurrence of every glyph.
    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(text);
        for glyph in self.iter().filter(|g| !g.is_empty()) {
            if result.contains(glyph) {
                result = Cow::Owned(result.replace(glyph, ""));
            }
        }
        result
    }
}

/// Options for [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Drop every character above U+007F from the output.
    pub restrict_to_ascii: bool,
    pub placeholder_glyphs: PlaceholderGlyphs,
    pub repair: RepairConfig,
}

impl CleanOptions {
    pub fn ascii() -> Self {
        Self {
            restrict_to_ascii: true,
            ..Default::default()
        }
    }
}

/// Normalize text into one clean line.
///
/// Performs the following operations in order:
/// 1. Remove placeholder glyphs (`�`, `•` by default)
/// 2. Repair encoding and Unicode problems (see [`repair_text`])
/// 3. Keep only ASCII, if `restrict_to_ascii` is set
/// 4. Turn line breaks into spaces
/// 5. Collapse whitespace runs into one space
/// 6. Trim
///
/// The steps are repeated until the text stops changing. Folding a line
/// break or dropping a glyph can expose new mojibake or a new entity, and
/// the output must be its own normalization.
///
/// # Examples
/// ```
/// use textmend::tools::clean::{normalize, CleanOptions};
///
/// let opts = CleanOptions::default();
/// assert_eq!(normalize("schÃ¶n   &amp;\r\nmore", &opts).unwrap(), "schön & more");
/// assert_eq!(normalize("héllo", &CleanOptions::ascii()).unwrap(), "hllo");
/// ```
pub fn normalize(text: &str, opts: &CleanOptions) -> Result<String> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let mut current = clean_pass(text, opts)?;
    for pass in 1..=MAX_PASSES {
        let next = clean_pass(&current, opts)?;
        if next == current {
            return Ok(current);
        }
        trace!(pass, before = %current, after = %next, "clean pass");
        current = next;
    }
    Err(MendError::Unsettled { passes: MAX_PASSES })
}

fn clean_pass(text: &str, opts: &CleanOptions) -> Result<String> {
    let stripped = opts.placeholder_glyphs.strip(text);
    let repaired = repair_text(&stripped, &opts.repair)?;
    let repaired = opts.placeholder_glyphs.strip(&repaired).into_owned();

    let restricted = if opts.restrict_to_ascii {
        match to_narrow_charset(&repaired) {
            Ok(ascii) => ascii,
            Err(e) => {
                debug!(error = %e, "ascii restriction failed; keeping repaired text");
                repaired
            }
        }
    } else {
        repaired
    };

    Ok(normalize_whitespace(&fold_line_breaks(&restricted)))
}

/// Normalize a JSON value.
///
/// Non-empty strings are normalized; everything else, including `""`, is
/// returned unchanged.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use textmend::tools::clean::{normalize_value, CleanOptions};
///
/// let opts = CleanOptions::default();
/// assert_eq!(normalize_value(json!(42), &opts).unwrap(), json!(42));
/// assert_eq!(normalize_value(json!(" a  b "), &opts).unwrap(), json!("a b"));
/// ```
pub fn normalize_value(value: Value, opts: &CleanOptions) -> Result<Value> {
    match value {
        Value::String(s) if !s.is_empty() => normalize(&s, opts).map(Value::String),
        other => Ok(other),
    }
}

/// Clean text with the default options.
///
/// # Examples
/// ```
/// use textmend::tools::clean::clean_text;
///
/// let dirty = "Hello &amp; &#39;world&#39;   with   spaces";
/// assert_eq!(clean_text(dirty).unwrap(), "Hello & 'world' with spaces");
/// ```
pub fn clean_text(text: &str) -> Result<String> {
    normalize(text, &CleanOptions::default())
}

/// Clean text with the default options, keeping only ASCII.
pub fn clean_text_ascii(text: &str) -> Result<String> {
    normalize(text, &CleanOptions::ascii())
}
