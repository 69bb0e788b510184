//! Text Repair
//!
//! Undo mojibake and clean up the Unicode leftovers of careless text
//! handling. Every behaviour is a field of [`RepairConfig`]; the default
//! value turns all of them on.

mod badness;
mod codecs;
mod fixes;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;

use crate::error::{MendError, Result};
use badness::is_bad;
use codecs::{decode_utf16_lossy, decode_utf8_variants, Charmap};

pub use badness::badness;
pub use fixes::{
    fix_c1_controls, fix_character_width, fix_latin_ligatures, fix_line_breaks,
    remove_control_chars, remove_terminal_escapes, uncurl_quotes, unescape_html,
};

/// A segment that still changes after this many passes is reported as
/// [`MendError::Unsettled`].
pub const MAX_PASSES: usize = 16;

/// Unicode normalization form applied as the last repair step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Normalization {
    #[default]
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
    None,
}

impl Normalization {
    fn apply(self, text: &str) -> String {
        match self {
            Normalization::Nfc => text.nfc().collect(),
            Normalization::Nfd => text.nfd().collect(),
            Normalization::Nfkc => text.nfkc().collect(),
            Normalization::Nfkd => text.nfkd().collect(),
            Normalization::None => text.to_string(),
        }
    }
}

/// The repair bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Decode HTML/XML character references (`&amp;`, `&#233;`, `&EACUTE;`).
    pub unescape_html: bool,
    /// Strip ANSI terminal escapes such as colour codes.
    pub remove_terminal_escapes: bool,
    /// Re-encode mojibake with the charmap it was wrongly decoded with and
    /// decode it as UTF-8.
    pub fix_encoding: bool,
    /// While fixing encoding, put back `0xA0` bytes that became spaces.
    pub restore_byte_a0: bool,
    /// While fixing encoding, turn sequences that lost bytes into one U+FFFD.
    pub replace_lossy_sequences: bool,
    /// While fixing encoding, fix mojibake runs embedded in sound text.
    pub decode_inconsistent_utf8: bool,
    /// Join surrogate pairs from numeric references and CESU-8 bytes.
    pub fix_surrogates: bool,
    /// Read leftover C1 controls as Windows-1252.
    pub fix_c1_controls: bool,
    /// `ﬁ` → `fi`.
    pub fix_latin_ligatures: bool,
    /// Full-width and half-width forms → standard width.
    pub fix_character_width: bool,
    /// Curly quotes → straight quotes.
    pub uncurl_quotes: bool,
    /// CRLF, CR, U+2028, U+2029, U+0085 → `\n`.
    pub fix_line_breaks: bool,
    /// Drop control characters other than `\t`, `\n`, `\f`, `\r`.
    pub remove_control_chars: bool,
    pub normalization: Normalization,
    /// Lines longer than this many bytes skip `fix_encoding`.
    pub max_decode_length: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            unescape_html: true,
            remove_terminal_escapes: true,
            fix_encoding: true,
            restore_byte_a0: true,
            replace_lossy_sequences: true,
            decode_inconsistent_utf8: true,
            fix_surrogates: true,
            fix_c1_controls: true,
            fix_latin_ligatures: true,
            fix_character_width: true,
            uncurl_quotes: true,
            fix_line_breaks: true,
            remove_control_chars: true,
            normalization: Normalization::Nfc,
            max_decode_length: 1_000_000,
        }
    }
}

/// Repair encoding problems and Unicode leftovers in `text`.
///
/// Each line is repaired on its own, and the fixes are repeated until the
/// line stops changing, so nested escapes like `&AMP;AMP;` unwind fully.
///
/// # Examples
/// ```
/// use textmend::tools::repair::{repair_text, RepairConfig};
///
/// let config = RepairConfig::default();
/// assert_eq!(repair_text("schÃ¶n", &config).unwrap(), "schön");
/// assert_eq!(
///     repair_text("L&AMP;AMP;ATILDE;&AMP;AMP;SUP3;PEZ", &config).unwrap(),
///     "LóPEZ"
/// );
/// ```
pub fn repair_text(text: &str, config: &RepairConfig) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_inclusive('\n') {
        out.push_str(&repair_segment(segment, config)?);
    }
    Ok(out)
}

/// Decode UTF-16 code units and repair the result. Unpaired surrogates
/// become U+FFFD.
pub fn repair_utf16(units: &[u16], config: &RepairConfig) -> Result<String> {
    repair_text(&decode_utf16_lossy(units), config)
}

fn repair_segment(segment: &str, config: &RepairConfig) -> Result<String> {
    let decode = segment.len() <= config.max_decode_length;
    if !decode {
        debug!(
            len = segment.len(),
            max = config.max_decode_length,
            "segment too long; skipping encoding repair"
        );
    }

    let mut text = segment.to_string();
    for pass in 1..=MAX_PASSES {
        let fixed = apply_fixes(&text, config, decode);
        if fixed == text {
            return Ok(text);
        }
        trace!(pass, before = %text, after = %fixed, "repair pass");
        text = fixed;
    }
    Err(MendError::Unsettled { passes: MAX_PASSES })
}

fn apply_fixes(text: &str, config: &RepairConfig, decode: bool) -> String {
    let mut text = Cow::Borrowed(text);
    if config.unescape_html {
        text = Cow::Owned(unescape_html(&text, config.fix_surrogates).into_owned());
    }
    if config.remove_terminal_escapes {
        text = Cow::Owned(remove_terminal_escapes(&text).into_owned());
    }
    if config.fix_encoding && decode {
        text = Cow::Owned(fix_encoding(&text, config));
    }
    if config.fix_c1_controls {
        text = Cow::Owned(fix_c1_controls(&text).into_owned());
    }
    if config.fix_latin_ligatures {
        text = Cow::Owned(fix_latin_ligatures(&text).into_owned());
    }
    if config.fix_character_width {
        text = Cow::Owned(fix_character_width(&text).into_owned());
    }
    if config.uncurl_quotes {
        text = Cow::Owned(uncurl_quotes(&text).into_owned());
    }
    if config.fix_line_breaks {
        text = Cow::Owned(fix_line_breaks(&text).into_owned());
    }
    if config.remove_control_chars {
        text = Cow::Owned(remove_control_chars(&text).into_owned());
    }
    config.normalization.apply(&text)
}

/// Undo mojibake, one decoding at a time, until nothing looks wrong.
///
/// # Examples
/// ```
/// use textmend::tools::repair::{fix_encoding, RepairConfig};
///
/// let config = RepairConfig::default();
/// assert_eq!(fix_encoding("â€œquotedâ€\u{9d}", &config), "“quoted”");
/// assert_eq!(fix_encoding("plain text", &config), "plain text");
/// ```
pub fn fix_encoding(text: &str, config: &RepairConfig) -> String {
    let mut text = text.to_string();
    for _ in 0..MAX_PASSES {
        let fixed = match fix_encoding_step(&text, config) {
            Cow::Borrowed(_) => break,
            Cow::Owned(fixed) => fixed,
        };
        if fixed == text {
            break;
        }
        text = fixed;
    }
    text
}

fn fix_encoding_step<'a>(text: &'a str, config: &RepairConfig) -> Cow<'a, str> {
    if text.is_ascii() || !is_bad(text) {
        return Cow::Borrowed(text);
    }

    for charmap in Charmap::ALL {
        let lossy = config.replace_lossy_sequences
            && charmap.is_sloppy()
            && !text.contains('\u{1A}');
        let encoded = if lossy {
            charmap.encode_lossy(text)
        } else {
            charmap.encode(text)
        };
        let Some(mut bytes) = encoded else {
            continue;
        };
        if config.restore_byte_a0 {
            bytes = fixes::restore_byte_a0(&bytes).into_owned();
        }
        if lossy {
            bytes = fixes::replace_lossy_sequences(&bytes).into_owned();
        }
        if let Some(fixed) = decode_utf8_variants(&bytes, config.fix_surrogates) {
            trace!(charmap = charmap.name(), "decoded mojibake as utf-8");
            return Cow::Owned(fixed);
        }
    }

    if config.decode_inconsistent_utf8 {
        if let Cow::Owned(fixed) = fixes::decode_inconsistent_utf8(text, config.fix_surrogates) {
            trace!("decoded embedded mojibake runs");
            return Cow::Owned(fixed);
        }
    }

    // Latin-1 with C1 controls: the text was meant as Windows-1252.
    if let Some(bytes) = Charmap::Latin1.encode(text) {
        if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
            return Cow::Owned(Charmap::SloppyWindows1252.decode(&bytes));
        }
    }

    Cow::Borrowed(text)
}
