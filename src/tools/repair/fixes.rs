//! Individual repair steps. Each one borrows when it has nothing to do.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::badness::utf8_runs;
use super::codecs::{
    decode_utf8_variants, is_continuation, utf8_tail_len, Charmap, SUBSTITUTE,
};

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

static HTML_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#?[0-9A-Za-z]{1,24};").expect("valid regex"));

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid regex"));

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\r\n|\r|\u{2028}|\u{2029}|\u{85}").expect("valid regex")
});

/// Latin ligatures and what they stand for.
const LIGATURES: [(char, &str); 24] = [
    ('\u{0132}', "IJ"),
    ('\u{0133}', "ij"),
    ('\u{013F}', "L\u{B7}"),
    ('\u{0140}', "l\u{B7}"),
    ('\u{0149}', "\u{2BC}n"),
    ('\u{01C4}', "D\u{17D}"),
    ('\u{01C5}', "D\u{17E}"),
    ('\u{01C6}', "d\u{17E}"),
    ('\u{01C7}', "LJ"),
    ('\u{01C8}', "Lj"),
    ('\u{01C9}', "lj"),
    ('\u{01CA}', "NJ"),
    ('\u{01CB}', "Nj"),
    ('\u{01CC}', "nj"),
    ('\u{01F1}', "DZ"),
    ('\u{01F2}', "Dz"),
    ('\u{01F3}', "dz"),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "\u{17F}t"),
    ('\u{FB06}', "st"),
];

/// Decode HTML/XML character references.
///
/// - Named references use the HTML5 table; all-caps names such as
///   `&EACUTE;` decode to the upper-cased character of `&eacute;`.
/// - Numeric references in `0x80..=0x9F` are read as Windows-1252.
/// - `&#0;` and out-of-range references become U+FFFD.
/// - A high and low surrogate written back to back combine into one code
///   point when `join_surrogates` is set; otherwise, and when unpaired, each
///   becomes U+FFFD.
///
/// Unknown references are left as they are. Nested escapes such as
/// `&amp;amp;lt;` unwind completely in one call.
pub fn unescape_html(text: &str, join_surrogates: bool) -> Cow<'_, str> {
    // every change consumes a reference or shortens the text, so this ends
    let mut result = Cow::Borrowed(text);
    loop {
        let next = match unescape_once(&result, join_surrogates) {
            Cow::Borrowed(_) => break,
            Cow::Owned(next) => next,
        };
        if next == *result {
            break;
        }
        result = Cow::Owned(next);
    }
    result
}

fn unescape_once(text: &str, join_surrogates: bool) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let refs: Vec<_> = HTML_ENTITY_RE.find_iter(text).collect();
    if refs.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;
    while i < refs.len() {
        let current = refs[i];
        out.push_str(&text[last..current.start()]);
        last = current.end();
        i += 1;

        match numeric_reference(current.as_str()) {
            Some(high) if is_high_surrogate(high) => {
                let low = refs
                    .get(i)
                    .filter(|next| join_surrogates && next.start() == current.end())
                    .and_then(|next| numeric_reference(next.as_str()))
                    .filter(|&cp| is_low_surrogate(cp));
                match low {
                    Some(low) => {
                        let cp = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(cp).unwrap_or(REPLACEMENT));
                        last = refs[i].end();
                        i += 1;
                    }
                    None => out.push(REPLACEMENT),
                }
            }
            Some(cp) => out.push(numeric_char(cp)),
            None => out.push_str(&named_reference(current.as_str())),
        }
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

fn numeric_reference(reference: &str) -> Option<u32> {
    let body = reference.strip_prefix("&#")?.strip_suffix(';')?;
    match body.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => body.parse().ok(),
    }
}

fn is_high_surrogate(cp: u32) -> bool {
    (0xD800..=0xDBFF).contains(&cp)
}

fn is_low_surrogate(cp: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&cp)
}

fn numeric_char(cp: u32) -> char {
    match cp {
        0 => REPLACEMENT,
        0x80..=0x9F => Charmap::SloppyWindows1252.decode_byte(cp as u8),
        _ => char::from_u32(cp).unwrap_or(REPLACEMENT),
    }
}

fn named_reference(reference: &str) -> String {
    if reference.starts_with("&#") {
        return reference.to_string();
    }
    let decoded = html_escape::decode_html_entities(reference);
    if decoded != reference {
        return decoded.into_owned();
    }

    let name = &reference[1..reference.len() - 1];
    let all_caps = name.len() > 1
        && name.bytes().any(|b| b.is_ascii_uppercase())
        && name.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if all_caps {
        let lower = format!("&{};", name.to_ascii_lowercase());
        let decoded = html_escape::decode_html_entities(&lower);
        if decoded != lower.as_str() {
            return decoded.to_uppercase();
        }
    }
    reference.to_string()
}

/// Strip ANSI CSI escapes such as colour codes.
pub fn remove_terminal_escapes(text: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(text, "")
}

/// Put back byte `0xA0` where a space replaced it inside a UTF-8 sequence.
///
/// `Ã ` is special: it is nearly always `à` followed by a real space, so the
/// space is kept and `A0` inserted, unless what follows is one of the
/// Portuguese contractions (`às`, `àquele`, ...).
pub fn restore_byte_a0(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !bytes.contains(&b' ') {
        return Cow::Borrowed(bytes);
    }
    let mut out = Vec::with_capacity(bytes.len() + 4);
    let mut changed = false;
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if byte == 0xC3
            && bytes.get(i + 1) == Some(&b' ')
            && !is_portuguese_contraction(&bytes[i + 2..])
        {
            out.extend_from_slice(&[0xC3, 0xA0]);
            changed = true;
            i += 1;
            continue;
        }
        if let Some(tail) = utf8_tail_len(byte) {
            if let Some(seq) = bytes.get(i + 1..=i + tail) {
                if seq.contains(&b' ') && seq.iter().all(|&b| b == b' ' || is_continuation(b)) {
                    out.push(byte);
                    out.extend(seq.iter().map(|&b| if b == b' ' { 0xA0 } else { b }));
                    changed = true;
                    i += tail + 1;
                    continue;
                }
            }
        }
        out.push(byte);
        i += 1;
    }
    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(bytes)
    }
}

const CONTRACTIONS: [&[u8]; 5] = [b" ", b"quele", b"quela", b"quilo", b"s "];

fn is_portuguese_contraction(rest: &[u8]) -> bool {
    rest == b"s" || CONTRACTIONS.iter().any(|prefix| rest.starts_with(prefix))
}

/// Replace UTF-8 sequences that lost continuation bytes (written as
/// [`SUBSTITUTE`] by a lossy encode), and any stray `SUBSTITUTE`, with the
/// UTF-8 bytes of U+FFFD.
pub fn replace_lossy_sequences(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !bytes.contains(&SUBSTITUTE) {
        return Cow::Borrowed(bytes);
    }
    let mut buf = [0u8; 4];
    let marker = REPLACEMENT.encode_utf8(&mut buf).as_bytes();

    let mut out = Vec::with_capacity(bytes.len() + 8);
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        let lossy_tail = utf8_tail_len(byte).filter(|&tail| {
            bytes.get(i + 1..=i + tail).is_some_and(|seq| {
                seq.contains(&SUBSTITUTE)
                    && seq.iter().all(|&b| b == SUBSTITUTE || is_continuation(b))
            })
        });
        match lossy_tail {
            Some(tail) => {
                out.extend_from_slice(marker);
                i += tail + 1;
            }
            None if byte == SUBSTITUTE => {
                out.extend_from_slice(marker);
                i += 1;
            }
            None => {
                out.push(byte);
                i += 1;
            }
        }
    }
    Cow::Owned(out)
}

/// Fix runs of Windows-1252-spelled UTF-8 that sit inside otherwise sound
/// text, one run at a time.
pub fn decode_inconsistent_utf8(text: &str, variants: bool) -> Cow<'_, str> {
    let chars: Vec<char> = text.chars().collect();
    let runs = utf8_runs(&chars);
    if runs.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut last = 0;
    for run in runs {
        out.extend(&chars[last..run.start]);
        let original: String = chars[run.clone()].iter().collect();
        let decoded = Charmap::SloppyWindows1252
            .encode(&original)
            .and_then(|bytes| decode_utf8_variants(&bytes, variants));
        match decoded {
            Some(fixed) => {
                out.push_str(&fixed);
                changed = true;
            }
            None => out.push_str(&original),
        }
        last = run.end;
    }
    if !changed {
        return Cow::Borrowed(text);
    }
    out.extend(&chars[last..]);
    Cow::Owned(out)
}

fn is_c1(ch: char) -> bool {
    ('\u{80}'..='\u{9F}').contains(&ch)
}

/// Read leftover C1 controls as the Windows-1252 characters they stand for.
pub fn fix_c1_controls(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_c1) {
        return Cow::Borrowed(text);
    }
    text.chars()
        .map(|ch| match u8::try_from(u32::from(ch)) {
            Ok(byte) if is_c1(ch) => Charmap::SloppyWindows1252.decode_byte(byte),
            _ => ch,
        })
        .collect::<String>()
        .into()
}

fn ligature(ch: char) -> Option<&'static str> {
    LIGATURES
        .iter()
        .find(|(lig, _)| *lig == ch)
        .map(|(_, letters)| *letters)
}

/// `ﬁ` → `fi` and friends. Ligatures of other scripts are left alone.
pub fn fix_latin_ligatures(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| ligature(ch).is_some()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ligature(ch) {
            Some(letters) => out.push_str(letters),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn is_width_variant(ch: char) -> bool {
    ch == '\u{3000}' || ('\u{FF01}'..='\u{FFEE}').contains(&ch)
}

/// Map full-width and half-width forms to their standard forms.
/// The ideographic space becomes an ASCII space.
pub fn fix_character_width(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_width_variant) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{3000}' => out.push(' '),
            _ if is_width_variant(ch) => out.extend(ch.to_string().nfkc()),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Straighten curly quotes.
pub fn uncurl_quotes(text: &str) -> Cow<'_, str> {
    let curly = |ch: char| ('\u{2018}'..='\u{201F}').contains(&ch);
    if !text.chars().any(curly) {
        return Cow::Borrowed(text);
    }
    text.chars()
        .map(|ch| match ch {
            '\u{2018}'..='\u{201B}' => '\'',
            '\u{201C}'..='\u{201F}' => '"',
            _ => ch,
        })
        .collect::<String>()
        .into()
}

/// CRLF, CR, U+2028, U+2029 and U+0085 all become `\n`.
pub fn fix_line_breaks(text: &str) -> Cow<'_, str> {
    LINE_BREAK_RE.replace_all(text, "\n")
}

fn is_unwanted_control(ch: char) -> bool {
    matches!(
        ch,
        '\u{00}'..='\u{08}'
            | '\u{0B}'
            | '\u{0E}'..='\u{1F}'
            | '\u{7F}'..='\u{9F}'
            | '\u{200B}'
            | '\u{206A}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFC}'
    )
}

/// Drop control characters except tab, line feed, form feed and carriage
/// return. Joiners and direction marks are kept.
pub fn remove_control_chars(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_unwanted_control) {
        return Cow::Borrowed(text);
    }
    text.chars()
        .filter(|&ch| !is_unwanted_control(ch))
        .collect::<String>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_named_and_numeric() {
        assert_eq!(unescape_html("Tom &amp; Jerry", true), "Tom & Jerry");
        assert_eq!(unescape_html("caf&eacute;", true), "café");
        assert_eq!(unescape_html("&#39;&#x27;", true), "''");
        assert_eq!(unescape_html("no entities", true), "no entities");
    }

    #[test]
    fn test_unescape_all_caps() {
        assert_eq!(unescape_html("P&EACUTE;REZ", true), "PÉREZ");
        assert_eq!(unescape_html("L&ATILDE;&SUP3;PEZ", true), "LÃ³PEZ");
    }

    #[test]
    fn test_unescape_unwinds_nested_escapes() {
        assert_eq!(unescape_html("&amp;amp;amp;lt;b&amp;gt;", true), "<b>");
        assert_eq!(unescape_html("&AMP;AMP;AMP;EACUTE;", true), "É");
        let deep = format!("x &{}y", "amp;".repeat(40));
        assert_eq!(unescape_html(&deep, true), "x &y");
    }

    #[test]
    fn test_unescape_leaves_unknown_references() {
        assert_eq!(unescape_html("&bogusname;", true), "&bogusname;");
        assert_eq!(unescape_html("a & b", true), "a & b");
    }

    #[test]
    fn test_unescape_windows_1252_numeric() {
        assert_eq!(unescape_html("&#150;", true), "\u{2013}");
        assert_eq!(unescape_html("&#0;", true), "\u{FFFD}");
        assert_eq!(unescape_html("&#x110000;", true), "\u{FFFD}");
    }

    #[test]
    fn test_unescape_surrogate_pairs() {
        assert_eq!(unescape_html("&#xD83D;&#xDE00;", true), "\u{1F600}");
        assert_eq!(unescape_html("&#55357;&#56832;!", true), "\u{1F600}!");
        assert_eq!(unescape_html("&#xD83D;x", true), "\u{FFFD}x");
        assert_eq!(unescape_html("&#xD83D;&#xDE00;", false), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_remove_terminal_escapes() {
        assert_eq!(
            remove_terminal_escapes("\x1b[36;44mblue\x1b[0m text"),
            "blue text"
        );
        assert_eq!(remove_terminal_escapes("plain"), "plain");
    }

    #[test]
    fn test_restore_byte_a0() {
        assert_eq!(restore_byte_a0(b"\xC3 la"), &b"\xC3\xA0 la"[..]);
        assert_eq!(restore_byte_a0(b"\xC3 s"), &b"\xC3\xA0s"[..]);
        assert_eq!(restore_byte_a0(b"\xE2\x80 x"), &b"\xE2\x80\xA0x"[..]);
        assert!(matches!(restore_byte_a0(b"plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_replace_lossy_sequences() {
        assert_eq!(
            replace_lossy_sequences(b"\xE2\x80\x1A end"),
            "\u{FFFD} end".as_bytes()
        );
        assert_eq!(replace_lossy_sequences(b"a\x1Ab"), "a\u{FFFD}b".as_bytes());
    }

    #[test]
    fn test_decode_inconsistent_utf8() {
        assert_eq!(
            decode_inconsistent_utf8("cafÃ© and café", true),
            "café and café"
        );
        assert!(matches!(
            decode_inconsistent_utf8("nothing odd", true),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_fix_c1_controls() {
        assert_eq!(fix_c1_controls("\u{93}quoted\u{94}"), "\u{201C}quoted\u{201D}");
        assert_eq!(fix_c1_controls("\u{81}"), "\u{81}");
    }

    #[test]
    fn test_fix_latin_ligatures() {
        assert_eq!(fix_latin_ligatures("\u{FB01}nd \u{FB02}ow"), "find flow");
        assert_eq!(fix_latin_ligatures("\u{0132}ssel"), "IJssel");
    }

    #[test]
    fn test_fix_character_width() {
        assert_eq!(fix_character_width("ＬＯＵＤ\u{3000}ＮＯＩＳＥＳ"), "LOUD NOISES");
        assert_eq!(fix_character_width("ｳｫｯｶ"), "ウォッカ");
    }

    #[test]
    fn test_uncurl_quotes() {
        assert_eq!(
            uncurl_quotes("\u{201C}here\u{2019}s a test\u{201D}"),
            "\"here's a test\""
        );
    }

    #[test]
    fn test_fix_line_breaks() {
        assert_eq!(
            fix_line_breaks("a\r\nb\rc\u{2028}d\u{2029}e\u{85}f"),
            "a\nb\nc\nd\ne\nf"
        );
    }

    #[test]
    fn test_remove_control_chars() {
        assert_eq!(remove_control_chars("a\x00b\x07c\u{FEFF}d"), "abcd");
        assert_eq!(remove_control_chars("keep\ttab\nline"), "keep\ttab\nline");
        assert_eq!(remove_control_chars("join\u{200D}er"), "join\u{200D}er");
    }
}
