//! Heuristics for spotting UTF-8 that was decoded as a single-byte charmap.

use std::ops::Range;

use super::codecs::{is_continuation, utf8_tail_len, Charmap};

fn sloppy_byte(ch: char) -> Option<u8> {
    Charmap::SloppyWindows1252.encode_char(ch)
}

fn is_c1(ch: char) -> bool {
    ('\u{80}'..='\u{9F}').contains(&ch)
}

/// Count the mojibake markers in `text`.
///
/// A marker is a C1 control character, a character whose Windows-1252 byte
/// is a UTF-8 lead byte followed by one whose byte is a continuation byte
/// (`Ã¶`, `â€`), or `Â`/`Ã` followed by a space, which is what a mangled
/// no-break space usually leaves behind.
pub fn badness(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut score = 0;
    for (i, &ch) in chars.iter().enumerate() {
        if is_c1(ch) {
            score += 1;
            continue;
        }
        if !sloppy_byte(ch).is_some_and(|b| utf8_tail_len(b).is_some()) {
            continue;
        }
        match chars.get(i + 1) {
            Some(&next) if sloppy_byte(next).is_some_and(is_continuation) => score += 1,
            Some(' ') if matches!(ch, 'Â' | 'Ã') => score += 1,
            _ => {}
        }
    }
    score
}

pub fn is_bad(text: &str) -> bool {
    badness(text) > 0
}

/// Char-index ranges of maximal runs of complete UTF-8 sequences spelled out
/// in Windows-1252.
pub fn utf8_runs(chars: &[char]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let start = i;
        while let Some(len) = sequence_len(&chars[i..]) {
            i += len;
        }
        if i > start {
            runs.push(start..i);
        } else {
            i += 1;
        }
    }
    runs
}

fn sequence_len(chars: &[char]) -> Option<usize> {
    let lead = sloppy_byte(*chars.first()?)?;
    let tail = utf8_tail_len(lead)?;
    let continuation = chars.get(1..=tail)?;
    continuation
        .iter()
        .all(|&c| sloppy_byte(c).is_some_and(is_continuation))
        .then_some(tail + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_not_bad() {
        assert!(!is_bad("hello world"));
        assert!(!is_bad("café crème"));
        assert!(!is_bad("Straße"));
        assert!(!is_bad("日本語"));
    }

    #[test]
    fn test_mojibake_is_bad() {
        assert!(is_bad("schÃ¶n"));
        assert!(is_bad("â€œquotedâ€\u{9D}"));
        assert!(is_bad("Ã la mode"));
        assert!(is_bad("price\u{85}"));
        assert_eq!(badness("Ã¶Ã¤"), 2);
    }

    #[test]
    fn test_utf8_runs() {
        let chars: Vec<char> = "cafÃ© and Ã¶â€œ".chars().collect();
        let runs = utf8_runs(&chars);
        assert_eq!(runs.len(), 2);
        let first: String = chars[runs[0].clone()].iter().collect();
        let second: String = chars[runs[1].clone()].iter().collect();
        assert_eq!(first, "Ã©");
        assert_eq!(second, "Ã¶â€œ");
    }

    #[test]
    fn test_incomplete_sequence_is_not_a_run() {
        let chars: Vec<char> = "é a".chars().collect();
        assert!(utf8_runs(&chars).is_empty());
    }
}
