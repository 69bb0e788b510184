//! Single-byte codecs used to undo mojibake, plus a forgiving UTF-8 decoder.

/// Code points for Windows-1252 bytes `0x80..=0x9F`.
///
/// The five bytes Windows-1252 leaves undefined keep their C1 code point,
/// which makes the codec "sloppy": every byte round-trips.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Byte a sloppy codec writes for U+FFFD, so lost bytes stay visible.
pub const SUBSTITUTE: u8 = 0x1A;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charmap {
    Latin1,
    SloppyWindows1252,
}

impl Charmap {
    /// Tried in this order when undoing a wrong decode.
    pub const ALL: [Charmap; 2] = [Charmap::Latin1, Charmap::SloppyWindows1252];

    pub fn name(self) -> &'static str {
        match self {
            Charmap::Latin1 => "latin-1",
            Charmap::SloppyWindows1252 => "sloppy-windows-1252",
        }
    }

    pub fn is_sloppy(self) -> bool {
        matches!(self, Charmap::SloppyWindows1252)
    }

    pub fn encode_char(self, ch: char) -> Option<u8> {
        let cp = u32::from(ch);
        match self {
            Charmap::Latin1 => u8::try_from(cp).ok(),
            Charmap::SloppyWindows1252 => {
                if cp < 0x80 || (0xA0..=0xFF).contains(&cp) {
                    return u8::try_from(cp).ok();
                }
                WINDOWS_1252_HIGH
                    .iter()
                    .position(|&c| c == ch)
                    .and_then(|i| u8::try_from(0x80 + i).ok())
            }
        }
    }

    pub fn decode_byte(self, byte: u8) -> char {
        match self {
            Charmap::SloppyWindows1252 if (0x80..=0x9F).contains(&byte) => {
                WINDOWS_1252_HIGH[usize::from(byte - 0x80)]
            }
            _ => char::from(byte),
        }
    }

    /// Encode every character, or `None` if one has no byte in this charmap.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        text.chars().map(|ch| self.encode_char(ch)).collect()
    }

    /// Like [`Charmap::encode`], but U+FFFD becomes [`SUBSTITUTE`].
    pub fn encode_lossy(self, text: &str) -> Option<Vec<u8>> {
        text.chars()
            .map(|ch| match ch {
                '\u{FFFD}' => Some(SUBSTITUTE),
                _ => self.encode_char(ch),
            })
            .collect()
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.decode_byte(b)).collect()
    }
}

/// Number of continuation bytes a UTF-8 lead byte announces.
pub fn utf8_tail_len(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(1),
        0xE0..=0xEF => Some(2),
        0xF0..=0xF4 => Some(3),
        _ => None,
    }
}

pub fn is_continuation(byte: u8) -> bool {
    (0x80..=0xBF).contains(&byte)
}

/// Decode UTF-8, also accepting CESU-8 surrogate pairs and Java's `C0 80`
/// when `variants` is set. Returns `None` on any other invalid sequence.
pub fn decode_utf8_variants(bytes: &[u8], variants: bool) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return Some(out);
            }
            Err(err) => {
                if !variants {
                    return None;
                }
                let (valid, tail) = rest.split_at(err.valid_up_to());
                out.push_str(std::str::from_utf8(valid).ok()?);
                let (ch, used) = decode_variant(tail)?;
                out.push(ch);
                rest = &tail[used..];
            }
        }
    }
}

fn decode_variant(bytes: &[u8]) -> Option<(char, usize)> {
    match *bytes {
        [0xC0, 0x80, ..] => Some(('\0', 2)),
        [0xED, a @ 0xA0..=0xAF, b @ 0x80..=0xBF, 0xED, c @ 0xB0..=0xBF, d @ 0x80..=0xBF, ..] => {
            let high = 0xD000 | (u32::from(a & 0x3F) << 6) | u32::from(b & 0x3F);
            let low = 0xD000 | (u32::from(c & 0x3F) << 6) | u32::from(d & 0x3F);
            let cp = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(cp).map(|ch| (ch, 6))
        }
        _ => None,
    }
}

/// Decode UTF-16 code units; unpaired surrogates become U+FFFD.
pub fn decode_utf16_lossy(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
