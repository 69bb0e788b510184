//! Sequential colour palettes (ColorBrewer, 9 classes).

use std::fmt;
use std::str::FromStr;

use crate::error::MendError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Palette {
    #[default]
    PuBu,
    Blues,
    BuPu,
    RdPu,
    PuRd,
    OrRd,
    Oranges,
}

type Rgb = (u8, u8, u8);

const PU_BU: [Rgb; 9] = [
    (0xff, 0xf7, 0xfb), (0xec, 0xe7, 0xf2), (0xd0, 0xd1, 0xe6),
    (0xa6, 0xbd, 0xdb), (0x74, 0xa9, 0xcf), (0x36, 0x90, 0xc0),
    (0x05, 0x70, 0xb0), (0x04, 0x5a, 0x8d), (0x02, 0x38, 0x58),
];
const BLUES: [Rgb; 9] = [
    (0xf7, 0xfb, 0xff), (0xde, 0xeb, 0xf7), (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1), (0x6b, 0xae, 0xd6), (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5), (0x08, 0x51, 0x9c), (0x08, 0x30, 0x6b),
];
const BU_PU: [Rgb; 9] = [
    (0xf7, 0xfc, 0xfd), (0xe0, 0xec, 0xf4), (0xbf, 0xd3, 0xe6),
    (0x9e, 0xbc, 0xda), (0x8c, 0x96, 0xc6), (0x8c, 0x6b, 0xb1),
    (0x88, 0x41, 0x9d), (0x81, 0x0f, 0x7c), (0x4d, 0x00, 0x4b),
];
const RD_PU: [Rgb; 9] = [
    (0xff, 0xf7, 0xf3), (0xfd, 0xe0, 0xdd), (0xfc, 0xc5, 0xc0),
    (0xfa, 0x9f, 0xb5), (0xf7, 0x68, 0xa1), (0xdd, 0x34, 0x97),
    (0xae, 0x01, 0x7e), (0x7a, 0x01, 0x77), (0x49, 0x00, 0x6a),
];
const PU_RD: [Rgb; 9] = [
    (0xf7, 0xf4, 0xf9), (0xe7, 0xe1, 0xef), (0xd4, 0xb9, 0xda),
    (0xc9, 0x94, 0xc7), (0xdf, 0x65, 0xb0), (0xe7, 0x29, 0x8a),
    (0xce, 0x12, 0x56), (0x98, 0x00, 0x43), (0x67, 0x00, 0x1f),
];
const OR_RD: [Rgb; 9] = [
    (0xff, 0xf7, 0xec), (0xfe, 0xe8, 0xc8), (0xfd, 0xd4, 0x9e),
    (0xfd, 0xbb, 0x84), (0xfc, 0x8d, 0x59), (0xef, 0x65, 0x48),
    (0xd7, 0x30, 0x1f), (0xb3, 0x00, 0x00), (0x7f, 0x00, 0x00),
];
const ORANGES: [Rgb; 9] = [
    (0xff, 0xf5, 0xeb), (0xfe, 0xe6, 0xce), (0xfd, 0xd0, 0xa2),
    (0xfd, 0xae, 0x6b), (0xfd, 0x8d, 0x3c), (0xf1, 0x69, 0x13),
    (0xd9, 0x48, 0x01), (0xa6, 0x36, 0x03), (0x7f, 0x27, 0x04),
];

impl Palette {
    pub const ALL: [Palette; 7] = [
        Palette::PuBu,
        Palette::Blues,
        Palette::BuPu,
        Palette::RdPu,
        Palette::PuRd,
        Palette::OrRd,
        Palette::Oranges,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Palette::PuBu => "PuBu",
            Palette::Blues => "Blues",
            Palette::BuPu => "BuPu",
            Palette::RdPu => "RdPu",
            Palette::PuRd => "PuRd",
            Palette::OrRd => "OrRd",
            Palette::Oranges => "Oranges",
        }
    }

    fn stops(self) -> &'static [Rgb; 9] {
        match self {
            Palette::PuBu => &PU_BU,
            Palette::Blues => &BLUES,
            Palette::BuPu => &BU_PU,
            Palette::RdPu => &RD_PU,
            Palette::PuRd => &PU_RD,
            Palette::OrRd => &OR_RD,
            Palette::Oranges => &ORANGES,
        }
    }

    /// Colour at `t` in `[0, 1]` (clamped), interpolated between stops,
    /// as `#rrggbb`.
    pub fn color_at(self, t: f64) -> String {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let idx = pos.floor() as usize;
        if idx >= stops.len() - 1 {
            return hex(stops[stops.len() - 1]);
        }
        let frac = pos - idx as f64;
        let (a, b) = (stops[idx], stops[idx + 1]);
        let lerp = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
        hex((lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2)))
    }

    /// The stops as `#rrggbb`, lightest first.
    pub fn hex_stops(self) -> Vec<String> {
        self.stops().iter().copied().map(hex).collect()
    }
}

fn hex((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = MendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Palette::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MendError::PlotOption(format!("unknown palette '{s}'")))
    }
}
