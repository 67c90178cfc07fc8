//! Avatar derivation for item rows.
//!
//! An item's name deterministically yields a short abbreviation, a background
//! color from a fixed palette, and a text color that contrasts with it.

use serde::{Deserialize, Serialize};

/// An sRGB color, `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);
    pub const NEAR_BLACK: Rgb = Rgb(0x212121);

    fn channels(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Relative luminance per WCAG 2.
    pub fn luminance(self) -> f32 {
        let [r, g, b] = self.channels().map(|c| {
            let c = c as f32 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        });
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG contrast ratio between two colors, in `1.0..=21.0`.
    pub fn contrast_ratio(self, other: Rgb) -> f32 {
        let (a, b) = (self.luminance(), other.luminance());
        let (hi, lo) = if a > b { (a, b) } else { (b, a) };
        (hi + 0.05) / (lo + 0.05)
    }
}

/// Minimum contrast for white text before falling back to dark text.
const CONTRAST_THRESHOLD: f32 = 3.0;

/// Background palette (material 500 shades).
const PALETTE: [Rgb; 16] = [
    Rgb(0xf44336), // red
    Rgb(0xe91e63), // pink
    Rgb(0x9c27b0), // purple
    Rgb(0x673ab7), // deep purple
    Rgb(0x3f51b5), // indigo
    Rgb(0x2196f3), // blue
    Rgb(0x03a9f4), // light blue
    Rgb(0x00bcd4), // cyan
    Rgb(0x009688), // teal
    Rgb(0x4caf50), // green
    Rgb(0x8bc34a), // light green
    Rgb(0xcddc39), // lime
    Rgb(0xffc107), // amber
    Rgb(0xff9800), // orange
    Rgb(0xff5722), // deep orange
    Rgb(0x795548), // brown
];

/// Presentation values derived from an item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub abbreviation: String,
    pub background: Rgb,
    pub foreground: Rgb,
}

impl Avatar {
    pub fn for_name(name: &str) -> Self {
        let background = color(name);
        Self {
            abbreviation: abbreviation(name),
            background,
            foreground: contrast_text(background),
        }
    }
}

/// Initials of the first two words, or the first two characters of a
/// single word. Blank names give `"?"`.
pub fn abbreviation(name: &str) -> String {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let abbreviation: String = match words.as_slice() {
        [] => return "?".to_string(),
        [single] => single.chars().take(2).collect(),
        [first, second, ..] => first.chars().take(1).chain(second.chars().take(1)).collect(),
    };
    abbreviation.to_uppercase()
}

/// Deterministic palette color for a name.
pub fn color(name: &str) -> Rgb {
    let index = (fnv1a(name.as_bytes()) % PALETTE.len() as u64) as usize;
    PALETTE[index]
}

/// White when it contrasts enough with `background`, near-black otherwise.
pub fn contrast_text(background: Rgb) -> Rgb {
    if background.contrast_ratio(Rgb::WHITE) >= CONTRAST_THRESHOLD {
        Rgb::WHITE
    } else {
        Rgb::NEAR_BLACK
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes.iter().fold(OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(PRIME)
    })
}
