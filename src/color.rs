//! Background color parsing: `#RGB` and `#RRGGBB`.

use core::fmt;
use core::str::FromStr;

/// An 8-bit sRGB color with alpha.
///
/// Colors produced by [`parse_color`] are always fully opaque.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Fully opaque color from its three channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// White, fully opaque.
    pub const fn white() -> Self {
        Self::opaque(255, 255, 255)
    }

    /// Black, fully opaque.
    pub const fn black() -> Self {
        Self::opaque(0, 0, 0)
    }

    /// Channels in `[r, g, b, a]` order.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgba8 {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

/// Why a color string was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color format: empty string")]
    Empty,
    #[error("invalid color format: must start with '#'")]
    MissingHash,
    /// Length in bytes, including the `#`.
    #[error("invalid color format: expected #RGB or #RRGGBB, got {0} characters")]
    BadLength(usize),
    #[error("invalid color format: {0:?} is not a hex digit")]
    NotHex(char),
}

/// Parse `#RGB` or `#RRGGBB` (case-insensitive hex) into an opaque color.
///
/// Short-form nibbles are duplicated: `#0AF` is `#00AAFF`.
///
/// ```
/// use photosheet::color::{parse_color, ColorError, Rgba8};
///
/// assert_eq!(parse_color("#FFF"), Ok(Rgba8::white()));
/// assert_eq!(parse_color("#000000"), Ok(Rgba8::black()));
/// assert_eq!(parse_color(""), Err(ColorError::Empty));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba8, ColorError> {
    let hex = match s.strip_prefix('#') {
        Some(hex) => hex,
        None if s.is_empty() => return Err(ColorError::Empty),
        None => return Err(ColorError::MissingHash),
    };

    if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::NotHex(bad));
    }

    // Every remaining char is ASCII, so byte indexing is safe from here on.
    let digits = hex.as_bytes();
    match digits.len() {
        3 => Ok(Rgba8::opaque(
            expand_nibble(digits[0]),
            expand_nibble(digits[1]),
            expand_nibble(digits[2]),
        )),
        6 => Ok(Rgba8::opaque(
            byte(digits[0], digits[1]),
            byte(digits[2], digits[3]),
            byte(digits[4], digits[5]),
        )),
        _ => Err(ColorError::BadLength(s.len())),
    }
}

/// One hex digit to a full byte by repetition: `f` is `0xFF`.
fn expand_nibble(ch: u8) -> u8 {
    let n = hex_val(ch);
    n << 4 | n
}

fn byte(hi: u8, lo: u8) -> u8 {
    hex_val(hi) << 4 | hex_val(lo)
}

// Input is pre-validated with `is_ascii_hexdigit`.
fn hex_val(ch: u8) -> u8 {
    match ch {
        b'0'..=b'9' => ch - b'0',
        b'a'..=b'f' => ch - b'a' + 10,
        b'A'..=b'F' => ch - b'A' + 10,
        _ => 0,
    }
}
