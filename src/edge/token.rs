//! Tokenizer for the edge mini-language.
//!
//! ```text
//! start  : moveto (moveto | lineto | quadto)*
//! moveto : "!" NUMBER NUMBER select?
//! lineto : ("|" | "/") NUMBER NUMBER
//! quadto : ("[" | "]") NUMBER NUMBER NUMBER NUMBER
//! select : "S" DIGIT
//! NUMBER : -?\d+(\.\d+)?            decimal twips
//!        | #[0-9A-F]{1,6}(\.[0-9A-F]{1,2})?   signed 24.8 fixed point twips, in hex
//! ```

use crate::foundation::core::TWIPS_PER_PX;
use crate::foundation::error::{XflError, XflResult};

/// One token of an `edges` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// `!`
    MoveTo,
    /// `|` or `/`
    LineTo,
    /// `[` or `]`
    QuadTo,
    /// `S1`..`S7`: selection hint for the authoring tool, carries no geometry.
    Select(u8),
    /// Coordinate already converted from twips to pixels.
    Number(f64),
}

/// Lazy tokenizer over an `edges` attribute.
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    /// Tokenize `src`.
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn fail(&mut self, msg: String) -> Option<XflResult<Token>> {
        self.pos = self.src.len();
        Some(Err(XflError::format(msg)))
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && pred(bytes[self.pos]) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn scan_decimal(&mut self) -> &'a str {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        if bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        self.take_while(|b| b.is_ascii_digit());
        if self.pos + 1 < bytes.len() && bytes[self.pos] == b'.' && bytes[self.pos + 1].is_ascii_digit()
        {
            self.pos += 1;
            self.take_while(|b| b.is_ascii_digit());
        }
        &self.src[start..self.pos]
    }

    fn scan_hex(&mut self) -> &'a str {
        let start = self.pos;
        self.pos += 1;
        self.take_while(|b| b.is_ascii_alphanumeric());
        let bytes = self.src.as_bytes();
        if self.pos < bytes.len() && bytes[self.pos] == b'.' {
            self.pos += 1;
            self.take_while(|b| b.is_ascii_alphanumeric());
        }
        &self.src[start..self.pos]
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = XflResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.take_while(|b| b.is_ascii_whitespace());
        let bytes = self.src.as_bytes();
        let &b = bytes.get(self.pos)?;

        let token = match b {
            b'!' => Token::MoveTo,
            b'|' | b'/' => Token::LineTo,
            b'[' | b']' => Token::QuadTo,
            b'S' => {
                // The digit belongs to the marker; it must not be read as a coordinate.
                return match bytes.get(self.pos + 1) {
                    Some(d) if d.is_ascii_digit() => {
                        self.pos += 2;
                        Some(Ok(Token::Select(d - b'0')))
                    }
                    _ => self.fail(format!("select marker without digit at byte {}", self.pos)),
                };
            }
            b'-' | b'0'..=b'9' => {
                let lit = self.scan_decimal();
                return match parse_number(lit) {
                    Ok(v) => Some(Ok(Token::Number(v))),
                    Err(e) => {
                        self.pos = self.src.len();
                        Some(Err(e))
                    }
                };
            }
            b'#' => {
                let lit = self.scan_hex();
                return match parse_number(lit) {
                    Ok(v) => Some(Ok(Token::Number(v))),
                    Err(e) => {
                        self.pos = self.src.len();
                        Some(Err(e))
                    }
                };
            }
            _ => {
                let c = self.src[self.pos..].chars().next().unwrap_or('?');
                return self.fail(format!("unexpected character {c:?} at byte {}", self.pos));
            }
        };
        self.pos += 1;
        Some(Ok(token))
    }
}

/// Parse one numeric literal and convert it from twips to pixels.
pub fn parse_number(lit: &str) -> XflResult<f64> {
    match lit.strip_prefix('#') {
        Some(hex) => parse_fixed_hex(hex).map(|v| v / TWIPS_PER_PX),
        None => {
            let v: f64 = lit
                .parse()
                .map_err(|_| XflError::format(format!("invalid decimal number {lit:?}")))?;
            if !v.is_finite() {
                return Err(XflError::format(format!("invalid decimal number {lit:?}")));
            }
            Ok(v / TWIPS_PER_PX)
        }
    }
}

/// `H.h` with up to 6 integer and 2 fractional hex digits: the bytes of a big-endian `i32`
/// holding a 24.8 fixed point value.
fn parse_fixed_hex(hex: &str) -> XflResult<f64> {
    let err = || XflError::format(format!("invalid hex number \"#{hex}\""));
    let (int, frac) = hex.split_once('.').unwrap_or((hex, ""));
    if int.is_empty() || int.len() > 6 || frac.len() > 2 {
        return Err(err());
    }
    let padded = format!("{int:0>6}{frac:0<2}");
    let raw = u32::from_str_radix(&padded, 16).map_err(|_| err())?;
    Ok(f64::from(raw as i32) / 256.0)
}

#[cfg(test)]
#[path = "../../tests/unit/edge/token.rs"]
mod tests;
