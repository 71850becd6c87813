use crate::foundation::core::fmt_num;
use crate::foundation::math::{StableHasher, content_id};
use crate::foundation::warning::{Warning, Warnings};
use crate::project::model::ColorDescriptor;
use crate::render::document::Element;

/// Per-channel RGBA multipliers and offsets, normalized to `[0, 1]` color space.
pub type Channels = ([f64; 4], [f64; 4]);

const IDENTITY: Channels = ([1.0; 4], [0.0; 4]);

const ADVANCED_KEYS: [&str; 8] = [
    "redMultiplier",
    "greenMultiplier",
    "blueMultiplier",
    "alphaMultiplier",
    "redOffset",
    "greenOffset",
    "blueOffset",
    "alphaOffset",
];

/// Affine color transform `color * multiplier + offset`, applied per channel.
///
/// `None` is the identity. Effects are plain values: composing returns a new effect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorEffect(Option<Channels>);

/// Hashable identity of a [`ColorEffect`]; all identity effects share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectKey(Option<[u64; 8]>);

impl ColorEffect {
    /// The identity effect.
    pub const fn identity() -> Self {
        Self(None)
    }

    /// Effect with explicit multipliers and offsets.
    pub const fn new(multiplier: [f64; 4], offset: [f64; 4]) -> Self {
        Self(Some((multiplier, offset)))
    }

    /// Multipliers and offsets, `None` for the identity.
    pub fn channels(&self) -> Option<&Channels> {
        self.0.as_ref()
    }

    /// Interpret a `Color` descriptor.
    ///
    /// Unknown descriptors, non-hex tint colors and unparseable numbers produce the identity
    /// and a warning.
    pub fn from_descriptor(desc: &ColorDescriptor, warnings: &mut Warnings) -> Self {
        match Self::parse(desc) {
            Ok(effect) => effect,
            Err(warning) => {
                warnings.push(warning);
                Self::identity()
            }
        }
    }

    fn parse(desc: &ColorDescriptor) -> Result<Self, Warning> {
        let num = |key: &str, default: f64| -> Result<f64, Warning> {
            match desc.get(key) {
                None => Ok(default),
                Some(v) => v.trim().parse::<f64>().map_err(|_| {
                    Warning::UnknownColorEffect(format!("{key}={v:?} is not a number in {desc}"))
                }),
            }
        };

        if desc.contains("alphaMultiplier") && desc.0.len() == 1 {
            let a = num("alphaMultiplier", 1.0)?;
            return Ok(Self::new([1.0, 1.0, 1.0, a], [0.0; 4]));
        }

        if desc.contains("brightness") {
            let b = num("brightness", 0.0)?;
            return Ok(if b < 0.0 {
                let m = 1.0 + b;
                Self::new([m, m, m, 1.0], [0.0; 4])
            } else {
                let m = 1.0 - b;
                Self::new([m, m, m, 1.0], [b, b, b, 0.0])
            });
        }

        if desc.contains("tintMultiplier") || desc.contains("tintColor") {
            let t = num("tintMultiplier", 0.0)?;
            let color = desc.get("tintColor").unwrap_or("#000000");
            let [r, g, b] =
                parse_hex_rgb(color).ok_or_else(|| Warning::NonHexTint(color.to_string()))?;
            let m = 1.0 - t;
            return Ok(Self::new(
                [m, m, m, 1.0],
                [
                    t * f64::from(r) / 255.0,
                    t * f64::from(g) / 255.0,
                    t * f64::from(b) / 255.0,
                    0.0,
                ],
            ));
        }

        if ADVANCED_KEYS.iter().any(|k| desc.contains(k)) {
            return Ok(Self::new(
                [
                    num("redMultiplier", 1.0)?,
                    num("greenMultiplier", 1.0)?,
                    num("blueMultiplier", 1.0)?,
                    num("alphaMultiplier", 1.0)?,
                ],
                [
                    num("redOffset", 0.0)? / 255.0,
                    num("greenOffset", 0.0)? / 255.0,
                    num("blueOffset", 0.0)? / 255.0,
                    num("alphaOffset", 0.0)? / 255.0,
                ],
            ));
        }

        Err(Warning::UnknownColorEffect(desc.to_string()))
    }

    /// `self ∘ inner`: apply `inner` first, then `self`.
    ///
    /// `(m1, o1) ∘ (m2, o2) = (m1·m2, m1·o2 + o1)` per channel. Composing with an identity on
    /// either side returns the other operand unchanged.
    pub fn compose(self, inner: ColorEffect) -> ColorEffect {
        if self.is_identity() {
            return inner;
        }
        let (Some((m1, o1)), Some((m2, o2))) = (self.0, inner.0) else {
            return self;
        };
        if inner.is_identity() {
            return self;
        }
        let mut m = [0.0; 4];
        let mut o = [0.0; 4];
        for i in 0..4 {
            m[i] = m1[i] * m2[i];
            o[i] = m1[i] * o2[i] + o1[i];
        }
        Self::new(m, o)
    }

    /// Return `true` when the effect leaves colors unchanged.
    pub fn is_identity(&self) -> bool {
        self.0.is_none_or(|c| c == IDENTITY)
    }

    /// Cache key; equal effects (including every spelling of the identity) share a key.
    pub fn key(&self) -> EffectKey {
        if self.is_identity() {
            return EffectKey(None);
        }
        EffectKey(self.0.map(|(m, o)| {
            let mut bits = [0u64; 8];
            for i in 0..4 {
                bits[i] = canonical_bits(m[i]);
                bits[i + 4] = canonical_bits(o[i]);
            }
            bits
        }))
    }

    /// `Filter_<hash>` id derived from the multipliers and offsets.
    pub fn render_id(&self) -> String {
        let (m, o) = self.0.unwrap_or(IDENTITY);
        let mut h = StableHasher::new();
        for v in m.iter().chain(o.iter()) {
            h.write_f64(*v);
        }
        content_id("Filter", h.finish())
    }

    /// `<filter>` with a 4×5 `feColorMatrix`; `None` for the identity.
    pub fn to_fragment(&self) -> Option<Element> {
        if self.is_identity() {
            return None;
        }
        let (m, o) = self.0?;
        let values = format!(
            "{} 0 0 0 {} 0 {} 0 0 {} 0 0 {} 0 {} 0 0 0 {} {}",
            fmt_num(m[0]),
            fmt_num(o[0]),
            fmt_num(m[1]),
            fmt_num(o[1]),
            fmt_num(m[2]),
            fmt_num(o[2]),
            fmt_num(m[3]),
            fmt_num(o[3])
        );
        Some(
            Element::new("filter")
                .with_attr("id", self.render_id())
                .with_attr("x", "-20%")
                .with_attr("y", "-20%")
                .with_attr("width", "140%")
                .with_attr("height", "140%")
                .with_attr("color-interpolation-filters", "sRGB")
                .with_child(
                    Element::new("feColorMatrix")
                        .with_attr("in", "SourceGraphic")
                        .with_attr("type", "matrix")
                        .with_attr("values", values)
                        .with_attr("result", "result1"),
                ),
        )
    }
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

/// `#RRGGBB` to channel bytes.
fn parse_hex_rgb(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
#[path = "../../tests/unit/style/color_effect.rs"]
mod tests;
