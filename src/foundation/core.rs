use std::fmt;

use crate::foundation::error::{MagikdError, MagikdResult};

pub use kurbo::{Point, Vec2};

/// Bounding box used by box-fit resizes.
///
/// Both sides are non-zero when built through [`BoxSize::new`], [`BoxSize::parse`] or serde.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
}

impl BoxSize {
    pub fn new(width: u32, height: u32) -> MagikdResult<Self> {
        if width == 0 || height == 0 {
            return Err(MagikdError::invalid_input("box size must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Re-check a box whose fields were set directly.
    pub fn validated(self) -> MagikdResult<Self> {
        Self::new(self.width, self.height)
    }

    /// Aspect-preserving size of a `width x height` image scaled to fit inside the box.
    ///
    /// Both shrinks and grows. Each side is at least 1px, even for a zero-sided box.
    pub fn fit(self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        let bw = f64::from(self.width.max(1));
        let bh = f64::from(self.height.max(1));
        let s = (bw / f64::from(width)).min(bh / f64::from(height));
        let w = (f64::from(width) * s).round().clamp(1.0, bw);
        let h = (f64::from(height) * s).round().clamp(1.0, bh);
        (w as u32, h as u32)
    }

    /// Parse `"WxH"` (e.g. `800x800`).
    pub fn parse(s: &str) -> MagikdResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| MagikdError::invalid_input(format!("box size '{s}' is not WxH")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| MagikdError::invalid_input(format!("box size '{s}' is not WxH")))
        };
        Self::new(parse(w)?, parse(h)?)
    }
}

impl<'de> serde::Deserialize<'de> for BoxSize {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Repr {
            width: u32,
            height: u32,
        }

        let Repr { width, height } = Repr::deserialize(deserializer)?;
        BoxSize::new(width, height).map_err(serde::de::Error::custom)
    }
}

impl Default for BoxSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

/// Scale one dimension by `factor`, truncating, never below 1px.
pub fn scale_dim(v: u32, factor: f64) -> u32 {
    ((f64::from(v) * factor).floor() as u32).max(1)
}

/// Opaque sRGB color as used by charts and diagrams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("magenta", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
    ("cyan", [0, 255, 255]),
    ("orange", [255, 165, 0]),
    ("gold", [255, 215, 0]),
    ("pink", [255, 192, 203]),
    ("darkred", [139, 0, 0]),
    ("darkgreen", [0, 100, 0]),
    ("darkblue", [0, 0, 139]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
];

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or a basic CSS color name.
    pub fn parse(s: &str) -> MagikdResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| {
                MagikdError::invalid_input(format!("invalid hex color '{s}'"))
            });
        }
        let lower = s.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Self::new(*r, *g, *b))
            .ok_or_else(|| MagikdError::invalid_input(format!("unknown color '{s}'")))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(Rgb8::new(out[0], out[1], out[2]))
        }
        6 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            Some(Rgb8::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        _ => None,
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Triple([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Rgb8::parse(&s).map_err(serde::de::Error::custom),
            Repr::Triple([r, g, b]) => Ok(Rgb8::new(r, g, b)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
