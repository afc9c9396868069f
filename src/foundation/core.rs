use serde::{Deserialize, Serialize};

use crate::foundation::error::{ShadowError, ShadowResult};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black; the background of every rasterized shadow.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque mid gray, the default shadow color.
    pub const GRAY: Self = Self::rgb(0x80, 0x80, 0x80);

    /// Build a color from all four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional, case-insensitive).
    pub fn from_hex(s: &str) -> ShadowResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> ShadowResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ShadowError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(ShadowError::validation("hex color must be ASCII"));
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::rgba(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err(ShadowError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// Lowercase `#rrggbbaa` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Channels in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Inverse of [`Color::to_array`].
    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                &[r, g, b] => Ok(Self::rgb(r, g, b)),
                &[r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

/// Row-major RGBA8 image with its origin at the top-left corner.
///
/// The pixel vector always holds exactly `width * height` colors. Writes go through
/// [`PixelBuffer::put`], which drops coordinates outside the buffer instead of wrapping
/// them onto a neighbouring row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; pixel_count(width, height)],
        }
    }

    /// Wrap an existing pixel vector; its length must be `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> ShadowResult<Self> {
        if pixels.len() != pixel_count(width, height) {
            return Err(ShadowError::validation(format!(
                "pixel buffer expects {}x{} = {} pixels, got {}",
                width,
                height,
                pixel_count(width, height),
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Interleave four equally sized channel planes (r, g, b, a) into a buffer.
    pub(crate) fn from_planes(width: u32, height: u32, planes: &[Vec<u8>; 4]) -> Self {
        let n = pixel_count(width, height);
        debug_assert!(planes.iter().all(|p| p.len() == n));
        let pixels = (0..n)
            .map(|i| Color::rgba(planes[0][i], planes[1][i], planes[2][i], planes[3][i]))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build from tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> ShadowResult<Self> {
        let expected_len = pixel_count(width, height)
            .checked_mul(4)
            .ok_or_else(|| ShadowError::validation("pixel buffer size overflow"))?;
        if bytes.len() != expected_len {
            return Err(ShadowError::validation(
                "rgba8 input must hold exactly width*height*4 bytes",
            ));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Color::rgba(px[0], px[1], px[2], px[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Linear index of `(x, y)`, or `None` when the coordinate lies outside the buffer.
    pub fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let idx = usize::try_from(y * i64::from(self.width) + x).ok()?;
        (idx < self.pixels.len()).then_some(idx)
    }

    /// Pixel at `(x, y)` if it lies inside the buffer.
    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    /// Write `color` at `(x, y)`. Returns `false` and leaves the buffer untouched when
    /// the coordinate is out of range.
    pub fn put(&mut self, x: i64, y: i64, color: Color) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    /// Fill the half-open rectangle `[x0, x1) × [y0, y1)`, clipped to the buffer.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let (x0, x1) = (x0.clamp(0, w), x1.clamp(0, w));
        let (y0, y1) = (y0.clamp(0, h), y1.clamp(0, h));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0..y1 {
            let row = (y * w) as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// Tightly packed RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            out.extend_from_slice(&c.to_array());
        }
        out
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    (width as usize).saturating_mul(height as usize)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
