use std::fmt;

use crate::foundation::math::{Fnv1a64, canonical_f32_bits};
use crate::shape::raster::RasterOpts;
use crate::shape::spec::{OwnerPosition, ShadowSpec};

/// Version of the rasterize/blur pipeline. Part of every fingerprint and of the cache
/// directory layout, so bumping it invalidates old entries.
pub const ALGORITHM_VERSION: &str = "v1";

/// 128-bit content key of one shadow render.
///
/// Callers should treat it as opaque; only [`Fingerprint::to_hex`] is stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    /// First FNV-1a lane.
    pub hi: u64,
    /// Second FNV-1a lane, seeded differently.
    pub lo: u64,
}

impl Fingerprint {
    /// 32 lowercase hex digits, used as the persisted file stem.
    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint of everything that determines the rendered bytes, plus the optional
/// owner position some callers key on.
pub fn fingerprint_shadow(
    spec: &ShadowSpec,
    position: Option<&OwnerPosition>,
    raster: &RasterOpts,
) -> Fingerprint {
    let mut a = Fnv1a64::new_default();
    let mut b = Fnv1a64::new(0x9ae16a3b2f90404f);

    write_str_pair(&mut a, &mut b, ALGORITHM_VERSION);
    write_u32_pair(&mut a, &mut b, spec.width);
    write_u32_pair(&mut a, &mut b, spec.height);
    write_u32_pair(&mut a, &mut b, spec.blur_radius);
    write_i32_pair(&mut a, &mut b, spec.expand);
    write_i32_pair(&mut a, &mut b, spec.x_offset);
    write_i32_pair(&mut a, &mut b, spec.y_offset);
    for c in spec.color.to_array() {
        write_u8_pair(&mut a, &mut b, c);
    }
    for r in spec.corner_radii.to_array() {
        write_f32_pair(&mut a, &mut b, r);
    }

    match position {
        Some(p) => {
            write_u8_pair(&mut a, &mut b, 1);
            for v in [p.margin_top, p.margin_left, p.padding_top, p.padding_left] {
                write_f32_pair(&mut a, &mut b, v);
            }
        }
        None => write_u8_pair(&mut a, &mut b, 0),
    }

    write_u64_pair(&mut a, &mut b, canonical_f64_bits(raster.arc_step_deg));
    for adj in raster.stroke_adjust {
        write_i32_pair(&mut a, &mut b, adj);
    }

    Fingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

fn canonical_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u32_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u32) {
    a.write_u32(v);
    b.write_u32(v);
}

fn write_i32_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: i32) {
    write_u32_pair(a, b, v as u32);
}

fn write_f32_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: f32) {
    write_u32_pair(a, b, canonical_f32_bits(v));
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
