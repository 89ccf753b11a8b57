use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Fixed-point decimal backed by a 128-bit unscaled integer, so at most 38
/// significant digits (arrow's `Decimal128` range). Wider stored values are
/// rejected when decoded.
///
/// Precision and scale come from the column metadata, not from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
    pub unscaled: i128,
    pub precision: u8,
    pub scale: i8,
}

pub const MAX_DECIMAL_BYTES: usize = 16;

impl Decimal {
    pub fn new(unscaled: i128, precision: u8, scale: i8) -> Self {
        Self {
            unscaled,
            precision,
            scale,
        }
    }

    /// Decodes big-endian two's complement bytes. Returns `None` for an empty
    /// slice or one wider than 128 bits.
    pub fn from_be_bytes(bytes: &[u8], precision: u8, scale: i8) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > MAX_DECIMAL_BYTES {
            return None;
        }
        let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
        let mut buf = [fill; MAX_DECIMAL_BYTES];
        buf[MAX_DECIMAL_BYTES - bytes.len()..].copy_from_slice(bytes);
        Some(Self::new(i128::from_be_bytes(buf), precision, scale))
    }

    /// Shortest big-endian two's complement form, at least one byte.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let full = self.unscaled.to_be_bytes();
        let mut start = 0;
        while start < MAX_DECIMAL_BYTES - 1 {
            let (cur, next) = (full[start], full[start + 1]);
            let redundant = (cur == 0x00 && next & 0x80 == 0) || (cur == 0xFF && next & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        full[start..].to_vec()
    }

    /// Compares numerically, aligning scales first. `None` when aligning
    /// would overflow.
    pub fn compare(&self, other: &Decimal) -> Option<Ordering> {
        if self.scale == other.scale {
            return Some(self.unscaled.cmp(&other.unscaled));
        }
        let target = self.scale.max(other.scale);
        let left = rescale(self.unscaled, self.scale, target)?;
        let right = rescale(other.unscaled, other.scale, target)?;
        Some(left.cmp(&right))
    }

    pub fn rescaled(&self, scale: i8) -> Option<Decimal> {
        if scale < self.scale {
            return None;
        }
        rescale(self.unscaled, self.scale, scale).map(|v| Decimal::new(v, self.precision, scale))
    }

    pub fn to_f64(&self) -> f64 {
        self.unscaled as f64 / 10f64.powi(self.scale as i32)
    }
}

fn rescale(unscaled: i128, from: i8, to: i8) -> Option<i128> {
    let diff = (to as i32 - from as i32) as u32;
    10i128.checked_pow(diff)?.checked_mul(unscaled)
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            let zeros = "0".repeat((-self.scale) as usize);
            return write!(f, "{}{}", self.unscaled, zeros);
        }
        let scale = self.scale as usize;
        let digits = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        if digits.len() <= scale {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        }
    }
}
