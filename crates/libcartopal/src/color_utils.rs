use palette::convert::FromColorUnclamped;
use palette::{Oklab, OklabHue, Oklch, Srgb};

use crate::{Error, Result};

/// Chroma below which a color is treated as achromatic, i.e. its hue is undefined.
pub const ACHROMATIC_CHROMA: f32 = 1e-4;

/// Affine remap of `value` from `[min_before, max_before]` to `[min_after, max_after]`.
///
/// Fails with [`Error::InvalidParameter`] when the source bounds coincide, since the
/// result would be NaN or infinite.
pub fn rescale(
    value: f32,
    min_after: f32,
    max_after: f32,
    min_before: f32,
    max_before: f32,
) -> Result<f32> {
    if max_before == min_before {
        return Err(Error::InvalidParameter(format!(
            "cannot rescale from the empty range [{}, {}]",
            min_before, max_before
        )));
    }

    Ok(min_after + ((value - min_before) * (max_after - min_after)) / (max_before - min_before))
}

/// [`rescale`] with the source range fixed to `[0, 1]`.
pub fn rescale_unit(value: f32, min_after: f32, max_after: f32) -> f32 {
    min_after + value * (max_after - min_after)
}

/// Wraps a hue in degrees into `[0, 360)`.
pub fn wrap_hue(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn rotate_hue(color: Oklch, delta: f32) -> Oklch {
    Oklch::new(
        color.l,
        color.chroma,
        OklabHue::from_degrees(wrap_hue(hue_degrees(color) + delta)),
    )
}

/// Maps a hue in `[0, 360]` into `[new_min, new_max]`.
///
/// When `new_min` is not below `new_max` the target range crosses 0°, so the hue is
/// spread over `new_min..360 + new_max` and folded back past 360.
pub fn rescale_hue_into(hue: f32, new_min: f32, new_max: f32) -> f32 {
    // The source range is the constant [0, 360], so the division is always defined.
    if new_min < new_max {
        rescale_unit(hue / 360.0, new_min, new_max)
    } else {
        let hue = rescale_unit(hue / 360.0, new_min, 360.0 + new_max);
        if hue > 360.0 {
            hue - 360.0
        } else {
            hue
        }
    }
}

pub fn hue_degrees(color: Oklch) -> f32 {
    color.hue.into_positive_degrees()
}

pub fn is_achromatic(color: Oklch) -> bool {
    color.chroma < ACHROMATIC_CHROMA
}

/// Whether every channel holds a real number. NaN channels would encode as black.
pub fn is_finite(color: Oklch) -> bool {
    color.l.is_finite() && color.chroma.is_finite() && hue_degrees(color).is_finite()
}

pub fn with_lightness(color: Oklch, l: f32) -> Oklch {
    Oklch::new(l, color.chroma, color.hue)
}

/// Parses `#rgb` or `#rrggbb` (case-insensitive, leading `#` required).
pub fn parse_hex_srgb(hex: &str) -> Result<Srgb<u8>> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| Error::InvalidColor(hex.to_string()))?;

    if !(digits.len() == 3 || digits.len() == 6) || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(Error::InvalidColor(hex.to_string()));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| Error::InvalidColor(hex.to_string()));

    if digits.len() == 3 {
        let r = channel(&digits[0..1])?;
        let g = channel(&digits[1..2])?;
        let b = channel(&digits[2..3])?;
        Ok(Srgb::new(r * 17, g * 17, b * 17))
    } else {
        Ok(Srgb::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ))
    }
}

pub fn parse_hex(hex: &str) -> Result<Oklch> {
    Ok(srgb8_to_oklch(parse_hex_srgb(hex)?))
}

pub fn srgb8_to_oklch(color: Srgb<u8>) -> Oklch {
    Oklch::from_color_unclamped(color.into_format::<f32>())
}

pub fn format_srgb8(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Converts to 8-bit sRGB, pulling out-of-gamut colors in by lowering chroma at
/// constant lightness and hue.
pub fn to_srgb8(color: Oklch) -> Srgb<u8> {
    let l = if color.l.is_nan() { 0.0 } else { color.l.clamp(0.0, 1.0) };
    let chroma = if color.chroma.is_nan() { 0.0 } else { color.chroma.max(0.0) };
    let candidate = Oklch::new(l, chroma, color.hue);

    let srgb = if in_gamut(candidate) {
        unclamped_srgb(candidate)
    } else {
        let mut low = 0.0;
        let mut high = chroma;
        for _ in 0..24 {
            let mid = (low + high) / 2.0;
            if in_gamut(Oklch::new(l, mid, color.hue)) {
                low = mid;
            } else {
                high = mid;
            }
        }
        unclamped_srgb(Oklch::new(l, low, color.hue))
    };

    let channel = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    Srgb::new(channel(srgb.red), channel(srgb.green), channel(srgb.blue))
}

pub fn to_hex(color: Oklch) -> String {
    format_srgb8(to_srgb8(color))
}

pub fn to_oklab(color: Oklch) -> Oklab {
    Oklab::from_color_unclamped(color)
}

pub fn from_oklab(color: Oklab) -> Oklch {
    Oklch::from_color_unclamped(color)
}

fn unclamped_srgb(color: Oklch) -> Srgb {
    Srgb::from_color_unclamped(color)
}

fn in_gamut(color: Oklch) -> bool {
    const EPSILON: f32 = 1e-4;
    let srgb = unclamped_srgb(color);
    [srgb.red, srgb.green, srgb.blue]
        .iter()
        .all(|c| (-EPSILON..=1.0 + EPSILON).contains(c))
}

/// Linear interpolation in OKLCH along the shorter hue arc.
///
/// An achromatic endpoint has no meaningful hue, so the other endpoint's hue is used
/// throughout; when the other endpoint sits on the gray axis too, its chroma is kept.
pub fn mix_oklch(from: Oklch, to: Oklch, t: f32) -> Oklch {
    let h0 = hue_degrees(from);
    let h1 = hue_degrees(to);
    let gray0 = is_achromatic(from);
    let gray1 = is_achromatic(to);

    let hue = match (gray0, gray1) {
        (false, false) => {
            let dh = if h1 > h0 && h1 - h0 > 180.0 {
                h1 - (h0 + 360.0)
            } else if h1 < h0 && h0 - h1 > 180.0 {
                h1 + 360.0 - h0
            } else {
                h1 - h0
            };
            h0 + t * dh
        }
        (false, true) => h0,
        (true, false) => h1,
        (true, true) => 0.0,
    };

    Oklch::new(
        from.l + t * (to.l - from.l),
        from.chroma + t * (to.chroma - from.chroma),
        OklabHue::from_degrees(wrap_hue(hue)),
    )
}
