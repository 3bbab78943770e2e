#![allow(dead_code)]

use libcartopal::color_utils::parse_hex;
use libcartopal::{Session, Settings};
use palette::Oklch;

pub fn session() -> Session {
    Session::with_seed(Settings::default(), 11).unwrap()
}

pub fn session_with(settings: Settings) -> Session {
    Session::with_seed(settings, 11).unwrap()
}

pub fn oklch(hex: &str) -> Oklch {
    parse_hex(hex).unwrap()
}

/// Signed difference `to - from` folded into (-180, 180].
pub fn hue_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}
