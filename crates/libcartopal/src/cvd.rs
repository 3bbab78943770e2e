//! Color vision deficiency simulation.
//!
//! Dichromacies are simulated by projecting the color along its confusion line in CIE
//! xyY onto the deficiency's axis, then shifting toward neutral gray until it fits the
//! sRGB gamut. The anomalous trichromacies blend that result back with the original.

use std::fmt::{self, Display};
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color_utils::{format_srgb8, parse_hex_srgb};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cvd {
    #[default]
    None,
    Deuteranomaly,
    Deuteranopia,
    Protanomaly,
    Protanopia,
    Tritanomaly,
    Tritanopia,
    Achromatomaly,
    Achromatopsia,
}

impl Cvd {
    pub const ALL: [Cvd; 9] = [
        Cvd::None,
        Cvd::Deuteranomaly,
        Cvd::Deuteranopia,
        Cvd::Protanomaly,
        Cvd::Protanopia,
        Cvd::Tritanomaly,
        Cvd::Tritanopia,
        Cvd::Achromatomaly,
        Cvd::Achromatopsia,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Cvd::None => "none",
            Cvd::Deuteranomaly => "deuteranomaly",
            Cvd::Deuteranopia => "deuteranopia",
            Cvd::Protanomaly => "protanomaly",
            Cvd::Protanopia => "protanopia",
            Cvd::Tritanomaly => "tritanomaly",
            Cvd::Tritanopia => "tritanopia",
            Cvd::Achromatomaly => "achromatomaly",
            Cvd::Achromatopsia => "achromatopsia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Cvd::None => "None - Pick a CVD to simulate",
            Cvd::Deuteranomaly => "Deuteranomaly",
            Cvd::Deuteranopia => "Deuteranopia",
            Cvd::Protanomaly => "Protanomaly",
            Cvd::Protanopia => "Protanopia",
            Cvd::Tritanomaly => "Tritanomaly",
            Cvd::Tritanopia => "Tritanopia",
            Cvd::Achromatomaly => "Achromatomaly",
            Cvd::Achromatopsia => "Achromatopsia",
        }
    }

    pub fn simulate(self, color: Srgb<u8>) -> Srgb<u8> {
        let rgb = [color.red, color.green, color.blue].map(f64::from);

        let simulated = match self {
            Cvd::None => return color,
            Cvd::Deuteranomaly => anomalize(dichromat(rgb, &DEUTAN), rgb),
            Cvd::Deuteranopia => dichromat(rgb, &DEUTAN),
            Cvd::Protanomaly => anomalize(dichromat(rgb, &PROTAN), rgb),
            Cvd::Protanopia => dichromat(rgb, &PROTAN),
            Cvd::Tritanomaly => anomalize(dichromat(rgb, &TRITAN), rgb),
            Cvd::Tritanopia => dichromat(rgb, &TRITAN),
            Cvd::Achromatomaly => anomalize(achromat(rgb), rgb),
            Cvd::Achromatopsia => achromat(rgb),
        };

        let [r, g, b] = simulated.map(|c| c.round().clamp(0.0, 255.0) as u8);
        Srgb::new(r, g, b)
    }

    /// Simulates a `#rgb`/`#rrggbb` color and returns lowercase `#rrggbb`.
    pub fn simulate_hex(self, hex: &str) -> Result<String> {
        if self == Cvd::None {
            return Ok(hex.to_string());
        }
        Ok(format_srgb8(self.simulate(parse_hex_srgb(hex)?)))
    }
}

impl Display for Cvd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Cvd {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cvd::ALL
            .into_iter()
            .find(|cvd| cvd.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCvd(s.to_string()))
    }
}

/// A confusion point in CIE xy and the deficiency axis (slope and intercept) colors
/// collapse onto.
struct ConfusionLine {
    x: f64,
    y: f64,
    m: f64,
    yi: f64,
}

const PROTAN: ConfusionLine = ConfusionLine {
    x: 0.7465,
    y: 0.2535,
    m: 1.273463,
    yi: -0.073894,
};

const DEUTAN: ConfusionLine = ConfusionLine {
    x: 1.4,
    y: -0.4,
    m: 0.968437,
    yi: 0.003331,
};

const TRITAN: ConfusionLine = ConfusionLine {
    x: 0.1748,
    y: 0.0,
    m: 0.062921,
    yi: 0.292119,
};

const GAMMA: f64 = 2.2;
const ANOMALY_WEIGHT: f64 = 1.75;

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.412_423_712_066_350_76, 0.357_579_340_136_303_5, 0.180_466_223_236_962_1],
    [0.212_656_067_849_276_93, 0.715_157_818_248_362, 0.072_186_453_917_156_4],
    [0.019_331_987_577_444_885, 0.119_192_674_203_547_62, 0.950_449_112_487_035_1],
];

const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.240_712_47, -1.537_259_26, -0.498_570_35],
    [-0.969_257_97, 1.875_999_01, 0.041_556_08],
    [0.055_635_2, -0.203_996_8, 1.057_071_5],
];

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn decode_srgb(c: f64) -> f64 {
    let c = c / 255.0;
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn dichromat(rgb: [f64; 3], line: &ConfusionLine) -> [f64; 3] {
    let [x_big, y_big, z_big] = mul(&RGB_TO_XYZ, rgb.map(decode_srgb));

    let sum = x_big + y_big + z_big;
    let (cx, cy) = if sum == 0.0 {
        (0.0, 0.0)
    } else {
        (x_big / sum, y_big / sum)
    };

    // Confusion line through the color and the confusion point, intersected with the
    // deficiency axis.
    let slope = (cy - line.y) / (cx - line.x);
    let intercept = cy - cx * slope;
    let dx = (line.yi - intercept) / (slope - line.m);
    let dy = slope * dx + intercept;

    let sim = [dx * y_big / dy, y_big, (1.0 - (dx + dy)) * y_big / dy];

    // D65 neutral gray at the same luminance
    let gray_x = 0.312713 * y_big / 0.329016;
    let gray_z = 0.358271 * y_big / 0.329016;
    let delta = mul(&XYZ_TO_RGB, [gray_x - sim[0], 0.0, gray_z - sim[2]]);
    let mut linear = mul(&XYZ_TO_RGB, sim);

    let fit = |c: f64, d: f64| {
        let shift = ((if c < 0.0 { 0.0 } else { 1.0 }) - c) / d;
        if (0.0..=1.0).contains(&shift) {
            shift
        } else {
            0.0
        }
    };
    let adjust = fit(linear[0], delta[0])
        .max(fit(linear[1], delta[1]))
        .max(fit(linear[2], delta[2]));

    for (c, d) in linear.iter_mut().zip(delta) {
        *c += adjust * d;
    }

    linear.map(|c| {
        let c = if c.is_nan() { 0.0 } else { c };
        255.0 * c.clamp(0.0, 1.0).powf(1.0 / GAMMA)
    })
}

fn achromat(rgb: [f64; 3]) -> [f64; 3] {
    let y = rgb[0] * RGB_TO_XYZ[1][0] + rgb[1] * RGB_TO_XYZ[1][1] + rgb[2] * RGB_TO_XYZ[1][2];
    [y, y, y]
}

fn anomalize(simulated: [f64; 3], original: [f64; 3]) -> [f64; 3] {
    let n = ANOMALY_WEIGHT + 1.0;
    [
        (ANOMALY_WEIGHT * simulated[0] + original[0]) / n,
        (ANOMALY_WEIGHT * simulated[1] + original[1]) / n,
        (ANOMALY_WEIGHT * simulated[2] + original[2]) / n,
    ]
}
