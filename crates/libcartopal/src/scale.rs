//! Continuous color scales and their classed sampling.

use palette::{Oklab, Oklch};

use crate::color_utils::{from_oklab, mix_oklch, to_hex, to_oklab};
use crate::{Error, Result};

/// A "continuous" range of colors parametrized by reals in \[0, 1\].
pub trait ColorRange {
    /// Returns the color corresponding to `t` ∈ \[0, 1\].
    fn color_at(&self, t: f32) -> Oklch;
}

/// Piecewise interpolation in OKLCH between equally spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct OklchStops {
    stops: Vec<Oklch>,
}

impl ColorRange for OklchStops {
    fn color_at(&self, t: f32) -> Oklch {
        let segments = self.stops.len() - 1;
        if segments == 0 || t <= 0.0 {
            return self.stops[0];
        }
        if t >= 1.0 {
            return self.stops[segments];
        }

        let scaled = t * segments as f32;
        let i = (scaled.floor() as usize).min(segments - 1);
        mix_oklch(self.stops[i], self.stops[i + 1], scaled - i as f32)
    }
}

/// A Bézier curve in OKLab using the colors as control points.
///
/// Only the end colors lie on the curve; the inner ones pull it toward themselves,
/// which smooths out kinks a piecewise ramp would have at each stop. Evaluated by
/// de Casteljau's algorithm in `f64`, which stays finite for any number of control
/// points.
#[derive(Debug, Clone, PartialEq)]
pub struct OklabBezier {
    points: Vec<[f64; 3]>,
}

impl OklabBezier {
    fn new(colors: &[Oklch]) -> Self {
        let points = colors
            .iter()
            .map(|color| {
                let lab = to_oklab(*color);
                [lab.l as f64, lab.a as f64, lab.b as f64]
            })
            .collect();

        OklabBezier { points }
    }
}

impl ColorRange for OklabBezier {
    fn color_at(&self, t: f32) -> Oklch {
        let t = t.clamp(0.0, 1.0) as f64;

        let mut work = self.points.clone();
        for level in 1..work.len() {
            for i in 0..work.len() - level {
                let (from, to) = (work[i], work[i + 1]);
                work[i] = [
                    from[0] + t * (to[0] - from[0]),
                    from[1] + t * (to[1] - from[1]),
                    from[2] + t * (to[2] - from[2]),
                ];
            }
        }

        let [l, a, b] = work[0];
        from_oklab(Oklab::new(l as f32, a as f32, b as f32))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    Oklch(OklchStops),
    Bezier(OklabBezier),
}

impl ColorRange for Interpolation {
    fn color_at(&self, t: f32) -> Oklch {
        match self {
            Interpolation::Oklch(stops) => stops.color_at(t),
            Interpolation::Bezier(curve) => curve.color_at(t),
        }
    }
}

/// Bisection budget and tolerance (on the 0–100 lightness scale) for lightness
/// correction.
const CORRECTION_STEPS: usize = 20;
const CORRECTION_TOLERANCE: f32 = 1e-2;

/// A continuous color scale, optionally split into discrete classes and corrected so
/// that lightness changes linearly along it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    interpolation: Interpolation,
    classes: Option<usize>,
    correct_lightness: bool,
}

impl Scale {
    /// Piecewise OKLCH scale through `colors`.
    pub fn new(colors: &[Oklch]) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::EmptyColorList);
        }

        Ok(Scale {
            interpolation: Interpolation::Oklch(OklchStops {
                stops: colors.to_vec(),
            }),
            classes: None,
            correct_lightness: false,
        })
    }

    /// Bézier scale with `colors` as control points. Needs at least two colors.
    pub fn bezier(colors: &[Oklch]) -> Result<Self> {
        match colors.len() {
            0 => Err(Error::EmptyColorList),
            1 => Err(Error::InvalidParameter(
                "a Bézier scale needs at least two colors".to_string(),
            )),
            _ => Ok(Scale {
                interpolation: Interpolation::Bezier(OklabBezier::new(colors)),
                classes: None,
                correct_lightness: false,
            }),
        }
    }

    /// Splits the scale into `classes` equal bins; every `t` in a bin maps to the
    /// color at the bin's lower edge, spread so the last bin reaches the end color.
    pub fn classes(mut self, classes: usize) -> Result<Self> {
        if classes == 0 {
            return Err(Error::InvalidParameter(
                "a scale needs at least one class".to_string(),
            ));
        }
        self.classes = Some(classes);
        Ok(self)
    }

    pub fn correct_lightness(mut self) -> Self {
        self.correct_lightness = true;
        self
    }

    pub fn interpolation(&self) -> &Interpolation {
        &self.interpolation
    }

    pub fn class_count(&self) -> Option<usize> {
        self.classes
    }

    pub fn is_lightness_corrected(&self) -> bool {
        self.correct_lightness
    }

    /// `n` colors sampled evenly from one end to the other. A single color is taken
    /// from the middle.
    pub fn colors(&self, n: usize) -> Vec<Oklch> {
        match n {
            0 => vec![],
            1 => vec![self.color_at(0.5)],
            _ => (0..n)
                .map(|i| self.color_at(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }

    pub fn hex_colors(&self, n: usize) -> Vec<String> {
        self.colors(n).into_iter().map(to_hex).collect()
    }

    fn class_position(&self, t: f32) -> f32 {
        match self.classes {
            Some(classes) if classes >= 2 => {
                let class = (t * classes as f32).floor().clamp(0.0, (classes - 1) as f32);
                class / (classes - 1) as f32
            }
            _ => t,
        }
    }

    /// Moves `t` so the raw scale's lightness there matches a straight line between
    /// the end lightnesses.
    ///
    /// Lightness is OKLab L here, where chroma.js measures CIELAB L.
    fn lightness_position(&self, t: f32) -> f32 {
        let lightness = |t: f32| self.interpolation.color_at(t).l * 100.0;

        let l0 = lightness(0.0);
        let l1 = lightness(1.0);
        let descending = l0 > l1;
        let ideal = l0 + (l1 - l0) * t;

        let mut t = t;
        let mut diff = lightness(t) - ideal;
        let (mut t0, mut t1) = (0.0, 1.0);

        for _ in 0..CORRECTION_STEPS {
            if diff.abs() <= CORRECTION_TOLERANCE {
                break;
            }
            if descending {
                diff = -diff;
            }
            if diff < 0.0 {
                t0 = t;
                t += (t1 - t) * 0.5;
            } else {
                t1 = t;
                t += (t0 - t) * 0.5;
            }
            diff = lightness(t) - ideal;
        }

        t
    }
}

impl ColorRange for Scale {
    fn color_at(&self, t: f32) -> Oklch {
        let mut t = self.class_position(t);
        if self.correct_lightness {
            t = self.lightness_position(t);
        }
        self.interpolation.color_at(t.clamp(0.0, 1.0))
    }
}
