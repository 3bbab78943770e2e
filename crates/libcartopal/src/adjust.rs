//! Perceptual adjustment of a consumer's input colors before a palette is built.

use palette::Oklch;

use crate::color_utils::{parse_hex, rotate_hue, srgb8_to_oklch, to_hex, to_srgb8, with_lightness};
use crate::cvd::Cvd;
use crate::seeds::{SeedColor, SeedId};
use crate::settings::PaletteType;
use crate::Result;

/// Neutral gray inserted into short diverging sequences. Its hue is meaningless.
fn neutral_gray() -> Oklch {
    Oklch::new(0.5, 0.0, 0.0)
}

/// A color after adjustment. Synthesized entries have no backing seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedColor {
    pub seed: Option<SeedId>,
    pub color: Oklch,
}

impl AdjustedColor {
    pub fn hex(&self) -> String {
        to_hex(self.color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustParams {
    pub palette_type: PaletteType,
    pub lightness_mid: f32,
    /// Negative when the lightness ramp is inverted.
    pub lightness_range: f32,
    pub lightness_correction: bool,
    pub cvd: Cvd,
}

/// Applies the palette type's lightness shaping to `inputs`, then the CVD simulation.
///
/// The inputs are never modified; the returned sequence may be longer than the input
/// when a diverging palette needs synthesized colors.
pub fn adjust(inputs: &[SeedColor], params: &AdjustParams) -> Result<Vec<AdjustedColor>> {
    let mut adjusted = inputs
        .iter()
        .map(|seed| {
            Ok(AdjustedColor {
                seed: Some(seed.id),
                color: parse_hex(&seed.color)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if params.lightness_correction && !adjusted.is_empty() {
        let dark = params.lightness_mid - params.lightness_range;
        let light = params.lightness_mid + params.lightness_range;

        match params.palette_type {
            PaletteType::Sequential => {
                if adjusted.len() == 1 {
                    adjusted.push(adjusted[0]);
                }
                set_lightness(&mut adjusted[0], dark);
                let last = adjusted.len() - 1;
                set_lightness(&mut adjusted[last], light);
            }
            PaletteType::Diverging => {
                pad_diverging(&mut adjusted);

                set_lightness(&mut adjusted[0], dark);
                for i in middle_indices(adjusted.len()) {
                    set_lightness(&mut adjusted[i], light);
                }
                let last = adjusted.len() - 1;
                set_lightness(&mut adjusted[last], dark);
            }
            PaletteType::Qualitative => {
                for entry in adjusted.iter_mut() {
                    set_lightness(entry, params.lightness_mid);
                }
            }
        }
    }

    if params.cvd != Cvd::None {
        for entry in adjusted.iter_mut() {
            entry.color = srgb8_to_oklch(params.cvd.simulate(to_srgb8(entry.color)));
        }
    }

    Ok(adjusted)
}

/// Grows a diverging sequence to three entries: a neutral center for two inputs, and
/// a neutral center plus the complementary color for one.
fn pad_diverging(adjusted: &mut Vec<AdjustedColor>) {
    let gray = AdjustedColor {
        seed: None,
        color: neutral_gray(),
    };

    match adjusted.len() {
        1 => {
            let complementary = AdjustedColor {
                seed: None,
                color: rotate_hue(adjusted[0].color, 180.0),
            };
            adjusted.insert(1, gray);
            adjusted.insert(2, complementary);
        }
        2 => adjusted.insert(1, gray),
        _ => {}
    }
}

/// The center entry of an odd-length sequence, or both center entries of an even one.
fn middle_indices(len: usize) -> Vec<usize> {
    if len < 3 {
        return vec![];
    }
    let middle = len / 2;
    if len % 2 == 1 {
        vec![middle]
    } else {
        vec![middle, middle - 1]
    }
}

fn set_lightness(entry: &mut AdjustedColor, l: f32) {
    entry.color = with_lightness(entry.color, l);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_utils::hue_degrees;
    use pretty_assertions::assert_eq;

    fn seeds(colors: &[&str]) -> Vec<SeedColor> {
        colors
            .iter()
            .enumerate()
            .map(|(i, color)| SeedColor {
                id: SeedId(i),
                color: color.to_string(),
                point_input_index: Some(i),
                area_input_index: None,
            })
            .collect()
    }

    fn params(palette_type: PaletteType) -> AdjustParams {
        AdjustParams {
            palette_type,
            lightness_mid: 0.5,
            lightness_range: 0.2,
            lightness_correction: true,
            cvd: Cvd::None,
        }
    }

    fn lightness(adjusted: &[AdjustedColor]) -> Vec<f32> {
        adjusted
            .iter()
            .map(|a| (a.color.l * 1000.0).round() / 1000.0)
            .collect()
    }

    #[test]
    fn sequential_pins_the_endpoints() {
        let input = seeds(&["#ff0000", "#00ff00", "#0000ff"]);
        let adjusted = adjust(&input, &params(PaletteType::Sequential)).unwrap();

        let original_middle = parse_hex("#00ff00").unwrap().l;
        assert_eq!(adjusted.len(), 3);
        assert!((adjusted[0].color.l - 0.3).abs() < 1e-6);
        assert!((adjusted[1].color.l - original_middle).abs() < 1e-6);
        assert!((adjusted[2].color.l - 0.7).abs() < 1e-6);
    }

    #[test]
    fn sequential_duplicates_a_single_input() {
        let adjusted = adjust(&seeds(&["#336699"]), &params(PaletteType::Sequential)).unwrap();
        assert_eq!(lightness(&adjusted), vec![0.3, 0.7]);
        assert_eq!(adjusted[0].seed, adjusted[1].seed);
    }

    #[test]
    fn inverted_range_swaps_dark_and_light() {
        let mut params = params(PaletteType::Sequential);
        params.lightness_range = -0.2;
        let adjusted = adjust(&seeds(&["#336699", "#996633"]), &params).unwrap();
        assert_eq!(lightness(&adjusted), vec![0.7, 0.3]);
    }

    #[test]
    fn diverging_single_input_gains_gray_and_complement() {
        let input = seeds(&["#3b82f6"]);
        let adjusted = adjust(&input, &params(PaletteType::Diverging)).unwrap();

        assert_eq!(adjusted.len(), 3);
        assert_eq!(lightness(&adjusted), vec![0.3, 0.7, 0.3]);
        assert_eq!(adjusted[1].seed, None);
        assert_eq!(adjusted[1].color.chroma, 0.0);
        assert_eq!(adjusted[2].seed, None);

        let hue = hue_degrees(adjusted[0].color);
        let complement = hue_degrees(adjusted[2].color);
        assert!(((complement - hue).rem_euclid(360.0) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn diverging_pair_gains_a_gray_center() {
        let adjusted = adjust(
            &seeds(&["#ff0000", "#0000ff"]),
            &params(PaletteType::Diverging),
        )
        .unwrap();
        assert_eq!(adjusted.len(), 3);
        assert_eq!(adjusted[1].seed, None);
        assert_eq!(lightness(&adjusted), vec![0.3, 0.7, 0.3]);
    }

    #[test]
    fn diverging_even_length_lightens_both_centers() {
        let adjusted = adjust(
            &seeds(&["#ff0000", "#ffaa00", "#00aaff", "#0000ff"]),
            &params(PaletteType::Diverging),
        )
        .unwrap();
        assert_eq!(lightness(&adjusted), vec![0.3, 0.7, 0.7, 0.3]);
    }

    #[test]
    fn qualitative_flattens_lightness() {
        let adjusted = adjust(
            &seeds(&["#ff0000", "#00ff00", "#0000ff"]),
            &params(PaletteType::Qualitative),
        )
        .unwrap();
        assert_eq!(lightness(&adjusted), vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn without_correction_colors_pass_through() {
        let mut params = params(PaletteType::Diverging);
        params.lightness_correction = false;
        let input = seeds(&["#ff0000"]);
        let adjusted = adjust(&input, &params).unwrap();
        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].hex(), "#ff0000");
    }

    #[test]
    fn cvd_runs_after_lightness_shaping() {
        let mut params = params(PaletteType::Qualitative);
        params.cvd = Cvd::Achromatopsia;
        let adjusted = adjust(&seeds(&["#ff0000", "#0000ff"]), &params).unwrap();

        for entry in adjusted {
            let srgb = to_srgb8(entry.color);
            assert_eq!(srgb.red, srgb.green);
            assert_eq!(srgb.green, srgb.blue);
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        let adjusted = adjust(&[], &params(PaletteType::Diverging)).unwrap();
        assert!(adjusted.is_empty());
    }
}
