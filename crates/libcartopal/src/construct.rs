use palette::Oklch;

use crate::adjust::AdjustedColor;
use crate::color_utils::is_finite;
use crate::scale::Scale;
use crate::settings::PaletteType;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructParams {
    pub palette_type: PaletteType,
    pub classes: usize,
    pub lightness_correction: bool,
    pub bezier_interpolation: bool,
}

/// Builds the classed scale for a consumer from its adjusted colors.
pub fn build_palette(adjusted: &[AdjustedColor], params: &ConstructParams) -> Result<Scale> {
    let mut colors: Vec<Oklch> = adjusted.iter().map(|entry| entry.color).collect();

    // Diverging palettes get each half corrected on its own, so the light center stays
    // where it is.
    if params.palette_type == PaletteType::Diverging
        && params.lightness_correction
        && !colors.is_empty()
    {
        let middle = colors.len() / 2;
        let first = Scale::new(&colors[..=middle])?.correct_lightness();
        let second = Scale::new(&colors[middle..])?.correct_lightness();

        let mut halves = first.colors(params.classes);
        halves.extend(second.colors(params.classes));
        colors = halves;
    }

    let smooth = matches!(
        params.palette_type,
        PaletteType::Sequential | PaletteType::Diverging
    ) && params.bezier_interpolation
        && colors.len() > 1;

    let mut scale = if smooth {
        Scale::bezier(&colors)?
    } else {
        Scale::new(&colors)?
    }
    .classes(params.classes)?;

    if params.palette_type == PaletteType::Sequential && params.lightness_correction {
        scale = scale.correct_lightness();
    }

    if !scale.colors(params.classes).into_iter().all(is_finite) {
        return Err(Error::InvalidParameter(format!(
            "{} palette with {} classes samples to non-finite colors",
            params.palette_type, params.classes
        )));
    }

    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_utils::parse_hex;
    use crate::scale::{ColorRange, Interpolation};

    fn adjusted(colors: &[Oklch]) -> Vec<AdjustedColor> {
        colors
            .iter()
            .map(|color| AdjustedColor {
                seed: None,
                color: *color,
            })
            .collect()
    }

    fn params(palette_type: PaletteType) -> ConstructParams {
        ConstructParams {
            palette_type,
            classes: 5,
            lightness_correction: true,
            bezier_interpolation: true,
        }
    }

    #[test]
    fn sequential_keeps_pinned_endpoints() {
        let input = adjusted(&[
            Oklch::new(0.3, 0.12, 250.0),
            Oklch::new(0.55, 0.15, 180.0),
            Oklch::new(0.7, 0.1, 120.0),
        ]);
        let scale = build_palette(&input, &params(PaletteType::Sequential)).unwrap();
        let colors = scale.colors(5);

        assert_eq!(colors.len(), 5);
        assert!((colors[0].l - 0.3).abs() < 1e-3);
        assert!((colors[4].l - 0.7).abs() < 1e-3);
        assert!(colors.windows(2).all(|pair| pair[0].l < pair[1].l));
        assert!(matches!(scale.interpolation(), Interpolation::Bezier(_)));
        assert!(scale.is_lightness_corrected());
    }

    #[test]
    fn qualitative_never_uses_bezier() {
        let input = adjusted(&[parse_hex("#ff0000").unwrap(), parse_hex("#0000ff").unwrap()]);
        let scale = build_palette(&input, &params(PaletteType::Qualitative)).unwrap();
        assert!(matches!(scale.interpolation(), Interpolation::Oklch(_)));
        assert!(!scale.is_lightness_corrected());
        assert_eq!(scale.hex_colors(2), vec!["#ff0000", "#0000ff"]);
    }

    #[test]
    fn single_color_skips_bezier() {
        let input = adjusted(&[parse_hex("#336699").unwrap()]);
        let mut params = params(PaletteType::Sequential);
        params.lightness_correction = false;
        let scale = build_palette(&input, &params).unwrap();
        assert_eq!(scale.hex_colors(4), vec!["#336699"; 4]);
    }

    #[test]
    fn diverging_halves_meet_at_a_light_center() {
        let input = adjusted(&[
            Oklch::new(0.3, 0.12, 30.0),
            Oklch::new(0.7, 0.0, 0.0),
            Oklch::new(0.3, 0.12, 250.0),
        ]);
        let mut params = params(PaletteType::Diverging);
        params.bezier_interpolation = false;
        let scale = build_palette(&input, &params).unwrap();

        let colors = scale.colors(9);
        assert!((colors[0].l - 0.3).abs() < 1e-3);
        assert!((colors[4].l - 0.7).abs() < 1e-2);
        assert!((colors[8].l - 0.3).abs() < 1e-3);
        assert!((scale.color_at(0.5).l - 0.7).abs() < 1e-2);
    }

    #[test]
    fn diverging_bezier_survives_many_classes() {
        let input = adjusted(&[
            Oklch::new(0.3, 0.12, 250.0),
            Oklch::new(0.7, 0.0, 0.0),
            Oklch::new(0.3, 0.12, 60.0),
        ]);
        let mut params = params(PaletteType::Diverging);
        params.classes = 100;
        let scale = build_palette(&input, &params).unwrap();

        let colors = scale.colors(100);
        assert!(colors.iter().all(|c| is_finite(*c)));
        assert!((colors[0].l - 0.3).abs() < 1e-3);
        assert!((colors[99].l - 0.3).abs() < 1e-3);
        assert!(colors[50].l > colors[0].l + 0.1);

        let hexes = scale.hex_colors(100);
        assert!(hexes.iter().any(|hex| hex != "#000000"));
        assert_ne!(hexes[0], hexes[99]);
    }

    #[test]
    fn empty_input_cannot_build_a_scale() {
        assert!(build_palette(&[], &params(PaletteType::Sequential)).is_err());
    }
}
