//! The seed color registry.
//!
//! Seeds are kept in an id-keyed ordered map; their assignment to the point and area
//! input sequences lives in two separate [`Assignment`]s so reordering never touches
//! the seeds themselves.

use std::fmt::{self, Display};
use std::ops::RangeInclusive;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use palette::Srgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::color_utils::{
    format_srgb8, hue_degrees, is_achromatic, parse_hex, parse_hex_srgb, rescale_hue_into,
    rotate_hue, srgb8_to_oklch, to_hex, with_lightness,
};
use crate::{Error, Result};

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})").expect("hex color pattern is valid")
});

/// Lightness of the first color when generating without a start color.
const GENERATED_LIGHTNESS: f32 = 0.7;
/// Chroma drawn for the first seed of a walk from a start color, ends included.
const START_CHROMA: RangeInclusive<f32> = 0.3..=1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeedId(pub usize);

impl Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two independent consumers of seed colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consumer {
    Point,
    Area,
}

impl Consumer {
    pub const BOTH: [Consumer; 2] = [Consumer::Point, Consumer::Area];
}

impl Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consumer::Point => f.write_str("point"),
            Consumer::Area => f.write_str("area"),
        }
    }
}

/// A seed color together with its current input positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedColor {
    pub id: SeedId,
    /// Authoritative `#rgb`/`#rrggbb` string, stored as given.
    pub color: String,
    pub point_input_index: Option<usize>,
    pub area_input_index: Option<usize>,
}

impl SeedColor {
    pub fn input_index(&self, consumer: Consumer) -> Option<usize> {
        match consumer {
            Consumer::Point => self.point_input_index,
            Consumer::Area => self.area_input_index,
        }
    }
}

/// Where [`SeedRegistry::initialize`] takes its colors from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialSeeds {
    Generate {
        count: usize,
        start_color: Option<String>,
    },
    Random {
        count: usize,
    },
    Text(String),
}

pub struct SeedRegistry {
    seeds: IndexMap<SeedId, String>,
    point: Assignment,
    area: Assignment,
    rng: StdRng,
}

impl fmt::Debug for SeedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedRegistry")
            .field("seeds", &self.seeds)
            .field("point", &self.point)
            .field("area", &self.area)
            .finish()
    }
}

impl Default for SeedRegistry {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl SeedRegistry {
    /// A registry holding a single black seed assigned first to both consumers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rng(rng: StdRng) -> Self {
        let mut seeds = IndexMap::new();
        seeds.insert(SeedId(0), "#000000".to_string());

        SeedRegistry {
            seeds,
            point: Assignment::new().with_raw_position(SeedId(0), Some(0)),
            area: Assignment::new().with_raw_position(SeedId(0), Some(0)),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn contains(&self, id: SeedId) -> bool {
        self.seeds.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<SeedId> {
        self.seeds.keys().copied().collect()
    }

    pub fn colors(&self) -> Vec<String> {
        self.seeds.values().cloned().collect()
    }

    pub fn seeds(&self) -> Vec<SeedColor> {
        self.seeds
            .iter()
            .map(|(id, color)| self.seed_color(*id, color))
            .collect()
    }

    /// # Panics
    ///
    /// Panics if `id` is not in the registry.
    pub fn get(&self, id: SeedId) -> SeedColor {
        let color = self.expect_color(id);
        self.seed_color(id, color)
    }

    pub fn assignment(&self, consumer: Consumer) -> &Assignment {
        match consumer {
            Consumer::Point => &self.point,
            Consumer::Area => &self.area,
        }
    }

    /// Resizes to `count` seeds with hues evenly spread in OKLCH.
    ///
    /// Without a start color the walk starts from a random color at lightness 0.7. With
    /// one, the first seed is the start color rotated by one step plus a degree, with
    /// a random chroma between 0.3 and 1.
    pub fn generate(&mut self, count: usize, start_color: Option<&str>) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidParameter(
                "cannot generate zero seed colors".to_string(),
            ));
        }

        let mut hue_shift = 360.0 / count as f32;
        let mut current = match start_color {
            Some(start) => {
                let start = parse_hex(start)?;
                hue_shift += 1.0;
                let rotated = rotate_hue(start, hue_shift);
                let chroma = self.rng.gen_range(START_CHROMA);
                palette::Oklch::new(rotated.l, chroma, rotated.hue)
            }
            None => with_lightness(srgb8_to_oklch(self.random_srgb()), GENERATED_LIGHTNESS),
        };

        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            colors.push(to_hex(current));
            current = rotate_hue(current, hue_shift);
        }

        self.resize_with(colors);
        Ok(())
    }

    /// Resizes to `count` independently random seeds.
    pub fn generate_random(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidParameter(
                "cannot generate zero seed colors".to_string(),
            ));
        }

        let colors = (0..count)
            .map(|_| format_srgb8(self.random_srgb()))
            .collect();
        self.resize_with(colors);
        Ok(())
    }

    /// Replaces the seed colors with `colors`, kept verbatim and in order.
    ///
    /// Every entry must be a `#rgb` or `#rrggbb` hex color; otherwise nothing changes.
    pub fn load<S: AsRef<str>>(&mut self, colors: &[S]) -> Result<()> {
        for color in colors {
            parse_hex_srgb(color.as_ref())?;
        }

        self.resize_with(colors.iter().map(|c| c.as_ref().to_string()).collect());
        Ok(())
    }

    /// Loads every `#rgb`/`#rrggbb` token found in `text`.
    ///
    /// Returns the number of colors loaded, or [`Error::NoColorsFound`] with the
    /// registry untouched.
    pub fn load_from_text(&mut self, text: &str) -> Result<usize> {
        let found = extract_hex_colors(text);
        if found.is_empty() {
            return Err(Error::NoColorsFound);
        }

        self.load(&found)?;
        Ok(found.len())
    }

    /// Fills the registry from `source`, then makes the first three seeds (where
    /// present) the first three inputs of both consumers.
    ///
    /// Existing assignments are discarded so the result is always contiguous.
    pub fn initialize(&mut self, source: &InitialSeeds) -> Result<()> {
        match source {
            InitialSeeds::Generate { count, start_color } => {
                self.generate(*count, start_color.as_deref())?
            }
            InitialSeeds::Random { count } => self.generate_random(*count)?,
            InitialSeeds::Text(text) => {
                self.load_from_text(text)?;
            }
        }

        self.point = Assignment::new();
        self.area = Assignment::new();

        for (position, id) in self.ids().into_iter().take(3).enumerate() {
            self.set_input_index(id, Consumer::Point, Some(position));
            self.set_input_index(id, Consumer::Area, Some(position));
        }

        Ok(())
    }

    /// Sets a raw input position. Other positions are left alone, so the caller is
    /// responsible for keeping the sequence contiguous.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the registry.
    pub fn set_input_index(&mut self, id: SeedId, consumer: Consumer, position: Option<usize>) {
        self.expect_color(id);
        let updated = self.assignment(consumer).with_raw_position(id, position);
        self.replace_assignment(consumer, updated);
    }

    /// Remaps every seed's OKLCH hue into `[new_min, new_max]`. A range with
    /// `new_min >= new_max` wraps through 0°.
    pub fn rescale_hue(&mut self, new_min: f32, new_max: f32) -> Result<()> {
        if !new_min.is_finite() || !new_max.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "hue range [{}, {}] is not finite",
                new_min, new_max
            )));
        }

        let mut rescaled = Vec::with_capacity(self.seeds.len());
        for color in self.seeds.values() {
            let oklch = parse_hex(color)?;
            if is_achromatic(oklch) {
                rescaled.push(color.clone());
                continue;
            }

            let hue = rescale_hue_into(hue_degrees(oklch), new_min, new_max);
            rescaled.push(to_hex(palette::Oklch::new(oklch.l, oklch.chroma, hue)));
        }

        for (color, new_color) in self.seeds.values_mut().zip(rescaled) {
            *color = new_color;
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if `id` is not in the registry.
    pub fn remove_from_input(&mut self, consumer: Consumer, id: SeedId) {
        self.expect_color(id);
        let updated = self.assignment(consumer).remove(id);
        self.replace_assignment(consumer, updated);
    }

    /// # Panics
    ///
    /// Panics if `id` is not in the registry.
    pub fn add_to_input_end(&mut self, consumer: Consumer, id: SeedId) {
        self.expect_color(id);
        let updated = self.assignment(consumer).append(id);
        self.replace_assignment(consumer, updated);
    }

    /// Moves `dragged` to the input position `target` holds, shifting `target` and
    /// everything after it back by one.
    ///
    /// # Panics
    ///
    /// Panics if either id is not in the registry.
    pub fn add_to_input_position(&mut self, consumer: Consumer, dragged: SeedId, target: SeedId) {
        self.expect_color(dragged);
        self.expect_color(target);
        let updated = self.assignment(consumer).insert_at_target(dragged, target);
        self.replace_assignment(consumer, updated);
    }

    fn replace_assignment(&mut self, consumer: Consumer, assignment: Assignment) {
        match consumer {
            Consumer::Point => self.point = assignment,
            Consumer::Area => self.area = assignment,
        }
    }

    fn seed_color(&self, id: SeedId, color: &str) -> SeedColor {
        SeedColor {
            id,
            color: color.to_string(),
            point_input_index: self.point.position(id),
            area_input_index: self.area.position(id),
        }
    }

    fn expect_color(&self, id: SeedId) -> &str {
        match self.seeds.get(&id) {
            Some(color) => color,
            None => panic!(
                "seed {} does not exist (registry holds {} seeds)",
                id,
                self.seeds.len()
            ),
        }
    }

    fn random_srgb(&mut self) -> Srgb<u8> {
        Srgb::new(self.rng.gen(), self.rng.gen(), self.rng.gen())
    }

    /// Sets the seed colors in order, growing or shrinking to fit.
    ///
    /// Seeds beyond the new length are unassigned from both consumers before they are
    /// dropped; new seeds take their position as id and start unassigned.
    fn resize_with(&mut self, colors: Vec<String>) {
        let removed: Vec<SeedId> = self.seeds.keys().skip(colors.len()).copied().collect();
        for id in removed {
            self.point = self.point.remove(id);
            self.area = self.area.remove(id);
            self.seeds.shift_remove(&id);
        }

        let existing: Vec<SeedId> = self.ids();
        for (position, color) in colors.into_iter().enumerate() {
            match existing.get(position) {
                Some(id) => {
                    self.seeds.insert(*id, color);
                }
                None => {
                    let id = self.fresh_id(position);
                    self.seeds.insert(id, color);
                }
            }
        }
    }

    fn fresh_id(&self, preferred: usize) -> SeedId {
        let mut candidate = preferred;
        while self.seeds.contains_key(&SeedId(candidate)) {
            candidate += 1;
        }
        SeedId(candidate)
    }
}

/// All `#rgb`/`#rrggbb` tokens in `text`, in order of appearance.
pub fn extract_hex_colors(text: &str) -> Vec<String> {
    HEX_COLOR
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
