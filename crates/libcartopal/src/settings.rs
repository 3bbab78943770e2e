//! Palette parameters for both consumers, loadable from YAML.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::cvd::Cvd;
use crate::seeds::Consumer;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    /// Lightness ramps monotonically from one end to the other.
    #[default]
    Sequential,
    /// Dark ends around a light center.
    Diverging,
    /// Flat lightness; classes differ by hue only.
    Qualitative,
}

impl PaletteType {
    pub const ALL: [PaletteType; 3] = [
        PaletteType::Sequential,
        PaletteType::Diverging,
        PaletteType::Qualitative,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PaletteType::Sequential => "sequential",
            PaletteType::Diverging => "diverging",
            PaletteType::Qualitative => "qualitative",
        }
    }
}

impl Display for PaletteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PaletteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PaletteType::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPaletteType(s.to_string()))
    }
}

/// Parameters for one consumer's adjustment and palette construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub palette_type: PaletteType,
    pub classes: usize,
    pub lightness_mid: f32,
    pub lightness_range: f32,
    pub invert_lightness: bool,
    pub lightness_correction: bool,
    pub bezier_interpolation: bool,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        ChannelSettings {
            palette_type: PaletteType::Sequential,
            classes: 9,
            lightness_mid: 0.5,
            lightness_range: 0.2,
            invert_lightness: false,
            lightness_correction: true,
            bezier_interpolation: true,
        }
    }
}

impl ChannelSettings {
    /// Area palettes sit lighter by default so point symbols stand out on top.
    pub fn area() -> Self {
        ChannelSettings {
            lightness_mid: 0.7,
            ..Default::default()
        }
    }

    /// The lightness range with the inversion applied as its sign.
    pub fn signed_lightness_range(&self) -> f32 {
        if self.invert_lightness {
            -self.lightness_range
        } else {
            self.lightness_range
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes == 0 {
            return Err(Error::InvalidParameter(
                "classes must be at least 1".to_string(),
            ));
        }
        if !self.lightness_mid.is_finite() || !(0.0..=1.0).contains(&self.lightness_mid) {
            return Err(Error::InvalidParameter(format!(
                "lightness_mid must be between 0 and 1, got {}",
                self.lightness_mid
            )));
        }
        if !self.lightness_range.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "lightness_range must be finite, got {}",
                self.lightness_range
            )));
        }
        Ok(())
    }
}

/// A channel block as written in a settings file. Missing fields fall back to the
/// consumer's own defaults, not to a shared set.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct PartialChannelSettings {
    palette_type: Option<PaletteType>,
    classes: Option<usize>,
    lightness_mid: Option<f32>,
    lightness_range: Option<f32>,
    invert_lightness: Option<bool>,
    lightness_correction: Option<bool>,
    bezier_interpolation: Option<bool>,
}

impl PartialChannelSettings {
    fn over(self, base: ChannelSettings) -> ChannelSettings {
        ChannelSettings {
            palette_type: self.palette_type.unwrap_or(base.palette_type),
            classes: self.classes.unwrap_or(base.classes),
            lightness_mid: self.lightness_mid.unwrap_or(base.lightness_mid),
            lightness_range: self.lightness_range.unwrap_or(base.lightness_range),
            invert_lightness: self.invert_lightness.unwrap_or(base.invert_lightness),
            lightness_correction: self
                .lightness_correction
                .unwrap_or(base.lightness_correction),
            bezier_interpolation: self
                .bezier_interpolation
                .unwrap_or(base.bezier_interpolation),
        }
    }
}

fn point_channel<'de, D>(deserializer: D) -> std::result::Result<ChannelSettings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialChannelSettings::deserialize(deserializer)?.over(ChannelSettings::default()))
}

fn area_channel<'de, D>(deserializer: D) -> std::result::Result<ChannelSettings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialChannelSettings::deserialize(deserializer)?.over(ChannelSettings::area()))
}

/// Target range for [`crate::Session::rescale_hue_to_settings`], in degrees. A `min`
/// above `max` wraps through 0°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HueRange {
    pub min: f32,
    pub max: f32,
}

impl Default for HueRange {
    fn default() -> Self {
        HueRange {
            min: 120.0,
            max: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "point_channel")]
    pub point: ChannelSettings,
    #[serde(deserialize_with = "area_channel")]
    pub area: ChannelSettings,
    pub cvd: Cvd,
    pub hue_range: HueRange,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            point: ChannelSettings::default(),
            area: ChannelSettings::area(),
            cvd: Cvd::None,
            hue_range: HueRange::default(),
        }
    }
}

impl Settings {
    /// Parses YAML settings. Missing fields take their defaults.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings: Settings = serde_yaml::from_str(input)
            .map_err(|e| Error::InvalidSettings(format!("could not parse settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::InvalidSettings(format!("could not write settings: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        for consumer in Consumer::BOTH {
            self.channel(consumer)
                .validate()
                .map_err(|e| Error::InvalidSettings(format!("{} settings: {}", consumer, e)))?;
        }
        if !self.hue_range.min.is_finite() || !self.hue_range.max.is_finite() {
            return Err(Error::InvalidSettings(
                "hue_range bounds must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn channel(&self, consumer: Consumer) -> &ChannelSettings {
        match consumer {
            Consumer::Point => &self.point,
            Consumer::Area => &self.area,
        }
    }

    pub fn channel_mut(&mut self, consumer: Consumer) -> &mut ChannelSettings {
        match consumer {
            Consumer::Point => &mut self.point,
            Consumer::Area => &mut self.area,
        }
    }
}
