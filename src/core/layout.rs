//! Channel layout of a tile: names and semantic groups in channel order.
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::params::AveragingConfig;
use crate::error::{Error, Result};

const REFLECTANCE_NAMES: [&str; 9] = [
    "ref_1", "ref_2", "ref_3", "ref_4", "ref_5", "ref_6", "ref_7", "ref_10", "ref_11",
];

const WEATHER_NAMES: [&str; 3] = ["Rainf_f_tavg", "SWdown_f_tavg", "Tair_f_tavg"];

const LAND_COVER_NAMES: [&str; 30] = [
    "grassland_pasture",
    "corn",
    "soybean",
    "shrubland",
    "deciduous_forest",
    "evergreen_forest",
    "spring_wheat",
    "developed_open_space",
    "other_hay_non_alfalfa",
    "winter_wheat",
    "herbaceous_wetlands",
    "woody_wetlands",
    "open_water",
    "alfalfa",
    "fallow_idle_cropland",
    "sorghum",
    "developed_low_intensity",
    "barren",
    "durum_wheat",
    "canola",
    "sunflower",
    "dry_beans",
    "developed_med_intensity",
    "millet",
    "sugarbeets",
    "oats",
    "mixed_forest",
    "peas",
    "barley",
    "lentils",
];

const MISSING_NAME: &str = "missing_reflectance";

/// Ordered channel names plus the index ranges of each semantic group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLayout {
    pub names: Vec<String>,
    pub reflectance: Range<usize>,
    pub weather: Range<usize>,
    pub land_cover: Range<usize>,
}

impl ChannelLayout {
    /// Landsat reflectance, FLDAS weather, CDL cover fractions, missing indicator (43 channels).
    pub fn standard() -> Self {
        let names: Vec<String> = REFLECTANCE_NAMES
            .iter()
            .chain(WEATHER_NAMES.iter())
            .chain(LAND_COVER_NAMES.iter())
            .chain(std::iter::once(&MISSING_NAME))
            .map(|s| s.to_string())
            .collect();
        let refl_end = REFLECTANCE_NAMES.len();
        let weather_end = refl_end + WEATHER_NAMES.len();
        let cover_end = weather_end + LAND_COVER_NAMES.len();
        Self {
            names,
            reflectance: 0..refl_end,
            weather: refl_end..weather_end,
            land_cover: weather_end..cover_end,
        }
    }

    /// Layout with generic names (`band_0`, ...) for tiles that do not follow the standard order.
    pub fn generic(
        channels: usize,
        reflectance: Range<usize>,
        weather: Range<usize>,
        land_cover: Range<usize>,
    ) -> Result<Self> {
        let mut names: Vec<String> = (0..channels.saturating_sub(1))
            .map(|i| format!("band_{}", i))
            .collect();
        names.push(MISSING_NAME.to_string());
        let layout = Self {
            names,
            reflectance,
            weather,
            land_cover,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn channels(&self) -> usize {
        self.names.len()
    }

    /// The missing-reflectance indicator is always the last channel.
    pub fn missing_indicator(&self) -> usize {
        self.names.len().saturating_sub(1)
    }

    pub fn name(&self, channel: usize) -> Option<&str> {
        self.names.get(channel).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.names.len() < 2 {
            return Err(Error::InvalidLayout(format!(
                "need at least one data channel and the missing indicator, got {} channels",
                self.names.len()
            )));
        }
        let last = self.missing_indicator();
        for (group, range) in [
            ("reflectance", &self.reflectance),
            ("weather", &self.weather),
            ("land_cover", &self.land_cover),
        ] {
            if range.start > range.end || range.end > last {
                return Err(Error::InvalidLayout(format!(
                    "{} range {:?} must end before the missing indicator ({})",
                    group, range, last
                )));
            }
        }
        Ok(())
    }

    /// Averager configuration for this layout.
    pub fn averaging_config(&self, min_coverage: Option<f64>) -> AveragingConfig {
        AveragingConfig {
            occlusion_sensitive_channels: self.reflectance.clone().collect(),
            missing_indicator_channel: Some(self.missing_indicator()),
            land_cover_channels: self.land_cover.clone().collect(),
            min_coverage,
        }
    }
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self::standard()
    }
}
