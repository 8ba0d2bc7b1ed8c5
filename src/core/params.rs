use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::layout::ChannelLayout;
use crate::core::processing::filters::DatasetFilter;
use crate::core::processing::stats::DEFAULT_STANDARDIZE_CLIP;
use crate::error::Result;
use crate::types::InputFormat;

/// Minimum summed land-cover fraction used by the standard dataset build.
pub const DEFAULT_MIN_COVERAGE: f64 = 0.5;

/// Which channels the averager masks, where the missing indicator lives,
/// and which channels count towards land-cover coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragingConfig {
    /// Averaged only over pixels whose missing indicator is 0
    pub occlusion_sensitive_channels: Vec<usize>,
    /// None selects the last channel
    pub missing_indicator_channel: Option<usize>,
    pub land_cover_channels: Vec<usize>,
    /// None disables the coverage check
    pub min_coverage: Option<f64>,
}

impl AveragingConfig {
    /// Index of the missing indicator for a tile with `channels` channels.
    pub fn missing_channel_for(&self, channels: usize) -> Option<usize> {
        match self.missing_indicator_channel {
            Some(idx) => Some(idx),
            None => channels.checked_sub(1),
        }
    }
}

impl Default for AveragingConfig {
    fn default() -> Self {
        ChannelLayout::standard().averaging_config(Some(DEFAULT_MIN_COVERAGE))
    }
}

/// Dataset build parameters suitable for config files and CLI overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildParams {
    pub layout: ChannelLayout,
    pub min_coverage: Option<f64>,
    pub filter: DatasetFilter,
    pub input_format: InputFormat,
    /// Average tiles on the rayon thread pool
    pub parallel: bool,
    /// If false, the first unreadable tile aborts the build
    pub continue_on_error: bool,
    /// Clip bound for standardized dataset output
    pub standardize_clip: f64,
}

impl BuildParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: BuildParams = serde_json::from_str(&text)?;
        params.layout.validate()?;
        Ok(params)
    }

    pub fn averaging_config(&self) -> AveragingConfig {
        self.layout.averaging_config(self.min_coverage)
    }
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            layout: ChannelLayout::standard(),
            min_coverage: Some(DEFAULT_MIN_COVERAGE),
            filter: DatasetFilter::default(),
            input_format: InputFormat::Auto,
            parallel: true,
            continue_on_error: true,
            standardize_clip: DEFAULT_STANDARDIZE_CLIP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_channel_defaults_to_last() {
        let cfg = AveragingConfig {
            occlusion_sensitive_channels: vec![0],
            missing_indicator_channel: None,
            land_cover_channels: vec![],
            min_coverage: None,
        };
        assert_eq!(cfg.missing_channel_for(3), Some(2));
        assert_eq!(cfg.missing_channel_for(0), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: BuildParams =
            serde_json::from_str(r#"{ "min_coverage": 0.3, "parallel": false }"#).unwrap();
        assert_eq!(params.min_coverage, Some(0.3));
        assert!(!params.parallel);
        assert!(params.continue_on_error);
        assert_eq!(params.layout.channels(), 43);
        assert_eq!(params.averaging_config().min_coverage, Some(0.3));
    }

    #[test]
    fn config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.json");
        let mut params = BuildParams::default();
        params.filter.min_fraction_valid = Some(0.75);
        std::fs::write(&path, serde_json::to_string_pretty(&params).unwrap()).unwrap();

        let loaded = BuildParams::from_json_file(&path).unwrap();
        assert_eq!(loaded.filter.min_fraction_valid, Some(0.75));
        assert_eq!(loaded.layout, params.layout);
    }
}
