//! Whole-system configuration, loadable from JSON. Missing sections take
//! their firmware defaults.

use crate::{
    autofire::AutofireParams,
    error::{TargetingError, TargetingResult},
    fixed::PI,
    segmentation::SegmentationParams,
    track::TrackParams,
    types::SensorGeometry,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    pub geometry: SensorGeometry,
    pub segmentation: SegmentationParams,
    pub tracking: TrackParams,
    pub autofire: AutofireParams,
}

impl TargetingConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: &Path) -> TargetingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> TargetingResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> TargetingResult<()> {
        let g = &self.geometry;
        if g.field_of_view <= 0 || g.field_of_view > PI {
            return Err(invalid(format!(
                "field_of_view {} outside (0, π] (Q11)",
                g.field_of_view
            )));
        }
        if g.mm_per_unit <= 0 {
            return Err(invalid(format!("mm_per_unit {} must be positive", g.mm_per_unit)));
        }
        if g.min_detection_distance > g.max_detection_distance {
            return Err(invalid("detection window is empty".into()));
        }
        self.segmentation.validate()?;
        if self.tracking.track_lost_dt == 0 {
            return Err(invalid("track_lost_dt must be non-zero".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> TargetingError {
    TargetingError::InvalidParameter(msg)
}
