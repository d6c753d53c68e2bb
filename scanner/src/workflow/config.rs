use anyhow::Context;
use beamcore::prelude::LoadConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanJobConfig {
    pub apply_calibration: bool,
    #[serde(default)]
    pub smoothing_window: Option<usize>,
}

impl ScanJobConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scan job config {}", path_ref.display()))?;
        let config: ScanJobConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scan job config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(apply_calibration: bool, smoothing_window: Option<usize>) -> Self {
        Self {
            apply_calibration,
            smoothing_window,
        }
    }

    pub fn to_load_config(&self) -> LoadConfig {
        LoadConfig {
            apply_calibration: self.apply_calibration,
            smoothing_window: self.smoothing_window,
        }
    }
}
