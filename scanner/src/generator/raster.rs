use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for generating a synthetic raster scan table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub x_start: f64,
    pub x_stop: f64,
    pub x_points: usize,
    pub y_start: f64,
    pub y_stop: f64,
    pub y_points: usize,
    /// 1/e amplitude radius of the simulated beam, in stage units.
    pub beam_waist: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            x_start: -30.0,
            x_stop: 30.0,
            x_points: 31,
            y_start: -30.0,
            y_stop: 30.0,
            y_points: 31,
            beam_waist: 12.0,
            noise: 0.002,
            seed: 0,
        }
    }
}

impl RasterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading raster config {}", path_ref.display()))?;
        let config: RasterConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing raster config {}", path_ref.display()))?;
        Ok(config)
    }

    fn normalized_x_points(&self) -> usize {
        self.x_points.max(2)
    }

    fn normalized_y_points(&self) -> usize {
        self.y_points.max(2)
    }
}

/// Build a comma-delimited scan table in raster order (y outer, x inner).
///
/// The transmission models a Gaussian beam with a quadratic phase front; the
/// reference channel drifts slowly away from unity with seeded jitter, which
/// is what the loader's smoothing option exists to clean up.
pub fn build_scan_table(config: &RasterConfig) -> String {
    let x_points = config.normalized_x_points();
    let y_points = config.normalized_y_points();
    let x_step = (config.x_stop - config.x_start) / (x_points - 1) as f64;
    let y_step = (config.y_stop - config.y_start) / (y_points - 1) as f64;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = config.noise;
    let mut jitter = move |rng: &mut StdRng| {
        if noise > 0.0 {
            rng.gen_range(-noise..noise)
        } else {
            0.0
        }
    };

    let mut table = String::new();
    let mut row_index = 0usize;
    for iy in 0..y_points {
        let y = config.y_start + y_step * iy as f64;
        for ix in 0..x_points {
            let x = config.x_start + x_step * ix as f64;
            let r_sq = x * x + y * y;
            let amplitude = (-r_sq / (config.beam_waist * config.beam_waist)).exp();
            let phase = 0.02 * r_sq;
            let trans_re = amplitude * phase.cos() + jitter(&mut rng);
            let trans_im = amplitude * phase.sin() + jitter(&mut rng);

            let drift = 1.0 + 0.0005 * row_index as f64;
            let ref_re = drift + jitter(&mut rng);
            let ref_im = -0.1 + jitter(&mut rng);

            table.push_str(&format!(
                "{},{},{},{},{},{}\n",
                x, y, trans_re, trans_im, ref_re, ref_im
            ));
            row_index += 1;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamcore::processing::parse_table;

    #[test]
    fn generator_emits_a_complete_raster() {
        let config = RasterConfig {
            x_points: 5,
            y_points: 7,
            ..Default::default()
        };
        let table = build_scan_table(&config);
        let samples = parse_table(table.as_bytes()).unwrap();

        assert_eq!(samples.len(), 5 * 7);
        assert!(samples.iter().all(|s| s.reference.is_some()));
    }

    #[test]
    fn raster_config_loads_from_yaml_with_defaults() {
        use std::io::Write;
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"x_points: 9\ny_points: 4\nseed: 7\n").unwrap();
        let path = temp.into_temp_path();

        let config = RasterConfig::load(&path).unwrap();
        assert_eq!(config.x_points, 9);
        assert_eq!(config.y_points, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.beam_waist, RasterConfig::default().beam_waist);
    }

    #[test]
    fn generator_is_deterministic_for_a_seed() {
        let config = RasterConfig {
            x_points: 4,
            y_points: 4,
            seed: 42,
            ..Default::default()
        };
        assert_eq!(build_scan_table(&config), build_scan_table(&config));
    }
}
