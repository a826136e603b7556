use serde::Deserialize;

use planet_geom::DVec3;
use planet_noise::{NoiseError, NoiseSpec};
use planet_surface::{DisplacementFn, LodPolicy, SurfaceConfig, noise_displacement};

#[derive(Clone, Debug, Deserialize)]
pub struct PlanetConfig {
    #[serde(default)] pub planet: PlanetSection,
    #[serde(default = "default_layers")] pub layers: Vec<LayerConfig>,
    #[serde(default)] pub lod: LodSection,
    #[serde(default)] pub flight: Flight,
}

fn default_layers() -> Vec<LayerConfig> { vec![LayerConfig::default()] }

impl Default for PlanetConfig {
    fn default() -> Self { Self { planet: PlanetSection::default(), layers: default_layers(), lod: LodSection::default(), flight: Flight::default() } }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlanetSection { #[serde(default)] pub position: [f64; 3] }

impl PlanetSection {
    pub fn position(&self) -> DVec3 { DVec3::from(self.position) }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LayerConfig {
    #[serde(default = "default_radius")] pub radius: f64,
    #[serde(default = "default_skirt_depth")] pub skirt_depth: f64,
    #[serde(default = "default_max_displacement")] pub max_displacement: f64,
    #[serde(default)] pub noise: NoiseSpec,
}
fn default_radius() -> f64 { 6_000_000.0 }
fn default_skirt_depth() -> f64 { 10_000.0 }
fn default_max_displacement() -> f64 { 20_000.0 }
impl Default for LayerConfig { fn default() -> Self { Self { radius: default_radius(), skirt_depth: default_skirt_depth(), max_displacement: default_max_displacement(), noise: NoiseSpec::default() } } }

impl LayerConfig {
    pub fn surface(&self, lod: &LodSection) -> SurfaceConfig {
        SurfaceConfig { radius: self.radius, skirt_depth: self.skirt_depth, policy: lod.policy() }
    }

    pub fn displacement(&self) -> Result<DisplacementFn, NoiseError> {
        Ok(noise_displacement(self.noise.build()?, self.max_displacement))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LodSection {
    #[serde(default = "default_split_factor")] pub split_factor: f64,
    #[serde(default = "default_merge_hysteresis")] pub merge_hysteresis: f64,
    #[serde(default = "default_min_side_length")] pub min_side_length: f64,
}
fn default_split_factor() -> f64 { LodPolicy::default().split_factor }
fn default_merge_hysteresis() -> f64 { LodPolicy::default().merge_hysteresis }
fn default_min_side_length() -> f64 { LodPolicy::default().min_side_length }
impl Default for LodSection { fn default() -> Self { Self { split_factor: default_split_factor(), merge_hysteresis: default_merge_hysteresis(), min_side_length: default_min_side_length() } } }

impl LodSection {
    pub fn policy(&self) -> LodPolicy {
        LodPolicy { split_factor: self.split_factor, merge_hysteresis: self.merge_hysteresis, min_side_length: self.min_side_length }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flight {
    #[serde(default = "default_frames")] pub frames: u32,
    #[serde(default = "default_start_altitude")] pub start_altitude: f64,
    #[serde(default = "default_end_altitude")] pub end_altitude: f64,
}
fn default_frames() -> u32 { 240 }
fn default_start_altitude() -> f64 { 4_000_000.0 }
fn default_end_altitude() -> f64 { 500.0 }
impl Default for Flight { fn default() -> Self { Self { frames: default_frames(), start_altitude: default_start_altitude(), end_altitude: default_end_altitude() } } }

impl Flight {
    /// Altitude at `frame`, interpolated geometrically so the approach slows
    /// near the surface. Altitudes are clamped to at least 1.
    pub fn altitude(&self, frame: u32) -> f64 {
        let start = self.start_altitude.max(1.0);
        let end = self.end_altitude.max(1.0);
        if self.frames <= 1 {
            return end;
        }
        let t = f64::from(frame.min(self.frames - 1)) / f64::from(self.frames - 1);
        start * (end / start).powf(t)
    }
}

pub fn load_config_from_path(path: &std::path::Path) -> Result<PlanetConfig, Box<dyn std::error::Error>> {
    let s = std::fs::read_to_string(path).map_err(|e| format!("read error: {}: {}", path.display(), e))?;
    let cfg: PlanetConfig = toml::from_str(&s).map_err(|e| format!("parse error: {}", e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: PlanetConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.layers.len(), 1);
        assert_eq!(cfg.layers[0].radius, 6_000_000.0);
        assert_eq!(cfg.lod.policy(), LodPolicy::default());
        assert_eq!(cfg.flight.frames, 240);
        assert_eq!(cfg.planet.position(), DVec3::ZERO);
    }

    #[test]
    fn partial_sections_fill_missing_fields() {
        let cfg: PlanetConfig = toml::from_str(
            r#"
            [planet]
            position = [10.0, 0.0, -5.0]

            [[layers]]
            radius = 1000.0
            noise = { type = "constant", value = 0.0 }

            [[layers]]
            radius = 1200.0
            max_displacement = 0.0

            [lod]
            merge_hysteresis = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.planet.position(), DVec3::new(10.0, 0.0, -5.0));
        assert_eq!(cfg.layers.len(), 2);
        assert_eq!(cfg.layers[0].skirt_depth, 10_000.0);
        assert_eq!(cfg.layers[1].radius, 1200.0);
        assert_eq!(cfg.lod.merge_hysteresis, 3.0);
        assert_eq!(cfg.lod.split_factor, 2.0);

        let surface = cfg.layers[0].surface(&cfg.lod);
        assert_eq!(surface.radius, 1000.0);
        assert_eq!(surface.policy.merge_hysteresis, 3.0);
        assert!(surface.validate().is_ok());

        let d = cfg.layers[0].displacement().unwrap();
        assert_eq!(d(DVec3::new(1.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn bad_noise_is_reported_at_build() {
        let cfg: PlanetConfig = toml::from_str(
            r#"
            [[layers]]
            noise = { type = "fractal", source = { type = "perlin" }, octaves = 0 }
            "#,
        )
        .unwrap();
        assert!(matches!(cfg.layers[0].displacement(), Err(NoiseError::ZeroOctaves)));
    }

    #[test]
    fn unknown_noise_type_fails_to_parse() {
        let r: Result<PlanetConfig, _> = toml::from_str(
            r#"
            [[layers]]
            noise = { type = "simplex" }
            "#,
        );
        assert!(r.is_err());
    }

    #[test]
    fn flight_altitude_is_monotone_between_endpoints() {
        let f = Flight { frames: 10, start_altitude: 1000.0, end_altitude: 10.0 };
        assert_eq!(f.altitude(0), 1000.0);
        assert!((f.altitude(9) - 10.0).abs() < 1e-9);
        assert!((f.altitude(20) - 10.0).abs() < 1e-9);
        for i in 1..10 {
            assert!(f.altitude(i) < f.altitude(i - 1));
        }
        let single = Flight { frames: 1, ..f };
        assert_eq!(single.altitude(0), 10.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let r = load_config_from_path(std::path::Path::new("/nonexistent/planet.toml"));
        assert!(r.is_err());
    }
}
