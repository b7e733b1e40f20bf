//! Configuration models and loaders for aircraft sizing runs.
//!
//! Values are expressed in the engineering units a designer writes down (nautical
//! miles, feet, knots, minutes, degrees); conversion to SI happens in the solver.
//! Every section defaults to the baseline long-range twin.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingConfig {
    pub name: String,
    pub design: DesignConfig,
    pub weights: WeightsConfig,
    pub mission: MissionConfig,
    /// Wing root leading-edge origin `[x, y, z]` (m).
    pub wing_origin_m: [f64; 3],
    pub controls: ControlsConfig,
    pub engine: EngineConfig,
    pub airframe: AirframeConfig,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            name: "baseline".to_string(),
            design: DesignConfig::default(),
            weights: WeightsConfig::default(),
            mission: MissionConfig::default(),
            wing_origin_m: [22.408, 0.0, -0.957],
            controls: ControlsConfig::default(),
            engine: EngineConfig::default(),
            airframe: AirframeConfig::default(),
        }
    }
}

/// Free design variables of the sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignConfig {
    pub wing_loading_kg_m2: f64,
    pub aspect_ratio: f64,
    pub sweep_deg: f64,
    pub thickness_to_chord: f64,
    /// Lower bound on sea-level static thrust over takeoff weight.
    pub thrust_loading: f64,
    pub cruise_altitude_ft: f64,
    pub cruise_mach: f64,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            wing_loading_kg_m2: 700.0,
            aspect_ratio: 13.0,
            sweep_deg: 29.0,
            thickness_to_chord: 0.105,
            thrust_loading: 0.22,
            cruise_altitude_ft: 37_000.0,
            cruise_mach: 0.82,
        }
    }
}

/// Initial mass guesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightsConfig {
    pub takeoff_kg: f64,
    pub operating_empty_kg: f64,
    pub payload_kg: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            takeoff_kg: 279_000.0,
            operating_empty_kg: 130_000.0,
            payload_kg: 24_500.0,
        }
    }
}

/// Mission requirements and the initial cruise guesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionConfig {
    pub range_nmi: f64,
    pub cruise_distance_nmi: f64,
    pub reserve_distance_nmi: f64,
    pub reserve_cruise_distance_nmi: f64,
    pub hold_time_min: f64,
    pub hold_altitude_ft: f64,
    pub hold_speed_kt: f64,
    /// Fraction of block fuel carried as contingency.
    pub trip_reserve_fraction: f64,
    pub throttle_mid_cruise: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            range_nmi: 10_500.0,
            cruise_distance_nmi: 9_900.0,
            reserve_distance_nmi: 200.0,
            reserve_cruise_distance_nmi: 100.0,
            hold_time_min: 30.0,
            hold_altitude_ft: 1_500.0,
            hold_speed_kt: 250.0,
            trip_reserve_fraction: 0.03,
            throttle_mid_cruise: 1.0,
        }
    }
}

/// Outer-loop termination and balancer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    pub max_iterations: usize,
    pub max_wall_time_s: Option<f64>,
    pub divergence_window: usize,
    pub tolerances: TolerancesConfig,
    pub gains: GainsConfig,
    pub mac_policy: MacPolicyConfig,
    pub target_percent_mac: f64,
    pub mac_error_scale: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_wall_time_s: None,
            divergence_window: 6,
            tolerances: TolerancesConfig::default(),
            gains: GainsConfig::default(),
            mac_policy: MacPolicyConfig::Midpoint,
            target_percent_mac: 24.0,
            mac_error_scale: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TolerancesConfig {
    pub distance_nmi: f64,
    pub reserve_nmi: f64,
    pub weight_kg: f64,
    pub mac: f64,
}

impl Default for TolerancesConfig {
    fn default() -> Self {
        Self {
            distance_nmi: 2.0,
            reserve_nmi: 1.0,
            weight_kg: 1.0,
            mac: 1.0,
        }
    }
}

/// Operating-empty relaxation gains and the |Δ| band edges (kg) that select them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GainsConfig {
    pub far: f64,
    pub mid: f64,
    pub near: f64,
    pub far_threshold_kg: f64,
    pub near_threshold_kg: f64,
}

impl Default for GainsConfig {
    fn default() -> Self {
        Self {
            far: 2.0,
            mid: 1.2,
            near: 0.8,
            far_threshold_kg: 500.0,
            near_threshold_kg: 50.0,
        }
    }
}

/// How a single percent-MAC figure is taken from the mission samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacPolicyConfig {
    Midpoint,
    Minimum,
}

/// Engine deck selection and calibration reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub count: u32,
    /// Bucket TSFC (lb/lbf/h) the surrogate is calibrated to.
    pub bucket_sfc: f64,
    /// Custom `altitude_ft,mach,thrust_lbf` table; the bundled deck is used when absent.
    pub max_thrust_table: Option<PathBuf>,
    /// Custom `altitude_ft,mach,thrust_lbf,tsfc_per_hour` table.
    pub tsfc_table: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            count: 2,
            bucket_sfc: 0.475,
            max_thrust_table: None,
            tsfc_table: None,
        }
    }
}

/// Planform and operating-empty correlation used by the reference vehicle builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirframeConfig {
    pub taper_ratio: f64,
    pub oew_fixed_kg: f64,
    /// kg of operating-empty mass per kg of takeoff mass.
    pub oew_per_takeoff: f64,
    /// kg per m² of wing reference area.
    pub oew_per_wing_area: f64,
    /// kg per N of total sea-level static thrust.
    pub oew_per_static_thrust: f64,
    /// Zero-fuel centre of gravity station (m).
    pub cg_zero_fuel_m: f64,
    /// CG travel (m) between empty and full tanks; negative moves forward when full.
    pub cg_fuel_shift_m: f64,
}

impl Default for AirframeConfig {
    fn default() -> Self {
        Self {
            taper_ratio: 0.3,
            oew_fixed_kg: 30_000.0,
            oew_per_takeoff: 0.25,
            oew_per_wing_area: 45.0,
            oew_per_static_thrust: 0.02,
            cg_zero_fuel_m: 32.0,
            cg_fuel_shift_m: -0.6,
        }
    }
}

/// A grid of sizing runs over wing loading and cruise altitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    #[serde(default)]
    pub base: SizingConfig,
    pub wing_loadings_kg_m2: Vec<f64>,
    pub altitudes_ft: Vec<f64>,
    /// Mass fraction at top of climb for the thrust-loading requirement.
    #[serde(default = "default_m4_m0")]
    pub m4_m0: f64,
    #[serde(default = "default_sweep_lift_to_drag")]
    pub lift_to_drag: f64,
    /// Worker threads for the sweep; available parallelism when absent.
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_m4_m0() -> f64 {
    1.0
}

fn default_sweep_lift_to_drag() -> f64 {
    22.0
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load and validate a sizing configuration (TOML by extension, YAML otherwise).
pub fn load_sizing_config<P: AsRef<Path>>(path: P) -> Result<SizingConfig, ConfigError> {
    let config: SizingConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a sweep configuration.
pub fn load_sweep_config<P: AsRef<Path>>(path: P) -> Result<SweepConfig, ConfigError> {
    let config: SweepConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn require(condition: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message()))
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    require(value.is_finite() && value > 0.0, || {
        format!("{name} must be positive (got {value})")
    })
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    require(value.is_finite() && value >= 0.0, || {
        format!("{name} must be non-negative (got {value})")
    })
}

impl SizingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let design = &self.design;
        positive("design.wing_loading_kg_m2", design.wing_loading_kg_m2)?;
        positive("design.aspect_ratio", design.aspect_ratio)?;
        positive("design.thickness_to_chord", design.thickness_to_chord)?;
        positive("design.thrust_loading", design.thrust_loading)?;
        positive("design.cruise_altitude_ft", design.cruise_altitude_ft)?;
        positive("design.cruise_mach", design.cruise_mach)?;
        require((0.0..90.0).contains(&design.sweep_deg), || {
            format!("design.sweep_deg must lie in [0, 90) (got {})", design.sweep_deg)
        })?;

        positive("weights.takeoff_kg", self.weights.takeoff_kg)?;
        positive("weights.operating_empty_kg", self.weights.operating_empty_kg)?;
        non_negative("weights.payload_kg", self.weights.payload_kg)?;
        require(
            self.weights.takeoff_kg > self.weights.operating_empty_kg + self.weights.payload_kg,
            || "weights.takeoff_kg must exceed operating empty plus payload".to_string(),
        )?;

        let mission = &self.mission;
        positive("mission.range_nmi", mission.range_nmi)?;
        positive("mission.cruise_distance_nmi", mission.cruise_distance_nmi)?;
        positive("mission.reserve_distance_nmi", mission.reserve_distance_nmi)?;
        positive(
            "mission.reserve_cruise_distance_nmi",
            mission.reserve_cruise_distance_nmi,
        )?;
        non_negative("mission.hold_time_min", mission.hold_time_min)?;
        non_negative("mission.hold_altitude_ft", mission.hold_altitude_ft)?;
        positive("mission.hold_speed_kt", mission.hold_speed_kt)?;
        non_negative("mission.trip_reserve_fraction", mission.trip_reserve_fraction)?;
        require(
            mission.throttle_mid_cruise > 0.0 && mission.throttle_mid_cruise <= 1.0,
            || {
                format!(
                    "mission.throttle_mid_cruise must lie in (0, 1] (got {})",
                    mission.throttle_mid_cruise
                )
            },
        )?;

        self.controls.validate()?;

        require(self.engine.count >= 1, || {
            "engine.count must be at least 1".to_string()
        })?;
        positive("engine.bucket_sfc", self.engine.bucket_sfc)?;
        require(
            self.engine.max_thrust_table.is_some() == self.engine.tsfc_table.is_some(),
            || "engine.max_thrust_table and engine.tsfc_table must be given together".to_string(),
        )?;

        require(
            self.airframe.taper_ratio > 0.0 && self.airframe.taper_ratio <= 1.0,
            || {
                format!(
                    "airframe.taper_ratio must lie in (0, 1] (got {})",
                    self.airframe.taper_ratio
                )
            },
        )?;
        Ok(())
    }
}

impl ControlsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.max_iterations > 0, || {
            "controls.max_iterations must be at least 1".to_string()
        })?;
        require(self.divergence_window >= 2, || {
            format!(
                "controls.divergence_window must be at least 2 (got {})",
                self.divergence_window
            )
        })?;
        if let Some(limit) = self.max_wall_time_s {
            positive("controls.max_wall_time_s", limit)?;
        }
        positive("controls.tolerances.distance_nmi", self.tolerances.distance_nmi)?;
        positive("controls.tolerances.reserve_nmi", self.tolerances.reserve_nmi)?;
        positive("controls.tolerances.weight_kg", self.tolerances.weight_kg)?;
        positive("controls.tolerances.mac", self.tolerances.mac)?;
        positive("controls.gains.far", self.gains.far)?;
        positive("controls.gains.mid", self.gains.mid)?;
        positive("controls.gains.near", self.gains.near)?;
        positive("controls.gains.near_threshold_kg", self.gains.near_threshold_kg)?;
        require(
            self.gains.far_threshold_kg > self.gains.near_threshold_kg,
            || "controls.gains.far_threshold_kg must exceed near_threshold_kg".to_string(),
        )?;
        positive("controls.mac_error_scale", self.mac_error_scale)?;
        Ok(())
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base.validate()?;
        require(!self.wing_loadings_kg_m2.is_empty(), || {
            "wing_loadings_kg_m2 must list at least one value".to_string()
        })?;
        require(!self.altitudes_ft.is_empty(), || {
            "altitudes_ft must list at least one value".to_string()
        })?;
        for &loading in &self.wing_loadings_kg_m2 {
            positive("wing_loadings_kg_m2", loading)?;
        }
        for &altitude in &self.altitudes_ft {
            positive("altitudes_ft", altitude)?;
        }
        positive("m4_m0", self.m4_m0)?;
        positive("lift_to_drag", self.lift_to_drag)?;
        if let Some(threads) = self.threads {
            require(threads > 0, || "threads must be at least 1".to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn empty_toml_yields_baseline() {
        let file = write_temp(".toml", "");
        let config = load_sizing_config(file.path()).expect("baseline");
        assert_eq!(config, SizingConfig::default());
    }

    #[test]
    fn toml_overrides_individual_fields() {
        let file = write_temp(
            ".toml",
            r#"
name = "short-body"

[design]
wing_loading_kg_m2 = 650.0
cruise_altitude_ft = 35000.0

[controls]
max_iterations = 20
mac_policy = "minimum"

[controls.gains]
far = 1.5
"#,
        );
        let config = load_sizing_config(file.path()).expect("config");
        assert_eq!(config.name, "short-body");
        assert_eq!(config.design.wing_loading_kg_m2, 650.0);
        assert_eq!(config.design.aspect_ratio, 13.0);
        assert_eq!(config.controls.max_iterations, 20);
        assert_eq!(config.controls.mac_policy, MacPolicyConfig::Minimum);
        assert_eq!(config.controls.gains.far, 1.5);
        assert_eq!(config.controls.gains.mid, 1.2);
    }

    #[test]
    fn yaml_sweep_loads_with_base_defaults() {
        let file = write_temp(
            ".yaml",
            "wing_loadings_kg_m2: [650.0, 700.0]\naltitudes_ft: [35000.0, 37000.0, 39000.0]\n",
        );
        let sweep = load_sweep_config(file.path()).expect("sweep");
        assert_eq!(sweep.wing_loadings_kg_m2.len(), 2);
        assert_eq!(sweep.altitudes_ft.len(), 3);
        assert_eq!(sweep.m4_m0, 1.0);
        assert_eq!(sweep.lift_to_drag, 22.0);
        assert_eq!(sweep.base.mission.range_nmi, 10_500.0);
    }

    #[test]
    fn rejects_zero_iteration_cap() {
        let file = write_temp(".toml", "[controls]\nmax_iterations = 0\n");
        let err = load_sizing_config(file.path()).expect_err("invalid");
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("max_iterations")));
    }

    #[test]
    fn rejects_non_positive_range() {
        let mut config = SizingConfig::default();
        config.mission.range_nmi = -5.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let file = write_temp(".toml", "[design]\nwingspan = 60.0\n");
        assert!(matches!(
            load_sizing_config(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }
}
