// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Configuration
// ─────────────────────────────────────────────────────────────────────

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, GenerateResult};
use crate::transition::TransitionState;

/// How coordinates behave at the faces of the simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryCondition {
    /// Positions are kept inside the box.
    None,
    /// The box tiles space; distances use the closest image.
    #[default]
    Periodic,
}

/// Simulation box. One corner sits at the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainParameters {
    /// Default: periodic.
    pub boundary_condition: BoundaryCondition,
    /// Box edge lengths in normalized units.
    /// Default: [1, 1, 1].
    pub domain: [f64; 3],
}

impl Default for DomainParameters {
    fn default() -> Self {
        Self {
            boundary_condition: BoundaryCondition::Periodic,
            domain: [1.0, 1.0, 1.0],
        }
    }
}

impl DomainParameters {
    /// Largest distance two nodes can have: the box diagonal, or half of
    /// it under periodic boundaries.
    pub fn max_distance(&self) -> f64 {
        let diagonal = self.domain.iter().map(|d| d * d).sum::<f64>().sqrt();
        match self.boundary_condition {
            BoundaryCondition::None => diagonal,
            BoundaryCondition::Periodic => 0.5 * diagonal,
        }
    }
}

/// Relation between the normalized box and physical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalScalingParameters {
    /// Default: 1000.
    pub num_vertices: usize,
    /// Nodes per cubic meter.
    /// Default: 0.066627e18.
    pub node_density: f64,
    /// Physical length of one normalized unit, derived from the two
    /// fields above.
    pub length_scaling_factor: f64,
}

impl Default for PhysicalScalingParameters {
    fn default() -> Self {
        let mut params = Self {
            num_vertices: 1000,
            node_density: 0.066627e18,
            length_scaling_factor: 0.0,
        };
        params.update_length_scaling_factor();
        params
    }
}

impl PhysicalScalingParameters {
    /// `(num_vertices / node_density)^(1/3)`.
    pub fn update_length_scaling_factor(&mut self) -> f64 {
        self.length_scaling_factor = (self.num_vertices as f64 / self.node_density).powf(1.0 / 3.0);
        self.length_scaling_factor
    }
}

/// Target log-normal distribution of edge end-to-end distances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EteDistanceParameters {
    /// Mean end-to-end distance in meters.
    /// Default: 1.96e-6.
    pub physical_normal_mean: f64,
    pub physical_normal_std_deviation: f64,
    /// `physical_normal_mean / length_scaling_factor`.
    pub normalized_normal_mean: f64,
    /// Default: 0.253.
    pub normalized_normal_std_deviation: f64,
    pub normalized_log_mean: f64,
    pub normalized_log_std_deviation: f64,
    /// Default: 100.
    pub num_bins: usize,
}

impl Default for EteDistanceParameters {
    fn default() -> Self {
        Self {
            physical_normal_mean: 1.96e-6,
            physical_normal_std_deviation: 0.0,
            normalized_normal_mean: 0.0,
            normalized_normal_std_deviation: 0.253,
            normalized_log_mean: 0.0,
            normalized_log_std_deviation: 0.0,
            num_bins: 100,
        }
    }
}

/// Standard deviation of `ln X` for a log-normal `X` with the given
/// mean and standard deviation.
pub fn log_std_deviation(normal_mean: f64, normal_std_deviation: f64) -> f64 {
    (normal_std_deviation.powi(2) / normal_mean.powi(2) + 1.0).ln().sqrt()
}

/// Mean of `ln X` for a log-normal `X` with the given mean.
pub fn log_mean(normal_mean: f64, log_std_deviation: f64) -> f64 {
    normal_mean.ln() - 0.5 * log_std_deviation.powi(2)
}

impl EteDistanceParameters {
    /// Derive the normalized log-normal parameters from the physical
    /// mean and the box scaling.
    pub fn normalize(&mut self, length_scaling_factor: f64) {
        self.normalized_normal_mean = self.physical_normal_mean / length_scaling_factor;
        self.normalized_log_std_deviation =
            log_std_deviation(self.normalized_normal_mean, self.normalized_normal_std_deviation);
        self.normalized_log_mean =
            log_mean(self.normalized_normal_mean, self.normalized_log_std_deviation);
    }
}

/// Degree distribution of the initial graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DegreeParameters {
    /// Default: 3.379692.
    pub mean: f64,
    /// Default: 3.
    pub min_degree: usize,
    /// Default: 999.
    pub max_degree: usize,
    /// Fraction of nodes forced to degree one.
    /// Default: 0.
    pub percentage_of_one_degree_nodes: f64,
}

impl Default for DegreeParameters {
    fn default() -> Self {
        Self {
            mean: 3.379692,
            min_degree: 3,
            max_degree: 999,
            percentage_of_one_degree_nodes: 0.0,
        }
    }
}

/// Target truncated power series (degree 3) of cosines between
/// adjacent edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CosineParameters {
    /// Default: 0.62.
    pub b1: f64,
    /// Default: -0.1025.
    pub b2: f64,
    /// Default: 0.0159375, the value that normalizes the series for the
    /// default b1 and b2.
    pub b3: f64,
    /// Default: 100.
    pub num_bins: usize,
    /// Add `counts[last] / bins` to the cosine energy so values do not
    /// pile up at cosine 1, where the target density vanishes.
    /// Default: false.
    pub penalize_last_bin: bool,
}

impl Default for CosineParameters {
    fn default() -> Self {
        let b1 = 0.62;
        let b2 = -0.1025;
        Self {
            b1,
            b2,
            b3: normalized_b3(b1, b2),
            num_bins: 100,
            penalize_last_bin: false,
        }
    }
}

/// `b3` making the truncated power series integrate to one over
/// `[-1, 1]`.
pub fn normalized_b3(b1: f64, b2: f64) -> f64 {
    -(3.0 / 32.0) * (-1.0 + 2.0 * b1 + 4.0 * b2)
}

/// Contour-length refinement of existing edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourLengthParameters {
    /// Bending stiffness handed to the path generator.
    /// Default: 2.0.
    pub k_bending: f64,
    /// Default: 100.
    pub monomers: usize,
    /// Default: 100.
    pub num_bins: usize,
    /// Histogram upper bound as a multiple of the box diagonal.
    /// Default: 4.0.
    pub max_contour_to_diagonal_ratio: f64,
    /// Log-normal target of contour lengths.
    /// Default: ln(0.2).
    pub log_mean: f64,
    /// Default: 0.5.
    pub log_std_deviation: f64,
}

impl Default for ContourLengthParameters {
    fn default() -> Self {
        Self {
            k_bending: 2.0,
            monomers: 100,
            num_bins: 100,
            max_contour_to_diagonal_ratio: 4.0,
            log_mean: 0.2f64.ln(),
            log_std_deviation: 0.5,
        }
    }
}

/// Full parameter record of the generator.
///
/// Loaded before a run; the engine writes energy and transition
/// counters back into `transition` for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub domain: DomainParameters,
    pub physical_scaling: PhysicalScalingParameters,
    pub degree: DegreeParameters,
    pub ete_distance: EteDistanceParameters,
    pub cosine: CosineParameters,
    pub transition: TransitionState,
    pub contour_length: ContourLengthParameters,
    /// RNG seed of the run.
    /// Default: 42.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let mut cfg = Self {
            domain: DomainParameters::default(),
            physical_scaling: PhysicalScalingParameters::default(),
            degree: DegreeParameters::default(),
            ete_distance: EteDistanceParameters::default(),
            cosine: CosineParameters::default(),
            transition: TransitionState::default(),
            contour_length: ContourLengthParameters::default(),
            seed: 42,
        };
        cfg.derive_parameters();
        cfg
    }
}

impl GeneratorConfig {
    /// Recompute the length scaling factor and the normalized
    /// log-normal parameters from the physical inputs.
    pub fn derive_parameters(&mut self) {
        let scaling = self.physical_scaling.update_length_scaling_factor();
        self.ete_distance.normalize(scaling);
        let reach = self.domain.max_distance();
        if self.ete_distance.normalized_normal_mean >= reach {
            log::warn!(
                "target end-to-end mean {:.4} is not below the largest distance {:.4} the box allows",
                self.ete_distance.normalized_normal_mean,
                reach
            );
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> GenerateResult<()> {
        if self.domain.domain.iter().any(|&d| !(d > 0.0 && d.is_finite())) {
            return Err(GenerateError::Config(format!(
                "domain sizes must be finite and > 0, got {:?}",
                self.domain.domain
            )));
        }
        if self.physical_scaling.node_density <= 0.0 {
            return Err(GenerateError::Config(format!(
                "node_density must be > 0, got {}",
                self.physical_scaling.node_density
            )));
        }
        if self.degree.mean <= 2.0 {
            return Err(GenerateError::Config(format!(
                "degree mean must be > 2, got {}",
                self.degree.mean
            )));
        }
        if self.degree.min_degree > self.degree.max_degree {
            return Err(GenerateError::Config(format!(
                "min_degree ({}) must be <= max_degree ({})",
                self.degree.min_degree, self.degree.max_degree
            )));
        }
        if !(0.0..=1.0).contains(&self.degree.percentage_of_one_degree_nodes) {
            return Err(GenerateError::Config(format!(
                "percentage_of_one_degree_nodes must be in [0, 1], got {}",
                self.degree.percentage_of_one_degree_nodes
            )));
        }
        if self.ete_distance.physical_normal_mean <= 0.0 {
            return Err(GenerateError::Config(format!(
                "physical_normal_mean must be > 0, got {}",
                self.ete_distance.physical_normal_mean
            )));
        }
        if self.ete_distance.normalized_normal_std_deviation <= 0.0 {
            return Err(GenerateError::Config(format!(
                "normalized_normal_std_deviation must be > 0, got {}",
                self.ete_distance.normalized_normal_std_deviation
            )));
        }
        for (name, bins) in [
            ("ete_distance.num_bins", self.ete_distance.num_bins),
            ("cosine.num_bins", self.cosine.num_bins),
            ("contour_length.num_bins", self.contour_length.num_bins),
        ] {
            if bins == 0 {
                return Err(GenerateError::Config(format!("{name} must be >= 1")));
            }
        }
        let t = &self.transition;
        if !(t.temp_cooling_rate > 0.0 && t.temp_cooling_rate <= 1.0) {
            return Err(GenerateError::Config(format!(
                "temp_cooling_rate must be in (0, 1], got {}",
                t.temp_cooling_rate
            )));
        }
        if !(0.0..=1.0).contains(&t.update_step_move_node_probability) {
            return Err(GenerateError::Config(format!(
                "update_step_move_node_probability must be in [0, 1], got {}",
                t.update_step_move_node_probability
            )));
        }
        if t.update_step_move_node_max_step_distance < 0.0 {
            return Err(GenerateError::Config(format!(
                "update_step_move_node_max_step_distance must be >= 0, got {}",
                t.update_step_move_node_max_step_distance
            )));
        }
        if self.contour_length.max_contour_to_diagonal_ratio <= 0.0 {
            return Err(GenerateError::Config(format!(
                "max_contour_to_diagonal_ratio must be > 0, got {}",
                self.contour_length.max_contour_to_diagonal_ratio
            )));
        }
        if self.contour_length.log_std_deviation <= 0.0 {
            return Err(GenerateError::Config(format!(
                "contour_length.log_std_deviation must be > 0, got {}",
                self.contour_length.log_std_deviation
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> GenerateResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GenerateError::Config(format!("JSON parse error: {e}")))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> GenerateResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GenerateError::Config(format!("JSON encode error: {e}")))
    }

    /// Read and validate a JSON parameter file.
    pub fn load(path: impl AsRef<Path>) -> GenerateResult<Self> {
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_json(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write the record as a JSON parameter file.
    pub fn save(&self, path: impl AsRef<Path>) -> GenerateResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        GeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_b3_normalizes_series() {
        let c = CosineParameters::default();
        assert!((c.b3 - 0.0159375).abs() < 1e-12, "b3 = {}", c.b3);
    }

    #[test]
    fn test_length_scaling_factor() {
        let p = PhysicalScalingParameters::default();
        let expected = (1000.0 / 0.066627e18_f64).powf(1.0 / 3.0);
        assert!((p.length_scaling_factor - expected).abs() < 1e-18);
    }

    #[test]
    fn test_log_normal_parameters() {
        let mut e = EteDistanceParameters {
            physical_normal_mean: 2.0,
            normalized_normal_std_deviation: 0.5,
            ..Default::default()
        };
        e.normalize(1.0);
        assert!((e.normalized_normal_mean - 2.0).abs() < 1e-12);
        let s = (0.25f64 / 4.0 + 1.0).ln().sqrt();
        assert!((e.normalized_log_std_deviation - s).abs() < 1e-12);
        assert!((e.normalized_log_mean - (2.0f64.ln() - 0.5 * s * s)).abs() < 1e-12);
    }

    #[test]
    fn test_derived_defaults_are_finite() {
        let cfg = GeneratorConfig::default();
        assert!(cfg.ete_distance.normalized_normal_mean > 0.0);
        assert!(cfg.ete_distance.normalized_log_mean.is_finite());
        assert!(cfg.ete_distance.normalized_log_std_deviation > 0.0);
    }

    #[test]
    fn test_domain_max_distance() {
        let mut d = DomainParameters {
            boundary_condition: BoundaryCondition::None,
            domain: [3.0, 4.0, 12.0],
        };
        assert!((d.max_distance() - 13.0).abs() < 1e-12);
        d.boundary_condition = BoundaryCondition::Periodic;
        assert!((d.max_distance() - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_derive_with_unreachable_mean_still_derives() {
        let mut cfg = GeneratorConfig::default();
        cfg.domain.domain = [1e-3, 1e-3, 1e-3];
        cfg.derive_parameters();
        assert!(cfg.ete_distance.normalized_normal_mean >= cfg.domain.max_distance());
        assert!(cfg.ete_distance.normalized_log_mean.is_finite());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut cfg = GeneratorConfig::default();
        cfg.domain.boundary_condition = BoundaryCondition::None;
        cfg.transition.accepted_transitions = 12;
        let json = cfg.to_json_pretty().unwrap();
        assert!(json.contains("\"none\""));
        let back = GeneratorConfig::from_json(&json).unwrap();
        assert_eq!(back.domain.boundary_condition, BoundaryCondition::None);
        assert_eq!(back.transition.accepted_transitions, 12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = GeneratorConfig::from_json(r#"{"seed": 7, "degree": {"mean": 4.0}}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert!((cfg.degree.mean - 4.0).abs() < 1e-15);
        assert_eq!(cfg.degree.min_degree, 3);
        assert_eq!(cfg.cosine.num_bins, 100);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            GeneratorConfig::from_json("{not json"),
            Err(GenerateError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_degree_mean() {
        let mut cfg = GeneratorConfig::default();
        cfg.degree.mean = 2.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_invalid_domain() {
        let mut cfg = GeneratorConfig::default();
        cfg.domain.domain = [1.0, 0.0, 1.0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_invalid_probability() {
        let mut cfg = GeneratorConfig::default();
        cfg.transition.update_step_move_node_probability = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "sgen_types_config_{}.json",
            std::process::id()
        ));
        let mut cfg = GeneratorConfig::default();
        cfg.seed = 99;
        cfg.save(&path).unwrap();
        let back = GeneratorConfig::load(&path).unwrap();
        assert_eq!(back.seed, 99);
        let _ = std::fs::remove_file(&path);
    }
}
