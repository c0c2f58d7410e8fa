// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::MAX_SHAPE_ORDER;
use crate::error::{DepositResult, DepositionError};
use crate::geometry::Geometry;
use crate::index::IntVect;
use serde::{Deserialize, Serialize};

/// Particle shape (B-spline) order. The stencil spans `order + 1` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ShapeOrder {
    Linear = 1,
    Quadratic = 2,
    Cubic = 3,
    Quartic = 4,
}

impl ShapeOrder {
    pub const ALL: [ShapeOrder; MAX_SHAPE_ORDER] = [
        ShapeOrder::Linear,
        ShapeOrder::Quadratic,
        ShapeOrder::Cubic,
        ShapeOrder::Quartic,
    ];

    pub fn order(self) -> usize {
        self as usize
    }

    /// Points touched per axis.
    pub fn stencil_width(self) -> usize {
        self.order() + 1
    }
}

impl TryFrom<u8> for ShapeOrder {
    type Error = DepositionError;

    fn try_from(value: u8) -> DepositResult<Self> {
        match value {
            1 => Ok(ShapeOrder::Linear),
            2 => Ok(ShapeOrder::Quadratic),
            3 => Ok(ShapeOrder::Cubic),
            4 => Ok(ShapeOrder::Quartic),
            other => Err(DepositionError::ConfigError(format!(
                "shape_order must be in 1..={MAX_SHAPE_ORDER}, got {other}"
            ))),
        }
    }
}

impl From<ShapeOrder> for u8 {
    fn from(order: ShapeOrder) -> u8 {
        order as u8
    }
}

/// How particle contributions reach the shared field.
///
/// * `BufferedMerge`: private zeroed scratch per patch, non-atomic scatter,
///   then a region-locked add into the shared field.
/// * `DirectScatter`: atomic adds straight into the shared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccumulationStrategy {
    BufferedMerge,
    DirectScatter,
}

impl Default for AccumulationStrategy {
    /// Strategy of the build target.
    fn default() -> Self {
        if cfg!(feature = "direct-scatter") {
            AccumulationStrategy::DirectScatter
        } else {
            AccumulationStrategy::BufferedMerge
        }
    }
}

/// Deposition engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositionConfig {
    pub geometry: Geometry,
    pub shape_order: ShapeOrder,
    #[serde(default)]
    pub strategy: AccumulationStrategy,
    /// Azimuthal modes in cylindrical geometry (0 elsewhere).
    #[serde(default)]
    pub n_rz_azimuthal_modes: usize,
    /// Engine-wide deposition guard override. When absent, the allocated
    /// guard of the target field is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposition_guards: Option<IntVect>,
}

impl DepositionConfig {
    pub fn new(geometry: Geometry, shape_order: ShapeOrder) -> Self {
        Self {
            geometry,
            shape_order,
            strategy: AccumulationStrategy::default(),
            n_rz_azimuthal_modes: if geometry.is_cylindrical() { 1 } else { 0 },
            deposition_guards: None,
        }
    }

    pub fn with_strategy(mut self, strategy: AccumulationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_azimuthal_modes(mut self, n_modes: usize) -> Self {
        self.n_rz_azimuthal_modes = n_modes;
        self
    }

    /// Load from JSON file.
    pub fn from_file(path: &str) -> DepositResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> DepositResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DepositResult<()> {
        if self.geometry.is_cylindrical() {
            if self.n_rz_azimuthal_modes == 0 {
                return Err(DepositionError::ConfigError(
                    "cylindrical geometry requires n_rz_azimuthal_modes >= 1".to_string(),
                ));
            }
        } else if self.n_rz_azimuthal_modes != 0 {
            return Err(DepositionError::ConfigError(format!(
                "n_rz_azimuthal_modes must be 0 outside cylindrical geometry, got {}",
                self.n_rz_azimuthal_modes
            )));
        }
        if let Some(ng) = self.deposition_guards {
            if ng.iter().any(|&g| g < 0) {
                return Err(DepositionError::ConfigError(format!(
                    "deposition_guards must be >= 0, got {ng:?}"
                )));
            }
        }
        Ok(())
    }

    /// Number of field components a scalar deposit writes.
    pub fn num_components(&self) -> usize {
        self.geometry.num_components(self.n_rz_azimuthal_modes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_cylindrical_config() {
        let cfg = DepositionConfig::from_json_str(
            r#"{
                "geometry": "cylindrical",
                "shape_order": 3,
                "strategy": "direct-scatter",
                "n_rz_azimuthal_modes": 2,
                "deposition_guards": [3, 0, 3]
            }"#,
        )
        .expect("valid config");
        assert_eq!(cfg.geometry, Geometry::Cylindrical);
        assert_eq!(cfg.shape_order, ShapeOrder::Cubic);
        assert_eq!(cfg.strategy, AccumulationStrategy::DirectScatter);
        assert_eq!(cfg.num_components(), 3);
        assert_eq!(cfg.deposition_guards, Some([3, 0, 3]));
    }

    #[test]
    fn test_every_geometry_name_loads() {
        for (name, geometry) in [
            ("one-d", Geometry::OneD),
            ("cartesian-2d", Geometry::Cartesian2D),
            ("cylindrical", Geometry::Cylindrical),
            ("three-d", Geometry::ThreeD),
        ] {
            let modes = if geometry.is_cylindrical() { 1 } else { 0 };
            let json = format!(
                r#"{{"geometry": "{name}", "shape_order": 1, "n_rz_azimuthal_modes": {modes}}}"#
            );
            let cfg = DepositionConfig::from_json_str(&json).expect("documented geometry name");
            assert_eq!(cfg.geometry, geometry);
            assert_eq!(
                serde_json::to_string(&geometry).expect("serialize"),
                format!("\"{name}\"")
            );
        }
    }

    #[test]
    fn test_defaults_when_fields_omitted() {
        let cfg = DepositionConfig::from_json_str(r#"{"geometry": "three-d", "shape_order": 1}"#)
            .expect("minimal config");
        assert_eq!(cfg.strategy, AccumulationStrategy::default());
        assert_eq!(cfg.n_rz_azimuthal_modes, 0);
        assert!(cfg.deposition_guards.is_none());
    }

    #[test]
    fn test_rejects_out_of_range_shape_order() {
        for bad in ["0", "5"] {
            let json = format!(r#"{{"geometry": "one-d", "shape_order": {bad}}}"#);
            assert!(
                DepositionConfig::from_json_str(&json).is_err(),
                "shape_order {bad} must be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_modes_outside_cylindrical() {
        let err = DepositionConfig::new(Geometry::Cartesian2D, ShapeOrder::Linear)
            .with_azimuthal_modes(2)
            .validate()
            .expect_err("modes in slab geometry must fail");
        match err {
            DepositionError::ConfigError(msg) => assert!(msg.contains("n_rz_azimuthal_modes")),
            other => panic!("Unexpected error: {other:?}"),
        }
        assert!(DepositionConfig::new(Geometry::Cylindrical, ShapeOrder::Linear)
            .with_azimuthal_modes(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = DepositionConfig::new(Geometry::Cylindrical, ShapeOrder::Quartic)
            .with_azimuthal_modes(3);
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2 = DepositionConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, cfg2);
    }

    #[test]
    fn test_load_shipped_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/rz_quadratic.json");
        let cfg = DepositionConfig::from_file(path).expect("shipped config loads");
        assert_eq!(cfg.geometry, Geometry::Cylindrical);
        assert_eq!(cfg.shape_order, ShapeOrder::Quadratic);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DepositionConfig::from_file("/nonexistent/deposition.json")
            .expect_err("missing file must fail");
        assert!(matches!(err, DepositionError::Io(_)));
    }
}
