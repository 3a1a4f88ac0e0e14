//! Shared configuration types for the portioning engine.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::PortionError, Scalar};

/// Upper bound on `total_weight_g / threshold_g`, the number of portions a run
/// may close.
pub const MAX_PORTIONS: Scalar = 1.0e6;

/// How the loaf volume is integrated from the sampled cross-sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationRule {
    /// Each slice is a prism of its own area: `t * Σ area_i`.
    #[default]
    Rectangular,
    /// Adjacent cross-sections bound `n - 1` trapezoidal intervals.
    Trapezoidal,
}

/// Which end of the loaf the portion scan starts from. Waste collects at the
/// opposite end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    #[default]
    Forward,
    Reverse,
}

/// Whether the slice crossing the threshold is taken whole or split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    #[default]
    WholeSlice,
    Linear,
}

impl InterpolationMode {
    pub fn from_flag(use_interpolation: bool) -> Self {
        if use_interpolation {
            Self::Linear
        } else {
            Self::WholeSlice
        }
    }
}

/// Every input of one portioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortionSettings {
    pub total_weight_g: Scalar,
    pub target_portion_weight_g: Scalar,
    pub average_width_mm: Scalar,
    pub average_height_mm: Scalar,
    pub slice_thickness_mm: Scalar,
    pub slice_count: usize,
    /// Portions close at `target * tolerance_fraction`.
    pub tolerance_fraction: Scalar,
    pub redistribute_waste: bool,
    pub interpolation: InterpolationMode,
    pub scan_direction: ScanDirection,
    pub integration_rule: IntegrationRule,
    /// Per-axis standard deviation of the sampled width and height.
    pub dimension_std_dev_mm: Scalar,
    pub seed: Option<u64>,
}

impl Default for PortionSettings {
    fn default() -> Self {
        Self {
            total_weight_g: 3330.0,
            target_portion_weight_g: 250.0,
            average_width_mm: 93.0,
            average_height_mm: 90.0,
            slice_thickness_mm: 0.1,
            slice_count: 3600,
            tolerance_fraction: 0.999,
            redistribute_waste: false,
            interpolation: InterpolationMode::WholeSlice,
            scan_direction: ScanDirection::Forward,
            integration_rule: IntegrationRule::Rectangular,
            dimension_std_dev_mm: 2.0,
            seed: None,
        }
    }
}

impl PortionSettings {
    /// Loads settings from a JSON document. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse settings {}", path.display()))
    }

    pub fn use_interpolation(&self) -> bool {
        self.interpolation == InterpolationMode::Linear
    }

    /// Accumulated weight at which a portion closes.
    pub fn threshold_g(&self) -> Scalar {
        self.target_portion_weight_g * self.tolerance_fraction
    }

    /// Rejects out-of-domain inputs before anything is sampled.
    pub fn validate(&self) -> Result<(), PortionError> {
        positive("total_weight_g", self.total_weight_g)?;
        positive("target_portion_weight_g", self.target_portion_weight_g)?;
        positive("average_width_mm", self.average_width_mm)?;
        positive("average_height_mm", self.average_height_mm)?;
        positive("slice_thickness_mm", self.slice_thickness_mm)?;

        if self.slice_count < 2 {
            return Err(PortionError::invalid(
                "slice_count",
                format!("need at least 2 slices, got {}", self.slice_count),
            ));
        }

        let tol = self.tolerance_fraction;
        if !tol.is_finite() || tol <= 0.0 || tol > 1.0 {
            return Err(PortionError::invalid(
                "tolerance_fraction",
                format!("must lie in (0, 1], got {tol}"),
            ));
        }

        let sd = self.dimension_std_dev_mm;
        if !sd.is_finite() || sd < 0.0 {
            return Err(PortionError::invalid(
                "dimension_std_dev_mm",
                format!("must be finite and >= 0, got {sd}"),
            ));
        }

        let portions = self.total_weight_g / self.threshold_g();
        if !portions.is_finite() || portions > MAX_PORTIONS {
            return Err(PortionError::invalid(
                "target_portion_weight_g",
                format!(
                    "threshold {} g would cut more than {MAX_PORTIONS} portions from {} g",
                    self.threshold_g(),
                    self.total_weight_g
                ),
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: Scalar) -> Result<(), PortionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PortionError::invalid(
            field,
            format!("must be finite and > 0, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = PortionSettings::default();
        settings.validate().expect("defaults should validate");
        assert!((settings.threshold_g() - 249.75).abs() < 1e-9);
        assert!(!settings.use_interpolation());
    }

    #[test]
    fn rejects_out_of_domain_inputs() {
        let mut settings = PortionSettings::default();
        settings.slice_thickness_mm = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(PortionError::InvalidInput {
                field: "slice_thickness_mm",
                ..
            })
        ));

        let mut settings = PortionSettings::default();
        settings.slice_count = 1;
        assert!(matches!(
            settings.validate(),
            Err(PortionError::InvalidInput {
                field: "slice_count",
                ..
            })
        ));

        let mut settings = PortionSettings::default();
        settings.tolerance_fraction = 1.01;
        assert!(settings.validate().is_err());
        settings.tolerance_fraction = 0.0;
        assert!(settings.validate().is_err());
        settings.tolerance_fraction = 1.0;
        assert!(settings.validate().is_ok());

        let mut settings = PortionSettings::default();
        settings.total_weight_g = Scalar::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_targets_too_small_for_the_loaf() {
        let mut settings = PortionSettings::default();
        settings.target_portion_weight_g = 1e-20;
        assert!(matches!(
            settings.validate(),
            Err(PortionError::InvalidInput {
                field: "target_portion_weight_g",
                ..
            })
        ));

        settings.target_portion_weight_g = 2.0 * 3330.0 / MAX_PORTIONS;
        settings.tolerance_fraction = 1.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "target_portion_weight_g": 125.0,
            "scan_direction": "reverse",
            "interpolation": "linear",
            "integration_rule": "trapezoidal",
            "seed": 7
        }"#;
        let settings: PortionSettings = serde_json::from_str(json).expect("valid settings json");
        assert_eq!(settings.target_portion_weight_g, 125.0);
        assert_eq!(settings.scan_direction, ScanDirection::Reverse);
        assert_eq!(settings.interpolation, InterpolationMode::Linear);
        assert_eq!(settings.integration_rule, IntegrationRule::Trapezoidal);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.slice_count, 3600);
        assert_eq!(settings.total_weight_g, 3330.0);
    }

    #[test]
    fn interpolation_flag_maps_to_mode() {
        assert_eq!(InterpolationMode::from_flag(true), InterpolationMode::Linear);
        assert_eq!(
            InterpolationMode::from_flag(false),
            InterpolationMode::WholeSlice
        );
    }
}
