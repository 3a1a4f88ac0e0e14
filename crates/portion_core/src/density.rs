//! Density inference from the measured loaf weight.

use serde::Serialize;
use tracing::debug;

use crate::{config::IntegrationRule, error::PortionError, slices::Slice, Scalar};

/// Result of integrating the loaf and normalizing it to the measured weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityEstimate {
    pub rule: IntegrationRule,
    pub volume_mm3: Scalar,
    pub density_g_per_mm3: Scalar,
}

impl IntegrationRule {
    /// Integrates the cross-sectional areas over a uniform thickness.
    pub fn volume(self, areas: &[Scalar], thickness_mm: Scalar) -> Scalar {
        match self {
            IntegrationRule::Rectangular => thickness_mm * areas.iter().sum::<Scalar>(),
            IntegrationRule::Trapezoidal => {
                let paired: Scalar = areas.windows(2).map(|w| w[0] + w[1]).sum();
                0.5 * thickness_mm * paired
            }
        }
    }
}

/// Computes the loaf density and writes each slice's weight in place.
///
/// Fails with [`PortionError::DegenerateVolume`] when the integral is not
/// strictly positive, including `n < 2` under the trapezoidal rule.
pub fn estimate(
    slices: &mut [Slice],
    total_weight_g: Scalar,
    thickness_mm: Scalar,
    rule: IntegrationRule,
) -> Result<DensityEstimate, PortionError> {
    let areas: Vec<Scalar> = slices.iter().map(|s| s.area_mm2).collect();
    let volume_mm3 = rule.volume(&areas, thickness_mm);
    if !(volume_mm3.is_finite() && volume_mm3 > 0.0) {
        return Err(PortionError::DegenerateVolume { volume: volume_mm3 });
    }

    let density_g_per_mm3 = total_weight_g / volume_mm3;
    for slice in slices.iter_mut() {
        slice.weight_g = slice.area_mm2 * thickness_mm * density_g_per_mm3;
    }

    debug!(?rule, volume_mm3, density_g_per_mm3, "estimated loaf density");
    Ok(DensityEstimate {
        rule,
        volume_mm3,
        density_g_per_mm3,
    })
}
