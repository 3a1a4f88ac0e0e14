//! Randomized cross-section sampling along the loaf.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::warn;

use crate::{error::PortionError, Scalar};

/// One cross-sectional segment of the loaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slice {
    pub index: usize,
    pub width_mm: Scalar,
    pub height_mm: Scalar,
    pub area_mm2: Scalar,
    pub thickness_mm: Scalar,
    /// Zero until the density estimator has run.
    pub weight_g: Scalar,
}

/// Builds the engine's random source. `None` draws from OS entropy.
pub fn rng_for_seed(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Parameters of the synthetic cross-section model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceModel {
    pub count: usize,
    pub mean_width_mm: Scalar,
    pub mean_height_mm: Scalar,
    pub std_dev_mm: Scalar,
    pub thickness_mm: Scalar,
}

/// Samples `count` independent slices with `width ~ N(w̄, σ)` and
/// `height ~ N(h̄, σ)`. Negative draws are kept as sampled.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    model: &SliceModel,
) -> Result<Vec<Slice>, PortionError> {
    let width_dist = normal("average_width_mm", model.mean_width_mm, model.std_dev_mm)?;
    let height_dist = normal("average_height_mm", model.mean_height_mm, model.std_dev_mm)?;

    let mut slices = Vec::with_capacity(model.count);
    let mut non_positive = 0usize;
    for index in 0..model.count {
        let width_mm = width_dist.sample(rng);
        let height_mm = height_dist.sample(rng);
        let area_mm2 = width_mm * height_mm;
        if area_mm2 <= 0.0 {
            non_positive += 1;
        }
        slices.push(Slice {
            index,
            width_mm,
            height_mm,
            area_mm2,
            thickness_mm: model.thickness_mm,
            weight_g: 0.0,
        });
    }

    if non_positive > 0 {
        warn!(
            non_positive,
            count = model.count,
            "sampled cross-sections with non-positive area"
        );
    }
    Ok(slices)
}

fn normal(
    field: &'static str,
    mean: Scalar,
    std_dev: Scalar,
) -> Result<Normal<Scalar>, PortionError> {
    Normal::new(mean, std_dev).map_err(|err| {
        PortionError::invalid(field, format!("cannot sample N({mean}, {std_dev}): {err}"))
    })
}
