//! One end-to-end portioning run: sample → estimate → segment → redistribute → check.

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::{
    compliance::{self, ComplianceReport},
    config::{PortionSettings, ScanDirection},
    density::{self, DensityEstimate},
    error::PortionError,
    redistribute::{self, Redistribution},
    segment::{self, Portion, SegmentParams, WasteRecord},
    slices::{self, Slice, SliceModel},
    tolerance::ToleranceTable,
    Scalar,
};

/// Everything a run produced, handed to whichever frontend renders it.
#[derive(Debug, Clone, Serialize)]
pub struct PortionRun {
    pub settings: PortionSettings,
    pub slices: Vec<Slice>,
    pub density: DensityEstimate,
    pub portions: Vec<Portion>,
    pub waste: WasteRecord,
    pub redistribution: Option<Redistribution>,
    pub report: ComplianceReport,
}

impl PortionRun {
    pub fn slice_weights(&self) -> Vec<Scalar> {
        self.slices.iter().map(|s| s.weight_g).collect()
    }

    /// Loaf length accounted for by the cut plan: every portion plus the
    /// waste when it was discarded.
    pub fn accounted_length_mm(&self) -> Scalar {
        let portions: Scalar = self.portions.iter().map(|p| p.length_mm).sum();
        if self.waste.redistributed {
            portions
        } else {
            portions + self.waste.length_mm
        }
    }

    /// `(cumulative length, cumulative weight)` after each slice in index order.
    pub fn cumulative_profile(&self) -> Vec<(Scalar, Scalar)> {
        let mut length = 0.0;
        let mut weight = 0.0;
        self.slices
            .iter()
            .map(|slice| {
                length += slice.thickness_mm;
                weight += slice.weight_g;
                (length, weight)
            })
            .collect()
    }

    /// Positions along the loaf, measured from slice 0, where each portion
    /// ends. A discarded waste remainder at the front shifts every cut.
    pub fn portion_cuts_mm(&self) -> Vec<Scalar> {
        let mut offset = match self.settings.scan_direction {
            ScanDirection::Reverse if !self.waste.redistributed => self.waste.length_mm,
            _ => 0.0,
        };
        self.portions
            .iter()
            .map(|p| {
                offset += p.length_mm;
                offset
            })
            .collect()
    }
}

/// Runs the pipeline with a random source built from `settings.seed`.
pub fn run(settings: &PortionSettings) -> Result<PortionRun, PortionError> {
    let mut rng = slices::rng_for_seed(settings.seed);
    run_with_rng(settings, &mut rng)
}

/// Runs the pipeline drawing cross-sections from `rng`.
pub fn run_with_rng<R: Rng + ?Sized>(
    settings: &PortionSettings,
    rng: &mut R,
) -> Result<PortionRun, PortionError> {
    settings.validate()?;

    let model = SliceModel {
        count: settings.slice_count,
        mean_width_mm: settings.average_width_mm,
        mean_height_mm: settings.average_height_mm,
        std_dev_mm: settings.dimension_std_dev_mm,
        thickness_mm: settings.slice_thickness_mm,
    };
    let mut slices = slices::generate(rng, &model)?;
    let density = density::estimate(
        &mut slices,
        settings.total_weight_g,
        settings.slice_thickness_mm,
        settings.integration_rule,
    )?;

    let weights: Vec<Scalar> = slices.iter().map(|s| s.weight_g).collect();
    let mut segmentation = segment::segment(
        &weights,
        &SegmentParams {
            threshold_g: settings.threshold_g(),
            thickness_mm: settings.slice_thickness_mm,
            mode: settings.interpolation,
            direction: settings.scan_direction,
        },
    );

    let redistribution = if settings.redistribute_waste {
        redistribute::redistribute(&mut segmentation)
    } else {
        None
    };

    let report = compliance::check(
        &segmentation.portions,
        settings.target_portion_weight_g,
        &ToleranceTable::default(),
    );

    info!(
        portions = report.portion_count,
        average_g = report.average_weight_g,
        waste_g = segmentation.waste.weight_g,
        passed = report.passed(),
        "portioning run complete"
    );

    Ok(PortionRun {
        settings: settings.clone(),
        slices,
        density,
        portions: segmentation.portions,
        waste: segmentation.waste,
        redistribution,
        report,
    })
}
