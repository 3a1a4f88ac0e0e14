//! Threshold-crossing scan that cuts the slice sequence into portions.
//!
//! The scan walks the slices in one direction, accumulating weight and length
//! into an open portion. When the accumulation reaches the threshold the
//! portion is closed and a new one opens. Whatever is still open when the
//! slices run out becomes the waste record at the trailing end of the scan.
//!
//! In [`InterpolationMode::Linear`] the crossing slice is split: the share
//! needed to hit the threshold exactly closes the portion and the rest of the
//! slice opens the next one. Such a boundary slice is reported in the index
//! range of both portions.

use serde::Serialize;
use tracing::debug;

use crate::{
    config::{InterpolationMode, ScanDirection},
    Scalar,
};

/// A contiguous run of slices closed at the weight threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Portion {
    pub start_index: usize,
    pub end_index: usize,
    pub length_mm: Scalar,
    pub weight_g: Scalar,
}

impl Portion {
    pub fn slice_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// The remainder left open when the scan runs out of slices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WasteRecord {
    /// `None` when nothing was left open.
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub length_mm: Scalar,
    pub weight_g: Scalar,
    /// Set once the weight has been folded into the portions.
    pub redistributed: bool,
    /// Weight the waste had before it was redistributed.
    pub absorbed_weight_g: Scalar,
}

impl WasteRecord {
    pub fn empty() -> Self {
        Self {
            start_index: None,
            end_index: None,
            length_mm: 0.0,
            weight_g: 0.0,
            redistributed: false,
            absorbed_weight_g: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index.is_none()
    }

    /// True when the waste stands as its own discarded entry.
    pub fn is_discarded(&self) -> bool {
        !self.redistributed && self.weight_g > 0.0
    }
}

/// Portions in ascending slice order plus the waste remainder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    pub portions: Vec<Portion>,
    pub waste: WasteRecord,
}

impl Segmentation {
    pub fn total_portion_weight_g(&self) -> Scalar {
        self.portions.iter().map(|p| p.weight_g).sum()
    }

    pub fn total_portion_length_mm(&self) -> Scalar {
        self.portions.iter().map(|p| p.length_mm).sum()
    }
}

/// Slice share below which a split remainder counts as fully consumed.
const SPLIT_EPSILON: Scalar = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    pub threshold_g: Scalar,
    pub thickness_mm: Scalar,
    pub mode: InterpolationMode,
    pub direction: ScanDirection,
}

#[derive(Debug, Default)]
struct OpenPortion {
    first: Option<usize>,
    last: usize,
    weight_g: Scalar,
    length_mm: Scalar,
}

impl OpenPortion {
    fn touch(&mut self, index: usize) {
        self.first.get_or_insert(index);
        self.last = index;
    }

    fn span(&self, first: usize) -> (usize, usize) {
        (first.min(self.last), first.max(self.last))
    }

    fn close(&self, weight_g: Scalar, length_mm: Scalar) -> Portion {
        let (start_index, end_index) = self.span(self.first.unwrap_or(self.last));
        Portion {
            start_index,
            end_index,
            length_mm,
            weight_g,
        }
    }

    fn into_waste(self) -> WasteRecord {
        match self.first {
            Some(first) => {
                let (start, end) = self.span(first);
                WasteRecord {
                    start_index: Some(start),
                    end_index: Some(end),
                    length_mm: self.length_mm,
                    weight_g: self.weight_g,
                    ..WasteRecord::empty()
                }
            }
            None => WasteRecord::empty(),
        }
    }
}

/// Cuts `weights` (one entry per slice, index order) into portions.
pub fn segment(weights: &[Scalar], params: &SegmentParams) -> Segmentation {
    let n = weights.len();
    let order: Vec<usize> = match params.direction {
        ScanDirection::Forward => (0..n).collect(),
        ScanDirection::Reverse => (0..n).rev().collect(),
    };

    let threshold = params.threshold_g;
    let thickness = params.thickness_mm;
    let mut portions = Vec::new();
    let mut open = OpenPortion::default();

    for i in order {
        let w = weights[i];
        open.touch(i);
        let mut prev_weight = open.weight_g;
        let mut prev_length = open.length_mm;
        open.weight_g += w;
        open.length_mm += thickness;

        match params.mode {
            InterpolationMode::WholeSlice => {
                if open.weight_g >= threshold {
                    portions.push(open.close(open.weight_g, open.length_mm));
                    open = OpenPortion::default();
                }
            }
            InterpolationMode::Linear => {
                // Share of slice `i` not yet claimed by a closed portion.
                let mut unassigned = 1.0;
                while open.weight_g >= threshold {
                    let overshoot = open.weight_g - threshold;
                    if overshoot >= open.weight_g {
                        // Threshold is below the resolution of the accumulated weight.
                        break;
                    }
                    let fraction = if w > 0.0 {
                        ((w * unassigned - overshoot) / w).clamp(0.0, unassigned)
                    } else {
                        unassigned
                    };
                    portions.push(open.close(
                        prev_weight + fraction * w,
                        prev_length + fraction * thickness,
                    ));

                    unassigned -= fraction;
                    if unassigned <= SPLIT_EPSILON {
                        unassigned = 0.0;
                    }
                    let remains = unassigned > 0.0;
                    prev_weight = 0.0;
                    prev_length = 0.0;
                    open = OpenPortion {
                        first: remains.then_some(i),
                        last: i,
                        weight_g: if remains { overshoot } else { 0.0 },
                        length_mm: unassigned * thickness,
                    };
                }
            }
        }
    }

    if params.direction == ScanDirection::Reverse {
        portions.reverse();
    }
    let waste = open.into_waste();

    debug!(
        portions = portions.len(),
        waste_g = waste.weight_g,
        waste_mm = waste.length_mm,
        mode = ?params.mode,
        direction = ?params.direction,
        "segmented slices"
    );
    Segmentation { portions, waste }
}
