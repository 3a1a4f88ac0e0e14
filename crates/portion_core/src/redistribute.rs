//! Folds the waste remainder back into the closed portions.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{segment::Segmentation, Scalar};

/// What a redistribution pass did to the segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Redistribution {
    pub share_per_portion_g: Scalar,
    pub absorbed_weight_g: Scalar,
}

/// Splits the waste weight evenly over every portion.
///
/// Each portion's length grows in proportion to its weight so its implied
/// density stays put. Portions of zero weight keep their length. The waste
/// record keeps its span and length for display but its weight drops to zero.
/// Returns `None` and leaves everything untouched when there are no portions.
pub fn redistribute(segmentation: &mut Segmentation) -> Option<Redistribution> {
    if segmentation.portions.is_empty() {
        warn!(
            waste_g = segmentation.waste.weight_g,
            "waste redistribution requested but no portions were formed"
        );
        return None;
    }

    let waste_g = segmentation.waste.weight_g;
    let share = waste_g / segmentation.portions.len() as Scalar;
    for portion in &mut segmentation.portions {
        if portion.weight_g > 0.0 {
            portion.length_mm += (share / portion.weight_g) * portion.length_mm;
        }
        portion.weight_g += share;
    }

    let waste = &mut segmentation.waste;
    waste.absorbed_weight_g = waste_g;
    waste.weight_g = 0.0;
    waste.redistributed = true;

    debug!(share_g = share, absorbed_g = waste_g, "redistributed waste");
    Some(Redistribution {
        share_per_portion_g: share,
        absorbed_weight_g: waste_g,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Portion, WasteRecord};

    fn portion(weight_g: Scalar, length_mm: Scalar) -> Portion {
        Portion {
            start_index: 0,
            end_index: 0,
            length_mm,
            weight_g,
        }
    }

    fn waste(weight_g: Scalar, length_mm: Scalar) -> WasteRecord {
        WasteRecord {
            start_index: Some(9),
            end_index: Some(9),
            length_mm,
            weight_g,
            ..WasteRecord::empty()
        }
    }

    #[test]
    fn spreads_waste_evenly_and_conserves_mass() {
        let mut seg = Segmentation {
            portions: vec![portion(100.0, 10.0), portion(200.0, 20.0)],
            waste: waste(30.0, 3.0),
        };
        let before = seg.total_portion_weight_g();
        let outcome = redistribute(&mut seg).expect("portions exist");

        assert_eq!(outcome.share_per_portion_g, 15.0);
        assert_eq!(outcome.absorbed_weight_g, 30.0);
        assert_eq!(seg.portions[0].weight_g, 115.0);
        assert!((seg.portions[0].length_mm - 11.5).abs() < 1e-12);
        assert_eq!(seg.portions[1].weight_g, 215.0);
        assert!((seg.portions[1].length_mm - 21.5).abs() < 1e-12);
        assert!((seg.total_portion_weight_g() - (before + 30.0)).abs() < 1e-12);

        assert_eq!(seg.waste.weight_g, 0.0);
        assert_eq!(seg.waste.absorbed_weight_g, 30.0);
        assert_eq!(seg.waste.length_mm, 3.0);
        assert!(seg.waste.redistributed);
        assert!(!seg.waste.is_discarded());
    }

    #[test]
    fn weightless_portions_keep_their_length() {
        let mut seg = Segmentation {
            portions: vec![portion(0.0, 4.0)],
            waste: waste(2.0, 1.0),
        };
        redistribute(&mut seg).expect("portions exist");
        assert_eq!(seg.portions[0].length_mm, 4.0);
        assert_eq!(seg.portions[0].weight_g, 2.0);
    }

    #[test]
    fn no_portions_leaves_waste_standing() {
        let mut seg = Segmentation {
            portions: Vec::new(),
            waste: waste(5.0, 1.0),
        };
        assert!(redistribute(&mut seg).is_none());
        assert_eq!(seg.waste.weight_g, 5.0);
        assert!(seg.waste.is_discarded());
    }
}
