//! Tolerable Negative Error (TNE) lookup for average-weight packing.
//!
//! The default table is the UK average-weight schedule. Tiers alternate
//! between a percentage of the nominal weight and a fixed gram allowance. The
//! two meet at every tier edge, so the TNE is continuous from 5 g upwards with
//! only its slope changing. Below 5 g there is no allowance and the TNE drops
//! from 0.45 g to zero.

use serde::{Deserialize, Serialize};

use crate::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum TneRule {
    /// Fraction of the nominal weight, e.g. `0.09` for 9 %.
    PercentOfNominal(Scalar),
    FixedGrams(Scalar),
}

impl TneRule {
    pub fn apply(self, nominal_g: Scalar) -> Scalar {
        match self {
            TneRule::PercentOfNominal(fraction) => nominal_g * fraction,
            TneRule::FixedGrams(grams) => grams,
        }
    }
}

/// One weight range of the table. The range is `lower < N <= upper` except
/// for the first tier, which also admits `N == lower`. `upper = None` is open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceTier {
    pub lower_g: Scalar,
    pub upper_g: Option<Scalar>,
    pub rule: TneRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceTable {
    tiers: Vec<ToleranceTier>,
}

impl Default for ToleranceTable {
    fn default() -> Self {
        use TneRule::{FixedGrams, PercentOfNominal};
        let tier = |lower_g, upper_g, rule| ToleranceTier {
            lower_g,
            upper_g,
            rule,
        };
        Self::new(vec![
            tier(5.0, Some(50.0), PercentOfNominal(0.09)),
            tier(50.0, Some(100.0), FixedGrams(4.5)),
            tier(100.0, Some(200.0), PercentOfNominal(0.045)),
            tier(200.0, Some(300.0), FixedGrams(9.0)),
            tier(300.0, Some(500.0), PercentOfNominal(0.03)),
            tier(500.0, Some(1000.0), FixedGrams(15.0)),
            tier(1000.0, Some(10_000.0), PercentOfNominal(0.015)),
            tier(10_000.0, Some(15_000.0), FixedGrams(150.0)),
            tier(15_000.0, None, PercentOfNominal(0.01)),
        ])
    }
}

impl ToleranceTable {
    /// Tiers must be ordered by `lower_g` and must not overlap.
    pub fn new(tiers: Vec<ToleranceTier>) -> Self {
        debug_assert!(
            tiers
                .windows(2)
                .all(|w| w[0].upper_g.is_some_and(|upper| upper <= w[1].lower_g)),
            "tolerance tiers must be ordered and disjoint"
        );
        Self { tiers }
    }

    pub fn tiers(&self) -> &[ToleranceTier] {
        &self.tiers
    }

    /// TNE for a nominal weight. Weights outside every tier (below 5 g in the
    /// default table) have no allowance and yield `0`.
    pub fn tne(&self, nominal_g: Scalar) -> Scalar {
        self.tier_for(nominal_g)
            .map_or(0.0, |tier| tier.rule.apply(nominal_g))
    }

    pub fn tier_for(&self, nominal_g: Scalar) -> Option<&ToleranceTier> {
        self.tiers.iter().enumerate().find_map(|(idx, tier)| {
            let above_lower = if idx == 0 {
                nominal_g >= tier.lower_g
            } else {
                nominal_g > tier.lower_g
            };
            let below_upper = tier.upper_g.map_or(true, |upper| nominal_g <= upper);
            (above_lower && below_upper).then_some(tier)
        })
    }

    pub fn bands(&self, nominal_g: Scalar) -> ToleranceBands {
        ToleranceBands::new(nominal_g, self.tne(nominal_g))
    }
}

/// The T1/T2 bands derived from one nominal weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceBands {
    pub nominal_g: Scalar,
    pub tne_g: Scalar,
    pub t1_g: Scalar,
    pub t2_g: Scalar,
}

impl ToleranceBands {
    pub fn new(nominal_g: Scalar, tne_g: Scalar) -> Self {
        Self {
            nominal_g,
            tne_g,
            t1_g: tne_g,
            t2_g: 2.0 * tne_g,
        }
    }

    /// Weights strictly below this count as T1 violations.
    pub fn t1_limit_g(&self) -> Scalar {
        self.nominal_g - self.t1_g
    }

    /// Weights strictly below this count as T2 violations.
    pub fn t2_limit_g(&self) -> Scalar {
        self.nominal_g - self.t2_g
    }
}
