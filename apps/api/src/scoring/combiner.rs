//! Score Combiner — blends similarity and coverage, then reshapes the blend
//! through a monotonic piecewise boost curve.
//!
//! The curve is data, not code: a `BoostCurve` is a sorted list of tiers and is
//! validated on construction so a coefficient change cannot silently make the
//! curve drop across a breakpoint. Curve versions are selected by config
//! (`SCORE_CURVE`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::error::ScoreError;

// ────────────────────────────────────────────────────────────────────────────
// Named constants
// ────────────────────────────────────────────────────────────────────────────

/// Weight of the cosine similarity signal in the blend.
pub const SIMILARITY_WEIGHT: f64 = 0.4;
/// Weight of the keyword coverage signal in the blend.
pub const COVERAGE_WEIGHT: f64 = 0.6;
/// Highest score ever reported. 100 is reserved: there is no perfect score.
pub const SCORE_CEILING: f64 = 98.0;

/// Breakpoints of the canonical (v3) curve.
pub const LOW_BREAKPOINT: f64 = 15.0;
pub const MID_BREAKPOINT: f64 = 30.0;
pub const HIGH_BREAKPOINT: f64 = 50.0;
/// Cap applied to the 30 < raw ≤ 50 segment of the canonical curve.
pub const MID_TIER_CAP: f64 = 88.0;

const V3_TIERS: &[BoostTier] = &[
    BoostTier::new(LOW_BREAKPOINT, 1.2, 0.0, SCORE_CEILING),
    BoostTier::new(MID_BREAKPOINT, 1.5, 10.0, MID_TIER_CAP),
    BoostTier::new(HIGH_BREAKPOINT, 1.5, 15.0, SCORE_CEILING),
];
const V2_TIERS: &[BoostTier] = &[BoostTier::new(MID_BREAKPOINT, 1.5, 15.0, SCORE_CEILING)];
const V1_TIERS: &[BoostTier] = &[BoostTier::new(LOW_BREAKPOINT, 1.5, 10.0, SCORE_CEILING)];

// ────────────────────────────────────────────────────────────────────────────
// Boost curve
// ────────────────────────────────────────────────────────────────────────────

/// One linear segment of the curve: for `raw > above` (up to the next tier),
/// `boosted = min(cap, raw * multiplier + offset)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostTier {
    pub above: f64,
    pub multiplier: f64,
    pub offset: f64,
    pub cap: f64,
}

impl BoostTier {
    pub const fn new(above: f64, multiplier: f64, offset: f64, cap: f64) -> Self {
        Self {
            above,
            multiplier,
            offset,
            cap,
        }
    }

    fn apply(&self, raw: f64) -> f64 {
        (raw * self.multiplier + self.offset).min(self.cap)
    }
}

/// Piecewise boost. Values at or below the first breakpoint pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostCurve {
    tiers: Vec<BoostTier>,
}

impl BoostCurve {
    /// Builds a curve, rejecting tiers that would make it non-monotonic:
    /// breakpoints must be strictly increasing, multipliers non-negative, and
    /// the value just above each breakpoint must not be lower than the value
    /// at it.
    pub fn new(tiers: Vec<BoostTier>) -> Result<Self, ScoreError> {
        let curve = Self { tiers };
        curve.validate()?;
        Ok(curve)
    }

    fn validate(&self) -> Result<(), ScoreError> {
        for (i, tier) in self.tiers.iter().enumerate() {
            let finite = [tier.above, tier.multiplier, tier.offset, tier.cap]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                return Err(ScoreError::Computation(format!(
                    "boost tier {i} has a non-finite coefficient"
                )));
            }
            if tier.multiplier < 0.0 {
                return Err(ScoreError::Computation(format!(
                    "boost tier {i} has a negative multiplier"
                )));
            }
            if i > 0 && tier.above <= self.tiers[i - 1].above {
                return Err(ScoreError::Computation(format!(
                    "boost tier {i} breakpoint {} is not above the previous one",
                    tier.above
                )));
            }

            let at_breakpoint = self.apply(tier.above);
            let above_breakpoint = tier.apply(tier.above);
            if above_breakpoint < at_breakpoint {
                return Err(ScoreError::Computation(format!(
                    "boost curve drops at {}: {at_breakpoint} -> {above_breakpoint}",
                    tier.above
                )));
            }
        }
        Ok(())
    }

    /// Applies the curve without clamping or rounding.
    pub fn apply(&self, raw: f64) -> f64 {
        match self.tiers.iter().rev().find(|tier| raw > tier.above) {
            Some(tier) => tier.apply(raw),
            None => raw,
        }
    }

    pub fn tiers(&self) -> &[BoostTier] {
        &self.tiers
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Curve versions
// ────────────────────────────────────────────────────────────────────────────

/// Boost curve revisions. `V3` is canonical; the others are kept so older
/// score behavior can be reproduced by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveVersion {
    /// raw > 15 → min(98, raw·1.5 + 10)
    V1,
    /// raw > 30 → min(98, raw·1.5 + 15)
    V2,
    #[default]
    V3,
}

impl CurveVersion {
    pub fn tiers(self) -> &'static [BoostTier] {
        match self {
            CurveVersion::V1 => V1_TIERS,
            CurveVersion::V2 => V2_TIERS,
            CurveVersion::V3 => V3_TIERS,
        }
    }

    /// Builds this version's curve through `BoostCurve::new`.
    pub fn curve(self) -> Result<BoostCurve, ScoreError> {
        BoostCurve::new(self.tiers().to_vec())
    }
}

impl FromStr for CurveVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(CurveVersion::V1),
            "v2" => Ok(CurveVersion::V2),
            "v3" => Ok(CurveVersion::V3),
            other => Err(format!("unknown score curve '{other}' (expected v1, v2 or v3)")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Combiner
// ────────────────────────────────────────────────────────────────────────────

/// Weighted blend followed by a boost curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCombiner {
    similarity_weight: f64,
    coverage_weight: f64,
    curve: BoostCurve,
}

impl ScoreCombiner {
    pub fn new(curve: BoostCurve) -> Self {
        Self {
            similarity_weight: SIMILARITY_WEIGHT,
            coverage_weight: COVERAGE_WEIGHT,
            curve,
        }
    }

    pub fn for_version(version: CurveVersion) -> Result<Self, ScoreError> {
        Ok(Self::new(version.curve()?))
    }

    /// `sim * 0.4 + cov * 0.6`, before boosting.
    pub fn blend(&self, similarity: f64, coverage: f64) -> f64 {
        similarity * self.similarity_weight + coverage * self.coverage_weight
    }

    /// Blends, boosts, clamps to [0, 98] and rounds to one decimal place.
    pub fn combine(&self, similarity: f64, coverage: f64) -> Result<f64, ScoreError> {
        self.finish(self.blend(similarity, coverage))
    }

    /// Boosts an already blended value, then clamps and rounds it.
    pub fn finish(&self, raw: f64) -> Result<f64, ScoreError> {
        if !raw.is_finite() {
            return Err(ScoreError::Computation(format!(
                "blended score is not finite: {raw}"
            )));
        }

        let boosted = self.curve.apply(raw).clamp(0.0, SCORE_CEILING);
        let score = round_one_decimal(boosted);

        if !(0.0..=SCORE_CEILING).contains(&score) {
            return Err(ScoreError::Computation(format!(
                "score {score} escaped the [0, {SCORE_CEILING}] range"
            )));
        }
        Ok(score)
    }

    pub fn curve(&self) -> &BoostCurve {
        &self.curve
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
