//! Stage classifier.
//!
//! Maps moving averages and slopes to a discrete stage. Each rule set is a
//! ranked list of `(predicate, stage)` rules evaluated in order; the first
//! matching rule wins.

use crate::error::AnalysisError;
use crate::types::{RuleSet, Stage, StageEvidence};
use std::cell::OnceCell;
use tracing::warn;

/// Relative gap between the triplet means below which they count as equal.
pub const NEAR_EQUAL_TOLERANCE: f64 = 0.01;

/// Short slope bound for Accumulation and Stage 1.
pub const FLAT_SLOPE: f64 = 0.1;

/// Short slope bound for Stage 3.
pub const TOPPING_SLOPE: f64 = 0.05;

fn mean(values: &[f64; 3]) -> f64 {
    values.iter().sum::<f64>() / 3.0
}

/// Every short MA above its long pair (5/50, 8/55, 13/60).
pub fn above(short_mas: &[f64; 3], long_mas: &[f64; 3]) -> bool {
    short_mas.iter().zip(long_mas).all(|(s, l)| s > l)
}

/// Every short MA below its long pair.
pub fn below(short_mas: &[f64; 3], long_mas: &[f64; 3]) -> bool {
    short_mas.iter().zip(long_mas).all(|(s, l)| s < l)
}

/// Whether the short and long triplet means are within 1% of the long mean.
///
/// Fails when the long mean is zero or the ratio is otherwise not finite.
pub fn near_equal(short_mas: &[f64; 3], long_mas: &[f64; 3]) -> Result<bool, AnalysisError> {
    let long_mean = mean(long_mas);
    if long_mean == 0.0 {
        return Err(AnalysisError::computation(
            "long moving average mean is zero",
        ));
    }

    let ratio = (mean(short_mas) - long_mean).abs() / long_mean;
    if !ratio.is_finite() {
        return Err(AnalysisError::computation(
            "moving average gap is not finite",
        ));
    }

    Ok(ratio < NEAR_EQUAL_TOLERANCE)
}

/// Inputs to the rule predicates. `near_equal` is evaluated on first use only.
pub struct Conditions<'a> {
    evidence: &'a StageEvidence,
    above: bool,
    below: bool,
    near_equal: OnceCell<Result<bool, AnalysisError>>,
}

impl<'a> Conditions<'a> {
    pub fn new(evidence: &'a StageEvidence) -> Self {
        Self {
            evidence,
            above: above(&evidence.short_mas, &evidence.long_mas),
            below: below(&evidence.short_mas, &evidence.long_mas),
            near_equal: OnceCell::new(),
        }
    }

    pub fn above(&self) -> bool {
        self.above
    }

    pub fn below(&self) -> bool {
        self.below
    }

    pub fn near_equal(&self) -> Result<bool, AnalysisError> {
        self.near_equal
            .get_or_init(|| near_equal(&self.evidence.short_mas, &self.evidence.long_mas))
            .clone()
    }

    pub fn short_slope(&self) -> f64 {
        self.evidence.short_slope
    }

    pub fn long_slope(&self) -> f64 {
        self.evidence.long_slope
    }
}

type Predicate = fn(&Conditions) -> Result<bool, AnalysisError>;

/// One entry of a ranked rule list.
pub struct StageRule {
    pub stage: Stage,
    pub predicate: Predicate,
}

const fn rule(stage: Stage, predicate: Predicate) -> StageRule {
    StageRule { stage, predicate }
}

/// 4-label rules. Distribution is the fallback when none match.
pub static FOUR_STAGE_RULES: [StageRule; 3] = [
    rule(Stage::Markup, |c| {
        Ok(c.above() && c.short_slope() > 0.0 && c.long_slope() > 0.0)
    }),
    rule(Stage::Markdown, |c| {
        Ok(c.below() && c.short_slope() < 0.0 && c.long_slope() < 0.0)
    }),
    rule(Stage::Accumulation, |c| {
        Ok(c.near_equal()? && c.short_slope().abs() < FLAT_SLOPE)
    }),
];

/// 8-label rules. Unclassified is the fallback when none match.
///
/// The Stage 3 rule can never fire: any input it accepts is already accepted
/// by the Stage 1 rule, whose slope bound is wider. It is kept in place so the
/// ranking stays as published.
pub static TRANSITION_RULES: [StageRule; 8] = [
    rule(Stage::Stage1, |c| {
        Ok(c.near_equal()? && c.short_slope().abs() < FLAT_SLOPE)
    }),
    rule(Stage::Stage1To2, |c| {
        Ok(c.above() && c.short_slope() > 0.0 && c.long_slope() <= 0.0)
    }),
    rule(Stage::Stage2, |c| {
        Ok(c.above() && c.short_slope() > 0.0 && c.long_slope() > 0.0)
    }),
    rule(Stage::Stage2To3, |c| Ok(c.above() && c.short_slope() <= 0.0)),
    rule(Stage::Stage3, |c| {
        Ok(c.near_equal()? && c.short_slope().abs() < TOPPING_SLOPE)
    }),
    rule(Stage::Stage3To4, |c| {
        Ok(c.below() && c.short_slope() < 0.0 && c.long_slope() >= 0.0)
    }),
    rule(Stage::Stage4, |c| {
        Ok(c.below() && c.short_slope() < 0.0 && c.long_slope() < 0.0)
    }),
    rule(Stage::Stage4To1, |c| Ok(c.below() && c.short_slope() >= 0.0)),
];

impl RuleSet {
    /// Ranked rules and the stage returned when none match.
    pub fn rules(&self) -> (&'static [StageRule], Stage) {
        match self {
            RuleSet::FourStage => (&FOUR_STAGE_RULES, Stage::Distribution),
            RuleSet::Transition => (&TRANSITION_RULES, Stage::Unclassified),
        }
    }
}

/// Evaluate a ranked rule list, first match wins.
///
/// A predicate that cannot be evaluated ends the evaluation with the error.
pub fn evaluate(
    rules: &[StageRule],
    fallback: Stage,
    evidence: &StageEvidence,
) -> Result<Stage, AnalysisError> {
    let conditions = Conditions::new(evidence);
    for rule in rules {
        if (rule.predicate)(&conditions)? {
            return Ok(rule.stage);
        }
    }
    Ok(fallback)
}

/// Classify evidence under a rule set.
///
/// Reaching the near-equal test with a zero long mean yields `Unclassified`.
pub fn classify(rule_set: RuleSet, evidence: &StageEvidence) -> Stage {
    let (rules, fallback) = rule_set.rules();
    match evaluate(rules, fallback, evidence) {
        Ok(stage) => stage,
        Err(e) => {
            warn!("{} classification left unclassified: {}", rule_set.name(), e);
            Stage::Unclassified
        }
    }
}

/// 4-label classification: Markup, Markdown, Accumulation or Distribution.
pub fn classify_stage(
    short_mas: [f64; 3],
    long_mas: [f64; 3],
    short_slope: f64,
    long_slope: f64,
) -> Stage {
    classify(
        RuleSet::FourStage,
        &StageEvidence {
            short_mas,
            long_mas,
            short_slope,
            long_slope,
        },
    )
}

/// 8-label transition classification.
pub fn classify_stage_v2(
    short_mas: [f64; 3],
    long_mas: [f64; 3],
    short_slope: f64,
    long_slope: f64,
) -> Stage {
    classify(
        RuleSet::Transition,
        &StageEvidence {
            short_mas,
            long_mas,
            short_slope,
            long_slope,
        },
    )
}
