use crate::error::{CheckError, Result};
use crate::facts::{FactBase, LookupValue, Strictness};
use crate::mode::{RunContext, RunMode};
use crate::report::fmt_number;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Ref,
    Tum,
}

/// A lower-fails threshold check against one metric of one sample role.
/// `threshold: None` is the NA sentinel: the value is still looked up and
/// reported, but the rule can never fail.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub role: Role,
    pub metric: &'static str,
    pub fallback: Option<&'static str>,
    pub threshold: Option<f64>,
}

pub const SINGLE_RULES: &[Rule] = &[
    Rule {
        name: "COVERAGE_10X_R",
        role: Role::Ref,
        metric: "COVERAGE_10X",
        fallback: None,
        threshold: Some(0.90),
    },
    Rule {
        name: "COVERAGE_20X_R",
        role: Role::Ref,
        metric: "COVERAGE_20X",
        fallback: None,
        threshold: Some(0.70),
    },
];

pub const SOMATIC_RULES: &[Rule] = &[
    Rule {
        name: "COVERAGE_10X_R",
        role: Role::Ref,
        metric: "COVERAGE_10X",
        fallback: None,
        threshold: Some(0.90),
    },
    Rule {
        name: "COVERAGE_20X_R",
        role: Role::Ref,
        metric: "COVERAGE_20X",
        fallback: None,
        threshold: Some(0.70),
    },
    Rule {
        name: "COVERAGE_30X_T",
        role: Role::Tum,
        metric: "COVERAGE_30X",
        fallback: None,
        threshold: Some(0.80),
    },
    Rule {
        name: "COVERAGE_60X_T",
        role: Role::Tum,
        metric: "COVERAGE_60X",
        fallback: None,
        threshold: Some(0.65),
    },
    Rule {
        name: "KINSHIP",
        role: Role::Tum,
        metric: "KINSHIP_TEST",
        fallback: None,
        threshold: Some(0.35),
    },
];

pub const SNP_COUNT_KEY: &str = "SOMATIC_SNP_COUNT";
pub const SNP_DBSNP_KEY: &str = "SOMATIC_SNP_DBSNP_COUNT";
pub const INDEL_COUNT_KEY: &str = "SOMATIC_INDEL_COUNT";

const DBSNP_COUNT_MAX: f64 = 250_000.0;
const NONDBSNP_COUNT_MIN: f64 = 1_000_000.0;
const NONDBSNP_RATIO_MIN: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub name: String,
    pub observed: String,
    pub threshold: String,
    pub passed: bool,
}

/// Ordered per-rule outcomes for one subject sample. The failure count is
/// derived once from the outcome list, never accumulated alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub sample: String,
    pub outcomes: Vec<RuleOutcome>,
    pub failures: usize,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.failures == 0
    }
}

pub fn evaluate(
    facts: &FactBase,
    context: &RunContext,
    strictness: Strictness,
) -> Result<Evaluation> {
    let mut outcomes = Vec::new();

    // Contamination predicates need exact counts and come before the
    // threshold table so report line order stays diff-stable.
    if context.mode == RunMode::Somatic {
        outcomes.extend(contamination_outcomes(facts, context.subject(), strictness)?);
    }

    let table = match context.mode {
        RunMode::Single => SINGLE_RULES,
        RunMode::Somatic => SOMATIC_RULES,
    };
    for rule in table {
        outcomes.push(evaluate_rule(facts, context, rule, strictness)?);
    }

    let failures = outcomes.iter().filter(|outcome| !outcome.passed).count();
    Ok(Evaluation {
        sample: context.subject().to_string(),
        outcomes,
        failures,
    })
}

fn evaluate_rule(
    facts: &FactBase,
    context: &RunContext,
    rule: &Rule,
    strictness: Strictness,
) -> Result<RuleOutcome> {
    let sample = match rule.role {
        Role::Ref => context.ref_sample.as_str(),
        Role::Tum => context.subject(),
    };
    let observed = require(facts, sample, rule.metric, rule.fallback, strictness)?;
    // Boundary passes: a rule fails only when strictly below its threshold.
    let passed = rule.threshold.is_none_or(|threshold| observed >= threshold);
    Ok(RuleOutcome {
        name: rule.name.to_string(),
        observed: fmt_number(observed),
        threshold: rule
            .threshold
            .map_or_else(|| "NA".to_string(), fmt_number),
        passed,
    })
}

fn contamination_outcomes(
    facts: &FactBase,
    tumor: &str,
    strictness: Strictness,
) -> Result<Vec<RuleOutcome>> {
    let snp_count = require(facts, tumor, SNP_COUNT_KEY, None, strictness)?;
    let dbsnp_count = require(facts, tumor, SNP_DBSNP_KEY, None, strictness)?;
    if snp_count == 0.0 {
        return Err(CheckError::MalformedValue {
            key: SNP_COUNT_KEY.to_string(),
            sample: tumor.to_string(),
            detail: "somatic SNP count is zero, dbSNP ratio is undefined".to_string(),
        });
    }
    let ratio = dbsnp_count / snp_count;

    let dbsnp_fails = dbsnp_count > DBSNP_COUNT_MAX;
    let nondbsnp_fails = snp_count > NONDBSNP_COUNT_MIN && ratio < NONDBSNP_RATIO_MIN;

    Ok(vec![
        RuleOutcome {
            name: "DBSNP_CONTAMINATION".to_string(),
            observed: fmt_number(dbsnp_count),
            threshold: fmt_number(DBSNP_COUNT_MAX),
            passed: !dbsnp_fails,
        },
        RuleOutcome {
            name: "NONDBSNP_CONTAMINATION".to_string(),
            observed: fmt_number(ratio),
            threshold: fmt_number(NONDBSNP_RATIO_MIN),
            passed: !nondbsnp_fails,
        },
    ])
}

/// Resolve a rule metric to a number. A missing metric is a hard stop even
/// in lenient mode: threshold arithmetic cannot proceed without it.
fn require(
    facts: &FactBase,
    sample: &str,
    metric: &str,
    fallback: Option<&str>,
    strictness: Strictness,
) -> Result<f64> {
    match facts.lookup(sample, metric, fallback, strictness)? {
        LookupValue::Numeric(value) => Ok(value),
        LookupValue::Missing => Err(CheckError::MissingKey {
            key: metric.to_string(),
            sample: sample.to_string(),
        }),
    }
}
