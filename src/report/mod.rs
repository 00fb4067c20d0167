use crate::error::Result;
use crate::facts::{FactBase, LookupValue, Strictness};
use crate::mode::{RunContext, RunMode};
use crate::rules::{Evaluation, INDEL_COUNT_KEY, SNP_COUNT_KEY, SNP_DBSNP_KEY};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Which stream a report line belongs on. `[FAIL]`-tagged lines and a FAIL
/// verdict go to the error channel so scrapers can grep the streams apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Out,
    Err,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub channel: Channel,
    pub text: String,
}

impl Line {
    fn out(text: String) -> Self {
        Line {
            channel: Channel::Out,
            text,
        }
    }

    fn err(text: String) -> Self {
        Line {
            channel: Channel::Err,
            text,
        }
    }
}

/// Display form for every number in the report: two decimal places,
/// thousands-separated integer part. Stable under re-parse and re-format.
pub fn fmt_number(value: f64) -> String {
    let rounded = format!("{value:.2}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, digit) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}.{frac_part}")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sample: &'a str,
    mode: &'a str,
    reference: &'a str,
    tumor: Option<&'a str>,
    checks: &'a [crate::rules::RuleOutcome],
    failures: usize,
    verdict: &'a str,
}

pub fn render(
    facts: &FactBase,
    context: &RunContext,
    evaluation: &Evaluation,
    strictness: Strictness,
    format: OutputFormat,
) -> Result<Vec<Line>> {
    match format {
        OutputFormat::Text => render_text(facts, context, evaluation, strictness),
        OutputFormat::Json => {
            let report = JsonReport {
                sample: &evaluation.sample,
                mode: match context.mode {
                    RunMode::Single => "single",
                    RunMode::Somatic => "somatic",
                },
                reference: &context.ref_sample,
                tumor: context.tum_sample.as_deref(),
                checks: &evaluation.outcomes,
                failures: evaluation.failures,
                verdict: if evaluation.passed() { "OK" } else { "FAIL" },
            };
            Ok(vec![Line::out(serde_json::to_string_pretty(&report)?)])
        }
    }
}

fn render_text(
    facts: &FactBase,
    context: &RunContext,
    evaluation: &Evaluation,
    strictness: Strictness,
) -> Result<Vec<Line>> {
    let mut lines = Vec::new();

    match context.mode {
        RunMode::Single => {
            lines.push(Line::out(format!("INFO: sample = {}", context.ref_sample)));
        }
        RunMode::Somatic => {
            let tumor = context.subject();
            lines.push(Line::out(format!(
                "INFO: reference sample = {}",
                context.ref_sample
            )));
            lines.push(Line::out(format!("INFO: tumor sample = {tumor}")));

            let (snp, snp_text) = display_count(facts, tumor, SNP_COUNT_KEY, strictness)?;
            let (_, indel_text) = display_count(facts, tumor, INDEL_COUNT_KEY, strictness)?;
            let (dbsnp, dbsnp_text) = display_count(facts, tumor, SNP_DBSNP_KEY, strictness)?;
            lines.push(Line::out(format!("INFO: somatic SNP count = {snp_text}")));
            lines.push(Line::out(format!(
                "INFO: somatic indel count = {indel_text}"
            )));
            let percentage = match (snp, dbsnp) {
                (Some(snp), Some(dbsnp)) if snp > 0.0 => fmt_number(dbsnp / snp * 100.0),
                _ => "NA".to_string(),
            };
            lines.push(Line::out(format!(
                "INFO: somatic dbSNP count = {dbsnp_text} ({percentage}%)"
            )));
        }
    }

    for outcome in &evaluation.outcomes {
        if outcome.passed {
            lines.push(Line::out(format!(
                "[OK] {}: {} > {}",
                outcome.name, outcome.observed, outcome.threshold
            )));
        } else {
            lines.push(Line::err(format!(
                "[FAIL] {}: {} < {}",
                outcome.name, outcome.observed, outcome.threshold
            )));
        }
    }

    let verdict = format!(
        "TEST RESULT for {} (fails:{}) = {}",
        evaluation.sample,
        evaluation.failures,
        if evaluation.passed() { "OK" } else { "FAIL" }
    );
    lines.push(if evaluation.passed() {
        Line::out(verdict)
    } else {
        Line::err(verdict)
    });

    Ok(lines)
}

fn display_count(
    facts: &FactBase,
    sample: &str,
    key: &str,
    strictness: Strictness,
) -> Result<(Option<f64>, String)> {
    match facts.lookup(sample, key, None, strictness)? {
        LookupValue::Numeric(value) => Ok((Some(value), fmt_number(value))),
        LookupValue::Missing => Ok((None, "NA".to_string())),
    }
}
