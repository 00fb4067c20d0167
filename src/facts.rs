use crate::error::{CheckError, Result};
use std::collections::HashMap;
use tracing::warn;

/// Sentinel the upstream producer writes when a measurement was attempted
/// but is invalid. Distinct from the metric being absent.
pub const POISON_SENTINEL: &str = "ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Lenient,
}

/// Per-sample metric store built once by the log parser, read-only after.
/// Sample order is first-encountered order; duplicate metrics within a
/// sample are last-write-wins.
#[derive(Debug, Default)]
pub struct FactBase {
    order: Vec<String>,
    facts: HashMap<String, HashMap<String, String>>,
}

/// Classification of a stored raw value.
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Numeric(f64),
    Poisoned,
    Malformed,
}

fn classify(raw: &str) -> RawValue {
    if raw == POISON_SENTINEL {
        return RawValue::Poisoned;
    }
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => RawValue::Numeric(value),
        _ => RawValue::Malformed,
    }
}

/// Result of a lookup: a usable number, or an absent value that lenient
/// mode downgraded to a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookupValue {
    Numeric(f64),
    Missing,
}

impl LookupValue {
    pub fn numeric(&self) -> Option<f64> {
        match self {
            LookupValue::Numeric(value) => Some(*value),
            LookupValue::Missing => None,
        }
    }
}

impl FactBase {
    pub fn insert(&mut self, sample: &str, metric: &str, value: &str) {
        if !self.facts.contains_key(sample) {
            self.order.push(sample.to_string());
        }
        self.facts
            .entry(sample.to_string())
            .or_default()
            .insert(metric.to_string(), value.to_string());
    }

    /// Sample names in the order they were first encountered.
    pub fn samples(&self) -> &[String] {
        &self.order
    }

    pub fn sample_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn has_metric(&self, sample: &str, metric: &str) -> bool {
        self.facts
            .get(sample)
            .is_some_and(|metrics| metrics.contains_key(metric))
    }

    pub fn raw(&self, sample: &str, metric: &str) -> Option<&str> {
        self.facts
            .get(sample)
            .and_then(|metrics| metrics.get(metric))
            .map(String::as_str)
    }

    /// Resolve `primary` (then `fallback`) for `sample` to a numeric value.
    ///
    /// A poisoned value is always an error regardless of which key resolved
    /// it. A missing key is an error in strict mode; lenient mode logs a
    /// warning and returns `LookupValue::Missing`, leaving the caller to
    /// decide whether evaluation can proceed without it.
    pub fn lookup(
        &self,
        sample: &str,
        primary: &str,
        fallback: Option<&str>,
        strictness: Strictness,
    ) -> Result<LookupValue> {
        let resolved = self
            .raw(sample, primary)
            .map(|raw| (primary, raw))
            .or_else(|| {
                fallback.and_then(|key| self.raw(sample, key).map(|raw| (key, raw)))
            });

        let (key, raw) = match resolved {
            Some(found) => found,
            None => match strictness {
                Strictness::Strict => {
                    return Err(CheckError::MissingKey {
                        key: primary.to_string(),
                        sample: sample.to_string(),
                    })
                }
                Strictness::Lenient => {
                    warn!(metric = primary, sample, "metric missing, continuing");
                    return Ok(LookupValue::Missing);
                }
            },
        };

        match classify(raw) {
            RawValue::Numeric(value) => Ok(LookupValue::Numeric(value)),
            RawValue::Poisoned => Err(CheckError::PoisonedValue {
                key: key.to_string(),
                sample: sample.to_string(),
            }),
            RawValue::Malformed => Err(CheckError::MalformedValue {
                key: key.to_string(),
                sample: sample.to_string(),
                detail: format!("value '{raw}' is not numeric"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> FactBase {
        let mut facts = FactBase::default();
        facts.insert("TUM1", "SOMATIC_SNP_COUNT", "1200000");
        facts.insert("REF1", "COVERAGE_10X", "0.95");
        facts.insert("REF1", "COVERAGE_20X", "ERROR");
        facts.insert("REF1", "KINSHIP", "0.40");
        facts
    }

    #[test]
    fn sample_order_is_first_encountered() {
        let facts = base();
        assert_eq!(facts.samples(), ["TUM1".to_string(), "REF1".to_string()]);
    }

    #[test]
    fn duplicate_metric_is_last_write_wins() {
        let mut facts = base();
        facts.insert("REF1", "COVERAGE_10X", "0.50");
        assert_eq!(facts.raw("REF1", "COVERAGE_10X"), Some("0.50"));
    }

    #[test]
    fn lookup_prefers_primary_over_fallback() {
        let facts = base();
        let value = facts
            .lookup("REF1", "COVERAGE_10X", Some("KINSHIP"), Strictness::Strict)
            .expect("primary should resolve");
        assert_eq!(value, LookupValue::Numeric(0.95));
    }

    #[test]
    fn lookup_uses_fallback_when_primary_absent() {
        let facts = base();
        let value = facts
            .lookup("REF1", "KINSHIP_TEST", Some("KINSHIP"), Strictness::Strict)
            .expect("fallback should resolve");
        assert_eq!(value, LookupValue::Numeric(0.40));
    }

    #[test]
    fn lookup_rejects_poisoned_value_from_any_key() {
        let facts = base();
        let via_primary = facts.lookup("REF1", "COVERAGE_20X", None, Strictness::Strict);
        assert!(matches!(
            via_primary,
            Err(CheckError::PoisonedValue { ref key, .. }) if key == "COVERAGE_20X"
        ));

        let via_fallback =
            facts.lookup("REF1", "NO_SUCH", Some("COVERAGE_20X"), Strictness::Lenient);
        assert!(matches!(
            via_fallback,
            Err(CheckError::PoisonedValue { ref key, .. }) if key == "COVERAGE_20X"
        ));
    }

    #[test]
    fn lookup_missing_is_fatal_in_strict_mode() {
        let facts = base();
        let result = facts.lookup("REF1", "NO_SUCH", None, Strictness::Strict);
        assert!(matches!(
            result,
            Err(CheckError::MissingKey { ref key, ref sample })
                if key == "NO_SUCH" && sample == "REF1"
        ));
    }

    #[test]
    fn lookup_missing_is_downgraded_in_lenient_mode() {
        let facts = base();
        let result = facts
            .lookup("REF1", "NO_SUCH", None, Strictness::Lenient)
            .expect("lenient mode should not fail on a missing key");
        assert_eq!(result, LookupValue::Missing);
    }

    #[test]
    fn lookup_rejects_non_numeric_value() {
        let mut facts = base();
        facts.insert("REF1", "COVERAGE_30X", "n/a");
        let result = facts.lookup("REF1", "COVERAGE_30X", None, Strictness::Strict);
        assert!(matches!(result, Err(CheckError::MalformedValue { .. })));
    }
}
