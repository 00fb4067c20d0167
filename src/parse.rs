use crate::error::{CheckError, Result};
use crate::facts::FactBase;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

static CHECK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Check '([^']+)' for sample '([^']+)' has value '([^']*)'")
        .expect("check-line pattern should compile")
});

/// Scan a health-check log and build the fact base. Lines that do not
/// match the check pattern are ignored; surrounding free-form text is
/// expected. Fails with `EmptyLog` when no sample produced a single fact.
pub fn parse_log(reader: impl BufRead) -> Result<FactBase> {
    let mut facts = FactBase::default();
    for line in reader.lines() {
        let line = line?;
        if let Some(captures) = CHECK_LINE.captures(&line) {
            let metric = &captures[1];
            let sample = &captures[2];
            let value = &captures[3];
            debug!(sample, metric, value, "parsed health check");
            facts.insert(sample, metric, value);
        }
    }
    if facts.is_empty() {
        return Err(CheckError::EmptyLog);
    }
    Ok(facts)
}

/// File handle is scoped to this call and released on every exit path.
pub fn parse_log_file(path: &Path) -> Result<FactBase> {
    let file = File::open(path)?;
    parse_log(BufReader::new(file))
}
