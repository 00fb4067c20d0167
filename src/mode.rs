use crate::error::{CheckError, Result};
use crate::facts::FactBase;

/// Metric whose presence marks a sample as the tumor in a paired run.
pub const TUMOR_MARKER: &str = "SOMATIC_SNP_COUNT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Single,
    Somatic,
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub mode: RunMode,
    pub ref_sample: String,
    pub tum_sample: Option<String>,
}

impl RunContext {
    /// The sample whose name labels the final verdict: the tumor in a
    /// paired run, the sole sample otherwise.
    pub fn subject(&self) -> &str {
        self.tum_sample.as_deref().unwrap_or(&self.ref_sample)
    }
}

/// Derive the run context from the fact base. Pure partition over the
/// ordered sample list; no iteration-order dependence.
pub fn resolve(facts: &FactBase) -> Result<RunContext> {
    match facts.samples() {
        [sole] => Ok(RunContext {
            mode: RunMode::Single,
            ref_sample: sole.clone(),
            tum_sample: None,
        }),
        [first, second] => {
            let (tumors, refs): (Vec<&String>, Vec<&String>) = [first, second]
                .into_iter()
                .partition(|sample| facts.has_metric(sample, TUMOR_MARKER));
            match (tumors.as_slice(), refs.as_slice()) {
                ([tumor], [reference]) => Ok(RunContext {
                    mode: RunMode::Somatic,
                    ref_sample: (*reference).clone(),
                    tum_sample: Some((*tumor).clone()),
                }),
                ([], _) => Err(CheckError::ModeResolution(format!(
                    "neither sample carries {TUMOR_MARKER}"
                ))),
                _ => Err(CheckError::ModeResolution(format!(
                    "both samples carry {TUMOR_MARKER}"
                ))),
            }
        }
        other => Err(CheckError::UnsupportedSampleCount(other.len())),
    }
}
