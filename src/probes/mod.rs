use crate::settings;
use std::path::Path;
use walkdir::WalkDir;

/// One boolean check over the run directory. Probes have no shared state
/// and no ordering constraints; the orchestrator sums the failures.
pub trait Probe {
    fn name(&self) -> &'static str;
    fn run(&self, run_dir: &Path) -> ProbeOutcome;
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

pub fn run_probes(run_dir: &Path) -> Vec<ProbeOutcome> {
    let probes: [&dyn Probe; 4] = [
        &CoreDumpProbe,
        &SubmitLogProbe,
        &BamCountProbe,
        &PlotCountProbe,
    ];
    probes.iter().map(|probe| probe.run(run_dir)).collect()
}

struct CoreDumpProbe;

impl Probe for CoreDumpProbe {
    fn name(&self) -> &'static str {
        "CORE_DUMPS"
    }

    fn run(&self, run_dir: &Path) -> ProbeOutcome {
        let dumps = list_files(run_dir)
            .filter(|name| name.starts_with("core."))
            .count();
        ProbeOutcome {
            name: self.name(),
            passed: dumps == 0,
            detail: format!("{dumps} core dump(s) found"),
        }
    }
}

struct SubmitLogProbe;

impl Probe for SubmitLogProbe {
    fn name(&self) -> &'static str {
        "SUBMIT_LOG"
    }

    fn run(&self, run_dir: &Path) -> ProbeOutcome {
        let submit_err = run_dir.join("logs/submit.err");
        let size = std::fs::metadata(&submit_err).map(|meta| meta.len()).unwrap_or(0);
        ProbeOutcome {
            name: self.name(),
            passed: size == 0,
            detail: format!("submit error log is {size} bytes"),
        }
    }
}

struct BamCountProbe;

impl Probe for BamCountProbe {
    fn name(&self) -> &'static str {
        "BAM_COUNT"
    }

    fn run(&self, run_dir: &Path) -> ProbeOutcome {
        let bams = list_files(run_dir)
            .filter(|name| name.ends_with(".bam"))
            .count();
        ProbeOutcome {
            name: self.name(),
            passed: bams > 0,
            detail: format!("{bams} BAM file(s) found"),
        }
    }
}

struct PlotCountProbe;

impl Probe for PlotCountProbe {
    fn name(&self) -> &'static str {
        "QC_PLOTS"
    }

    fn run(&self, run_dir: &Path) -> ProbeOutcome {
        if !settings::is_feature_enabled("qc_plots", run_dir) {
            return ProbeOutcome {
                name: self.name(),
                passed: true,
                detail: "skipped, qc_plots disabled for this run".to_string(),
            };
        }
        let plots = list_files(&run_dir.join("qc"))
            .filter(|name| name.ends_with(".png"))
            .count();
        ProbeOutcome {
            name: self.name(),
            passed: plots > 0,
            detail: format!("{plots} QC plot(s) found"),
        }
    }
}

fn list_files(root: &Path) -> impl Iterator<Item = String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn healthy_run_dir() -> TempDir {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::create_dir_all(dir.path().join("logs")).expect("logs dir should create");
        fs::write(dir.path().join("logs/submit.err"), "").expect("empty submit log should write");
        fs::write(dir.path().join("sample1.bam"), "bam").expect("bam should write");
        dir
    }

    #[test]
    fn healthy_run_passes_all_probes() {
        let dir = healthy_run_dir();
        let outcomes = run_probes(dir.path());
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|outcome| outcome.passed));
    }

    #[test]
    fn core_dump_fails_the_core_probe() {
        let dir = healthy_run_dir();
        fs::write(dir.path().join("core.12345"), "dump").expect("core dump should write");
        let outcomes = run_probes(dir.path());
        let core = outcomes
            .iter()
            .find(|outcome| outcome.name == "CORE_DUMPS")
            .expect("core probe should run");
        assert!(!core.passed);
    }

    #[test]
    fn non_empty_submit_error_log_fails() {
        let dir = healthy_run_dir();
        fs::write(dir.path().join("logs/submit.err"), "job 7 rejected\n")
            .expect("submit log should write");
        let outcomes = run_probes(dir.path());
        let submit = outcomes
            .iter()
            .find(|outcome| outcome.name == "SUBMIT_LOG")
            .expect("submit probe should run");
        assert!(!submit.passed);
    }

    #[test]
    fn plot_probe_is_gated_by_the_settings_switch() {
        let dir = healthy_run_dir();
        // Disabled by default: passes without a qc directory.
        let outcomes = run_probes(dir.path());
        assert!(outcomes
            .iter()
            .find(|outcome| outcome.name == "QC_PLOTS")
            .expect("plot probe should run")
            .passed);

        // Enabled with no plots: fails.
        fs::write(dir.path().join(settings::SETTINGS_FILE), "qc_plots = yes\n")
            .expect("settings should write");
        let outcomes = run_probes(dir.path());
        assert!(!outcomes
            .iter()
            .find(|outcome| outcome.name == "QC_PLOTS")
            .expect("plot probe should run")
            .passed);

        // Enabled with a plot present: passes.
        fs::create_dir_all(dir.path().join("qc")).expect("qc dir should create");
        fs::write(dir.path().join("qc/coverage.png"), "png").expect("plot should write");
        let outcomes = run_probes(dir.path());
        assert!(outcomes
            .iter()
            .find(|outcome| outcome.name == "QC_PLOTS")
            .expect("plot probe should run")
            .passed);
    }
}
