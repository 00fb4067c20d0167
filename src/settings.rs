use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.ini";

static KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)\s*=\s*(.*?)\s*$").expect("key-value pattern should compile")
});

/// Query the run's INI-style settings file for a feature switch. Absent
/// file, absent key, and non-truthy values all read as disabled.
pub fn is_feature_enabled(key: &str, run_dir: &Path) -> bool {
    read_setting(key, run_dir)
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "yes" | "true" | "1"))
        .unwrap_or(false)
}

fn read_setting(key: &str, run_dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(run_dir.join(SETTINGS_FILE)).ok()?;
    let mut found = None;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', ';', '[']) {
            continue;
        }
        if let Some(captures) = KEY_VALUE.captures(line) {
            if &captures[1] == key {
                // Last occurrence wins, matching the fact-base policy.
                found = Some(captures[2].to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run_dir_with(content: &str) -> TempDir {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::write(dir.path().join(SETTINGS_FILE), content).expect("settings should write");
        dir
    }

    #[test]
    fn missing_settings_file_reads_as_disabled() {
        let dir = TempDir::new().expect("temp dir should be created");
        assert!(!is_feature_enabled("qc_plots", dir.path()));
    }

    #[test]
    fn truthy_values_enable_a_feature() {
        let dir = run_dir_with("qc_plots = yes\nkinship = TRUE\nbam_count=1\n");
        assert!(is_feature_enabled("qc_plots", dir.path()));
        assert!(is_feature_enabled("kinship", dir.path()));
        assert!(is_feature_enabled("bam_count", dir.path()));
    }

    #[test]
    fn sections_comments_and_unknown_keys_are_tolerated() {
        let dir = run_dir_with(
            "[pipeline]\n# generated by the scheduler\n; legacy comment\nqc_plots = no\n",
        );
        assert!(!is_feature_enabled("qc_plots", dir.path()));
        assert!(!is_feature_enabled("not_present", dir.path()));
    }

    #[test]
    fn last_occurrence_wins() {
        let dir = run_dir_with("qc_plots = no\nqc_plots = yes\n");
        assert!(is_feature_enabled("qc_plots", dir.path()));
    }
}
