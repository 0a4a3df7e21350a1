// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Scenario Reports
// Description: Per-test artifact directory and run summary.
// Purpose: Leave a JCS summary and any captured exports behind every test.
// Dependencies: system-tests, serde, serde_jcs
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Canonical JSON summary file.
const SUMMARY_JSON: &str = "summary.json";
/// Human-readable summary file.
const SUMMARY_MARKDOWN: &str = "summary.md";

/// Outcome of one round-trip test.
#[derive(Debug, Serialize)]
struct ScenarioSummary<'a> {
    test_name: &'a str,
    status: &'a str,
    duration_ms: u128,
    notes: &'a [String],
    artifacts: &'a [String],
}

impl ScenarioSummary<'_> {
    fn markdown(&self) -> String {
        let mut out = format!(
            "# {}\n\n- Status: {}\n- Duration (ms): {}\n",
            self.test_name, self.status, self.duration_ms
        );
        for (heading, lines) in [("Notes", self.notes), ("Artifacts", self.artifacts)] {
            let _ = write!(out, "\n## {heading}\n\n");
            for line in lines {
                let _ = writeln!(out, "- {line}");
            }
        }
        out
    }
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Writes a test's artifacts and, on finish or drop, its summary.
pub struct TestReporter {
    dir: PathBuf,
    test_name: String,
    started_at_ms: u128,
    finished: bool,
}

impl TestReporter {
    /// Creates the artifact directory for `test_name`. Without a configured
    /// run root each run gets a fresh `target/system-tests/run_<ms>` root.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(|err| io::Error::other(err.to_string()))?;
        let started_at_ms = now_millis();
        let run_root = config
            .run_root
            .unwrap_or_else(|| PathBuf::from("target/system-tests").join(format!("run_{started_at_ms}")));
        let dir = run_root.join(test_name);
        if !config.allow_overwrite && fs::read_dir(&dir).is_ok_and(|mut entries| entries.next().is_some()) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("artifact directory {} is not empty", dir.display()),
            ));
        }
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            test_name: test_name.to_string(),
            started_at_ms,
            finished: false,
        })
    }

    /// Writes `value` as canonical JSON.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        let path = self.dir.join(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes `value` verbatim.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, value)?;
        Ok(path)
    }

    /// Writes the summary for the test.
    pub fn finish(&mut self, status: &str, notes: Vec<String>, artifacts: Vec<String>) -> io::Result<()> {
        let summary = ScenarioSummary {
            test_name: &self.test_name,
            status,
            duration_ms: now_millis().saturating_sub(self.started_at_ms),
            notes: &notes,
            artifacts: &artifacts,
        };
        self.write_json(SUMMARY_JSON, &summary)?;
        self.write_text(SUMMARY_MARKDOWN, &summary.markdown())?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.finished {
            let status = if std::thread::panicking() { "panic" } else { "fail" };
            let _ = self.finish(status, vec!["ended before the scenario finished".to_string()], Vec::new());
        }
    }
}
