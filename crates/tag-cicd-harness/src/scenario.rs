// crates/tag-cicd-harness/src/scenario.rs
// ============================================================================
// Module: Scenario Sequencing
// Description: Harness wiring and the per-scenario state machine.
// Purpose: Run reset, import, export, and compare in the only valid order.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Scenario`] walks `reset → imported → exported (×N) → compared`.
//! Creating one resets the tag store first; an out-of-order call returns
//! [`ScenarioOrderError`] without touching the gateway.
//!
//! Scenarios hold a process-wide lock for their whole lifetime because the
//! gateway tag store is shared global state. Creating a second scenario on
//! the same thread while one is alive blocks forever.
//!
//! Export names are relative to the shared mount. Reusing a name within a
//! scenario overwrites the earlier export.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde_json::Value;
use thiserror::Error;

use crate::config::HarnessConfig;
use crate::config::PathMapping;
use crate::equivalence::ComparisonFailure;
use crate::equivalence::EquivalenceChecker;
use crate::equivalence::LeafMode;
use crate::equivalence::Side;
use crate::equivalence::artifact_error;
use crate::error::HarnessError;
use crate::fixtures::FixtureLoader;
use crate::fixtures::load_fixture;
use crate::gateway::CollisionPolicy;
use crate::gateway::ExportMode;
use crate::gateway::ExportRequest;
use crate::gateway::GatewayClient;
use crate::gateway::ImportPayload;
use crate::gateway::ImportReport;
use crate::gateway::InlineExport;
use crate::logging::EventOutcome;
use crate::logging::HarnessEvent;
use crate::logging::HarnessLogSink;
use crate::logging::sink_from_config;
use crate::reset::ResetController;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag path addressing the provider root.
const ROOT_TAG_PATH: &str = "";

/// Exports a byte-identity check needs.
const MIN_IDENTICAL_FILES: usize = 2;

/// Serializes scenarios across the process.
static SCENARIO_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Scenario lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPhase {
    /// The tag store was just cleared.
    Reset,
    /// At least one import succeeded.
    Imported,
    /// `count` exports succeeded since the last import.
    Exported {
        /// Number of exports taken.
        count: usize,
    },
    /// A comparison ran.
    Compared {
        /// Whether it passed.
        passed: bool,
    },
}

/// Scenario operations subject to ordering rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioOperation {
    /// Import tags.
    Import,
    /// Export tags.
    Export,
    /// Compare artifacts.
    Compare,
}

impl ScenarioOperation {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
            Self::Compare => "compare",
        }
    }
}

impl ScenarioPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Imported => "imported",
            Self::Exported {
                ..
            } => "exported",
            Self::Compared {
                passed: true,
            } => "passed",
            Self::Compared {
                passed: false,
            } => "failed",
        }
    }

    /// Returns true when `operation` may run in this phase.
    ///
    /// Imports may repeat before the first export. Exports may repeat until a
    /// comparison runs. Further comparisons are allowed only after a passing
    /// one; a failed comparison ends the scenario.
    #[must_use]
    pub const fn allows(self, operation: ScenarioOperation) -> bool {
        matches!(
            (self, operation),
            (Self::Reset | Self::Imported, ScenarioOperation::Import)
                | (Self::Imported | Self::Exported { .. }, ScenarioOperation::Export)
                | (
                    Self::Exported { .. } | Self::Compared { passed: true },
                    ScenarioOperation::Compare
                )
        )
    }

    /// Returns the phase after `operation` succeeds, or after a comparison
    /// concludes with `passed`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioOrderError`] when the operation is not allowed.
    pub fn advance(
        self,
        operation: ScenarioOperation,
        passed: bool,
    ) -> Result<Self, ScenarioOrderError> {
        if !self.allows(operation) {
            return Err(ScenarioOrderError {
                operation,
                phase: self,
            });
        }
        Ok(match operation {
            ScenarioOperation::Import => Self::Imported,
            ScenarioOperation::Export => match self {
                Self::Exported {
                    count,
                } => Self::Exported {
                    count: count.saturating_add(1),
                },
                _ => Self::Exported {
                    count: 1,
                },
            },
            ScenarioOperation::Compare => Self::Compared {
                passed,
            },
        })
    }
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// An operation was invoked out of sequence. Indicates a defect in the
/// scenario, not in the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} is not allowed in phase {phase}", operation.as_str())]
pub struct ScenarioOrderError {
    /// Operation attempted.
    pub operation: ScenarioOperation,
    /// Phase the scenario was in.
    pub phase: ScenarioPhase,
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Wired harness components shared by every scenario of a run.
pub struct Harness {
    /// Effective configuration.
    config: HarnessConfig,
    /// Gateway client.
    client: Arc<GatewayClient>,
    /// Reset controller run at the start of each scenario.
    reset: ResetController,
    /// Fixture loader rooted at the configured fixture directory.
    fixtures: FixtureLoader,
    /// Equivalence checker writing to the configured debug directory.
    checker: EquivalenceChecker,
    /// Gateway/host export path mapping.
    paths: PathMapping,
    /// Event sink.
    sink: Arc<dyn HarnessLogSink>,
}

impl Harness {
    /// Builds a harness from `TAG_HARNESS_*` configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when configuration is invalid, the log sink
    /// cannot be opened, or the gateway client cannot be built.
    pub fn from_env() -> Result<Self, HarnessError> {
        let config = HarnessConfig::load()?;
        let sink = sink_from_config(&config)?;
        Self::from_config(config, sink)
    }

    /// Builds a harness from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when configuration is invalid or the gateway
    /// client cannot be built.
    pub fn from_config(
        config: HarnessConfig,
        sink: Arc<dyn HarnessLogSink>,
    ) -> Result<Self, HarnessError> {
        config.validate()?;
        let client = Arc::new(GatewayClient::new(&config, Arc::clone(&sink))?);
        let reset =
            ResetController::new(Arc::clone(&client), config.provider.clone(), Arc::clone(&sink));
        let fixtures = FixtureLoader::new(config.fixture_root.clone());
        let checker = EquivalenceChecker::new(config.debug_dir.clone(), Arc::clone(&sink));
        let paths = config.path_mapping();
        Ok(Self {
            config,
            client,
            reset,
            fixtures,
            checker,
            paths,
            sink,
        })
    }

    /// Replaces the reset controller.
    #[must_use]
    pub fn with_reset(mut self, reset: ResetController) -> Self {
        self.reset = reset;
        self
    }

    /// Returns the effective configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Returns the gateway client.
    #[must_use]
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Returns the fixture loader.
    #[must_use]
    pub const fn fixtures(&self) -> &FixtureLoader {
        &self.fixtures
    }

    /// Returns the export path mapping.
    #[must_use]
    pub const fn paths(&self) -> &PathMapping {
        &self.paths
    }

    /// Returns the reset controller.
    #[must_use]
    pub const fn reset_controller(&self) -> &ResetController {
        &self.reset
    }

    /// Starts a scenario: waits for any running scenario to finish, then
    /// resets the tag store.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Reset`] when the store cannot be cleared.
    pub fn scenario(&self, name: impl Into<String>) -> Result<Scenario<'_>, HarnessError> {
        let guard = SCENARIO_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let name = name.into();
        let scenario = Scenario {
            harness: self,
            checker: self.checker.with_scenario(name.clone()),
            name,
            phase: ScenarioPhase::Reset,
            exports: Vec::new(),
            _guard: guard,
        };
        self.reset.reset()?;
        scenario.log_phase(ScenarioPhase::Reset, None);
        Ok(scenario)
    }
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// One independent scenario against the live gateway.
pub struct Scenario<'a> {
    /// Owning harness.
    harness: &'a Harness,
    /// Checker labelled with this scenario.
    checker: EquivalenceChecker,
    /// Scenario label.
    name: String,
    /// Current phase.
    phase: ScenarioPhase,
    /// Host paths of exports taken, in order.
    exports: Vec<PathBuf>,
    /// Held for the scenario's lifetime.
    _guard: MutexGuard<'static, ()>,
}

impl Scenario<'_> {
    /// Returns the scenario label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> ScenarioPhase {
        self.phase
    }

    /// Returns the host paths of exports taken so far.
    #[must_use]
    pub fn exports(&self) -> &[PathBuf] {
        &self.exports
    }

    /// Imports a fixture's raw bytes at the provider root.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids importing, the fixture
    /// cannot be read, or the gateway rejects the import.
    pub fn import_fixture(
        &mut self,
        fixture: &Path,
        policy: CollisionPolicy,
    ) -> Result<ImportReport, HarnessError> {
        self.require(ScenarioOperation::Import)?;
        let bytes = self.harness.fixtures.load_bytes(fixture)?;
        self.import(ImportPayload::Bytes(&bytes), policy)
    }

    /// Imports a parsed document at the provider root.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids importing or the
    /// gateway rejects the import.
    pub fn import_document(
        &mut self,
        document: &Value,
        policy: CollisionPolicy,
    ) -> Result<ImportReport, HarnessError> {
        self.import(ImportPayload::Document(document), policy)
    }

    /// Imports raw bytes, which need not be valid JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids importing or the
    /// gateway rejects the import.
    pub fn import_bytes(
        &mut self,
        bytes: &[u8],
        policy: CollisionPolicy,
    ) -> Result<ImportReport, HarnessError> {
        self.import(ImportPayload::Bytes(bytes), policy)
    }

    /// Exports the provider to `name` as one JSON file and returns its host
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids exporting, `name` is not
    /// a plain relative path, or the gateway rejects the export.
    pub fn export_single_file(&mut self, name: &str) -> Result<PathBuf, HarnessError> {
        self.export_to(name, ExportMode::SingleFile)
    }

    /// Exports the provider to directory `name` as one file per object and
    /// returns the directory's host path.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids exporting, `name` is not
    /// a plain relative path, or the gateway rejects the export.
    pub fn export_individual_files(&mut self, name: &str) -> Result<PathBuf, HarnessError> {
        self.export_to(name, ExportMode::IndividualFiles)
    }

    /// Exports the provider to `name` in `mode` and returns the host path.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids exporting, `name` is not
    /// a plain relative path, or the gateway rejects the export.
    pub fn export_to(&mut self, name: &str, mode: ExportMode) -> Result<PathBuf, HarnessError> {
        self.require(ScenarioOperation::Export)?;
        let gateway_path = self.harness.paths.gateway_path(name)?;
        let host_path = self.harness.paths.host_path(name)?;
        let provider = self.harness.config.provider.as_str();
        let request = match mode {
            ExportMode::SingleFile => ExportRequest::single_file(provider, gateway_path),
            ExportMode::IndividualFiles | ExportMode::StructuredByType => ExportRequest {
                mode,
                ..ExportRequest::individual_files(provider, gateway_path)
            },
        };
        self.harness.client.export(&request)?;
        self.exports.push(host_path.clone());
        self.transition(ScenarioOperation::Export, true, Some(&host_path))?;
        Ok(host_path)
    }

    /// Exports the provider inline and returns the document.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids exporting or the
    /// gateway rejects the export.
    pub fn export_inline(&mut self) -> Result<Value, HarnessError> {
        self.require(ScenarioOperation::Export)?;
        let document = self.harness.client.export_inline_with(&self.inline_request())?;
        self.transition(ScenarioOperation::Export, true, None)?;
        Ok(document)
    }

    /// Reads the current tag store inline without changing phase. Used to
    /// confirm side effects (or their absence) around imports.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Gateway`] when the export fails.
    pub fn observe_tag_store(&self) -> Result<Value, HarnessError> {
        self.harness.client.export_inline_with(&self.inline_request()).map_err(HarnessError::from)
    }

    /// Compares the JSON file at `exported` with a freshly loaded fixture.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids comparing, the fixture
    /// cannot be loaded, or the documents differ.
    pub fn compare_with_fixture(&mut self, fixture: &Path, exported: &Path) -> Result<(), HarnessError> {
        self.require(ScenarioOperation::Compare)?;
        let expected = self.harness.fixtures.load(fixture)?;
        let verdict = self.checker.check_document_file(&expected, exported);
        self.conclude(verdict)
    }

    /// Compares two documents structurally.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids comparing or the
    /// documents differ.
    pub fn compare_documents(&mut self, expected: &Value, actual: &Value) -> Result<(), HarnessError> {
        self.require(ScenarioOperation::Compare)?;
        let verdict = self.checker.check_documents(expected, actual);
        self.conclude(verdict)
    }

    /// Requires every consecutive pair of `files` to be byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids comparing or any pair
    /// differs. Fewer than two files is
    /// [`ComparisonFailure::TooFewArtifacts`] and leaves the phase unchanged.
    pub fn compare_files_identical(&mut self, files: &[PathBuf]) -> Result<(), HarnessError> {
        self.require(ScenarioOperation::Compare)?;
        if files.len() < MIN_IDENTICAL_FILES {
            return Err(ComparisonFailure::TooFewArtifacts {
                required: MIN_IDENTICAL_FILES,
                found: files.len(),
            }
            .into());
        }
        let verdict = files
            .windows(2)
            .try_for_each(|pair| self.checker.check_files_identical(&pair[0], &pair[1]));
        self.conclude(verdict)
    }

    /// Compares two directory trees.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids comparing or the trees
    /// differ.
    pub fn compare_trees(
        &mut self,
        expected: &Path,
        actual: &Path,
        mode: LeafMode,
    ) -> Result<usize, HarnessError> {
        self.require(ScenarioOperation::Compare)?;
        let verdict = self.checker.check_trees(expected, actual, mode);
        let compared = verdict.as_ref().map_or(0, |count| *count);
        self.conclude(verdict.map(|_| ()))?;
        Ok(compared)
    }

    /// Compares a single-file export with an individual-files export.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the phase forbids comparing or the two
    /// representations hold different tags.
    pub fn compare_representations(
        &mut self,
        single_file: &Path,
        tree_root: &Path,
    ) -> Result<(), HarnessError> {
        self.require(ScenarioOperation::Compare)?;
        let verdict = load_fixture(single_file)
            .map_err(|err| artifact_error(err, Side::Expected))
            .and_then(|document| self.checker.check_representations(&document, tree_root));
        self.conclude(verdict)
    }

    /// Shared import path.
    fn import(
        &mut self,
        payload: ImportPayload<'_>,
        policy: CollisionPolicy,
    ) -> Result<ImportReport, HarnessError> {
        self.require(ScenarioOperation::Import)?;
        let report = self.harness.client.import(
            payload,
            policy,
            &self.harness.config.provider,
            ROOT_TAG_PATH,
        )?;
        self.transition(ScenarioOperation::Import, true, None)?;
        Ok(report)
    }

    /// Inline export scoped to the configured provider.
    fn inline_request(&self) -> InlineExport {
        InlineExport {
            provider: Some(self.harness.config.provider.clone()),
            ..InlineExport::recursive(true)
        }
    }

    /// Fails when `operation` is not allowed in the current phase.
    fn require(&self, operation: ScenarioOperation) -> Result<(), ScenarioOrderError> {
        if self.phase.allows(operation) {
            Ok(())
        } else {
            Err(ScenarioOrderError {
                operation,
                phase: self.phase,
            })
        }
    }

    /// Records a comparison verdict as the new phase.
    fn conclude(
        &mut self,
        verdict: Result<(), ComparisonFailure>,
    ) -> Result<(), HarnessError> {
        self.transition(ScenarioOperation::Compare, verdict.is_ok(), None)?;
        verdict.map_err(HarnessError::from)
    }

    /// Advances the phase and logs the change.
    fn transition(
        &mut self,
        operation: ScenarioOperation,
        passed: bool,
        path: Option<&Path>,
    ) -> Result<(), ScenarioOrderError> {
        self.phase = self.phase.advance(operation, passed)?;
        self.log_phase(self.phase, path);
        Ok(())
    }

    /// Records a `scenario_phase` event.
    fn log_phase(&self, phase: ScenarioPhase, path: Option<&Path>) {
        let outcome = if matches!(
            phase,
            ScenarioPhase::Compared {
                passed: false
            }
        ) {
            EventOutcome::Error
        } else {
            EventOutcome::Ok
        };
        let mut event =
            HarnessEvent::new("scenario_phase", outcome).scenario(self.name.as_str()).operation(phase.as_str());
        if let Some(path) = path {
            event = event.path(path.display().to_string());
        }
        self.harness.sink.record(&event);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
