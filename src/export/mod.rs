//! The export pipeline: locate the container layer, enumerate its
//! candidates, render each one to its own file.
//!
//! A single linear pass with no retries and no concurrency - one
//! renderer process at a time, each awaited to completion.

mod render;
mod scan;

pub use render::{InkscapeRenderer, Renderer};
pub use scan::{
    Candidate, Container, ScanError, THUMBS_LABEL, enumerate_candidates, locate_container,
};

use crate::document::SvgDocument;
use crate::logger::ProgressCounter;
use crate::utils::exec::ExecError;
use crate::{debug, log};
use std::path::{Path, PathBuf};
use std::{env, fs, io};
use thiserror::Error;

/// Failure of an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to create output directory `{path}`")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write document snapshot `{path}`")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The renderer invocation for one group failed. Aborts the run
    /// unless keep-going mode is active.
    #[error("export of group `{id}` failed")]
    Render {
        id: String,
        #[source]
        source: ExecError,
    },

    /// Keep-going summary: some groups exported, some did not.
    #[error("{failed} of {total} group exports failed")]
    Incomplete { failed: usize, total: usize },
}

/// Settings for one export run.
pub struct ExportOptions {
    /// Directory all artifacts are written into. Created if absent.
    pub output_dir: PathBuf,
    /// Fixed path the document is serialized to for the renderer.
    pub snapshot_path: PathBuf,
    /// Attempt remaining candidates after a failure instead of aborting.
    pub keep_going: bool,
}

impl ExportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            snapshot_path: env::temp_dir().join("thumbex-snapshot.svg"),
            keep_going: false,
        }
    }

    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }
}

/// What an export run did.
#[derive(Debug)]
pub enum ExportOutcome {
    /// No layer carries the sentinel label; nothing was written, not even
    /// the output directory.
    ContainerNotFound,
    /// Every candidate was exported.
    Complete { artifacts: Vec<PathBuf> },
}

/// Run the pipeline: locate, enumerate, export each candidate in order.
///
/// The output directory is created and the document snapshotted only
/// after the container is found, so a document without one causes no
/// filesystem mutation. By default the first render failure aborts the
/// run (artifacts already written stay on disk); with
/// [`ExportOptions::keep_going`] every candidate is attempted and the
/// run ends with [`ExportError::Incomplete`] if any failed.
pub fn run_export(
    doc: &SvgDocument,
    renderer: &dyn Renderer,
    opts: &ExportOptions,
) -> Result<ExportOutcome, ExportError> {
    let Some(container) = locate_container(doc.data())? else {
        return Ok(ExportOutcome::ContainerNotFound);
    };
    debug!("export"; "container layer located (id: {})", container.id().unwrap_or("<none>"));

    let candidates: Vec<Candidate> = enumerate_candidates(&container).collect();
    debug!("export"; "{} of {} children qualify", candidates.len(), container.child_count());

    fs::create_dir_all(&opts.output_dir).map_err(|source| ExportError::OutputDir {
        path: opts.output_dir.clone(),
        source,
    })?;

    // One snapshot per run: nothing mutates the document between
    // candidates, so every invocation can read the same file
    doc.snapshot_to(&opts.snapshot_path)
        .map_err(|source| ExportError::Snapshot {
            path: opts.snapshot_path.clone(),
            source,
        })?;

    let base_name = doc.base_name();
    let progress =
        (!candidates.is_empty()).then(|| ProgressCounter::new("thumbs", candidates.len()));

    let mut artifacts = Vec::with_capacity(candidates.len());
    let mut failed = 0usize;

    for candidate in &candidates {
        match export_candidate(candidate, &base_name, renderer, opts) {
            Ok(path) => {
                log!("export"; "{}", path.display());
                artifacts.push(path);
            }
            Err(err) if opts.keep_going => {
                failed += 1;
                log!("error"; "{:#}", anyhow::Error::new(err));
            }
            Err(err) => return Err(err),
        }
        if let Some(progress) = &progress {
            progress.inc();
        }
    }

    if let Some(progress) = progress {
        progress.finish();
    }

    if failed > 0 {
        return Err(ExportError::Incomplete {
            failed,
            total: candidates.len(),
        });
    }

    Ok(ExportOutcome::Complete { artifacts })
}

/// Export a single candidate; returns the artifact path on success.
///
/// The artifact name is fully determined by the document base name and
/// the candidate id, so re-running an unchanged document overwrites the
/// same files.
pub fn export_candidate(
    candidate: &Candidate,
    base_name: &str,
    renderer: &dyn Renderer,
    opts: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let output = artifact_path(&opts.output_dir, base_name, &candidate.id);
    renderer
        .render(&opts.snapshot_path, &candidate.id, &output)
        .map_err(|source| ExportError::Render {
            id: candidate.id.clone(),
            source,
        })?;
    Ok(output)
}

/// `{output_dir}/{base_name}_{group_id}.svg`
fn artifact_path(output_dir: &Path, base_name: &str, group_id: &str) -> PathBuf {
    output_dir.join(format!("{base_name}_{group_id}.svg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const DOC: &str = r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
        <g inkscape:groupmode="layer" inkscape:label="_thumbs" id="layer2">
            <g id="wheelA"><circle r="4"/></g>
            <g id="wheelB"><circle r="2"/></g>
            <text id="ignore">caption</text>
        </g>
    </svg>"#;

    const NO_CONTAINER: &str = r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
        <g inkscape:groupmode="layer" inkscape:label="artwork" id="layer1"/>
    </svg>"#;

    /// Renderer fake: writes a marker file per invocation, optionally
    /// failing for a chosen set of ids.
    struct FakeRenderer {
        fail_ids: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRenderer {
        fn new() -> Self {
            Self {
                fail_ids: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(ids: &[&str]) -> Self {
            Self {
                fail_ids: ids.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Renderer for FakeRenderer {
        fn render(
            &self,
            snapshot: &Path,
            export_id: &str,
            output: &Path,
        ) -> Result<(), ExecError> {
            self.calls.lock().unwrap().push(export_id.to_string());
            assert!(snapshot.exists(), "snapshot must exist before rendering");
            if self.fail_ids.contains(export_id) {
                return Err(ExecError::Failed {
                    program: "inkscape".into(),
                    status: "exit status: 1".into(),
                    detail: String::new(),
                });
            }
            fs::write(output, format!("rendered {export_id}")).unwrap();
            Ok(())
        }
    }

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions::new(dir.join("thumbs")).snapshot_path(dir.join("snapshot.svg"))
    }

    fn run(doc_body: &str, renderer: &FakeRenderer, opts: &ExportOptions) -> Result<ExportOutcome, ExportError> {
        let doc = SvgDocument::new("design.svg", doc_body.as_bytes().to_vec());
        run_export(&doc, renderer, opts)
    }

    #[test]
    fn test_one_artifact_per_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::new();
        let opts = options(dir.path());

        let outcome = run(DOC, &renderer, &opts).unwrap();
        let ExportOutcome::Complete { artifacts } = outcome else {
            panic!("expected Complete");
        };

        assert_eq!(
            artifacts,
            [
                opts.output_dir.join("design_wheelA.svg"),
                opts.output_dir.join("design_wheelB.svg"),
            ]
        );
        assert!(opts.output_dir.join("design_wheelA.svg").exists());
        assert!(opts.output_dir.join("design_wheelB.svg").exists());
        // The non-group child produced nothing
        assert_eq!(renderer.calls(), ["wheelA", "wheelB"]);
    }

    #[test]
    fn test_container_not_found_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::new();
        let opts = options(dir.path());

        let outcome = run(NO_CONTAINER, &renderer, &opts).unwrap();
        assert!(matches!(outcome, ExportOutcome::ContainerNotFound));
        assert!(!opts.output_dir.exists());
        assert!(!opts.snapshot_path.exists());
        assert!(renderer.calls().is_empty());
    }

    #[test]
    fn test_output_directory_created_before_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        assert!(!opts.output_dir.exists());

        run(DOC, &FakeRenderer::new(), &opts).unwrap();
        assert!(opts.output_dir.is_dir());
    }

    #[test]
    fn test_failure_aborts_remaining_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::failing(&["wheelB"]);
        let opts = options(dir.path());

        let err = run(DOC, &renderer, &opts).unwrap_err();
        match err {
            ExportError::Render { id, .. } => assert_eq!(id, "wheelB"),
            other => panic!("expected Render, got {other:?}"),
        }
        // wheelA was already produced and stays on disk
        assert!(opts.output_dir.join("design_wheelA.svg").exists());
        assert!(!opts.output_dir.join("design_wheelB.svg").exists());
        assert_eq!(renderer.calls(), ["wheelA", "wheelB"]);
    }

    #[test]
    fn test_keep_going_attempts_every_candidate() {
        let doc = r#"<svg><g inkscape:groupmode="layer" inkscape:label="_thumbs">
            <g id="a"/><g id="b"/><g id="c"/>
        </g></svg>"#;
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::failing(&["b"]);
        let opts = options(dir.path()).keep_going(true);

        let err = run(doc, &renderer, &opts).unwrap_err();
        match err {
            ExportError::Incomplete { failed, total } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
        assert_eq!(renderer.calls(), ["a", "b", "c"]);
        assert!(opts.output_dir.join("design_a.svg").exists());
        assert!(opts.output_dir.join("design_c.svg").exists());
    }

    #[test]
    fn test_rerun_overwrites_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::new();
        let opts = options(dir.path());

        run(DOC, &renderer, &opts).unwrap();
        let first = fs::read(opts.output_dir.join("design_wheelA.svg")).unwrap();
        run(DOC, &renderer, &opts).unwrap();
        let second = fs::read(opts.output_dir.join("design_wheelA.svg")).unwrap();

        assert_eq!(first, second);
        // No accumulation: exactly the two artifacts exist
        assert_eq!(fs::read_dir(&opts.output_dir).unwrap().count(), 2);
    }

    #[test]
    fn test_empty_layer_completes_with_no_artifacts() {
        let doc = r#"<svg><g inkscape:groupmode="layer" inkscape:label="_thumbs"/></svg>"#;
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());

        let outcome = run(doc, &FakeRenderer::new(), &opts).unwrap();
        let ExportOutcome::Complete { artifacts } = outcome else {
            panic!("expected Complete");
        };
        assert!(artifacts.is_empty());
        // Directory creation is still performed once the layer is found
        assert!(opts.output_dir.is_dir());
    }

    #[test]
    fn test_error_names_failing_group() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FakeRenderer::failing(&["wheelB"]);
        let opts = options(dir.path());

        let err = run(DOC, &renderer, &opts).unwrap_err();
        assert!(err.to_string().contains("wheelB"));
    }
}
