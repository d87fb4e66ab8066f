//! Writing edited canvases back to component source files.
//!
//! Saves are serialized per target path so two canvases editing the same
//! file cannot interleave read-modify-write cycles. A missing target gets a
//! freshly scaffolded component file; an existing one is merged — either
//! deterministically (replace the return expression, refresh imports) or
//! through a pluggable snapshot-merge backend. Writes go through a temp
//! file in the target directory and a rename, so a crash never leaves a
//! half-written component behind.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use weft_core::emitter::{
    collect_component_names, generate, generate_component_file, generate_imports,
    unresolved_components,
};
use weft_core::error::{MergeError, SnapshotMergeError};
use weft_core::merge::{MergeOptions, SnapshotMerge, SnapshotMergeRequest, merge_into_existing_file};
use weft_core::model::{ComponentIndex, Element};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Assistant(#[from] SnapshotMergeError),
}

/// How existing files get their edits merged in.
pub enum MergeBackend {
    /// Pure textual merge: replace the return expression, refresh imports.
    Deterministic,
    /// Delegate the merge to an external assistant.
    Assistant(Arc<dyn SnapshotMerge>),
}

/// What a save did to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file did not exist and was scaffolded from scratch.
    Created,
    /// The file existed and the edits were merged in.
    Merged,
}

/// The result of a successful save. Unresolved component references are not
/// errors — the write went through without their imports — but the caller
/// gets the names back to surface them.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    /// Components on the canvas the index does not know, sorted.
    pub unresolved: Vec<String>,
}

pub struct SaveRequest {
    /// Project-relative path of the target file.
    pub path: String,
    /// Export name used when scaffolding a new file.
    pub component_name: String,
    pub elements: Vec<Element>,
    /// Runtime bindings the assistant backend may need to preserve.
    pub mock_bindings: serde_json::Map<String, serde_json::Value>,
}

pub struct SaveController {
    project_root: PathBuf,
    index: ComponentIndex,
    backend: MergeBackend,
    /// One lock per target path; saves to different files proceed freely.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl SaveController {
    pub fn new(project_root: impl Into<PathBuf>, index: ComponentIndex, backend: MergeBackend) -> Self {
        Self {
            project_root: project_root.into(),
            index,
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn save(&self, request: &SaveRequest) -> Result<SaveReport, SaveError> {
        let target = self.project_root.join(&request.path);
        let lock = self.lock_for(&target).await;
        let _guard = lock.lock().await;

        let unresolved = unresolved_components(&request.elements, &self.index);
        for name in &unresolved {
            log::warn!("saving {} with unresolved component `{name}`", request.path);
        }

        if !tokio::fs::try_exists(&target).await? {
            let contents = generate_component_file(
                &request.component_name,
                &request.elements,
                &self.index,
                Some(&request.path),
            );
            self.write_atomic(&target, &contents).await?;
            log::info!("scaffolded {}", request.path);
            return Ok(SaveReport { outcome: SaveOutcome::Created, unresolved });
        }

        let source = tokio::fs::read_to_string(&target).await?;
        let merged = match &self.backend {
            MergeBackend::Deterministic => merge_into_existing_file(&MergeOptions {
                source: &source,
                path: &request.path,
                elements: &request.elements,
                index: &self.index,
            })?,
            MergeBackend::Assistant(assistant) => {
                let names = collect_component_names(&request.elements);
                let merge_request = SnapshotMergeRequest {
                    original_source: source,
                    rendered_snapshot: generate(&request.elements, 0),
                    file_path: request.path.clone(),
                    component_imports: generate_imports(&names, &self.index, Some(&request.path)),
                    mock_bindings: request.mock_bindings.clone(),
                };
                assistant.merge(&merge_request).await?
            }
        };
        self.write_atomic(&target, &merged).await?;
        log::info!("saved {}", request.path);
        Ok(SaveReport { outcome: SaveOutcome::Merged, unresolved })
    }

    async fn lock_for(&self, target: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(target.to_path_buf()).or_default())
    }

    /// Temp file in the target's directory, then rename over the target.
    async fn write_atomic(&self, target: &Path, contents: &str) -> Result<(), SaveError> {
        let dir = target.parent().unwrap_or(Path::new("."));
        tokio::fs::create_dir_all(dir).await?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(target).map_err(|e| SaveError::Io(e.error))?;
        Ok(())
    }
}
