//! Recursive Path Adder
//!
//! Walks a file or directory tree and stores it through a [`DagStore`].
//! Files are streamed with `add`; directories are materialized with
//! `dag/put` once every child has been stored, then sized with
//! `object/stat`. The walk is sequential and stops at the first failure.

use crate::cancel::Cancellation;
use crate::error::ApiError;
use crate::gateway::{AddResult, DagStore};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, trace};
use walkdir::{DirEntry, WalkDir};

/// The two kinds of entry the adder knows how to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Anything that is not a directory is opened and stored as a file.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// Receives one event per stored file or directory, children first.
pub trait AddedSink: Send + Sync {
    fn added(&self, name: &str, result: &AddResult);
}

/// Writes `added <hash> <name>` lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintSink;

impl AddedSink for PrintSink {
    fn added(&self, name: &str, result: &AddResult) {
        println!("added {} {}", result.hash, name);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, AddResult)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, AddResult)> {
        self.events.lock().clone()
    }

    /// Names in emission order.
    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl AddedSink for RecordingSink {
    fn added(&self, name: &str, result: &AddResult) {
        self.events.lock().push((name.to_string(), result.clone()));
    }
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub kind: EntryKind,
    pub path: PathBuf,
}

impl From<DirEntry> for ListedEntry {
    fn from(entry: DirEntry) -> Self {
        Self {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: EntryKind::from_file_type(entry.file_type()),
            path: entry.into_path(),
        }
    }
}

/// Lists the immediate children of a directory. The adder links children in
/// exactly the order returned.
pub trait DirLister: Send + Sync {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>>;
}

/// Native, unsorted listing via `walkdir`. Symlinks are not followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkDirLister;

impl DirLister for WalkDirLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .map(|entry| entry.map(ListedEntry::from).map_err(io::Error::from))
            .collect()
    }
}

/// Stores local paths through a [`DagStore`].
pub struct PathAdder<S> {
    store: S,
    handle_hidden_files: bool,
    sink: Arc<dyn AddedSink>,
    lister: Arc<dyn DirLister>,
}

impl<S: DagStore> PathAdder<S> {
    /// Adder that prints `added` lines to stdout.
    pub fn new(store: S, handle_hidden_files: bool) -> Self {
        Self::with_sink(store, handle_hidden_files, Arc::new(PrintSink))
    }

    pub fn with_sink(store: S, handle_hidden_files: bool, sink: Arc<dyn AddedSink>) -> Self {
        Self {
            store,
            handle_hidden_files,
            sink,
            lister: Arc::new(WalkDirLister),
        }
    }

    /// Replace the directory lister.
    pub fn with_lister(mut self, lister: Arc<dyn DirLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn handle_hidden_files(&self) -> bool {
        self.handle_hidden_files
    }

    /// Add the file or directory at `path`.
    ///
    /// `"."` resolves to the canonical current directory. The top-level name
    /// is the final component of the cleaned path.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn add_path(&self, path: &Path, cancel: &Cancellation) -> Result<(), ApiError> {
        let mut path = clean_path(path);
        if path == Path::new(".") {
            path = dunce::canonicalize(&path)?;
        }

        let metadata = tokio::fs::symlink_metadata(&path).await?;
        let kind = EntryKind::from_file_type(metadata.file_type());
        let name = entry_name(&path);
        debug!(name = %name, kind = ?kind, "Adding path");

        self.add(kind, name, path, cancel).await?;
        Ok(())
    }

    /// Store one entry, recursing into directories.
    ///
    /// `name` is the path relative to the top-level entry and is what the
    /// sink receives.
    pub fn add<'a>(
        &'a self,
        kind: EntryKind,
        name: String,
        path: PathBuf,
        cancel: &'a Cancellation,
    ) -> BoxFuture<'a, Result<AddResult, ApiError>> {
        Box::pin(async move {
            match kind {
                EntryKind::File => self.add_file(&name, &path, cancel).await,
                EntryKind::Directory => self.add_dir(&name, &path, cancel).await,
            }
        })
    }

    async fn add_file(
        &self,
        name: &str,
        path: &Path,
        cancel: &Cancellation,
    ) -> Result<AddResult, ApiError> {
        let file = tokio::fs::File::open(path).await?;
        trace!(name, "Uploading file");

        // The reader is consumed by the upload and dropped with it.
        let result = self.store.add(Box::new(file), cancel).await?;
        self.sink.added(name, &result);
        Ok(result)
    }

    async fn add_dir(
        &self,
        name: &str,
        path: &Path,
        cancel: &Cancellation,
    ) -> Result<AddResult, ApiError> {
        let entries = self.lister.list(path)?;
        let mut links = Vec::with_capacity(entries.len());

        for entry in entries {
            if !self.handle_hidden_files && is_hidden(&entry.name) {
                trace!(name = %entry.name, "Skipping hidden entry");
                continue;
            }

            let child_name = Path::new(name).join(&entry.name).to_string_lossy().into_owned();
            let result = self.add(entry.kind, child_name, entry.path, cancel).await?;
            links.push(result.to_link(entry.name));
        }

        let cid = self.store.dag_put_links(&links, cancel).await?;
        let stat = self.store.object_stat(cid.as_str(), cancel).await?;
        debug!(name, cid = %cid, links = links.len(), size = stat.cumulative_size, "Stored directory");

        let result = AddResult {
            hash: cid.to_string(),
            size: stat.cumulative_size,
        };
        self.sink.added(name, &result);
        Ok(result)
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// Lexically clean a path: drop `.` components, collapse separators and
/// resolve `..` against a preceding normal component. Never touches the
/// filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}
