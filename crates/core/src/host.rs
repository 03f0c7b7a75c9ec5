//! The note store that rendered notes are written into.
//!
//! [`NoteHost`] is the boundary between the pipeline and wherever notes live.
//! All paths crossing it are relative to the host's root. [`FsHost`] is the
//! filesystem implementation used by the CLI.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{Result, ShelfnoteError};

/// Operations the pipeline needs from a note store.
pub trait NoteHost: Send + Sync {
    /// Reads a whole file as UTF-8.
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;

    /// Every file in the store, recursively.
    fn list_files(&self) -> impl Future<Output = Result<Vec<PathBuf>>> + Send;

    /// Every folder in the store, recursively. The root itself is not listed.
    fn list_folders(&self) -> impl Future<Output = Result<Vec<PathBuf>>> + Send;

    /// Creates `path` with `contents`, never replacing an existing file.
    ///
    /// Fails with [`ShelfnoteError::FileExists`] if the file is already there
    /// and [`ShelfnoteError::FolderNotFound`] if its folder is missing.
    fn write_new_file(&self, path: &Path, contents: &str) -> impl Future<Output = Result<PathBuf>> + Send;

    /// Shows a short message to the user.
    fn notify(&self, message: &str);

    /// Shows a message about a failed operation. Defaults to [`NoteHost::notify`].
    fn notify_failure(&self, message: &str) {
        self.notify(message);
    }
}

/// A [`NoteHost`] over a directory on disk.
///
/// Hidden entries (names starting with `.`) are skipped when listing.
#[derive(Debug, Clone)]
pub struct FsHost {
    root: PathBuf,
}

impl FsHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a store-relative path, refusing absolute paths and `..`.
    fn resolve(&self, relative: &Path) -> Result<PathBuf> {
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(ShelfnoteError::InvalidInput(format!(
                "path must stay inside the vault: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Walks the tree below the root, returning relative (files, folders).
    async fn walk(&self) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut files = Vec::new();
        let mut folders = Vec::new();
        let mut pending = vec![PathBuf::new()];

        while let Some(relative) = pending.pop() {
            let mut entries = fs::read_dir(self.root.join(&relative)).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                let child = relative.join(&name);
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    folders.push(child.clone());
                    pending.push(child);
                } else if file_type.is_file() {
                    files.push(child);
                }
            }
        }

        files.sort();
        folders.sort();
        Ok((files, folders))
    }
}

impl NoteHost for FsHost {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let full = self.resolve(path)?;
        Ok(fs::read_to_string(full).await?)
    }

    async fn list_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.walk().await?.0)
    }

    async fn list_folders(&self) -> Result<Vec<PathBuf>> {
        Ok(self.walk().await?.1)
    }

    async fn write_new_file(&self, path: &Path, contents: &str) -> Result<PathBuf> {
        let full = self.resolve(path)?;
        let parent = full.parent().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
        if !fs::try_exists(&parent).await? {
            let folder = path.parent().map(Path::to_path_buf).unwrap_or_default();
            return Err(ShelfnoteError::FolderNotFound(folder));
        }

        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&full).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ShelfnoteError::FileExists(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %full.display(), bytes = contents.len(), "host.write");
        Ok(path.to_path_buf())
    }

    fn notify(&self, message: &str) {
        tracing::info!(notice = message, "host.notify");
    }

    fn notify_failure(&self, message: &str) {
        tracing::warn!(notice = message, "host.notify_failure");
    }
}
