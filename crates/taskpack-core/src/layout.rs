use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::models::{CoreError, CoreErrorKind, CoreResult};

pub const STRINGS_DIR: &str = "Strings";
pub const RESOURCES_DIR: &str = "resources.resjson";
pub const DEFAULT_CULTURE: &str = "en-US";
pub const RESOURCES_FILE_NAME: &str = "resources.resjson";
pub const TASK_LOC_FILE_NAME: &str = "task.loc.json";

const BUILD_ONLY_EXTENSIONS: &[&str] = &["csproj", "md"];

type CopyFuture<'a> = Pin<Box<dyn Future<Output = CoreResult<()>> + Send + 'a>>;

pub fn resources_path(root: &Path) -> PathBuf {
    root.join(STRINGS_DIR)
        .join(RESOURCES_DIR)
        .join(DEFAULT_CULTURE)
        .join(RESOURCES_FILE_NAME)
}

pub fn task_loc_path(root: &Path) -> PathBuf {
    root.join(TASK_LOC_FILE_NAME)
}

/// Project files and markdown docs never ship inside a packaged task.
pub fn is_build_only(file_name: &OsStr) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| BUILD_ONLY_EXTENSIONS.contains(&extension))
}

fn is_hidden(file_name: &OsStr) -> bool {
    file_name.to_string_lossy().starts_with('.')
}

/// Copies a task folder's top-level entries into `dest`, skipping hidden
/// entries and build-only files. Subdirectories are copied whole.
pub async fn copy_task_folder(src: &Path, dest: &Path) -> CoreResult<()> {
    copy_top_level(src, dest, |name| is_hidden(name) || is_build_only(name)).await
}

/// Copies the non-hidden entries of `src` into `dest`, merging with existing content.
pub async fn copy_dir_contents(src: &Path, dest: &Path) -> CoreResult<()> {
    copy_top_level(src, dest, is_hidden).await
}

async fn copy_top_level(src: &Path, dest: &Path, skip: fn(&OsStr) -> bool) -> CoreResult<()> {
    create_dir_all(dest).await?;

    let mut entries = tokio::fs::read_dir(src)
        .await
        .map_err(|error| CoreError::io(src, "read directory", error))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|error| CoreError::io(src, "read directory", error))?
    {
        let file_name = entry.file_name();
        if skip(&file_name) {
            continue;
        }
        copy_entry(&entry.path(), &dest.join(&file_name)).await?;
    }

    Ok(())
}

pub async fn copy_dir_into(src: &Path, dest_parent: &Path) -> CoreResult<PathBuf> {
    let name = src.file_name().ok_or_else(|| {
        CoreError::new(
            CoreErrorKind::Io,
            format!("cannot copy a path without a final component: {}", src.display()),
        )
    })?;
    let dest = dest_parent.join(name);
    copy_entry(src, &dest).await?;
    Ok(dest)
}

fn copy_dir_recursive<'a>(src: &'a Path, dest: &'a Path) -> CopyFuture<'a> {
    Box::pin(async move {
        create_dir_all(dest).await?;

        let mut entries = tokio::fs::read_dir(src)
            .await
            .map_err(|error| CoreError::io(src, "read directory", error))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|error| CoreError::io(src, "read directory", error))?
        {
            copy_entry(&entry.path(), &dest.join(entry.file_name())).await?;
        }

        Ok(())
    })
}

async fn copy_entry(src: &Path, dest: &Path) -> CoreResult<()> {
    let metadata = tokio::fs::symlink_metadata(src)
        .await
        .map_err(|error| CoreError::io(src, "stat", error))?;

    if metadata.file_type().is_symlink() {
        return copy_symlink(src, dest).await;
    }
    if metadata.is_dir() {
        return copy_dir_recursive(src, dest).await;
    }

    tokio::fs::copy(src, dest)
        .await
        .map_err(|error| CoreError::io(dest, "copy", error))?;
    Ok(())
}

// Recreates the link itself; the target is never followed.
#[cfg(unix)]
async fn copy_symlink(src: &Path, dest: &Path) -> CoreResult<()> {
    let target = tokio::fs::read_link(src)
        .await
        .map_err(|error| CoreError::io(src, "read link", error))?;

    if let Ok(existing) = tokio::fs::symlink_metadata(dest).await
        && !existing.is_dir()
    {
        tokio::fs::remove_file(dest)
            .await
            .map_err(|error| CoreError::io(dest, "replace", error))?;
    }

    tokio::fs::symlink(&target, dest)
        .await
        .map_err(|error| CoreError::io(dest, "link", error))
}

#[cfg(not(unix))]
async fn copy_symlink(src: &Path, _dest: &Path) -> CoreResult<()> {
    tracing::warn!(path = %src.display(), "skipping symbolic link");
    Ok(())
}

pub async fn create_dir_all(path: &Path) -> CoreResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|error| CoreError::io(path, "create", error))
}

pub async fn write_file(path: &Path, contents: &str) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|error| CoreError::io(path, "create", error))
}

pub async fn copy_file(src: &Path, dest: &Path) -> CoreResult<()> {
    if let Some(parent) = dest.parent() {
        create_dir_all(parent).await?;
    }
    tokio::fs::copy(src, dest)
        .await
        .map_err(|error| CoreError::io(dest, "copy", error))?;
    Ok(())
}

pub async fn move_file(src: &Path, dest: &Path) -> CoreResult<()> {
    if tokio::fs::rename(src, dest).await.is_ok() {
        return Ok(());
    }

    copy_file(src, dest).await?;
    tokio::fs::remove_file(src)
        .await
        .map_err(|error| CoreError::io(src, "remove", error))
}

pub async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
