//! File system operations for build trees

use kiln_errors::Error;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Recursively copy directory contents, entries in sorted order
///
/// Entries named `.git` are skipped; everything else is copied as-is.
pub fn copy_directory_recursive<'a>(
    src: &'a Path,
    dst: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), Error>> + Send + 'a>> {
    Box::pin(async move {
        fs::create_dir_all(dst).await?;

        for entry_path in sorted_entries(src).await? {
            let file_name = entry_path
                .file_name()
                .map(std::ffi::OsStr::to_owned)
                .unwrap_or_default();
            if file_name == ".git" {
                continue;
            }
            let dst_path = dst.join(&file_name);

            if entry_path.is_dir() {
                copy_directory_recursive(&entry_path, &dst_path).await?;
            } else {
                fs::copy(&entry_path, &dst_path)
                    .await
                    .map_err(|e| Error::io_with_path(&e, &entry_path))?;
            }
        }

        Ok(())
    })
}

/// Collect every file under `root`, as paths relative to `root`, in a
/// stable sorted order
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub async fn collect_files_sorted(root: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut out = Vec::new();
    walk(root, root, &mut out).await?;
    Ok(out)
}

fn walk<'a>(
    dir: &'a Path,
    root: &'a Path,
    out: &'a mut Vec<PathBuf>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), Error>> + Send + 'a>> {
    Box::pin(async move {
        for entry_path in sorted_entries(dir).await? {
            if entry_path.is_dir() {
                walk(&entry_path, root, out).await?;
            } else if let Ok(rel) = entry_path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
        Ok(())
    })
}

async fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

/// Remove a directory tree if it exists
///
/// # Errors
///
/// Returns an error if removal fails for a reason other than absence.
pub async fn remove_dir_if_exists(path: &Path) -> Result<(), Error> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_files_sorted_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::create_dir_all(dir.path().join("a/nested")).unwrap();
        std::fs::write(dir.path().join("b/two"), "2").unwrap();
        std::fs::write(dir.path().join("a/one"), "1").unwrap();
        std::fs::write(dir.path().join("a/nested/three"), "3").unwrap();

        let first = collect_files_sorted(dir.path()).await.unwrap();
        let second = collect_files_sorted(dir.path()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                PathBuf::from("a/nested/three"),
                PathBuf::from("a/one"),
                PathBuf::from("b/two"),
            ]
        );
    }

    #[tokio::test]
    async fn test_copy_directory_skips_git() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join(".git")).unwrap();
        std::fs::write(src.path().join(".git/HEAD"), "ref").unwrap();
        std::fs::write(src.path().join("keep.txt"), "x").unwrap();

        let dst_root = dst.path().join("out");
        copy_directory_recursive(src.path(), &dst_root)
            .await
            .unwrap();

        assert!(dst_root.join("keep.txt").exists());
        assert!(!dst_root.join(".git").exists());
    }
}
