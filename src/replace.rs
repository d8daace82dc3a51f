//! Scratch files and the size-gated replace step.
//!
//! Every candidate is encoded into a hidden scratch file next to the
//! original, named `.resize-XXXXXX.<ext>` so the codec still sees the right
//! suffix. [`safe_replace`] then either renames the scratch file over the
//! original or throws it away:
//!
//! ```text
//! savings >= 0 || force   →  rename scratch over source   (Committed)
//! otherwise               →  delete scratch, source as-is (Discarded)
//! ```
//!
//! The rename happens within one directory, so it is an atomic
//! replace-existing on both Unix (`rename(2)`) and Windows
//! (`MoveFileExW` with `MOVEFILE_REPLACE_EXISTING`): there is no window in
//! which the original is missing. Scratch files are [`TempPath`]s and delete
//! themselves on drop, so no exit path leaks one.

use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempPath;

const SCRATCH_PREFIX: &str = ".resize-";

/// What [`safe_replace`] did with the scratch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The scratch file now sits at the source path.
    Committed,
    /// The scratch file was deleted; the source is untouched.
    Discarded,
}

/// Create an empty scratch file beside `source`, keeping its suffix.
pub fn scratch_for(source: &Path) -> io::Result<TempPath> {
    let dir = source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let suffix = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

/// Commit `scratch` over `source` when it saved space or `force` is set.
///
/// On commit the source's permissions are copied to the scratch file first,
/// so the replaced file keeps its mode. On discard, `source` is not opened.
pub fn safe_replace(
    source: &Path,
    scratch: TempPath,
    savings: i64,
    force: bool,
) -> io::Result<Replacement> {
    if savings < 0 && !force {
        scratch.close()?;
        return Ok(Replacement::Discarded);
    }

    let permissions = fs::metadata(source)?.permissions();
    fs::set_permissions(&scratch, permissions)?;
    scratch.persist(source).map_err(|e| e.error)?;
    Ok(Replacement::Committed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn scratch_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(SCRATCH_PREFIX)
            })
            .collect()
    }

    fn setup(source_bytes: &[u8], scratch_bytes: &[u8]) -> (TempDir, PathBuf, TempPath) {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        fs::write(&source, source_bytes).unwrap();
        let scratch = scratch_for(&source).unwrap();
        fs::write(&scratch, scratch_bytes).unwrap();
        (tmp, source, scratch)
    }

    #[test]
    fn scratch_is_hidden_sibling_with_same_suffix() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("IMG_0001.JPEG");

        let scratch = scratch_for(&source).unwrap();
        assert_eq!(scratch.parent(), Some(tmp.path()));
        let name = scratch.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".resize-"));
        assert!(name.ends_with(".JPEG"));
    }

    #[test]
    fn scratch_deleted_on_drop() {
        let tmp = TempDir::new().unwrap();
        let scratch = scratch_for(&tmp.path().join("a.png")).unwrap();
        let path = scratch.to_path_buf();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn positive_savings_commits() {
        let (tmp, source, scratch) = setup(b"original-bytes", b"small");

        let result = safe_replace(&source, scratch, 9, false).unwrap();

        assert_eq!(result, Replacement::Committed);
        assert_eq!(fs::read(&source).unwrap(), b"small");
        assert!(scratch_files(tmp.path()).is_empty());
    }

    #[test]
    fn zero_savings_commits() {
        let (_tmp, source, scratch) = setup(b"same", b"same");
        assert_eq!(
            safe_replace(&source, scratch, 0, false).unwrap(),
            Replacement::Committed
        );
    }

    #[test]
    fn negative_savings_leaves_source_identical() {
        let (tmp, source, scratch) = setup(b"original", b"a much larger re-encode");
        let before = fs::read(&source).unwrap();

        let result = safe_replace(&source, scratch, -15, false).unwrap();

        assert_eq!(result, Replacement::Discarded);
        assert_eq!(fs::read(&source).unwrap(), before);
        assert!(scratch_files(tmp.path()).is_empty());
    }

    #[test]
    fn force_commits_negative_savings() {
        let (tmp, source, scratch) = setup(b"original", b"a much larger re-encode");

        let result = safe_replace(&source, scratch, -15, true).unwrap();

        assert_eq!(result, Replacement::Committed);
        assert_eq!(fs::read(&source).unwrap(), b"a much larger re-encode");
        assert!(scratch_files(tmp.path()).is_empty());
    }

    #[test]
    fn missing_source_fails_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("gone.png");
        let scratch = scratch_for(&source).unwrap();

        assert!(safe_replace(&source, scratch, 5, false).is_err());
        assert!(scratch_files(tmp.path()).is_empty());
        assert!(!source.exists());
    }

    #[cfg(unix)]
    #[test]
    fn commit_keeps_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, source, scratch) = setup(b"original", b"new");
        fs::set_permissions(&source, fs::Permissions::from_mode(0o644)).unwrap();

        safe_replace(&source, scratch, 3, false).unwrap();

        let mode = fs::metadata(&source).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
