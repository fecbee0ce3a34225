use std::fs;
use std::path::Path;

use filetime::FileTime;

use crate::error::{ErrorContext, Result};

/// Copy one file, creating destination parents and carrying the source
/// modification time over to the copy.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_io_context(|| format!("creating directory {}", parent.display()))?;
    }

    fs::copy(src, dst)
        .with_io_context(|| format!("copying {} to {}", src.display(), dst.display()))?;

    let metadata = fs::metadata(src)
        .with_io_context(|| format!("reading metadata of {}", src.display()))?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dst, mtime)
        .with_io_context(|| format!("setting modification time on {}", dst.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_content_into_new_parent_dirs() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("deep/nested/dst.txt");
        fs::write(&src, b"payload").unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn preserves_modification_time() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        fs::write(&src, b"x").unwrap();
        filetime::set_file_mtime(&src, FileTime::from_unix_time(1_500_000_000, 0)).unwrap();

        copy_file(&src, &dst).unwrap();

        let copied = FileTime::from_last_modification_time(&fs::metadata(&dst).unwrap());
        assert_eq!(copied.unix_seconds(), 1_500_000_000);
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = copy_file(&tmp.path().join("nope"), &tmp.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("copying"));
    }
}
