// crates/clipsqueeze-media/src/stage.rs
//
// Staging copy: the picked file is copied into the staging directory before
// anything reads it, so the export never holds a handle on the user's file
// and the output lands next to a path we own.
//
// Copies are named `clipsqueeze_<random>.<ext>` and persisted; nothing
// cleans them up.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Copy `source` into `staging_dir`. Returns the copy's path.
pub fn stage_copy(source: &Path, staging_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(staging_dir)
        .with_context(|| format!("create staging dir '{}'", staging_dir.display()))?;

    let suffix = staged_suffix(source);
    let mut tmp = tempfile::Builder::new()
        .prefix("clipsqueeze_")
        .suffix(&suffix)
        .tempfile_in(staging_dir)
        .with_context(|| format!("create staging file in '{}'", staging_dir.display()))?;

    let mut src = std::fs::File::open(source)
        .with_context(|| format!("open '{}'", source.display()))?;
    let bytes = std::io::copy(&mut src, tmp.as_file_mut())
        .with_context(|| format!("copy '{}'", source.display()))?;
    tmp.as_file().sync_all().context("flush staged copy")?;

    let (_, path) = tmp.keep().context("persist staged copy")?;
    log::info!("[stage] {} → {} ({bytes} bytes)", source.display(), path.display());
    Ok(path)
}

/// `.ext` of the source, lowercased, or `.mov` when it has none.
fn staged_suffix(source: &Path) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("mov");
    format!(".{}", ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_into_staging_dir() {
        let src_dir = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("Holiday.MOV");
        std::fs::write(&src, b"not really a movie").unwrap();

        let staged = stage_copy(&src, staging.path()).unwrap();
        assert_eq!(staged.parent(), Some(staging.path()));
        let name = staged.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("clipsqueeze_"), "{name}");
        assert!(name.ends_with(".mov"), "{name}");
        assert_eq!(std::fs::read(&staged).unwrap(), b"not really a movie");
        // Source untouched.
        assert!(src.exists());
    }

    #[test]
    fn creates_missing_staging_dir() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("a.mp4");
        std::fs::write(&src, b"x").unwrap();
        let staging = root.path().join("deep").join("stage");

        let staged = stage_copy(&src, &staging).unwrap();
        assert!(staged.starts_with(&staging));
    }

    #[test]
    fn missing_source_is_an_error() {
        let staging = tempfile::tempdir().unwrap();
        let err = stage_copy(Path::new("/definitely/not/here.mov"), staging.path());
        assert!(err.is_err());
    }

    #[test]
    fn suffix_defaults_to_mov() {
        assert_eq!(staged_suffix(Path::new("/x/clip")), ".mov");
        assert_eq!(staged_suffix(Path::new("/x/clip.M4V")), ".m4v");
    }
}
