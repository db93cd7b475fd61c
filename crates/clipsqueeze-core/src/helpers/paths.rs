// crates/clipsqueeze-core/src/helpers/paths.rs
//
// Single source of truth for where ClipSqueeze reads and writes files.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "ClipSqueeze";

/// `%APPDATA%\ClipSqueeze` on Windows, `$XDG_CONFIG_HOME/ClipSqueeze` or
/// `~/.config/ClipSqueeze` elsewhere. Falls back to the temp dir.
pub fn app_config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    #[cfg(not(target_os = "windows"))]
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|_| std::env::temp_dir());
    base.join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    app_config_dir().join("config.json")
}

/// Where picked files are copied before export.
pub fn default_staging_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Output path for a staged source: same stem, container extension.
///
/// A source that already has the container extension gets a `_compressed`
/// suffix so the export never writes over its own input.
///
/// ```
/// use std::path::Path;
/// use clipsqueeze_core::helpers::paths::output_path_for;
/// assert_eq!(output_path_for(Path::new("/tmp/a.MOV"), "mp4"), Path::new("/tmp/a.mp4"));
/// assert_eq!(output_path_for(Path::new("/tmp/a.MP4"), "mp4"), Path::new("/tmp/a_compressed.mp4"));
/// ```
pub fn output_path_for(source: &Path, extension: &str) -> PathBuf {
    let same_ext = source
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false);
    if !same_ext {
        return source.with_extension(extension);
    }
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".into());
    source.with_file_name(format!("{stem}_compressed.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensionless_source_gains_extension() {
        assert_eq!(output_path_for(Path::new("/tmp/clip"), "mp4"), Path::new("/tmp/clip.mp4"));
    }

    #[test]
    fn output_never_equals_source() {
        for src in ["/tmp/a.mov", "/tmp/a.mp4", "/tmp/a.Mp4", "/tmp/a.mkv"] {
            let src = Path::new(src);
            assert_ne!(output_path_for(src, "mp4"), src);
        }
    }

    #[test]
    fn config_path_lives_under_app_dir() {
        let p = default_config_path();
        assert!(p.ends_with("ClipSqueeze/config.json"));
    }
}
