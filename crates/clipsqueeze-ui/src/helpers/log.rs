// crates/clipsqueeze-ui/src/helpers/log.rs
//
// Logger setup for the binary.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch)
// there is no console attached, so stderr output is silently discarded. Every
// record is therefore also appended to a file in the OS temp directory.
//
// File: %TEMP%\clipsqueeze.log (or $TMPDIR/clipsqueeze.log), append-only.
//
// Level comes from RUST_LOG, default `info`:
//   RUST_LOG=debug clipsqueeze
//   RUST_LOG=clipsqueeze_media=debug clipsqueeze

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

pub const LOG_FILE_NAME: &str = "clipsqueeze.log";

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Writes every buffer to stderr and, when it could be opened, the log file.
pub struct TeeWriter {
    file: Option<File>,
}

impl TeeWriter {
    pub fn open(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path).ok();
        Self { file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The file is best-effort; stderr decides success.
        if let Some(f) = self.file.as_mut() {
            let _ = f.write_all(buf);
        }
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(f) = self.file.as_mut() {
            let _ = f.flush();
        }
        io::stderr().flush()
    }
}

/// Install the global logger. Call once, first thing in `main`.
pub fn init_logging() {
    let path = log_file_path();
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(TeeWriter::open(&path))))
        .init();
    log::info!("[app] logging to {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);

        let mut w = TeeWriter::open(&path);
        w.write_all(b"first\n").unwrap();
        w.flush().unwrap();
        drop(w);

        let mut w = TeeWriter::open(&path);
        w.write_all(b"second\n").unwrap();
        w.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn unopenable_file_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        // A directory can't be opened for appending.
        let mut w = TeeWriter::open(dir.path());
        assert_eq!(w.write(b"x\n").unwrap(), 2);
    }
}
