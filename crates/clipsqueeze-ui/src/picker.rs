// crates/clipsqueeze-ui/src/picker.rs
//
// Native file dialog as the controller's MediaPicker.
//
// rfd's FileDialog is modal and synchronous; it runs on the UI thread and the
// reply is queued before `present` returns, to be picked up by the next
// `Controller::poll`.

use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use rfd::FileDialog;
use uuid::Uuid;

use clipsqueeze_core::collab::MediaPicker;
use clipsqueeze_core::media_types::MediaResult;

pub const MOVIE_EXTENSIONS: &[&str] = &["mov", "mp4", "m4v", "avi", "mkv", "webm", "3gp"];

pub fn is_movie(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MOVIE_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[derive(Default)]
pub struct RfdPicker {
    /// Folder the last pick came from; the next dialog opens there.
    last_dir: Option<PathBuf>,
}

impl MediaPicker for RfdPicker {
    fn present(&mut self, pick_id: Uuid, reply: Sender<MediaResult>) {
        let mut dialog = FileDialog::new()
            .set_title("Select a video")
            .add_filter("Movies", MOVIE_EXTENSIONS);
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }

        let msg = match dialog.pick_file() {
            Some(path) if is_movie(&path) => {
                self.last_dir = path.parent().map(Path::to_path_buf);
                MediaResult::Picked { pick_id, path }
            }
            Some(path) => {
                log::warn!("[app] not a movie file: {}", path.display());
                MediaResult::PickCancelled { pick_id }
            }
            None => MediaResult::PickCancelled { pick_id },
        };
        let _ = reply.send(msg);
    }
}
