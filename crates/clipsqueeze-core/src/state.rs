// crates/clipsqueeze-core/src/state.rs
//
// Presentation state and the affordances derived from it.
//
// `PresentationState` is the only thing that decides what the window shows.
// `Affordances::from_state` is a pure function of it, so a transition can
// never leave a stale label or a half-hidden button behind.

use uuid::Uuid;

/// Label text used for both picker and export cancellation.
pub const MSG_CANCELLED:   &str = "export cancelled";
/// Label text when the staged copy of the picked file could not be written.
pub const MSG_WRITE_ERROR: &str = "could not write video data";
/// Label text when the original or compressed file could not be inspected.
pub const MSG_READ_ERROR:  &str = "error reading data";
/// Label text when the export session reported anything but success.
pub const MSG_FAILED:      &str = "failed";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PresentationState {
    /// Nothing selected yet.
    #[default]
    Initialized,
    /// Picker open, staging copy running, or export in flight.
    Loading,
    /// Export finished; message is the before/after report.
    Complete(String),
    /// Picker or export was cancelled.
    Cancelled(String),
    /// Staging, export, or stats read failed.
    Failure(String),
}

impl PresentationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, PresentationState::Loading)
    }

    /// The label text for this state. Empty for `Initialized` and `Loading`.
    pub fn message(&self) -> &str {
        match self {
            PresentationState::Initialized | PresentationState::Loading => "",
            PresentationState::Complete(m)
            | PresentationState::Cancelled(m)
            | PresentationState::Failure(m) => m,
        }
    }
}

/// Everything the UI is allowed to show. Rebuilt from the state every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Affordances {
    pub spinner_visible:   bool,
    pub spinner_animating: bool,
    pub play_visible:      bool,
    pub select_visible:    bool,
    pub message:           String,
    /// Export progress in 0.0..=1.0. Only ever `Some` while loading.
    pub progress:          Option<f32>,
}

impl Affordances {
    pub fn from_state(state: &PresentationState) -> Self {
        let (spinner, play, select) = match state {
            PresentationState::Initialized  => (false, false, true),
            PresentationState::Loading      => (true,  false, false),
            PresentationState::Complete(_)  => (false, true,  true),
            PresentationState::Cancelled(_) => (false, true,  true),
            PresentationState::Failure(_)   => (false, false, true),
        };
        Self {
            spinner_visible:   spinner,
            spinner_animating: spinner,
            play_visible:      play,
            select_visible:    select,
            message:           state.message().to_string(),
            progress:          None,
        }
    }

    /// Attach encode progress. Ignored unless the spinner is showing.
    pub fn with_progress(mut self, progress: Option<(u64, u64)>) -> Self {
        if self.spinner_visible {
            self.progress = progress
                .map(|(frame, total)| (frame as f32 / total.max(1) as f32).clamp(0.0, 1.0));
        }
        self
    }
}

/// At most one export per controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportGuard {
    #[default]
    Idle,
    InFlight(Uuid),
}

impl ExportGuard {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ExportGuard::InFlight(_))
    }

    pub fn owns(&self, job_id: Uuid) -> bool {
        *self == ExportGuard::InFlight(job_id)
    }
}
