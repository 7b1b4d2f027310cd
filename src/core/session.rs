//! Session state and flow sequencing.
//!
//! One [`Session`] exists per user session. It owns the uploaded images, the
//! selected style and aspect ratio, the current result, and the busy/error
//! slots shared by the three flows. Requests are sequenced with tickets: a
//! ticket taken at `begin` is compared at completion time, so the completion
//! of a superseded request is discarded instead of clobbering newer state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::style::{default_aspect_ratio, default_style, AspectRatio, StylePreset};
use crate::core::StudioError;
use crate::media::{ImageAsset, EDITED_FILENAME, STUDIO_FILENAME};

const MSG_UPLOAD_FIRST: &str = "Please upload an image first.";
const MSG_EMPTY_INSTRUCTION: &str = "Please enter a prompt to describe your edits.";
const MSG_NO_EDIT_TARGET: &str =
    "There is no image to edit yet. Generate a photo or load one into the editor first.";

/// The three request flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Generate,
    CleanUp,
    Edit,
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flow::Generate => write!(f, "generate"),
            Flow::CleanUp => write!(f, "clean-up"),
            Flow::Edit => write!(f, "edit"),
        }
    }
}

/// Download filename for a flow's result.
pub fn download_filename(flow: Flow) -> &'static str {
    match flow {
        Flow::Generate | Flow::CleanUp => STUDIO_FILENAME,
        Flow::Edit => EDITED_FILENAME,
    }
}

/// Observable phase of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Busy,
    Succeeded,
    Failed,
}

/// Upload destinations. Each has its own last-write-wins sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Original,
    Editing,
    Reference,
}

impl UploadTarget {
    fn index(self) -> usize {
        match self {
            UploadTarget::Original => 0,
            UploadTarget::Editing => 1,
            UploadTarget::Reference => 2,
        }
    }
}

/// One completed result in the session's linear history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: String,
    pub flow: Flow,
    pub image: ImageAsset,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(flow: Flow, image: ImageAsset) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            id: format!("ph_{}", &uuid.to_string()[..8]),
            flow,
            image,
            created_at: Utc::now(),
        }
    }
}

/// Proof that a flow request was begun; compared at completion time.
#[derive(Debug, Clone, Copy)]
pub struct FlowTicket {
    flow: Flow,
    seq: u64,
}

impl FlowTicket {
    pub fn flow(&self) -> Flow {
        self.flow
    }
}

/// Proof that an upload was begun.
#[derive(Debug, Clone, Copy)]
pub struct UploadTicket {
    target: UploadTarget,
    seq: u64,
}

/// The model-facing operations the controller needs. Implemented by the real
/// API client and by test doubles.
#[async_trait]
pub trait GenerationBackend {
    async fn generate(
        &self,
        image: &ImageAsset,
        style: &StylePreset,
        aspect_ratio: &AspectRatio,
    ) -> Result<ImageAsset, StudioError>;

    async fn clean_up(&self, image: &ImageAsset) -> Result<ImageAsset, StudioError>;

    async fn edit(
        &self,
        image: &ImageAsset,
        instruction: &str,
        reference: Option<&ImageAsset>,
    ) -> Result<ImageAsset, StudioError>;
}

/// Mutable per-session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The uploaded source photo.
    pub original: Option<ImageAsset>,
    /// Result of the most recent successful flow.
    pub generated: Option<ImageAsset>,
    /// Current target of the edit flow.
    pub editing: Option<ImageAsset>,
    /// Optional style/pose/clothing reference for edits.
    pub reference: Option<ImageAsset>,
    /// Edit instruction text, owned by the presentation layer.
    pub instruction: String,
    /// Flow with a request in flight, if any.
    pub busy: Option<Flow>,
    /// Error slot for the most recently finished flow.
    pub last_error: Option<String>,
    /// Completed results, oldest first. No branching, no undo.
    pub history: Vec<HistoryEntry>,
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }
}

/// Owns a [`SessionState`] and sequences requests against it.
pub struct Session {
    pub state: SessionState,
    pub style: StylePreset,
    pub aspect_ratio: AspectRatio,
    seq: u64,
    upload_seq: [u64; 3],
    last_flow: Option<Flow>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_selection(default_style(), default_aspect_ratio())
    }

    pub fn with_selection(style: StylePreset, aspect_ratio: AspectRatio) -> Self {
        Self {
            state: SessionState::default(),
            style,
            aspect_ratio,
            seq: 0,
            upload_seq: [0; 3],
            last_flow: None,
        }
    }

    pub fn select_style(&mut self, style: StylePreset) {
        self.style = style;
    }

    pub fn select_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Observable phase of a flow. For a given flow exactly one of
    /// busy/succeeded/failed/idle holds at any time.
    pub fn phase(&self, flow: Flow) -> FlowPhase {
        if self.state.busy == Some(flow) {
            return FlowPhase::Busy;
        }
        if self.last_flow == Some(flow) {
            if self.state.last_error.is_some() {
                return FlowPhase::Failed;
            }
            if self.state.generated.is_some() {
                return FlowPhase::Succeeded;
            }
        }
        FlowPhase::Idle
    }

    // --- uploads -----------------------------------------------------------

    pub fn begin_upload(&mut self, target: UploadTarget) -> UploadTicket {
        self.upload_seq[target.index()] += 1;
        UploadTicket {
            target,
            seq: self.upload_seq[target.index()],
        }
    }

    /// Apply an upload outcome. Returns false when a newer upload for the
    /// same target has since begun (last-write-wins).
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: &Result<ImageAsset, StudioError>,
    ) -> bool {
        if ticket.seq != self.upload_seq[ticket.target.index()] {
            tracing::debug!("Discarding superseded upload for {:?}", ticket.target);
            return false;
        }

        match result {
            Ok(asset) => match ticket.target {
                UploadTarget::Original => {
                    self.state.original = Some(asset.clone());
                    self.state.generated = None;
                    self.state.editing = None;
                    self.state.last_error = None;
                    self.last_flow = None;
                }
                UploadTarget::Editing => {
                    self.state.editing = Some(asset.clone());
                    self.state.generated = None;
                    self.last_flow = None;
                }
                UploadTarget::Reference => {
                    self.state.reference = Some(asset.clone());
                }
            },
            Err(e) => {
                self.state.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub fn set_original(&mut self, asset: ImageAsset) {
        let ticket = self.begin_upload(UploadTarget::Original);
        self.finish_upload(ticket, &Ok(asset));
    }

    pub fn set_editing(&mut self, asset: ImageAsset) {
        let ticket = self.begin_upload(UploadTarget::Editing);
        self.finish_upload(ticket, &Ok(asset));
    }

    pub fn set_reference(&mut self, asset: ImageAsset) {
        let ticket = self.begin_upload(UploadTarget::Reference);
        self.finish_upload(ticket, &Ok(asset));
    }

    pub fn clear_reference(&mut self) {
        self.state.reference = None;
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.state.instruction = instruction.into();
    }

    /// Feed the current result into the editor as the next edit target.
    /// Clears the instruction and reference, like opening a fresh editor.
    pub fn forward_to_editor(&mut self) -> bool {
        match self.state.generated.clone() {
            Some(image) => {
                self.state.editing = Some(image);
                self.state.instruction.clear();
                self.state.reference = None;
                true
            }
            None => false,
        }
    }

    // --- flow sequencing ---------------------------------------------------

    fn require_original(&self) -> Result<ImageAsset, StudioError> {
        self.state
            .original
            .clone()
            .ok_or_else(|| StudioError::MissingInput(MSG_UPLOAD_FIRST.to_string()))
    }

    fn require_edit_inputs(&self) -> Result<(ImageAsset, String), StudioError> {
        let image = self
            .state
            .editing
            .clone()
            .ok_or_else(|| StudioError::MissingInput(MSG_NO_EDIT_TARGET.to_string()))?;
        let instruction = self.state.instruction.trim();
        if instruction.is_empty() {
            return Err(StudioError::MissingInput(MSG_EMPTY_INSTRUCTION.to_string()));
        }
        Ok((image, instruction.to_string()))
    }

    /// Start a request. Validates the flow's preconditions, then atomically
    /// clears the prior result and error and raises the busy flag. Fails with
    /// `MissingInput` before any network traffic when inputs are missing.
    pub fn begin(&mut self, flow: Flow) -> Result<FlowTicket, StudioError> {
        match flow {
            Flow::Generate | Flow::CleanUp => {
                self.require_original()?;
                // Restarting the pipeline closes the editor; its target
                // referenced the result being replaced.
                self.state.editing = None;
            }
            Flow::Edit => {
                self.require_edit_inputs()?;
            }
        }

        self.state.generated = None;
        self.state.last_error = None;
        self.state.busy = Some(flow);
        self.last_flow = None;
        self.seq += 1;

        Ok(FlowTicket {
            flow,
            seq: self.seq,
        })
    }

    /// Apply a request outcome. Returns false and leaves state untouched when
    /// any newer request has begun since the ticket was taken; the stale
    /// arrival is discarded, per the only-latest-result-observable rule.
    pub fn finish(
        &mut self,
        ticket: FlowTicket,
        outcome: &Result<ImageAsset, StudioError>,
    ) -> bool {
        if ticket.seq != self.seq {
            tracing::debug!("Discarding stale {} result (request superseded)", ticket.flow);
            return false;
        }

        self.state.busy = None;
        self.last_flow = Some(ticket.flow);

        match outcome {
            Ok(image) => {
                self.state.generated = Some(image.clone());
                if ticket.flow == Flow::Edit {
                    // Chained edits: the result becomes the next edit target.
                    self.state.editing = Some(image.clone());
                }
                self.state.last_error = None;
                self.state
                    .history
                    .push(HistoryEntry::new(ticket.flow, image.clone()));
            }
            Err(e) => {
                self.state.last_error = Some(e.to_string());
            }
        }
        true
    }

    // --- straight-line drivers ---------------------------------------------
    //
    // These hold &mut self across the await, so the ticket cannot be
    // superseded mid-call; supersession matters for callers that spawn and
    // use begin/finish directly.

    pub async fn generate<B: GenerationBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<ImageAsset, StudioError> {
        let image = self.require_original()?;
        let ticket = self.begin(Flow::Generate)?;
        let style = self.style.clone();
        let aspect_ratio = self.aspect_ratio.clone();
        let outcome = backend.generate(&image, &style, &aspect_ratio).await;
        self.finish(ticket, &outcome);
        outcome
    }

    pub async fn clean_up<B: GenerationBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<ImageAsset, StudioError> {
        let image = self.require_original()?;
        let ticket = self.begin(Flow::CleanUp)?;
        let outcome = backend.clean_up(&image).await;
        self.finish(ticket, &outcome);
        outcome
    }

    pub async fn edit<B: GenerationBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<ImageAsset, StudioError> {
        let (image, instruction) = self.require_edit_inputs()?;
        let ticket = self.begin(Flow::Edit)?;
        let reference = self.state.reference.clone();
        let outcome = backend
            .edit(&image, &instruction, reference.as_ref())
            .await;
        self.finish(ticket, &outcome);
        outcome
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::style_by_id;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn asset(byte: u8) -> ImageAsset {
        ImageAsset::new(vec![byte], "image/png")
    }

    /// Backend double that counts calls and returns a fixed outcome.
    struct MockBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockBackend {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn respond(&self) -> Result<ImageAsset, StudioError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StudioError::NoImageReturned(None))
            } else {
                Ok(asset(9))
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for MockBackend {
        async fn generate(
            &self,
            _image: &ImageAsset,
            _style: &StylePreset,
            _aspect_ratio: &AspectRatio,
        ) -> Result<ImageAsset, StudioError> {
            self.respond()
        }

        async fn clean_up(&self, _image: &ImageAsset) -> Result<ImageAsset, StudioError> {
            self.respond()
        }

        async fn edit(
            &self,
            _image: &ImageAsset,
            _instruction: &str,
            _reference: Option<&ImageAsset>,
        ) -> Result<ImageAsset, StudioError> {
            self.respond()
        }
    }

    #[test]
    fn generate_requires_original() {
        let mut session = Session::new();
        let err = session.begin(Flow::Generate).unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));
        assert_eq!(session.phase(Flow::Generate), FlowPhase::Idle);
        assert!(!session.state.is_busy());
    }

    #[test]
    fn begin_clears_result_and_error_and_sets_busy() {
        let mut session = Session::new();
        session.set_original(asset(1));
        session.state.generated = Some(asset(2));
        session.state.editing = Some(asset(2));
        session.state.last_error = Some("old error".to_string());

        session.begin(Flow::CleanUp).unwrap();

        assert!(session.state.generated.is_none());
        assert!(session.state.editing.is_none());
        assert!(session.state.last_error.is_none());
        assert_eq!(session.state.busy, Some(Flow::CleanUp));
        assert_eq!(session.phase(Flow::CleanUp), FlowPhase::Busy);
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut session = Session::new();
        session.set_original(asset(1));

        let first = session.begin(Flow::Generate).unwrap();
        let second = session.begin(Flow::Generate).unwrap();
        assert_eq!(first.flow(), Flow::Generate);

        // First request resolves after the second began: discarded.
        assert!(!session.finish(first, &Ok(asset(10))));
        assert!(session.state.generated.is_none());
        assert_eq!(session.phase(Flow::Generate), FlowPhase::Busy);

        assert!(session.finish(second, &Ok(asset(20))));
        assert_eq!(session.state.generated, Some(asset(20)));
        assert_eq!(session.phase(Flow::Generate), FlowPhase::Succeeded);
    }

    #[test]
    fn newer_flow_supersedes_other_flows() {
        let mut session = Session::new();
        session.set_original(asset(1));

        let generate = session.begin(Flow::Generate).unwrap();
        let clean_up = session.begin(Flow::CleanUp).unwrap();

        assert!(!session.finish(generate, &Ok(asset(10))));
        assert!(session.finish(clean_up, &Ok(asset(20))));
        assert_eq!(session.state.generated, Some(asset(20)));
    }

    #[test]
    fn failure_populates_the_error_slot() {
        let mut session = Session::new();
        session.set_original(asset(1));

        let ticket = session.begin(Flow::Generate).unwrap();
        let outcome = Err(StudioError::Upstream {
            message: "service unavailable".to_string(),
            source: None,
        });
        assert!(session.finish(ticket, &outcome));

        assert!(!session.state.is_busy());
        assert!(session.state.generated.is_none());
        assert_eq!(
            session.state.last_error.as_deref(),
            Some("Upstream service error: service unavailable")
        );
        assert_eq!(session.phase(Flow::Generate), FlowPhase::Failed);
    }

    #[test]
    fn edit_requires_target_and_instruction() {
        let mut session = Session::new();

        let err = session.begin(Flow::Edit).unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));

        session.set_editing(asset(1));
        session.set_instruction("   \t  ");
        let err = session.begin(Flow::Edit).unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));
    }

    #[test]
    fn edit_success_chains_into_the_editor() {
        let mut session = Session::new();
        session.set_editing(asset(1));
        session.set_instruction("add a hat");

        let ticket = session.begin(Flow::Edit).unwrap();
        assert!(session.finish(ticket, &Ok(asset(5))));

        assert_eq!(session.state.editing, Some(asset(5)));
        assert_eq!(session.state.generated, Some(asset(5)));
        assert_eq!(session.state.history.len(), 1);
        assert_eq!(session.state.history[0].flow, Flow::Edit);
    }

    #[test]
    fn upload_is_last_write_wins() {
        let mut session = Session::new();

        let first = session.begin_upload(UploadTarget::Original);
        let second = session.begin_upload(UploadTarget::Original);

        assert!(!session.finish_upload(first, &Ok(asset(1))));
        assert!(session.state.original.is_none());

        assert!(session.finish_upload(second, &Ok(asset(2))));
        assert_eq!(session.state.original, Some(asset(2)));
    }

    #[test]
    fn upload_targets_supersede_independently() {
        let mut session = Session::new();

        let original = session.begin_upload(UploadTarget::Original);
        let reference = session.begin_upload(UploadTarget::Reference);

        assert!(session.finish_upload(original, &Ok(asset(1))));
        assert!(session.finish_upload(reference, &Ok(asset(2))));
        assert_eq!(session.state.reference, Some(asset(2)));
    }

    #[test]
    fn new_original_resets_stale_outputs() {
        let mut session = Session::new();
        session.set_original(asset(1));
        let ticket = session.begin(Flow::Generate).unwrap();
        session.finish(ticket, &Ok(asset(2)));
        session.forward_to_editor();

        session.set_original(asset(3));

        assert_eq!(session.state.original, Some(asset(3)));
        assert!(session.state.generated.is_none());
        assert!(session.state.editing.is_none());
        assert!(session.state.last_error.is_none());
        assert_eq!(session.phase(Flow::Generate), FlowPhase::Idle);
    }

    #[test]
    fn upload_failure_is_surfaced() {
        let mut session = Session::new();
        let ticket = session.begin_upload(UploadTarget::Original);
        let result = Err(StudioError::MediaRead("short read".to_string()));
        assert!(session.finish_upload(ticket, &result));
        assert!(session.state.original.is_none());
        assert!(session.state.last_error.is_some());
    }

    #[test]
    fn forward_to_editor_clears_edit_inputs() {
        let mut session = Session::new();
        assert!(!session.forward_to_editor());

        session.set_original(asset(1));
        let ticket = session.begin(Flow::Generate).unwrap();
        session.finish(ticket, &Ok(asset(2)));
        session.set_instruction("leftover");
        session.set_reference(asset(3));

        assert!(session.forward_to_editor());
        assert_eq!(session.state.editing, Some(asset(2)));
        assert!(session.state.instruction.is_empty());
        assert!(session.state.reference.is_none());
    }

    #[tokio::test]
    async fn missing_instruction_never_reaches_the_backend() {
        let mut session = Session::new();
        session.set_editing(asset(1));
        session.set_instruction("");

        let backend = MockBackend::ok();
        let err = session.edit(&backend).await.unwrap_err();

        assert!(matches!(err, StudioError::MissingInput(_)));
        assert_eq!(backend.calls(), 0);
        assert!(!session.state.is_busy());
    }

    #[tokio::test]
    async fn generate_driver_reaches_succeeded() {
        let mut session = Session::new();
        session.set_original(asset(1));
        session.select_style(style_by_id("monochrome").unwrap());

        let backend = MockBackend::ok();
        let image = session.generate(&backend).await.unwrap();

        assert_eq!(backend.calls(), 1);
        assert_eq!(session.state.generated, Some(image));
        assert_eq!(session.phase(Flow::Generate), FlowPhase::Succeeded);
        assert!(!session.state.is_busy());
        assert!(session.state.last_error.is_none());
    }

    #[tokio::test]
    async fn clean_up_driver_records_failure() {
        let mut session = Session::new();
        session.set_original(asset(1));

        let backend = MockBackend::failing();
        let err = session.clean_up(&backend).await.unwrap_err();

        assert!(matches!(err, StudioError::NoImageReturned(_)));
        assert_eq!(backend.calls(), 1);
        assert_eq!(session.phase(Flow::CleanUp), FlowPhase::Failed);
        assert!(session.state.last_error.is_some());
    }

    #[test]
    fn download_filenames_are_fixed_per_flow() {
        assert_eq!(download_filename(Flow::Generate), "studio_photo.png");
        assert_eq!(download_filename(Flow::CleanUp), "studio_photo.png");
        assert_eq!(download_filename(Flow::Edit), "edited_photo.png");
    }
}
