pub mod error;
pub mod prompt;
pub mod session;
pub mod style;

pub use error::StudioError;
pub use session::{Flow, FlowPhase, GenerationBackend, Session, SessionState, UploadTarget};
pub use style::{AspectRatio, StylePreset};
