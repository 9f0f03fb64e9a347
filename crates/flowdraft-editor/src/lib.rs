//! Flowdraft Editor
//!
//! The in-process core behind the workflow canvas. An [`EditorSession`] owns
//! the live graph and feeds every edit into two debounced pipelines:
//!
//! - [`ValidationOrchestrator`] re-validates once edits have been quiet for
//!   the validation window and publishes the errors
//! - [`AutoSaveController`] persists the graph once edits have been quiet for
//!   the auto-save window, but only while it validates
//!
//! Both publish their state through `tokio::sync::watch` channels and report
//! progress to an [`EditorNotifier`]. Timers are spawned on the current tokio
//! runtime and are children of the session's cancellation token.

mod autosave;
mod config;
mod debounce;
mod error;
mod events;
mod ids;
mod session;
mod status;
mod validation;

pub use autosave::AutoSaveController;
pub use config::EditorConfig;
pub use debounce::Debouncer;
pub use error::EditorError;
pub use events::{ChannelNotifier, EditorEvent, EditorNotifier, NoopNotifier};
pub use ids::NodeIdGenerator;
pub use session::{EXPORT_NAME, EditorSession};
pub use status::{SaveState, SaveStatus, format_relative_time};
pub use validation::{ValidationOrchestrator, ValidationState};
