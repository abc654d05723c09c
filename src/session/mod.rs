//! Consumer-side session for the explorer surface.
//!
//! Resolution is selection-initiated: a new request is issued only when the
//! consumer selects a capital (click, list pick, or agent follow-up). Map
//! panning recenters the nearby list through [`InvocationState::nearby`] but
//! never triggers a resolution on its own.

pub mod machine;
pub mod state;

pub use machine::{InvocationStateMachine, Selection};
pub use state::{InvocationPhase, InvocationState};
