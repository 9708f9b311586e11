//! Editor front end over `postframe-core`.
//!
//! [`EditorSession`] is what a host UI drives: it turns pointer and button
//! events into Transform State mutations and hands saves to the compositor,
//! either inline or on a background render thread.

pub mod error;
pub mod session;
pub mod worker;

pub use error::{EditorError, Result};
pub use session::{EditorSession, FlipAxis};
pub use worker::{CancelToken, RenderTask};
