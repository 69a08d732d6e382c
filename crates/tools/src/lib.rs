//! Developer Tooling: debug-parameter panel and session inspector.
//!
//! # Invariants
//! - Panel writes are clamped and snapped before they reach the scene.
//! - The inspector is read-only.

mod inspector;
mod panel;

pub use inspector::{BodyInfo, SessionInspector, SessionSummary};
pub use panel::{Binding, BindingId, Bindable, DebugPanel, PanelError};
