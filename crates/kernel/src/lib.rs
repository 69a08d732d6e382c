//! Orbit Kernel: body state, per-tick phase advance, session ownership.
//!
//! # Invariants
//! - Each body's phase depends only on its own prior phase and speed.
//! - Satellite positions are expressed in the parent's local frame.
//! - The kernel never owns rendering state; it writes through a [`NodeSink`].

pub mod animator;
pub mod body;
pub mod session;

pub use animator::{NodeSink, OrbitAnimator, Spinner};
pub use body::Body;
pub use session::Session;
