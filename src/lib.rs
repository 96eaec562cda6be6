//! quicktap removes the artificial delay touch platforms insert before
//! firing a click, by watching the raw touch stream and synthesizing an
//! immediate, trustworthy click while suppressing the platform's own
//! delayed duplicate.
//!
//! The crate splits into a platform-free core and a thin browser adapter:
//!
//! - [`Engine`] is the disambiguation state machine. It consumes touch and
//!   mouse events as plain data over any [`dom::DomView`] implementation
//!   and answers with [`dom::Disposition`]s, so it runs (and is tested)
//!   without a browser.
//! - [`web::attach`] (wasm32 only) binds an engine to a live DOM element
//!   and returns a handle whose only further operation is detaching.
//!
//! Elements can opt out per element with the `needsclick` class token
//! (always use the native click) or opt in with `needsfocus` (always
//! attempt focus simulation). [`not_needed`] reports up front whether the
//! runtime requires disambiguation at all.

pub mod dom;
pub mod engine;
mod gate;
pub mod listeners;
pub mod platform;
pub mod resolve;
mod tracker;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use dom::{Disposition, DomView, ElementFacts, MouseEvent, SyntheticKind, TouchEvent, TouchPoint};
pub use engine::{Engine, Options};
pub use platform::{PlatformProfile, SurfaceTraits, not_needed};
pub use resolve::{ElementKind, InputKind};

#[cfg(target_arch = "wasm32")]
pub use web::{Handle, attach};
