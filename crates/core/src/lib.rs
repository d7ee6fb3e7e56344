//! Core toolkit of the Talos emulator front-end.
//!
//! The crate provides the pieces a front-end composes into its UI: a view
//! tree with stack-based navigation ([`view`]), an in-memory framebuffer
//! with PNG support ([`framebuffer`]), screenshot capture ([`screenshot`]),
//! and the surrounding settings and logging plumbing. Platform concerns
//! (window/event backends, text shaping, image APIs beyond PNG) stay in the
//! host application.

#[macro_use]
pub mod geom;

pub mod color;
pub mod context;
pub mod framebuffer;
pub mod gesture;
pub mod input;
pub mod logging;
pub mod screenshot;
pub mod settings;
pub mod view;
