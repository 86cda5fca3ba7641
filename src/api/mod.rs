//! Ceilidh Viewer WASM API
//!
//! The JavaScript-facing surface of the viewer core.
//!
//! # Module Structure
//!
//! - `helpers`: Serialization, validation and error conversion shared by every call
//! - `viewer`: The `CeilidhViewer` handle wrapping one `ViewerState`

pub mod helpers;
pub mod viewer;

pub use viewer::CeilidhViewer;
