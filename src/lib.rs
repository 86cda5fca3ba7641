//! Ceilidh Viewer WASM Module
//!
//! Core of the ceilidh dance reference viewer: catalog indexing, filtering,
//! selection, setlist editing and role-term substitution. The host page owns
//! the DOM and calls into [`api::CeilidhViewer`].

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod markup;
pub mod models;
pub mod projection;
pub mod roles;
pub mod selection;
pub mod setlist;
pub mod state;
pub mod storage;

// Re-export commonly used types
pub use catalog::CatalogIndex;
pub use config::ViewerConfig;
pub use filter::FilterCriteria;
pub use models::{Dance, Formation, RoleSet, Setlist, SetlistItem};
pub use selection::Selection;
pub use state::{DataPayload, ViewerState};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            log::warn!("Logger was already initialized");
        }
    }

    log::info!("Ceilidh viewer WASM module initialized");
}
