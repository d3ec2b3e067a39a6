// ---------------------------------------------------------------------------
// Save structs and version constants (split into submodules)
// ---------------------------------------------------------------------------

mod player_types;
mod progression_types;
mod save_data;
mod version;

// Re-export everything so callers see one flat namespace.
pub use player_types::*;
pub use progression_types::*;
pub use save_data::*;
pub use version::*;
