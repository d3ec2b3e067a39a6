pub mod atomic_write;
mod checkpoint_bridge;
pub mod collectibles;
pub mod crash_recovery;
mod exclusive_load;
mod exclusive_new_game;
mod exclusive_save;
pub mod file_header;
pub mod restore_resources;
pub mod save_codec;
pub mod save_error;
pub mod save_migrate;
pub mod save_migrate_registry;
mod save_plugin;
pub mod save_slots;
pub mod save_stages;
pub mod save_types;
pub mod store_file;
pub mod tutorial_codex;


pub use collectibles::CollectiblesStore;
pub use crash_recovery::CrashRecoveryState;
pub use save_error::SaveError;
pub use save_plugin::{
    CollectibleObtainedEvent, DeleteSaveEvent, LoadGameEvent, LoadNewLevelEvent, LoadOutcome,
    LoadOutcomeEvent, NewGameEvent, SaveGameEvent, SaveOutcome, SaveOutcomeEvent, SavePlugin,
    SaveSettings, TutorialUnlockedEvent, WipeGameDataEvent,
};
pub use save_slots::SaveSlots;
pub use save_types::SaveRecord;
pub use tutorial_codex::TutorialCodexStore;
