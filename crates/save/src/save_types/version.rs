// ---------------------------------------------------------------------------
// Save file version constants
// ---------------------------------------------------------------------------

/// Current save record version.
/// v0 = unversioned records
/// v1 = player status/respawn/currency/inventory, scene pointer, progression map
/// v2 = extension map (unlock state, ability wheel); stats clamped to their maxima
pub const CURRENT_SAVE_VERSION: u32 = 2;
