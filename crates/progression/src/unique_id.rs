// ---------------------------------------------------------------------------
// UniqueId: 32-bit key addressing a progression object's saved state
// ---------------------------------------------------------------------------
//
// Layout:
//   [31..24] ObjectType tag (1..=12, 0 reserved)
//   [23..0]  instance discriminator: a numeric key masked to 24 bits, or the
//            low 24 bits of the xxh32 hash of a string key
//
// IDs are only unique inside one tag's 24-bit space. Two string keys whose
// hashes agree in the low 24 bits produce the same ID and their entries in
// the progression map overwrite each other. `ProgressionManager::claim_id`
// can detect this at registration time.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::xxh32;

use crate::object_type::ObjectType;

/// Mask for the per-instance part of an ID.
pub const INSTANCE_MASK: u32 = 0x00FF_FFFF;

/// Bit offset of the object-type tag.
pub const TAG_SHIFT: u32 = 24;

/// Seed for string-key hashing. Changing it changes every string-derived ID
/// and orphans existing saves.
const KEY_HASH_SEED: u32 = 0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct UniqueId(pub u32);

impl UniqueId {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Decoded object-type tag, `None` when the tag byte is reserved or
    /// unknown to this build.
    pub fn object_type(self) -> Option<ObjectType> {
        ObjectType::from_tag((self.0 >> TAG_SHIFT) as u8)
    }

    pub fn instance_bits(self) -> u32 {
        self.0 & INSTANCE_MASK
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

impl From<u32> for UniqueId {
    fn from(raw: u32) -> Self {
        UniqueId(raw)
    }
}

/// Per-instance key fed to [`generate_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKey<'a> {
    Number(u32),
    Name(&'a str),
}

impl From<u32> for IdKey<'_> {
    fn from(n: u32) -> Self {
        IdKey::Number(n)
    }
}

impl<'a> From<&'a str> for IdKey<'a> {
    fn from(name: &'a str) -> Self {
        IdKey::Name(name)
    }
}

/// Stable 32-bit hash of a string key.
pub fn hash_key(name: &str) -> u32 {
    xxh32(name.as_bytes(), KEY_HASH_SEED)
}

/// Builds `(tag << 24) | (key & 0x00FFFFFF)`.
pub fn generate_id<'a>(object_type: ObjectType, key: impl Into<IdKey<'a>>) -> UniqueId {
    let low = match key.into() {
        IdKey::Number(n) => n,
        IdKey::Name(name) => hash_key(name),
    };
    UniqueId(((object_type.tag() as u32) << TAG_SHIFT) | (low & INSTANCE_MASK))
}
