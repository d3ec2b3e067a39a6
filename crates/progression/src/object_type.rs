// ---------------------------------------------------------------------------
// ObjectType: category tag stored in the top byte of every UniqueId
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// Category of a saveable scene object.
///
/// The discriminant is written into the top 8 bits of a [`UniqueId`]
/// (see [`crate::unique_id`]). Tag `0` is reserved and never produced, so a
/// zero top byte always means "not a progression ID". At most 255 categories
/// fit in the tag.
///
/// [`UniqueId`]: crate::unique_id::UniqueId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectType {
    GameEvent = 1,
    Door = 2,
    Cutscene = 3,
    Pickup = 4,
    EnemySpawner = 5,
    Enemy = 6,
    Key = 7,
    Hazard = 8,
    StoryTrigger = 9,
    BossTrigger = 10,
    Pedestal = 11,
    MusicTrigger = 12,
}

impl ObjectType {
    /// Every category, in tag order.
    pub const ALL: [ObjectType; 12] = [
        ObjectType::GameEvent,
        ObjectType::Door,
        ObjectType::Cutscene,
        ObjectType::Pickup,
        ObjectType::EnemySpawner,
        ObjectType::Enemy,
        ObjectType::Key,
        ObjectType::Hazard,
        ObjectType::StoryTrigger,
        ObjectType::BossTrigger,
        ObjectType::Pedestal,
        ObjectType::MusicTrigger,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decode a tag byte. Returns `None` for the reserved `0` and for tags
    /// this build does not know.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectType::GameEvent => "game event",
            ObjectType::Door => "door",
            ObjectType::Cutscene => "cutscene",
            ObjectType::Pickup => "pickup",
            ObjectType::EnemySpawner => "enemy spawner",
            ObjectType::Enemy => "enemy",
            ObjectType::Key => "key",
            ObjectType::Hazard => "hazard",
            ObjectType::StoryTrigger => "story trigger",
            ObjectType::BossTrigger => "boss trigger",
            ObjectType::Pedestal => "pedestal",
            ObjectType::MusicTrigger => "music trigger",
        }
    }
}
