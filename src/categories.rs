//! Item category (`_parent`) ids that the icon cache treats specially.
//!
//! These are fixed by the game's item database and are compared as opaque
//! strings.

pub const PISTOL: &str = "5447b5cf4bdc2d65278b4567";
pub const REVOLVER: &str = "617f1ef5e8b54b0998387733";
pub const SMG: &str = "5447b5e04bdc2d62278b4567";
pub const ASSAULT_RIFLE: &str = "5447b5f14bdc2d61278b4567";
pub const ASSAULT_CARBINE: &str = "5447b5fc4bdc2d87278b4567";
pub const SHOTGUN: &str = "5447b6094bdc2dc3278b4567";
pub const MARKSMAN_RIFLE: &str = "5447b6194bdc2d67278b4567";
pub const SNIPER_RIFLE: &str = "5447b6254bdc2dc3278b4568";
pub const MACHINE_GUN: &str = "5447bed64bdc2d97278b4568";
pub const GRENADE_LAUNCHER: &str = "5447bedf4bdc2d87278b4568";
pub const SPECIAL_WEAPON: &str = "5447bee84bdc2dc3278b4569";

pub const MAGAZINE: &str = "5448bc234bdc2d3c308b4569";
pub const CYLINDER_MAGAZINE: &str = "610720f290b75a49ff2e5e25";
pub const NIGHT_VISION: &str = "5a2c3a9486f774688b05e574";
pub const ARMORED_EQUIPMENT: &str = "57bef4c42459772e8d35a53b";
pub const AMMO: &str = "5485a8684bdc2da71d8b4567";

/// Categories whose icons are rendered from their default preset.
pub const WEAPON_CATEGORIES: &[&str] = &[
    PISTOL,
    REVOLVER,
    SMG,
    ASSAULT_RIFLE,
    ASSAULT_CARBINE,
    SHOTGUN,
    MARKSMAN_RIFLE,
    SNIPER_RIFLE,
    MACHINE_GUN,
    GRENADE_LAUNCHER,
    SPECIAL_WEAPON,
];

/// Typed view of the categories the fingerprint cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemCategory {
    Weapon,
    Magazine,
    NightVision,
    ArmoredEquipment,
    Ammo,
}

impl ItemCategory {
    /// All special-cased categories.
    pub const ALL: &[ItemCategory] = &[
        Self::Weapon,
        Self::Magazine,
        Self::NightVision,
        Self::ArmoredEquipment,
        Self::Ammo,
    ];

    /// Classify a raw `_parent` id. Returns `None` for categories without
    /// special handling.
    pub fn from_parent_id(parent_id: &str) -> Option<Self> {
        match parent_id {
            MAGAZINE | CYLINDER_MAGAZINE => Some(Self::Magazine),
            NIGHT_VISION => Some(Self::NightVision),
            ARMORED_EQUIPMENT => Some(Self::ArmoredEquipment),
            AMMO => Some(Self::Ammo),
            id if WEAPON_CATEGORIES.contains(&id) => Some(Self::Weapon),
            _ => None,
        }
    }

    /// The raw category ids that map to this variant.
    pub fn parent_ids(&self) -> &'static [&'static str] {
        match self {
            Self::Weapon => WEAPON_CATEGORIES,
            Self::Magazine => &[MAGAZINE, CYLINDER_MAGAZINE],
            Self::NightVision => &[NIGHT_VISION],
            Self::ArmoredEquipment => &[ARMORED_EQUIPMENT],
            Self::Ammo => &[AMMO],
        }
    }
}
