//! The icon cache fingerprint.
//!
//! The game client keys its icon cache by a 32-bit hash of the item and,
//! for weapons, of every slot of its default preset. Everything here uses
//! wrapping `i32` arithmetic so results match the client bit for bit.

/// Preset attachment tree reconstruction
pub mod preset_tree;
/// Magazine visible-ammo buckets
pub mod visible_ammo;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::Rc;
use crate::catalog::{Catalog, ItemDefinition};
use crate::categories::ItemCategory;
use crate::error::{Error, ErrorKind, IResult};

use preset_tree::{PresetTree, SlotEntry, bare_slot_sequence};
use visible_ammo::{max_visible_ammo, parse_ranges, visible_ammo_count};

pub const MAGAZINE_SLOT: &str = "mod_magazine";
pub const CARTRIDGES_SLOT: &str = "cartridges";

const STRING_HASH_SEED: i32 = 5381;
const STRING_HASH_MULTIPLIER: i32 = 1566083941;
const ITEM_HASH_SEED: i32 = 17;
const HIGHLIGHTED_MODIFIER: i32 = 23;
const EMPTY_MAGAZINE_MODIFIER: i32 = 24 << 2;
const AMMO_MODIFIER: i32 = 27 * 56;

/// Two-lane DJB2 over UTF-16 code units. A trailing odd unit is ignored.
pub fn string_hash(s: &str) -> i32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    string_hash_utf16(&units)
}

pub fn string_hash_utf16(units: &[u16]) -> i32 {
    let mut hash1 = STRING_HASH_SEED;
    let mut hash2 = STRING_HASH_SEED;

    for pair in units.chunks_exact(2) {
        hash1 = hash1.wrapping_shl(5).wrapping_add(hash1) ^ i32::from(pair[0]);
        hash2 = hash2.wrapping_shl(5).wrapping_add(hash2) ^ i32::from(pair[1]);
    }

    hash1.wrapping_add(hash2.wrapping_mul(STRING_HASH_MULTIPLIER))
}

/// Ammunition loaded into a magazine that is being hashed inside a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartridgeLoad<'a> {
    pub ammo_id: &'a str,
    /// Total rounds, when the preset records stack sizes. `None` means the
    /// magazine is hashed as if it showed its largest visible count.
    pub count: Option<u32>,
}

impl<'a> CartridgeLoad<'a> {
    /// Load described by a `cartridges` slot, if anything is attached there.
    /// Stacks without a recorded size count as a single round.
    pub fn from_slot(slot: &SlotEntry<'a>) -> Option<Self> {
        let ammo_id = slot.item()?;
        let count = slot
            .parts
            .iter()
            .any(|part| part.stack_count().is_some())
            .then(|| {
                slot.parts
                    .iter()
                    .map(|part| part.stack_count().unwrap_or(1))
                    .fold(0u32, u32::saturating_add)
            });
        Some(CartridgeLoad { ammo_id, count })
    }
}

/// Result of hashing many items at once.
#[derive(Debug, Default)]
pub struct HashedItems {
    /// Fingerprint to item id. On collision the first id is kept.
    pub by_hash: HashMap<i32, String>,
    /// Items whose fingerprint could not be computed.
    pub failures: Vec<(String, Error)>,
}

/// Computes icon cache fingerprints against a loaded [`Catalog`].
///
/// A default-constructed hasher has no catalogs and fails every call with
/// [`ErrorKind::NotInitialized`] until [`ItemHasher::init`] is called.
#[derive(Debug, Default, Clone)]
pub struct ItemHasher {
    catalog: Option<Rc<Catalog>>,
}

impl ItemHasher {
    pub fn new(catalog: impl Into<Rc<Catalog>>) -> Self {
        Self {
            catalog: Some(catalog.into()),
        }
    }

    /// Install or replace the catalogs.
    pub fn init(&mut self, catalog: impl Into<Rc<Catalog>>) {
        self.catalog = Some(catalog.into());
    }

    pub fn is_initialized(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn catalog(&self) -> IResult<&Catalog> {
        self.catalog
            .as_deref()
            .ok_or_else(|| ErrorKind::NotInitialized.into())
    }

    /// Fingerprint of an item as the icon cache sees it.
    pub fn item_hash(&self, item_id: &str) -> IResult<i32> {
        let catalog = self.catalog()?;
        let mut hash = ITEM_HASH_SEED ^ self.single_item_hash(item_id, None)?;

        let Some(item) = catalog.item_by_id(item_id) else {
            return Ok(hash);
        };

        match item.category() {
            Some(ItemCategory::Weapon) => {
                hash = self.container_hash(hash, item)?;
            }
            category => {
                hash = self.hash_slots(hash, &bare_slot_sequence(catalog, item_id))?;
                if category == Some(ItemCategory::Ammo) {
                    hash ^= AMMO_MODIFIER;
                }
            }
        }

        Ok(hash)
    }

    /// Fingerprint of a single item, ignoring anything attached to it.
    pub fn single_item_hash(
        &self,
        item_id: &str,
        cartridges: Option<CartridgeLoad<'_>>,
    ) -> IResult<i32> {
        let catalog = self.catalog()?;
        if item_id.is_empty() {
            return Ok(0);
        }

        let mut hash = string_hash(item_id);
        let Some(item) = catalog.item_by_id(item_id) else {
            return Ok(hash);
        };

        match item.category() {
            Some(ItemCategory::NightVision) | Some(ItemCategory::ArmoredEquipment) => {
                hash ^= HIGHLIGHTED_MODIFIER;
            }
            Some(ItemCategory::Magazine) => match cartridges {
                None => hash ^= EMPTY_MAGAZINE_MODIFIER,
                Some(load) => {
                    let ranges = parse_ranges(item_id, item.visible_ammo_ranges())?;
                    let count = match load.count {
                        Some(count) => i32::try_from(count).unwrap_or(i32::MAX),
                        None => max_visible_ammo(&ranges),
                    };
                    let visible = visible_ammo_count(&ranges, count);
                    debug!(
                        magazine = item_id,
                        ammo = load.ammo_id,
                        count,
                        visible,
                        "hashing loaded magazine"
                    );
                    hash ^= HIGHLIGHTED_MODIFIER.wrapping_add(visible.wrapping_shl(2));
                }
            },
            _ => {}
        }

        Ok(hash)
    }

    /// Fold the slots of `item`'s default preset into `hash`.
    pub fn container_hash(&self, hash: i32, item: &ItemDefinition) -> IResult<i32> {
        let catalog = self.catalog()?;
        let preset = catalog.default_preset_for(item.id()).ok_or_else(|| {
            Error::from(ErrorKind::MissingDefaultPreset {
                item_id: item.id().to_string(),
            })
        })?;
        debug!(item = item.id(), preset = preset.id(), "hashing default preset");

        let tree = PresetTree::build(preset)?;
        self.hash_slots(hash, &tree.slot_sequence(catalog))
    }

    fn hash_slots(&self, mut hash: i32, slots: &[SlotEntry<'_>]) -> IResult<i32> {
        for (idx, slot) in slots.iter().enumerate() {
            hash ^= string_hash(slot.name);

            // Consumed by the magazine slot before it.
            if slot.name == CARTRIDGES_SLOT {
                continue;
            }
            let Some(item_id) = slot.item() else {
                continue;
            };

            let cartridges = if slot.name == MAGAZINE_SLOT {
                slots
                    .get(idx + 1)
                    .filter(|next| next.name == CARTRIDGES_SLOT)
                    .and_then(CartridgeLoad::from_slot)
            } else {
                None
            };

            hash ^= self.single_item_hash(item_id, cartridges)?;
        }

        Ok(hash)
    }

    /// Hash every id, isolating failures per item.
    pub fn hash_items<'a>(&self, item_ids: impl IntoIterator<Item = &'a str>) -> HashedItems {
        let mut hashed = HashedItems::default();
        for item_id in item_ids {
            match self.item_hash(item_id) {
                Ok(hash) => hashed.insert(item_id, hash),
                Err(err) => {
                    warn!(item = item_id, "error hashing item: {err}");
                    hashed.failures.push((item_id.to_string(), err));
                }
            }
        }
        hashed
    }
}

impl HashedItems {
    pub fn insert(&mut self, item_id: &str, hash: i32) {
        if let Some(existing) = self.by_hash.get(&hash) {
            warn!(hash, existing = %existing, item = item_id, "fingerprint collision");
            return;
        }
        self.by_hash.insert(hash, item_id.to_string());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::{PresetConfig, PresetPart};
    use crate::categories;

    const STANAG: &str = "55d4887d4bdc2d962f8b4570";
    const AK12_MAG: &str = "5bed61680db834001d2c45ab";
    const SR1MP_MAG: &str = "59f99a7d86f7745b134aa97b";
    const GPNVG: &str = "5c0558060db834001b735271";

    fn magazine(id: &str, ranges: Option<&str>) -> ItemDefinition {
        ItemDefinition::builder()
            .id(id)
            .parent(categories::MAGAZINE)
            .cartridges(vec![CARTRIDGES_SLOT.into()])
            .maybe_visible_ammo_ranges(ranges)
            .build()
    }

    fn part(id: &str, tpl: &str, parent: &str, slot: &str) -> PresetPart {
        PresetPart::builder()
            .id(id)
            .tpl(tpl)
            .parent_id(parent)
            .slot_id(slot)
            .build()
    }

    fn cartridges(id: &str, stack: Option<u32>) -> PresetPart {
        PresetPart::builder()
            .id(id)
            .tpl("ammo")
            .parent_id("m")
            .slot_id(CARTRIDGES_SLOT)
            .maybe_stack_count(stack)
            .build()
    }

    fn pistol_catalog(loaded: Vec<PresetPart>) -> Catalog {
        let items = [
            ItemDefinition::builder()
                .id("pm")
                .parent(categories::PISTOL)
                .slots(vec![
                    "mod_pistol_grip".into(),
                    MAGAZINE_SLOT.into(),
                    "mod_reciever".into(),
                ])
                .chambers(vec!["patron_in_weapon".into()])
                .build(),
            magazine("pm_mag", Some("1-2;5-8")),
            ItemDefinition::builder()
                .id("grip")
                .parent("5a74651486f7744e73386dd1")
                .build(),
            ItemDefinition::builder()
                .id("ammo")
                .parent(categories::AMMO)
                .build(),
        ];

        let mut parts = vec![
            PresetPart::builder().id("w").tpl("pm").build(),
            part("m", "pm_mag", "w", MAGAZINE_SLOT),
            part("g", "grip", "w", "mod_pistol_grip"),
        ];
        parts.extend(loaded);

        let presets = [PresetConfig::builder()
            .id("pm_default")
            .base_id("pm")
            .is_default(true)
            .parts(parts)
            .build()];

        Catalog::new(items, presets, [])
    }

    #[test]
    fn string_hash_vectors() {
        assert_eq!(string_hash(""), 371857150);
        // The trailing odd unit never contributes.
        assert_eq!(string_hash("a"), 371857150);
        assert_eq!(string_hash("ab"), 1093630535);
        assert_eq!(string_hash(CARTRIDGES_SLOT), 1060355784);
        assert_eq!(string_hash("5448bd6b4bdc2dfc2f8b4569"), -1136272319);
    }

    #[test]
    fn string_hash_wraps_to_negative() {
        assert_eq!(string_hash(MAGAZINE_SLOT), -1801083473);
    }

    #[test]
    fn string_hash_uses_utf16_units() {
        // One astral code point is a surrogate pair, i.e. one full pair of units.
        assert_eq!(string_hash("😀"), 1126268081);
        assert_eq!(string_hash_utf16(&[0xD83D, 0xDE00]), 1126268081);
    }

    #[test]
    fn uninitialized_hasher_fails() {
        let hasher = ItemHasher::default();
        assert!(!hasher.is_initialized());
        let err = hasher.item_hash(STANAG).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotInitialized));
        assert!(hasher.single_item_hash(STANAG, None).is_err());
    }

    #[test]
    fn reference_vectors() {
        let items = [
            magazine(STANAG, Some("1-2;5-30")),
            magazine(AK12_MAG, None),
            magazine(SR1MP_MAG, None),
            ItemDefinition::builder()
                .id(GPNVG)
                .parent(categories::NIGHT_VISION)
                .build(),
        ];
        let mut hasher = ItemHasher::default();
        hasher.init(Catalog::new(items, [], []));

        assert_eq!(hasher.item_hash(STANAG).unwrap(), -304995614);
        assert_eq!(hasher.item_hash(AK12_MAG).unwrap(), 129279493);
        assert_eq!(hasher.item_hash(SR1MP_MAG).unwrap(), -1157986124);
        assert_eq!(hasher.item_hash(GPNVG).unwrap(), 1444116773);
    }

    #[test]
    fn unknown_and_empty_items() {
        let hasher = ItemHasher::new(Catalog::default());
        assert_eq!(hasher.single_item_hash("", None).unwrap(), 0);
        assert_eq!(
            hasher.single_item_hash("unknown", None).unwrap(),
            string_hash("unknown")
        );
        assert_eq!(
            hasher.item_hash("unknown").unwrap(),
            17 ^ string_hash("unknown")
        );
    }

    #[test]
    fn ammo_modifier() {
        let hasher = ItemHasher::new(pistol_catalog(vec![]));
        assert_eq!(hasher.item_hash("ammo").unwrap(), 1730070261);
        assert_eq!(hasher.item_hash("grip").unwrap(), -1018758657);
        assert_eq!(hasher.item_hash("pm_mag").unwrap(), 1211881932);
    }

    #[test]
    fn magazine_load_changes_hash() {
        let hasher = ItemHasher::new(pistol_catalog(vec![]));
        let empty = hasher.single_item_hash("pm_mag", None).unwrap();
        let loaded = hasher
            .single_item_hash(
                "pm_mag",
                Some(CartridgeLoad {
                    ammo_id: "ammo",
                    count: Some(6),
                }),
            )
            .unwrap();
        assert_eq!(empty, 1997039381);
        assert_eq!(loaded, 1997039450);
        assert_ne!(empty, loaded);
    }

    #[test]
    fn weapon_with_empty_magazine() {
        let hasher = ItemHasher::new(pistol_catalog(vec![]));
        assert_eq!(hasher.item_hash("pm").unwrap(), -2015257362);
    }

    #[test]
    fn weapon_with_loaded_magazine() {
        let hasher = ItemHasher::new(pistol_catalog(vec![cartridges("c", Some(6))]));
        assert_eq!(hasher.item_hash("pm").unwrap(), -2015257439);

        // 2 + 1 rounds; stacks without a size count once.
        let hasher = ItemHasher::new(pistol_catalog(vec![
            cartridges("c1", Some(2)),
            cartridges("c2", None),
        ]));
        assert_eq!(hasher.item_hash("pm").unwrap(), -2015257455);

        // No stack sizes at all: the magazine shows its largest count.
        let hasher = ItemHasher::new(pistol_catalog(vec![cartridges("c", None)]));
        assert_eq!(hasher.item_hash("pm").unwrap(), -2015257415);
    }

    #[test]
    fn hashing_is_deterministic() {
        let hasher = ItemHasher::new(pistol_catalog(vec![cartridges("c", Some(6))]));
        let first = hasher.item_hash("pm").unwrap();
        assert_eq!(hasher.item_hash("pm").unwrap(), first);
        assert_eq!(hasher.clone().item_hash("pm").unwrap(), first);
    }

    #[test]
    fn weapon_without_default_preset() {
        let items = [ItemDefinition::builder()
            .id("lonely")
            .parent(categories::SHOTGUN)
            .build()];
        let presets = [PresetConfig::builder()
            .id("not_default")
            .base_id("lonely")
            .parts(vec![PresetPart::builder().id("w").tpl("lonely").build()])
            .build()];
        let hasher = ItemHasher::new(Catalog::new(items, presets, []));

        match hasher.item_hash("lonely") {
            Err(Error {
                kind: ErrorKind::MissingDefaultPreset { item_id },
            }) => assert_eq!(item_id, "lonely"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn malformed_ranges_propagate() {
        let items = [
            ItemDefinition::builder()
                .id("gun")
                .parent(categories::SMG)
                .slots(vec![MAGAZINE_SLOT.into()])
                .build(),
            magazine("bad_mag", Some("1-x")),
            ItemDefinition::builder()
                .id("ammo")
                .parent(categories::AMMO)
                .build(),
        ];
        let presets = [PresetConfig::builder()
            .id("gun_default")
            .base_id("gun")
            .is_default(true)
            .parts(vec![
                PresetPart::builder().id("w").tpl("gun").build(),
                part("m", "bad_mag", "w", MAGAZINE_SLOT),
                cartridges("c", Some(10)),
            ])
            .build()];
        let hasher = ItemHasher::new(Catalog::new(items, presets, []));

        let err = hasher.item_hash("gun").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedRangeString { .. }));
        // Without a load the ranges are never consulted.
        assert!(hasher.item_hash("bad_mag").is_ok());
    }

    #[test]
    fn batch_isolates_failures() {
        let mut catalog_items: Vec<_> = vec![ItemDefinition::builder()
            .id("lonely")
            .parent(categories::SHOTGUN)
            .build()];
        catalog_items.push(magazine(STANAG, None));
        let hasher = ItemHasher::new(Catalog::new(catalog_items, [], []));

        let hashed = hasher.hash_items(["lonely", STANAG, STANAG]);
        assert_eq!(hashed.failures.len(), 1);
        assert_eq!(hashed.failures[0].0, "lonely");
        assert_eq!(hashed.by_hash.len(), 1);
        assert_eq!(
            hashed.by_hash.get(&-304995614).map(String::as_str),
            Some(STANAG)
        );
    }
}
