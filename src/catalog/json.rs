//! Readers for the JSON snapshots the catalogs are published as.
//!
//! Three files are involved:
//! - the item database (`{ "<id>": { "_id", "_parent", "_props": { .. } } }`),
//! - the game's preset snapshot (`{ "<id>": { "_id", "_items": [..], "_encyclopedia" } }`),
//! - the preset listing that flags default presets
//!   (`{ "<id>": { "id", "name", "baseId", "default" } }`).

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::{
    Catalog, ItemDefinition, LegacyPreset, PresetConfig, PresetPart, SlotDefinition,
};
use crate::error::IResult;

#[derive(Debug, Deserialize)]
struct RawSlot {
    #[serde(rename = "_name")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawItemProps {
    #[serde(default)]
    slots: Vec<RawSlot>,
    #[serde(default)]
    cartridges: Vec<RawSlot>,
    #[serde(default)]
    chambers: Vec<RawSlot>,
    visible_ammo_ranges_string: Option<String>,
    short_name: Option<String>,
    background_color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_parent", default)]
    parent: String,
    #[serde(rename = "_props", default)]
    props: RawItemProps,
}

#[derive(Debug, Default, Deserialize)]
struct RawUpd {
    #[serde(rename = "StackObjectsCount")]
    stack_objects_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPresetItem {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_tpl")]
    tpl: String,
    #[serde(rename = "parentId")]
    parent_id: Option<String>,
    #[serde(rename = "slotId")]
    slot_id: Option<String>,
    upd: Option<RawUpd>,
}

/// A preset as stored in the game's preset snapshot.
#[derive(Debug, Deserialize)]
pub struct GamePreset {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_name")]
    name: Option<String>,
    #[serde(rename = "_items", default)]
    items: Vec<RawPresetItem>,
    #[serde(rename = "_encyclopedia")]
    encyclopedia: Option<String>,
}

impl GamePreset {
    fn root_tpl(&self) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.parent_id.is_none() && item.slot_id.is_none())
            .map(|item| item.tpl.as_str())
    }
}

/// An entry of the preset listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetListing {
    id: String,
    name: String,
    base_id: String,
    #[serde(default)]
    default: bool,
}

fn convert_slots(slots: Vec<RawSlot>) -> Vec<SlotDefinition> {
    slots
        .into_iter()
        .map(|slot| SlotDefinition::new(slot.name))
        .collect()
}

impl From<RawItem> for ItemDefinition {
    fn from(raw: RawItem) -> Self {
        let props = raw.props;
        ItemDefinition::builder()
            .id(raw.id)
            .parent(raw.parent)
            .slots(convert_slots(props.slots))
            .cartridges(convert_slots(props.cartridges))
            .chambers(convert_slots(props.chambers))
            .maybe_visible_ammo_ranges(props.visible_ammo_ranges_string)
            .maybe_short_name(props.short_name)
            .maybe_background_color(props.background_color)
            .build()
    }
}

impl From<RawPresetItem> for PresetPart {
    fn from(raw: RawPresetItem) -> Self {
        PresetPart::builder()
            .id(raw.id)
            .tpl(raw.tpl)
            .maybe_parent_id(raw.parent_id)
            .maybe_slot_id(raw.slot_id)
            .maybe_stack_count(raw.upd.and_then(|upd| upd.stack_objects_count))
            .build()
    }
}

/// Read the item database.
pub fn read_items<R: Read>(reader: R) -> IResult<Vec<ItemDefinition>> {
    let raw: BTreeMap<String, RawItem> = serde_json::from_reader(reader)?;
    Ok(raw.into_values().map(ItemDefinition::from).collect())
}

/// Read the game's preset snapshot.
pub fn read_game_presets<R: Read>(reader: R) -> IResult<Vec<GamePreset>> {
    let raw: BTreeMap<String, GamePreset> = serde_json::from_reader(reader)?;
    Ok(raw.into_values().collect())
}

/// Read the preset listing.
pub fn read_preset_listing<R: Read>(reader: R) -> IResult<Vec<PresetListing>> {
    let raw: BTreeMap<String, PresetListing> = serde_json::from_reader(reader)?;
    Ok(raw.into_values().collect())
}

/// Combine the game's presets with the listing that names them and marks the
/// defaults. Listing entries become the display-name presets.
pub fn join_presets(
    game_presets: Vec<GamePreset>,
    listing: Vec<PresetListing>,
) -> (Vec<PresetConfig>, Vec<LegacyPreset>) {
    let mut listing_by_id: BTreeMap<&str, &PresetListing> =
        listing.iter().map(|entry| (entry.id.as_str(), entry)).collect();

    let mut configs = Vec::with_capacity(game_presets.len());
    for preset in game_presets {
        let listed = listing_by_id.remove(preset.id.as_str());
        let Some(base_id) = listed
            .map(|entry| entry.base_id.clone())
            .or_else(|| preset.encyclopedia.clone())
            .or_else(|| preset.root_tpl().map(str::to_string))
        else {
            warn!(preset = %preset.id, "preset has no base item, skipping");
            continue;
        };

        configs.push(
            PresetConfig::builder()
                .id(preset.id)
                .maybe_name(listed.map(|entry| entry.name.clone()).or(preset.name))
                .base_id(base_id)
                .is_default(listed.is_some_and(|entry| entry.default))
                .parts(preset.items.into_iter().map(PresetPart::from).collect())
                .build(),
        );
    }

    for id in listing_by_id.keys() {
        debug!(preset = %id, "listed preset missing from game snapshot");
    }

    let legacy = listing
        .into_iter()
        .map(|entry| {
            LegacyPreset::builder()
                .id(entry.id)
                .name(entry.name)
                .base_id(entry.base_id)
                .build()
        })
        .collect();

    (configs, legacy)
}

/// Read all three snapshots and build a [`Catalog`].
pub fn read_catalog<I: Read, P: Read, L: Read>(
    items: I,
    game_presets: P,
    preset_listing: L,
) -> IResult<Catalog> {
    let items = read_items(items)?;
    let (presets, legacy) = join_presets(
        read_game_presets(game_presets)?,
        read_preset_listing(preset_listing)?,
    );
    debug!(
        items = items.len(),
        presets = presets.len(),
        listed = legacy.len(),
        "catalog loaded"
    );
    Ok(Catalog::new(items, presets, legacy))
}
