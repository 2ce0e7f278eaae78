/// Loaders for the JSON snapshots the catalogs are normally distributed as
#[cfg(feature = "json")]
pub mod json;

use std::collections::HashMap;

use bon::Builder;
use tracing::warn;

use crate::categories::ItemCategory;

/// A named attachment point declared by an item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotDefinition {
    name: String,
}

impl SlotDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for SlotDefinition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One entry of the item database.
#[derive(Clone, Debug, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    #[builder(into)]
    id: String,
    #[builder(into)]
    parent: String,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    slots: Vec<SlotDefinition>,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    cartridges: Vec<SlotDefinition>,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    chambers: Vec<SlotDefinition>,
    #[builder(into)]
    visible_ammo_ranges: Option<String>,
    #[builder(into)]
    short_name: Option<String>,
    #[builder(into)]
    background_color: Option<String>,
}

impl ItemDefinition {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw category id (`_parent`).
    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn category(&self) -> Option<ItemCategory> {
        ItemCategory::from_parent_id(&self.parent)
    }

    pub fn slots(&self) -> &[SlotDefinition] {
        &self.slots
    }

    pub fn cartridges(&self) -> &[SlotDefinition] {
        &self.cartridges
    }

    pub fn chambers(&self) -> &[SlotDefinition] {
        &self.chambers
    }

    /// Every declared slot name: regular slots, then cartridge slots, then
    /// chambers, each group in declaration order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .chain(self.cartridges.iter())
            .chain(self.chambers.iter())
            .map(SlotDefinition::name)
    }

    /// Raw `VisibleAmmoRangesString`, if present and non-empty.
    pub fn visible_ammo_ranges(&self) -> Option<&str> {
        self.visible_ammo_ranges
            .as_deref()
            .filter(|ranges| !ranges.is_empty())
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }
}

/// One item instance inside a preset's flat parts list.
#[derive(Clone, Debug, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresetPart {
    #[builder(into)]
    id: String,
    #[builder(into)]
    tpl: String,
    #[builder(into)]
    parent_id: Option<String>,
    #[builder(into)]
    slot_id: Option<String>,
    stack_count: Option<u32>,
}

impl PresetPart {
    /// Instance id, unique within the preset.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item definition id of this part.
    pub fn tpl(&self) -> &str {
        &self.tpl
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn slot_id(&self) -> Option<&str> {
        self.slot_id.as_deref()
    }

    pub fn stack_count(&self) -> Option<u32> {
        self.stack_count
    }

    /// The root part carries neither a parent nor a slot.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none() && self.slot_id.is_none()
    }
}

/// A concrete loadout of a weapon.
#[derive(Clone, Debug, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresetConfig {
    #[builder(into)]
    id: String,
    #[builder(into)]
    name: Option<String>,
    #[builder(into)]
    base_id: String,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    is_default: bool,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    parts: Vec<PresetPart>,
}

impl PresetConfig {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn parts(&self) -> &[PresetPart] {
        &self.parts
    }
}

/// Display information for a preset, keyed by preset id.
#[derive(Clone, Debug, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyPreset {
    #[builder(into)]
    id: String,
    #[builder(into)]
    name: String,
    #[builder(into)]
    base_id: String,
}

impl LegacyPreset {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }
}

/// Read-only view over the item database and the two preset datasets.
#[derive(Debug, Default)]
pub struct Catalog {
    items: HashMap<String, ItemDefinition>,
    presets: Vec<PresetConfig>,
    preset_index: HashMap<String, usize>,
    default_presets: HashMap<String, usize>,
    legacy_presets: HashMap<String, LegacyPreset>,
}

impl Catalog {
    pub fn new(
        items: impl IntoIterator<Item = ItemDefinition>,
        presets: impl IntoIterator<Item = PresetConfig>,
        legacy_presets: impl IntoIterator<Item = LegacyPreset>,
    ) -> Self {
        let items: HashMap<String, ItemDefinition> = items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();

        let presets: Vec<PresetConfig> = presets.into_iter().collect();
        let mut preset_index = HashMap::with_capacity(presets.len());
        let mut default_presets = HashMap::new();
        for (idx, preset) in presets.iter().enumerate() {
            preset_index.insert(preset.id.clone(), idx);
            if !preset.is_default {
                continue;
            }
            if default_presets.contains_key(&preset.base_id) {
                warn!(
                    base_id = %preset.base_id,
                    preset_id = %preset.id,
                    "multiple default presets, keeping the first"
                );
                continue;
            }
            default_presets.insert(preset.base_id.clone(), idx);
        }

        let legacy_presets = legacy_presets
            .into_iter()
            .map(|preset| (preset.id.clone(), preset))
            .collect();

        Catalog {
            items,
            presets,
            preset_index,
            default_presets,
            legacy_presets,
        }
    }

    pub fn item_by_id(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    pub fn preset_by_id(&self, id: &str) -> Option<&PresetConfig> {
        self.preset_index.get(id).map(|&idx| &self.presets[idx])
    }

    pub fn presets(&self) -> &[PresetConfig] {
        &self.presets
    }

    /// The preset flagged as default for `base_id`.
    pub fn default_preset_for(&self, base_id: &str) -> Option<&PresetConfig> {
        self.default_presets
            .get(base_id)
            .map(|&idx| &self.presets[idx])
    }

    pub fn legacy_preset_by_id(&self, id: &str) -> Option<&LegacyPreset> {
        self.legacy_presets.get(id)
    }

    /// Label for an icon: the preset name when `id` is a preset, otherwise the
    /// item's short name. Line breaks are removed.
    pub fn display_name(&self, id: &str) -> Option<String> {
        let raw = self
            .legacy_preset_by_id(id)
            .map(LegacyPreset::name)
            .or_else(|| self.item_by_id(id).and_then(ItemDefinition::short_name))?;

        let name = raw.trim().replace(['\r', '\n'], "");
        if name.is_empty() { None } else { Some(name) }
    }
}
