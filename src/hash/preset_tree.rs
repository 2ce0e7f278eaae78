//! Rebuilds a preset's attachment tree from its flat parts list and flattens it
//! into the slot sequence the icon cache hashes.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{Catalog, PresetConfig, PresetPart};
use crate::error::ErrorKind;

/// One declared slot in traversal order, with whatever is attached to it.
#[derive(Debug, Clone)]
pub struct SlotEntry<'a> {
    pub name: &'a str,
    /// Parts attached at this slot, in parts-list order. Usually zero or one;
    /// cartridge slots may hold several ammo stacks.
    pub parts: Vec<&'a PresetPart>,
}

impl<'a> SlotEntry<'a> {
    /// Item id assigned to this slot.
    pub fn item(&self) -> Option<&'a str> {
        self.parts.first().map(|part| part.tpl())
    }
}

#[derive(Debug)]
struct Node<'a> {
    part: &'a PresetPart,
    /// `(slot name, node index)` in parts-list order.
    children: Vec<(&'a str, usize)>,
}

/// Arena of a preset's parts with children attached by slot name.
#[derive(Debug)]
pub struct PresetTree<'a> {
    nodes: Vec<Node<'a>>,
    root: usize,
}

impl<'a> PresetTree<'a> {
    pub fn build(preset: &'a PresetConfig) -> Result<Self, ErrorKind> {
        let malformed = |reason: String| ErrorKind::MalformedPreset {
            preset_id: preset.id().to_string(),
            reason,
        };

        let parts = preset.parts();
        let mut nodes = Vec::with_capacity(parts.len());
        let mut by_instance = HashMap::with_capacity(parts.len());
        let mut root = None;

        for (idx, part) in parts.iter().enumerate() {
            if by_instance.insert(part.id(), idx).is_some() {
                return Err(malformed(format!("duplicate part id {}", part.id())));
            }
            if part.is_root() {
                if root.replace(idx).is_some() {
                    return Err(malformed("more than one root part".to_string()));
                }
            }
            nodes.push(Node {
                part,
                children: Vec::new(),
            });
        }

        let root = root.ok_or_else(|| malformed("no root part".to_string()))?;

        for (idx, part) in parts.iter().enumerate() {
            if idx == root {
                continue;
            }
            let (Some(parent_id), Some(slot_id)) = (part.parent_id(), part.slot_id()) else {
                return Err(malformed(format!(
                    "part {} has only one of parent and slot",
                    part.id()
                )));
            };
            let parent = *by_instance.get(parent_id).ok_or_else(|| {
                malformed(format!(
                    "part {} references unknown parent {parent_id}",
                    part.id()
                ))
            })?;
            nodes[parent].children.push((slot_id, idx));
        }

        let tree = PresetTree { nodes, root };
        let reachable = tree.reachable_count();
        if reachable != tree.nodes.len() {
            return Err(malformed(format!(
                "{} parts are not reachable from the root",
                tree.nodes.len() - reachable
            )));
        }

        Ok(tree)
    }

    pub fn root(&self) -> &'a PresetPart {
        self.nodes[self.root].part
    }

    fn reachable_count(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        let mut count = 0;
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut seen[idx], true) {
                continue;
            }
            count += 1;
            stack.extend(self.nodes[idx].children.iter().map(|&(_, child)| child));
        }
        count
    }

    /// Depth-first walk over the root's declared slots. Attached items are
    /// expanded in place, right after the slot that holds them.
    pub fn slot_sequence(&self, catalog: &'a Catalog) -> Vec<SlotEntry<'a>> {
        let mut out = Vec::new();
        self.emit(catalog, self.root, &mut out);
        out
    }

    fn emit(&self, catalog: &'a Catalog, idx: usize, out: &mut Vec<SlotEntry<'a>>) {
        let node = &self.nodes[idx];
        let Some(item) = catalog.item_by_id(node.part.tpl()) else {
            debug!(tpl = node.part.tpl(), "no item definition for preset part");
            return;
        };

        for name in item.slot_names() {
            let attached: Vec<usize> = node
                .children
                .iter()
                .filter(|(slot, _)| *slot == name)
                .map(|&(_, child)| child)
                .collect();

            out.push(SlotEntry {
                name,
                parts: attached.iter().map(|&child| self.nodes[child].part).collect(),
            });

            if let Some(&first) = attached.first() {
                self.emit(catalog, first, out);
            }
        }
    }
}

/// Slot sequence of an item on its own, with nothing attached.
pub fn bare_slot_sequence<'a>(catalog: &'a Catalog, item_id: &str) -> Vec<SlotEntry<'a>> {
    catalog
        .item_by_id(item_id)
        .map(|item| {
            item.slot_names()
                .map(|name| SlotEntry {
                    name,
                    parts: Vec::new(),
                })
                .collect()
        })
        .unwrap_or_default()
}
