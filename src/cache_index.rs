//! The game's icon cache `index.json`.
//!
//! The file maps fingerprints (as decimal strings) to the number of the
//! `<n>.png` file that holds the rendered icon.

use std::collections::HashMap;
use std::io::Read;

use tracing::warn;

use crate::error::IResult;

#[derive(Debug, Default, Clone)]
pub struct CacheIndex {
    icons: HashMap<i32, u32>,
}

impl CacheIndex {
    pub fn from_reader<R: Read>(reader: R) -> IResult<Self> {
        let raw: HashMap<String, u32> = serde_json::from_reader(reader)?;
        let icons = raw
            .into_iter()
            .filter_map(|(key, icon)| match key.parse::<i32>() {
                Ok(hash) => Some((hash, icon)),
                Err(_) => {
                    warn!(key = %key, "ignoring non-numeric cache index key");
                    None
                }
            })
            .collect();
        Ok(CacheIndex { icons })
    }

    pub fn icon_for(&self, hash: i32) -> Option<u32> {
        self.icons.get(&hash).copied()
    }

    /// File name of the cached icon for `hash`, relative to the cache folder.
    pub fn icon_file_name(&self, hash: i32) -> Option<String> {
        self.icon_for(hash).map(|icon| format!("{icon}.png"))
    }

    /// Reverse lookup from an icon file number.
    pub fn hash_for_icon(&self, icon: u32) -> Option<i32> {
        self.icons
            .iter()
            .find_map(|(&hash, &candidate)| (candidate == icon).then_some(hash))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.icons.iter().map(|(&hash, &icon)| (hash, icon))
    }
}
