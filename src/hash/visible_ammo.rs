//! Magazine visible-ammo buckets.
//!
//! Magazine models only show a handful of distinct round counts. The game
//! describes them as `VisibleAmmoRangesString`, e.g. `"1-2;5-10"`, and snaps
//! any loaded count to one of those buckets before hashing.

use itertools::Itertools;

use crate::error::ErrorKind;

/// Used when a magazine declares no ranges.
pub const DEFAULT_RANGES: &[VisibleAmmoRange] = &[VisibleAmmoRange { start: 1, end: 2 }];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleAmmoRange {
    pub start: i32,
    pub end: i32,
}

/// Parse a raw range string. `None` or an empty string yields [`DEFAULT_RANGES`].
pub fn parse_ranges(item_id: &str, raw: Option<&str>) -> Result<Vec<VisibleAmmoRange>, ErrorKind> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Ok(DEFAULT_RANGES.to_vec());
    };

    let malformed = || ErrorKind::MalformedRangeString {
        item_id: item_id.to_string(),
        raw: raw.to_string(),
    };

    raw.split(';')
        .map(|range| -> Result<VisibleAmmoRange, ErrorKind> {
            let (start, end) = range.split('-').collect_tuple().ok_or_else(malformed)?;
            Ok(VisibleAmmoRange {
                start: start.trim().parse().map_err(|_| malformed())?,
                end: end.trim().parse().map_err(|_| malformed())?,
            })
        })
        .collect()
}

/// Snap `cartridge_count` to a count the magazine model can display.
pub fn visible_ammo_count(ranges: &[VisibleAmmoRange], cartridge_count: i32) -> i32 {
    let ranges = if ranges.is_empty() {
        DEFAULT_RANGES
    } else {
        ranges
    };

    for (i, range) in ranges.iter().enumerate() {
        if range.start <= cartridge_count && cartridge_count <= range.end {
            return cartridge_count;
        }
        if cartridge_count < range.start {
            return if i == 0 {
                range.start
            } else {
                ranges[i - 1].end
            };
        }
    }

    // Above every bucket.
    ranges[ranges.len() - 1].end
}

/// The highest count the magazine can display.
pub fn max_visible_ammo(ranges: &[VisibleAmmoRange]) -> i32 {
    ranges.last().unwrap_or(&DEFAULT_RANGES[0]).end
}
