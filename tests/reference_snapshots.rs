//! Checks fingerprints against values read from a live icon cache.
//!
//! Needs real game snapshots, so it only runs when `ICONHASH_FIXTURES_DIR`
//! points at a directory holding `items.json`, `presets.json` and
//! `preset_listing.json`.
#![cfg(feature = "json")]

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use iconhash::ItemHasher;
use iconhash::catalog::json::read_catalog;

const VECTORS: &[(&str, i32)] = &[
    // PM pistol
    ("5448bd6b4bdc2dfc2f8b4569", 430064332),
    // AKS-74U
    ("57dc2fa62459775949412633", 592229284),
    // AS VAL
    ("57c44b372459772d2b39b8ce", 658560108),
    // STANAG 30-round magazine
    ("55d4887d4bdc2d962f8b4570", -304995614),
    // AK-12 magazine
    ("5bed61680db834001d2c45ab", 129279493),
    // SR-1MP magazine
    ("59f99a7d86f7745b134aa97b", -1157986124),
    // GPNVG-18
    ("5c0558060db834001b735271", 1444116773),
];

fn open(dir: &PathBuf, name: &str) -> BufReader<File> {
    BufReader::new(File::open(dir.join(name)).unwrap())
}

#[test]
fn matches_icon_cache() {
    let Some(dir) = std::env::var_os("ICONHASH_FIXTURES_DIR").map(PathBuf::from) else {
        eprintln!("ICONHASH_FIXTURES_DIR not set, skipping");
        return;
    };

    let catalog = read_catalog(
        open(&dir, "items.json"),
        open(&dir, "presets.json"),
        open(&dir, "preset_listing.json"),
    )
    .unwrap();
    let hasher = ItemHasher::new(catalog);

    for &(id, expected) in VECTORS {
        assert_eq!(hasher.item_hash(id).unwrap(), expected, "fingerprint of {id}");
    }
}
