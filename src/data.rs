// Record sources for the binary: a JSON file, or generated demo data.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::records::Record;

const SYLLABLES: &[&str] = &[
    "zen", "flo", "qua", "bix", "lum", "tro", "vex", "ora", "pix", "dro",
    "nom", "kai", "rho", "sy", "tek", "vio", "mur", "jax", "pel", "ux",
];
const SUFFIXES: &[&str] = &["ly", "io", "ify", "hub", "base", "wise", ".ai", "labs"];
const CATEGORIES: &[&str] = &["fintech", "hardware", "social", "media", "health", "crypto", "food"];
const CAUSES: &[&str] = &[
    "ran out of runway",
    "no product-market fit",
    "outcompeted",
    "regulatory trouble",
    "founder split",
    "acquired and shut down",
];

/// Parse a JSON array of records. Every field other than `id` is kept as payload.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading records from {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&text)
        .with_context(|| format!("parsing records in {}", path.display()))?;

    let mut seen = HashSet::new();
    let duplicates = records.iter().filter(|r| !seen.insert(r.id)).count();
    if duplicates > 0 {
        log::warn!("{} has {duplicates} duplicate record ids", path.display());
    }

    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Deterministic fake records for running without a data file.
pub fn demo_records(count: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let parts = rng.gen_range(1..=2);
            let mut name: String = (0..parts)
                .map(|_| SYLLABLES[rng.gen_range(0..SYLLABLES.len())])
                .collect();
            name.push_str(SUFFIXES[rng.gen_range(0..SUFFIXES.len())]);
            if let Some(first) = name.get(..1) {
                name = first.to_uppercase() + &name[1..];
            }

            let founded = rng.gen_range(1998..=2020);
            let lifetime = rng.gen_range(1..=8);
            Record::new(i as i64 + 1)
                .with_field("name", name)
                .with_field("category", CATEGORIES[rng.gen_range(0..CATEGORIES.len())])
                .with_field("founded", founded)
                .with_field("died", founded + lifetime)
                .with_field("raised_usd", rng.gen_range(1u64..500) * 1_000_000)
                .with_field("cause", CAUSES[rng.gen_range(0..CAUSES.len())])
        })
        .collect()
}
