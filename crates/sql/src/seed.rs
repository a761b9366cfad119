//! Synthetic subscriber snapshot for local runs and tests.

use copilot_core::{AppError, AppResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Seed used by the CLI when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// First subscriber id handed out.
pub const FIRST_SUBSCRIBER_ID: i64 = 1001;

const SCHEMA: &str = r#"
DROP TABLE IF EXISTS subscribers;
CREATE TABLE subscribers (
    subscriber_id     INTEGER PRIMARY KEY,
    segment_label     TEXT    NOT NULL,
    churn_probability REAL    NOT NULL,
    monthly_charges   REAL    NOT NULL,
    contract_type     TEXT    NOT NULL,
    tenure            INTEGER NOT NULL
);
"#;

const MONTHLY: &str = "Month-to-month";
const ONE_YEAR: &str = "One year";
const TWO_YEAR: &str = "Two year";

/// Value ranges for one behavioural segment.
#[derive(Debug, Clone)]
pub struct SegmentProfile {
    pub label: &'static str,
    pub churn: RangeInclusive<f64>,
    pub charges: RangeInclusive<f64>,
    pub tenure: RangeInclusive<i64>,
    /// Weighted by repetition
    pub contracts: Vec<&'static str>,
    pub count: usize,
}

fn weighted(parts: &[(&'static str, usize)]) -> Vec<&'static str> {
    parts
        .iter()
        .flat_map(|(name, n)| std::iter::repeat(*name).take(*n))
        .collect()
}

/// The four segments of the snapshot, 20 subscribers each.
pub fn segment_profiles() -> Vec<SegmentProfile> {
    vec![
        SegmentProfile {
            label: "Early High-Risk",
            churn: 0.60..=0.90,
            charges: 70.0..=110.0,
            tenure: 1..=12,
            contracts: weighted(&[(MONTHLY, 9), (ONE_YEAR, 1)]),
            count: 20,
        },
        SegmentProfile {
            label: "At-Risk Mid-Value",
            churn: 0.30..=0.60,
            charges: 50.0..=85.0,
            tenure: 6..=36,
            contracts: weighted(&[(MONTHLY, 6), (ONE_YEAR, 3), (TWO_YEAR, 1)]),
            count: 20,
        },
        SegmentProfile {
            label: "Loyal High-Value",
            churn: 0.15..=0.40,
            charges: 80.0..=130.0,
            tenure: 24..=72,
            contracts: weighted(&[(MONTHLY, 2), (ONE_YEAR, 4), (TWO_YEAR, 4)]),
            count: 20,
        },
        SegmentProfile {
            label: "Stable Low-Value",
            churn: 0.05..=0.20,
            charges: 20.0..=50.0,
            tenure: 12..=60,
            contracts: weighted(&[(MONTHLY, 2), (ONE_YEAR, 4), (TWO_YEAR, 4)]),
            count: 20,
        },
    ]
}

/// One generated row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriberRow {
    pub subscriber_id: i64,
    pub segment_label: &'static str,
    pub churn_probability: f64,
    pub monthly_charges: f64,
    pub contract_type: &'static str,
    pub tenure: i64,
}

/// Outcome of [`seed_database`].
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub path: PathBuf,
    pub rows: usize,
    pub seed: u64,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Generate the snapshot rows. The same seed always yields the same rows.
pub fn generate_rows(seed: u64) -> Vec<SubscriberRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::new();
    let mut next_id = FIRST_SUBSCRIBER_ID;

    for profile in segment_profiles() {
        for _ in 0..profile.count {
            let churn_probability = round_to(rng.gen_range(profile.churn.clone()), 4);
            let monthly_charges = round_to(rng.gen_range(profile.charges.clone()), 2);
            let tenure = rng.gen_range(profile.tenure.clone());
            let contract_type = profile.contracts.choose(&mut rng).copied().unwrap_or(MONTHLY);

            rows.push(SubscriberRow {
                subscriber_id: next_id,
                segment_label: profile.label,
                churn_probability,
                monthly_charges,
                contract_type,
                tenure,
            });
            next_id += 1;
        }
    }

    rows
}

/// (Re)create the `subscribers` table at `path` and fill it.
///
/// Any existing table is dropped first. Parent directories are created.
pub fn seed_database(path: &Path, seed: u64) -> AppResult<SeedReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let rows = generate_rows(seed);
    let mut conn = Connection::open(path).map_err(seed_error)?;
    conn.execute_batch(SCHEMA).map_err(seed_error)?;

    let tx = conn.transaction().map_err(seed_error)?;
    {
        let mut stmt = tx
            .prepare("INSERT INTO subscribers VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
            .map_err(seed_error)?;
        for row in &rows {
            stmt.execute(params![
                row.subscriber_id,
                row.segment_label,
                row.churn_probability,
                row.monthly_charges,
                row.contract_type,
                row.tenure,
            ])
            .map_err(seed_error)?;
        }
    }
    tx.commit().map_err(seed_error)?;

    tracing::info!("Seeded {} subscribers into {:?}", rows.len(), path);
    Ok(SeedReport {
        path: path.to_path_buf(),
        rows: rows.len(),
        seed,
    })
}

fn seed_error(e: rusqlite::Error) -> AppError {
    AppError::Sql(format!("Seeding failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, SubscriberStore};
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_generate_rows_shape() {
        let rows = generate_rows(DEFAULT_SEED);
        assert_eq!(rows.len(), 80);
        assert_eq!(rows[0].subscriber_id, 1001);
        assert_eq!(rows[79].subscriber_id, 1080);

        let mut per_segment: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            *per_segment.entry(row.segment_label).or_default() += 1;
        }
        assert_eq!(per_segment.len(), 4);
        assert!(per_segment.values().all(|n| *n == 20));
    }

    #[test]
    fn test_generate_rows_respects_ranges() {
        let profiles: HashMap<&str, SegmentProfile> = segment_profiles()
            .into_iter()
            .map(|p| (p.label, p))
            .collect();

        for row in generate_rows(7) {
            let profile = &profiles[row.segment_label];
            // rounding can nudge a value onto the bound, never past it
            assert!(profile.churn.contains(&row.churn_probability), "{:?}", row);
            assert!(profile.charges.contains(&row.monthly_charges), "{:?}", row);
            assert!(profile.tenure.contains(&row.tenure), "{:?}", row);
            assert!(profile.contracts.contains(&row.contract_type), "{:?}", row);
            assert_eq!(round_to(row.churn_probability, 4), row.churn_probability);
            assert_eq!(round_to(row.monthly_charges, 2), row.monthly_charges);
        }
    }

    #[test]
    fn test_generate_rows_deterministic() {
        assert_eq!(generate_rows(42), generate_rows(42));
        assert_ne!(generate_rows(42), generate_rows(43));
    }

    #[test]
    fn test_seed_database_readable_by_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("subscriber_sample.db");

        let report = seed_database(&path, DEFAULT_SEED).unwrap();
        assert_eq!(report.rows, 80);

        let store = SqliteStore::new(&path);
        let table = store
            .query("SELECT segment_label, COUNT(*) FROM subscribers GROUP BY segment_label")
            .unwrap();
        assert_eq!(table.rows.len(), 4);
        assert!(table.rows.iter().all(|r| r[1] == "20"));
    }

    #[test]
    fn test_reseed_replaces_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subs.db");

        seed_database(&path, 1).unwrap();
        seed_database(&path, 2).unwrap();

        let table = SqliteStore::new(&path)
            .query("SELECT COUNT(*) FROM subscribers")
            .unwrap();
        assert_eq!(table.rows[0][0], "80");
    }
}
