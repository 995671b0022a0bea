// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use banview_app::{BanRecord, BanSnapshot};
use banview_testkit::BanFaker;
use banview_tui::BanSource;
use std::fs;
use std::path::Path;

/// A ban source over an in-memory snapshot, loaded once from a local JSON
/// export or seeded from the demo faker. Scope selection filters the held
/// snapshot; nothing is ever fetched.
#[derive(Debug)]
pub struct SnapshotRuntime {
    snapshot: BanSnapshot,
}

impl SnapshotRuntime {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read snapshot file {}", path.display()))?;
        let snapshot: BanSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parse snapshot JSON {}", path.display()))?;
        snapshot
            .validate()
            .with_context(|| format!("validate snapshot {}", path.display()))?;
        Ok(Self { snapshot })
    }

    pub fn demo(seed: u64) -> Self {
        let mut faker = BanFaker::new(seed);
        Self {
            snapshot: faker.snapshot(48),
        }
    }

    pub fn snapshot(&self) -> &BanSnapshot {
        &self.snapshot
    }
}

impl BanSource for SnapshotRuntime {
    fn load_snapshot(&mut self) -> Result<BanSnapshot> {
        Ok(self.snapshot.clone())
    }

    fn load_bans(&mut self, instance: &str) -> Result<Vec<BanRecord>> {
        Ok(self.snapshot.bans_for_instance(instance))
    }
}
