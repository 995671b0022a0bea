// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use banview_app::{BanRecord, BanSnapshot, InstanceInfo};
use time::{Duration, OffsetDateTime};
use time::macros::datetime;

const BAN_REASONS: [&str; 8] = [
    "abuse",
    "antibot",
    "bad behavior",
    "blacklist",
    "bruteforce",
    "rate limit",
    "scanner",
    "spam",
];

const BAN_PERIODS: [&str; 2] = ["ban", "greban"];

const INSTANCES: [(&str, &str); 5] = [
    ("host", "local"),
    ("edge-1", "container"),
    ("edge-2", "container"),
    ("edge-3", "container"),
    ("gw-static", "static"),
];

const BAN_DURATIONS_HOURS: [i64; 6] = [1, 6, 12, 24, 72, 168];

/// Fixed clock the generated data is anchored to, so rendered remaining
/// times are reproducible.
pub fn reference_now() -> OffsetDateTime {
    datetime!(2026-08-04 12:00 UTC)
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x6C62_272E_07BB_0142;
        if state == 0 {
            state = 0x2545_F491_4F6C_DD1D;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut x = self.state;
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        x ^ (x >> 31)
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, one_in: u64) -> bool {
        self.next_u64() % one_in == 0
    }
}

/// Deterministic ban data for demos and tests: the same seed always
/// produces the same snapshot.
#[derive(Debug, Clone)]
pub struct BanFaker {
    rng: DeterministicRng,
}

impl BanFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
        }
    }

    pub fn instances(&self) -> Vec<InstanceInfo> {
        INSTANCES
            .iter()
            .map(|(name, kind)| InstanceInfo {
                name: (*name).to_owned(),
                kind: (*kind).to_owned(),
            })
            .collect()
    }

    pub fn ip(&mut self) -> String {
        if self.rng.chance(8) {
            return format!("2001:db8::{:x}", self.rng.int_n(0xFFFF).max(1));
        }
        format!(
            "{}.{}.{}.{}",
            [10, 172, 192, 203][self.rng.int_n(4)],
            self.rng.int_n(224),
            self.rng.int_n(256),
            self.rng.int_n(254) + 1,
        )
    }

    pub fn ban(&mut self) -> BanRecord {
        let period = BAN_PERIODS[self.rng.int_n(BAN_PERIODS.len())];
        let instance = INSTANCES[self.rng.int_n(INSTANCES.len())].0;
        let started_hours_ago = self.rng.int_n(24 * 7) as i64;
        let ban_start = reference_now() - Duration::hours(started_hours_ago);

        // global bans are occasionally permanent
        let ban_end = if period == "greban" && self.rng.chance(3) {
            None
        } else {
            let lasts = BAN_DURATIONS_HOURS[self.rng.int_n(BAN_DURATIONS_HOURS.len())];
            Some(ban_start + Duration::hours(lasts))
        };

        BanRecord {
            ip: self.ip(),
            reason: BAN_REASONS[self.rng.int_n(BAN_REASONS.len())].to_owned(),
            period: period.to_owned(),
            instance: instance.to_owned(),
            ban_start,
            ban_end,
        }
    }

    pub fn snapshot(&mut self, count: usize) -> BanSnapshot {
        BanSnapshot {
            instances: self.instances(),
            bans: (0..count).map(|_| self.ban()).collect(),
        }
    }
}
