// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Scope tag that hides the date-range inputs when committed in the
/// instances widget.
pub const LOCAL_SCOPE_TAG: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordField {
    Ip,
    BanStart,
    BanEnd,
    Remain,
    Period,
    Reason,
}

impl RecordField {
    pub const ALL: [Self; 6] = [
        Self::Ip,
        Self::BanStart,
        Self::BanEnd,
        Self::Remain,
        Self::Period,
        Self::Reason,
    ];

    /// Fields the keyword pass searches, in evaluation order.
    pub const KEYWORD_FIELDS: [Self; 4] =
        [Self::Ip, Self::BanStart, Self::BanEnd, Self::Remain];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::BanStart => "ban_start",
            Self::BanEnd => "ban_end",
            Self::Remain => "remain",
            Self::Period => "period",
            Self::Reason => "reason",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ip" => Some(Self::Ip),
            "ban_start" => Some(Self::BanStart),
            "ban_end" => Some(Self::BanEnd),
            "remain" => Some(Self::Remain),
            "period" => Some(Self::Period),
            "reason" => Some(Self::Reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectSetting {
    Period,
    Reason,
    Instances,
}

impl SelectSetting {
    pub const ALL: [Self; 3] = [Self::Period, Self::Reason, Self::Instances];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Period => "period",
            Self::Reason => "reason",
            Self::Instances => "instances",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "period" => Some(Self::Period),
            "reason" => Some(Self::Reason),
            "instances" => Some(Self::Instances),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Period => "period",
            Self::Reason => "reason",
            Self::Instances => "instances",
        }
    }

    /// Whether a committed value on this widget feeds the filter engine.
    pub const fn is_filter_criterion(self) -> bool {
        matches!(self, Self::Period | Self::Reason)
    }
}

/// One ban entry as loaded from a source, before the rendering layer turns
/// it into a record node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub ip: String,
    pub reason: String,
    pub period: String,
    pub instance: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ban_start: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ban_end: Option<OffsetDateTime>,
}

impl BanRecord {
    pub fn validate(&self) -> Result<()> {
        if self.ip.trim().is_empty() {
            bail!("ban ip is required -- every entry must carry the banned address");
        }
        if self.reason.trim().is_empty() {
            bail!("ban reason is required -- tag the entry with the triggering rule");
        }
        if self.period.trim().is_empty() {
            bail!("ban period is required -- tag the entry with its ban class");
        }
        if self.instance.trim().is_empty() {
            bail!("ban instance is required -- name the instance that issued the ban");
        }
        if let Some(ban_end) = self.ban_end
            && ban_end < self.ban_start
        {
            bail!("ban end must be on/after ban start");
        }
        Ok(())
    }

    pub fn is_permanent(&self) -> bool {
        self.ban_end.is_none()
    }
}

/// A known instance the bans were collected from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub name: String,
    pub kind: String,
}

/// Everything a ban source hands to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BanSnapshot {
    pub instances: Vec<InstanceInfo>,
    pub bans: Vec<BanRecord>,
}

impl BanSnapshot {
    pub fn validate(&self) -> Result<()> {
        for (index, ban) in self.bans.iter().enumerate() {
            if let Err(error) = ban.validate() {
                bail!("ban entry {index}: {error}");
            }
        }
        for (index, instance) in self.instances.iter().enumerate() {
            if instance.name.trim().is_empty() {
                bail!("instance entry {index}: name is required");
            }
        }
        Ok(())
    }

    /// Bans for one instances-widget value; `"all"` selects every entry.
    pub fn bans_for_instance(&self, instance: &str) -> Vec<BanRecord> {
        if instance == crate::filter::FilterCriteria::UNCONSTRAINED {
            return self.bans.clone();
        }
        self.bans
            .iter()
            .filter(|ban| ban.instance == instance)
            .cloned()
            .collect()
    }
}
