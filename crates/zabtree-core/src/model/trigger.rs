// ── Trigger and desired-state types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::ids::TriggerId;

/// Zabbix trigger severity.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    NotClassified,
    Information,
    Warning,
    Average,
    High,
    Disaster,
}

impl Severity {
    pub fn code(self) -> u8 {
        match self {
            Self::NotClassified => 0,
            Self::Information => 1,
            Self::Warning => 2,
            Self::Average => 3,
            Self::High => 4,
            Self::Disaster => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::iter().find(|s| s.code() == code)
    }
}

/// Error returned when a severity is neither a known name nor `0..=5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSeverityError(String);

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = Severity::iter().map(|s| s.to_string()).collect();
        write!(
            f,
            "unknown severity '{}' (expected 0-5 or one of: {})",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for ParseSeverityError {}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Accepts the numeric code or the name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| ParseSeverityError(s.to_owned()));
        }
        let wanted = trimmed.to_ascii_lowercase().replace('_', "-");
        Self::iter()
            .find(|sev| sev.to_string() == wanted)
            .ok_or_else(|| ParseSeverityError(s.to_owned()))
    }
}

/// Host a trigger belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRef {
    /// Technical name; also what macros in descriptions expand to.
    pub host: String,
    /// Visible name.
    pub name: String,
}

/// A monitored trigger with its host and host groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub id: TriggerId,
    /// Description template, may contain `{MACRO}` or `{MACRO.FIELD}`.
    pub description: String,
    pub priority: Severity,
    pub groups: Vec<String>,
    pub host: Option<HostRef>,
}

/// Filter for fetching triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerQuery {
    pub min_severity: Severity,
    pub monitored_only: bool,
    pub group: Option<String>,
}

/// One trigger leaf the tree should contain, with the nodes it hangs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredLeaf {
    pub trigger_name: String,
    /// `"{host} - {name}"`
    pub host_node_name: String,
    /// Owning host groups, in order. The first one receives a new host node.
    pub groups: Vec<String>,
    pub trigger_id: TriggerId,
}

/// Why a trigger produced no leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The trigger has no host.
    NoHost,
    /// Neither the trigger nor the options name a host group.
    NoGroups,
    /// The host already has a leaf of that name bound to another trigger.
    LeafNameTaken,
}

/// A trigger that was fetched but could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLeaf {
    pub trigger_id: TriggerId,
    pub description: String,
    pub reason: SkipReason,
}
