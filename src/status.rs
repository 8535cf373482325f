//! Permit lifecycle statuses.
//!
//! The backend identifies statuses by lookup id (`workPermitStatusId`) and
//! sends an Arabic display label (`workPermitStatusName`). Both parse into the
//! closed [`PermitStatus`] enum; anything else is rejected at construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Status of a work permit.
///
/// Ordered by backend lookup id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermitStatus {
    Pending,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl PermitStatus {
    /// Every status, in lookup-id order.
    pub const ALL: [PermitStatus; 6] = [
        PermitStatus::Pending,
        PermitStatus::Approved,
        PermitStatus::Rejected,
        PermitStatus::InProgress,
        PermitStatus::Completed,
        PermitStatus::Cancelled,
    ];

    /// Backend lookup id.
    pub fn id(self) -> u8 {
        match self {
            PermitStatus::Pending => 1,
            PermitStatus::Approved => 2,
            PermitStatus::Rejected => 3,
            PermitStatus::InProgress => 4,
            PermitStatus::Completed => 5,
            PermitStatus::Cancelled => 6,
        }
    }

    /// Resolve a backend lookup id.
    pub fn from_id(id: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| Error::BadRequest(format!("Unknown permit status id: {id}")))
    }

    /// English name (`nameEn` in the lookup table).
    pub fn name_en(self) -> &'static str {
        match self {
            PermitStatus::Pending => "Pending",
            PermitStatus::Approved => "Approved",
            PermitStatus::Rejected => "Rejected",
            PermitStatus::InProgress => "In Progress",
            PermitStatus::Completed => "Completed",
            PermitStatus::Cancelled => "Cancelled",
        }
    }

    /// Arabic display label (`nameAr`, also sent as `workPermitStatusName`).
    pub fn name_ar(self) -> &'static str {
        match self {
            PermitStatus::Pending => "قيد الانتظار",
            PermitStatus::Approved => "موافق عليه",
            PermitStatus::Rejected => "مرفوض",
            PermitStatus::InProgress => "قيد التنفيذ",
            PermitStatus::Completed => "مكتمل",
            PermitStatus::Cancelled => "ملغي",
        }
    }

    /// Resolve a status from either display label or the enum name.
    pub fn from_label(label: &str) -> Result<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| {
                s.name_ar() == label
                    || s.name_en().eq_ignore_ascii_case(label)
                    || format!("{s:?}").eq_ignore_ascii_case(label)
            })
            .ok_or_else(|| Error::BadRequest(format!("Unknown permit status: {label}")))
    }

    /// No further transition is possible for anybody.
    pub fn is_final(self) -> bool {
        self == PermitStatus::Completed
    }
}

impl fmt::Display for PermitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_en())
    }
}

impl FromStr for PermitStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

/// One row of the `/lookups/work-permit-statuses` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOption {
    pub id: u8,
    pub name_en: String,
    pub name_ar: String,
}

impl From<PermitStatus> for StatusOption {
    fn from(status: PermitStatus) -> Self {
        Self {
            id: status.id(),
            name_en: status.name_en().to_string(),
            name_ar: status.name_ar().to_string(),
        }
    }
}

impl TryFrom<&StatusOption> for PermitStatus {
    type Error = Error;

    fn try_from(option: &StatusOption) -> Result<Self> {
        PermitStatus::from_id(option.id)
    }
}
