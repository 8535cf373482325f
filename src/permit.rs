//! Permit records exchanged with the backend and the snapshot the rules read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::status::PermitStatus;
use crate::user::UserId;

/// Backend id of a work permit.
pub type PermitId = i64;

/// Read-only projection of a permit used by the edit and transition rules.
///
/// Built from a freshly fetched detail record and replaced wholesale on every
/// reload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitSnapshot {
    pub id: PermitId,
    pub status: PermitStatus,
    pub created_by_id: UserId,
    /// Whether S&H signed the permit. `None` when the record predates the flag.
    #[serde(default)]
    pub is_signed: Option<bool>,
}

impl PermitSnapshot {
    pub fn new(id: PermitId, status: PermitStatus, created_by_id: UserId, is_signed: bool) -> Self {
        Self {
            id,
            status,
            created_by_id,
            is_signed: Some(is_signed),
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by_id == user
    }

    /// Only an explicit `false` counts as unsigned.
    pub fn is_explicitly_unsigned(&self) -> bool {
        self.is_signed == Some(false)
    }
}

/// One worker listed on a permit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub worker_name: String,
    pub position: u32,
}

/// Full permit record from `GET /work-permit/{id}`.
///
/// Only the fields the desk reasons about are typed; everything else is kept
/// verbatim in `extra` so it can be shown or sent back untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitDetail {
    pub id: PermitId,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department_name: String,
    #[serde(default)]
    pub work_permit_status_id: Option<u8>,
    #[serde(default)]
    pub work_permit_status_name: String,
    pub created_by_id: UserId,
    #[serde(default)]
    pub created_by_full_name: String,
    #[serde(default)]
    pub actual_work_end_date: Option<String>,
    #[serde(default)]
    pub actual_work_end_hour: Option<String>,
    #[serde(default)]
    pub is_signed: Option<bool>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub security_requirements: Vec<String>,
    #[serde(default)]
    pub work_location_ids: Vec<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PermitDetail {
    /// Resolve the status, preferring the lookup id over the display label.
    pub fn status(&self) -> Result<PermitStatus> {
        match self.work_permit_status_id {
            Some(id) if id != 0 => PermitStatus::from_id(id),
            _ => PermitStatus::from_label(&self.work_permit_status_name),
        }
    }

    pub fn snapshot(&self) -> Result<PermitSnapshot> {
        Ok(PermitSnapshot {
            id: self.id,
            status: self.status()?,
            created_by_id: self.created_by_id,
            is_signed: self.is_signed,
        })
    }

    /// The record as edit fields, keyed by backend name.
    ///
    /// Audit and display keys are left out; the edit endpoint identifies the
    /// permit by `workPermitId` instead of `id`.
    pub fn editable_fields(&self) -> Result<Map<String, Value>> {
        let Value::Object(mut fields) = serde_json::to_value(self)? else {
            return Err(Error::Internal(format!("permit {} is not a JSON object", self.id)));
        };
        for key in RECORD_ONLY_KEYS {
            fields.remove(key);
        }
        Ok(fields)
    }
}

/// Detail keys that describe the record rather than the work.
const RECORD_ONLY_KEYS: [&str; 10] = [
    "id",
    "departmentName",
    "workPermitStatusId",
    "workPermitStatusName",
    "createdAt",
    "createdById",
    "createdByFullName",
    "updatedAt",
    "updatedByFullName",
    "isSigned",
];

/// Row of the paginated permit list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitSummary {
    pub id: PermitId,
    #[serde(default)]
    pub created_by_full_name: String,
    #[serde(default)]
    pub department_name_ar: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub work_permit_status_name: String,
    #[serde(default)]
    pub supervisor_engineer: String,
    #[serde(default)]
    pub is_signed: Option<bool>,
}

impl PermitSummary {
    pub fn status(&self) -> Result<PermitStatus> {
        PermitStatus::from_label(&self.work_permit_status_name)
    }
}

/// A page of results from a paginated endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_index: u32,
    pub page_size: u32,
    /// Lookup endpoints call this `count`.
    #[serde(alias = "count")]
    pub total_count: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
    pub data: Vec<T>,
}

/// Filters for the permit list. Unset filters are omitted from the query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermitFilters {
    pub department_id: Option<i64>,
    pub status: Option<PermitStatus>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
}

impl PermitFilters {
    pub fn page(index: u32, size: u32) -> Self {
        Self {
            page_index: Some(index),
            page_size: Some(size),
            ..Default::default()
        }
    }

    /// Query string pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.department_id {
            pairs.push(("departmentId", id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("workPermitStatusId", status.id().to_string()));
        }
        if let Some(from) = self.from_date.as_deref().filter(|d| !d.is_empty()) {
            pairs.push(("fromDate", from.to_string()));
        }
        if let Some(to) = self.to_date.as_deref().filter(|d| !d.is_empty()) {
            pairs.push(("toDate", to.to_string()));
        }
        if let Some(index) = self.page_index.filter(|i| *i > 0) {
            pairs.push(("pageIndex", index.to_string()));
        }
        if let Some(size) = self.page_size.filter(|s| *s > 0) {
            pairs.push(("pageSize", size.to_string()));
        }
        pairs
    }
}

/// Actual end of work, the only data a limited editor may change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActualEnd {
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Body of `PUT /work-permit/edit`.
///
/// The endpoint replaces the whole record, so an update is laid over the
/// fetched record with [`PermitUpdate::applied_to`] before it is sent.
#[derive(Clone, Debug, PartialEq)]
pub struct PermitUpdate {
    pub id: PermitId,
    /// Set values win over the same keys in `details`.
    pub actual_end: ActualEnd,
    /// Every other permit field, keyed by backend name. Must be `None` for a
    /// limited edit.
    pub details: Option<Map<String, Value>>,
}

impl PermitUpdate {
    /// An update that only records the actual end of work.
    pub fn actual_end(id: PermitId, date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id,
            actual_end: ActualEnd {
                date: Some(date.into()),
                time: Some(time.into()),
            },
            details: None,
        }
    }

    /// An update that rewrites the given fields.
    pub fn full(id: PermitId, details: Map<String, Value>) -> Self {
        Self {
            id,
            actual_end: ActualEnd::default(),
            details: Some(details),
        }
    }

    pub fn touches_only_actual_end(&self) -> bool {
        self.details.as_ref().is_none_or(|d| d.is_empty())
    }

    /// This update over `current`: fields it leaves alone keep their fetched
    /// values.
    pub fn applied_to(&self, current: &PermitDetail) -> Result<Self> {
        let mut details = current.editable_fields()?;
        if let Some(changes) = &self.details {
            details.extend(changes.clone());
        }
        Ok(Self {
            id: self.id,
            actual_end: self.actual_end.clone(),
            details: Some(details),
        })
    }

    /// JSON body as the backend expects it.
    pub fn body(&self) -> Value {
        let mut body = self.details.clone().unwrap_or_default();
        body.insert("workPermitId".into(), Value::from(self.id));
        if let Some(date) = &self.actual_end.date {
            body.insert("actualWorkEndDate".into(), Value::from(date.as_str()));
        }
        if let Some(time) = &self.actual_end.time {
            body.insert("actualWorkEndHour".into(), Value::from(time.as_str()));
        }
        Value::Object(body)
    }
}
