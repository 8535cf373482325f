//! Document export eligibility and download naming.
//!
//! A pending permit is never exported, even when signed, because it still
//! needs approval. Approved, in-progress and completed permits can only have
//! got there signed, so they always export. Rejected and cancelled permits
//! export unless they are explicitly marked unsigned; records from before the
//! signed flag existed export as before.

use serde::{Deserialize, Serialize};

use crate::permit::{PermitId, PermitSnapshot};
use crate::status::PermitStatus;

/// Whether `permit` may be exported as a document.
pub fn can_export(permit: &PermitSnapshot) -> bool {
    match permit.status {
        PermitStatus::Pending => false,
        PermitStatus::Approved | PermitStatus::InProgress | PermitStatus::Completed => true,
        PermitStatus::Rejected | PermitStatus::Cancelled => !permit.is_explicitly_unsigned(),
    }
}

/// Why the export action is or is not available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportHint {
    Available,
    /// Pending and signed: waiting for the supervisor.
    AwaitingApproval,
    /// Pending and not signed: needs S&H, then the supervisor.
    AwaitingSignature,
    Unavailable,
}

impl ExportHint {
    pub fn message(self) -> &'static str {
        match self {
            ExportHint::Available => "Export to Word",
            ExportHint::AwaitingApproval => "Waiting for supervisor approval before export",
            ExportHint::AwaitingSignature => {
                "Requires the Safety & Health signature, then supervisor approval"
            }
            ExportHint::Unavailable => "Not available for export at the moment",
        }
    }
}

/// Tooltip reason for the export action on `permit`.
pub fn export_hint(permit: &PermitSnapshot) -> ExportHint {
    if can_export(permit) {
        return ExportHint::Available;
    }
    match (permit.status, permit.is_signed) {
        (PermitStatus::Pending, Some(true)) => ExportHint::AwaitingApproval,
        (PermitStatus::Pending, _) => ExportHint::AwaitingSignature,
        _ => ExportHint::Unavailable,
    }
}

/// Document formats the backend can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Word,
    Pdf,
}

impl ExportFormat {
    /// Path segment under `/work-permit/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            ExportFormat::Word => "export-word",
            ExportFormat::Pdf => "export-pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Download name, e.g. `WorkPermit_41_2026-03-05.docx`.
    pub fn file_name(self, id: PermitId, date: jiff::civil::Date) -> String {
        format!("WorkPermit_{id}_{date}.{}", self.extension())
    }
}
