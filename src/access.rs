//! Everything the permit screens need to know about one user and one permit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::export::{self, ExportHint};
use crate::form;
use crate::permission::{self, EditMode};
use crate::permit::PermitSnapshot;
use crate::status::PermitStatus;
use crate::transition;
use crate::user::ActingUser;

/// Combined edit, transition and export decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    pub edit_mode: EditMode,
    pub enabled_fields: BTreeSet<String>,
    pub can_initiate_change: bool,
    pub allowed_targets: BTreeSet<PermitStatus>,
    pub can_export: bool,
    pub export_hint: Option<ExportHint>,
}

impl Access {
    /// Decide access for `user` on `permit`; `None` is a permit being created.
    pub fn compute(permit: Option<&PermitSnapshot>, user: &ActingUser) -> Self {
        let edit_mode = permission::evaluate(permit, user);
        let enabled_fields = form::for_mode(edit_mode).enabled_fields();

        match permit {
            Some(permit) => Self {
                edit_mode,
                enabled_fields,
                can_initiate_change: transition::can_initiate_change(permit, user),
                allowed_targets: transition::targets_for(permit, user),
                can_export: export::can_export(permit),
                export_hint: Some(export::export_hint(permit)),
            },
            None => Self {
                edit_mode,
                enabled_fields,
                can_initiate_change: false,
                allowed_targets: BTreeSet::new(),
                can_export: false,
                export_hint: None,
            },
        }
    }
}
