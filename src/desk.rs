//! The permit desk: loads permits, attaches access decisions and forwards
//! edits, status changes and exports to the backend.
//!
//! Every failure is reported the same way: an error toast, and for
//! authentication failures the session is cleared. The returned
//! [`Recovery`] tells the caller where to navigate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::access::Access;
use crate::client::PermitSource;
use crate::error::{Error, Recovery, Result};
use crate::export::{self, ExportFormat};
use crate::form::{self, Form};
use crate::notify::{ERROR_DURATION, Toasts};
use crate::permission::EditMode;
use crate::permit::{PermitDetail, PermitId, PermitSnapshot, PermitUpdate};
use crate::session::Session;
use crate::status::PermitStatus;
use crate::transition;
use crate::user::ActingUser;

/// A loaded permit with the decisions for the current user.
#[derive(Clone, Debug)]
pub struct PermitView {
    pub detail: PermitDetail,
    pub snapshot: PermitSnapshot,
    pub access: Access,
    pub form: Form,
}

impl PermitView {
    pub fn id(&self) -> PermitId {
        self.snapshot.id
    }

    pub fn edit_mode(&self) -> EditMode {
        self.access.edit_mode
    }
}

/// An empty create form.
#[derive(Clone, Debug)]
pub struct Draft {
    pub access: Access,
    pub form: Form,
}

/// An exported document ready to save.
#[derive(Clone, Debug)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

pub struct Desk<S> {
    source: S,
    session: Arc<dyn Session>,
    toasts: Toasts,
    generation: AtomicU64,
}

impl<S: PermitSource> Desk<S> {
    pub fn new(source: S, session: Arc<dyn Session>) -> Self {
        Self {
            source,
            session,
            toasts: Toasts::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn user(&self) -> Result<ActingUser> {
        self.session.current_user().ok_or(Error::Unauthorized)
    }

    /// Show `err` to the user and apply its session side effects.
    pub fn report(&self, err: &Error) -> Recovery {
        let recovery = err.recovery();
        tracing::warn!(error = %err, ?recovery, "permit desk error");
        self.toasts.error(err.user_message(), Some(ERROR_DURATION));
        if recovery == Recovery::SignOut {
            self.session.sign_out();
        }
        recovery
    }

    fn fail<T>(&self, err: Error) -> Result<T> {
        self.report(&err);
        Err(err)
    }

    /// Start a new permit.
    pub fn draft(&self) -> Result<Draft> {
        let user = match self.user() {
            Ok(user) => user,
            Err(err) => return self.fail(err),
        };
        let access = Access::compute(None, &user);
        Ok(Draft {
            form: form::for_mode(access.edit_mode),
            access,
        })
    }

    /// Load a permit and decide access for the current user.
    ///
    /// When another `open` starts before this one completes, this result is
    /// dropped and `Ok(None)` is returned.
    pub async fn open(&self, id: PermitId) -> Result<Option<PermitView>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = self.source.fetch(id).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(id, generation, "discarding superseded permit load");
            return Ok(None);
        }

        let view = fetched.and_then(|detail| {
            let user = self.user()?;
            let snapshot = detail.snapshot()?;
            let access = Access::compute(Some(&snapshot), &user);
            tracing::debug!(id, status = %snapshot.status, mode = %access.edit_mode, "permit opened");
            Ok(PermitView {
                form: form::for_mode(access.edit_mode),
                detail,
                snapshot,
                access,
            })
        });

        match view {
            Ok(view) => Ok(Some(view)),
            Err(err) => self.fail(err),
        }
    }

    /// Save edits to a loaded permit.
    ///
    /// A read-only permit cannot be saved, and a limited editor may only
    /// record the actual end of work. The update is sent over the loaded
    /// record, so untouched fields keep their values.
    pub async fn save(&self, view: &PermitView, update: PermitUpdate) -> Result<()> {
        let refused = match view.edit_mode() {
            EditMode::ReadOnly => Some("This permit is read-only"),
            EditMode::Limited if !update.touches_only_actual_end() => {
                Some("Only the actual end date and time can be changed on this permit")
            }
            _ => None,
        };
        if let Some(message) = refused {
            return self.fail(Error::BusinessRuleViolation(message.to_string()));
        }
        if update.id != view.id() {
            return self.fail(Error::BadRequest(format!(
                "Update for permit {} sent to permit {}",
                update.id,
                view.id()
            )));
        }

        let update = match update.applied_to(&view.detail) {
            Ok(update) => update,
            Err(err) => return self.fail(err),
        };

        match self.source.update(&update).await {
            Ok(()) => {
                self.toasts.success("Work permit updated successfully", None);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Move a loaded permit to `target`.
    ///
    /// Targets outside the allowed set are refused without contacting the
    /// backend. Callers reload the permit afterwards.
    pub async fn change_status(&self, view: &PermitView, target: PermitStatus) -> Result<()> {
        let user = match self.user() {
            Ok(user) => user,
            Err(err) => return self.fail(err),
        };
        if let Err(err) = transition::authorize_change(&view.snapshot, &user, target) {
            return self.fail(err);
        }

        match self.source.change_status(view.id(), target).await {
            Ok(()) => {
                tracing::info!(id = view.id(), from = %view.snapshot.status, to = %target, "status changed");
                self.toasts.success("Permit status updated successfully", None);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Export a loaded permit, naming the file for `today`.
    pub async fn export(
        &self,
        view: &PermitView,
        format: ExportFormat,
        today: jiff::civil::Date,
    ) -> Result<Download> {
        if !export::can_export(&view.snapshot) {
            let hint = export::export_hint(&view.snapshot);
            return self.fail(Error::BusinessRuleViolation(hint.message().to_string()));
        }

        match self.source.export(view.id(), format).await {
            Ok(bytes) => Ok(Download {
                file_name: format.file_name(view.id(), today),
                content_type: format.content_type(),
                bytes,
            }),
            Err(err) => self.fail(err),
        }
    }
}
