//! Decision service endpoints.
//!
//! | Method | Path | Body | Answer |
//! |---|---|---|---|
//! | GET | `/health` | | `{"status":"ok"}` |
//! | GET | `/api/statuses` | | status lookup list |
//! | POST | `/api/permits/access` | `{permit}` | [`Access`] |
//! | POST | `/api/permits/transitions` | `{permit, target}` | 204, or 409 when refused |
//!
//! `permit` is a [`PermitSnapshot`]; `null`, absent or an empty body asks
//! about a new permit. The acting user comes from the bearer token.

use serde::Deserialize;

use crate::access::Access;
use crate::module::Module;
use crate::permit::PermitSnapshot;
use crate::response;
use crate::router::Router;
use crate::status::{PermitStatus, StatusOption};
use crate::transition;

#[derive(Debug, Deserialize)]
struct AccessRequest {
    #[serde(default)]
    permit: Option<PermitSnapshot>,
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    permit: PermitSnapshot,
    target: PermitStatus,
}

/// Access and transition decisions over HTTP.
pub struct AccessModule;

impl Module for AccessModule {
    fn name(&self) -> &'static str {
        "access"
    }

    fn routes(&self, router: &mut Router) {
        router.get("/health", |_ctx| async {
            response::ok(&serde_json::json!({ "status": "ok" }))
        });

        router.get("/api/statuses", |_ctx| async {
            let statuses: Vec<StatusOption> =
                PermitStatus::ALL.into_iter().map(StatusOption::from).collect();
            response::ok(&statuses)
        });

        router.post("/api/permits/access", |ctx| async move {
            let user = ctx.acting_user()?;
            let request: Option<AccessRequest> = ctx.json()?;
            let permit = request.and_then(|r| r.permit);
            let access = Access::compute(permit.as_ref(), &user);
            response::ok(&access)
        });

        router.post("/api/permits/transitions", |ctx| async move {
            let user = ctx.acting_user()?;
            let request: TransitionRequest = ctx.json()?;
            transition::authorize_change(&request.permit, &user, request.target)?;
            Ok(response::no_content())
        });
    }
}
