//! Remote client and desk against the fake backend.

use std::sync::Arc;
use std::time::Instant;

use permitdesk::client::Registration;
use permitdesk::config::Api;
use permitdesk::error::Denial;
use permitdesk::notify::ToastKind;
use permitdesk::permit::{PermitFilters, PermitUpdate};
use permitdesk::user::{PasswordChange, UserFilters};
use permitdesk::{
    Desk, EditMode, Error, ExportFormat, MemorySession, PermitApi, PermitSource, PermitStatus,
    Recovery, Role, Roles, Session, UserId,
};

use super::backend::{self, APPROVED_OWN, EXPIRES_SESSION, FORBIDDEN, PASSWORD, PENDING_UNSIGNED};

fn api(base_url: String, session: Arc<MemorySession>) -> PermitApi {
    let config = Api {
        base_url,
        timeout_secs: 5,
    };
    PermitApi::new(&config, session).unwrap()
}

async fn signed_in(base_url: String) -> (PermitApi, Arc<MemorySession>) {
    let session = Arc::new(MemorySession::new());
    let api = api(base_url, session.clone());
    let account = api.sign_in("huda", PASSWORD).await.unwrap();
    session.sign_in(account);
    (api, session)
}

#[tokio::test]
async fn sign_in_returns_account() {
    let backend = backend::start().await;
    let (_api, session) = signed_in(backend.base_url()).await;

    let account = session.account().unwrap();
    assert_eq!(account.id, UserId(7));
    assert_eq!(account.user_name, "huda");
    assert_eq!(session.token().as_deref(), Some(backend::TOKEN));

    backend.stop().await;
}

#[tokio::test]
async fn wrong_password_stays_on_login() {
    let backend = backend::start().await;
    let session = Arc::new(MemorySession::new());
    let api = api(backend.base_url(), session);

    let err = api.sign_in("huda", "nope").await.unwrap_err();
    backend.stop().await;

    assert!(matches!(err, Error::InvalidCredentials(_)));
    assert_eq!(err.recovery(), Recovery::Notify);
    assert_eq!(err.user_message(), "Invalid username or password");
}

#[tokio::test]
async fn fetch_sends_bearer_token() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let detail = api.fetch(APPROVED_OWN).await.unwrap();
    backend.stop().await;

    assert_eq!(detail.status().unwrap(), PermitStatus::Approved);
    assert_eq!(detail.created_by_id, UserId(7));
    assert_eq!(detail.workers[0].worker_name, "Ali Hassan");
    assert_eq!(detail.extra["workDescription"], "Replace apron lights");
}

#[tokio::test]
async fn fetch_without_session_is_rejected() {
    let backend = backend::start().await;
    let api = api(backend.base_url(), Arc::new(MemorySession::new()));

    let err = api.fetch(APPROVED_OWN).await.unwrap_err();
    backend.stop().await;

    assert_eq!(err.recovery(), Recovery::SignOut);
}

#[tokio::test]
async fn expired_session_is_cleared() {
    let backend = backend::start().await;
    let (api, session) = signed_in(backend.base_url()).await;

    let err = api.fetch(EXPIRES_SESSION).await.unwrap_err();
    backend.stop().await;

    assert!(matches!(err, Error::AuthenticationExpired(_)));
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn missing_and_foreign_permits_return_to_list() {
    let backend = backend::start().await;
    let (api, session) = signed_in(backend.base_url()).await;

    let missing = api.fetch(99_999).await.unwrap_err();
    let foreign = api.fetch(FORBIDDEN).await.unwrap_err();
    backend.stop().await;

    assert!(matches!(missing, Error::NotFound(_)));
    assert_eq!(missing.user_message(), "Work Permit with ID '99999' was not found.");
    assert!(matches!(
        foreign,
        Error::AuthorizationDenied { denial: Denial::NotOwner, .. }
    ));
    assert_eq!(foreign.recovery(), Recovery::ReturnToList);
    assert!(session.is_logged_in());
}

#[tokio::test]
async fn list_passes_only_set_filters() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let filters = PermitFilters {
        status: Some(PermitStatus::Approved),
        ..PermitFilters::page(1, 10)
    };
    let page = api.list(&filters).await.unwrap();
    let calls = backend.calls();
    backend.stop().await;

    assert_eq!(page.total_count, 1);
    assert_eq!(page.data[0].status().unwrap(), PermitStatus::Approved);
    assert_eq!(calls, ["list workPermitStatusId=2&pageIndex=1&pageSize=10"]);
}

#[tokio::test]
async fn status_change_and_signature_reach_backend() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    api.change_status(APPROVED_OWN, PermitStatus::InProgress).await.unwrap();
    api.sign(PENDING_UNSIGNED, UserId(10)).await.unwrap();
    let calls = backend.calls();
    backend.stop().await;

    assert_eq!(
        calls,
        [
            "status workPermitId=41&statusId=4",
            "sign 42 \"10\"",
        ]
    );
}

#[tokio::test]
async fn backend_business_rule_is_reported() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let err = api
        .change_status(PENDING_UNSIGNED, PermitStatus::Approved)
        .await
        .unwrap_err();
    backend.stop().await;

    assert!(matches!(err, Error::BusinessRuleViolation(_)));
    assert_eq!(err.recovery(), Recovery::Notify);
}

#[tokio::test]
async fn lookups_and_export() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let statuses = api.statuses().await.unwrap();
    let pdf = api.export(APPROVED_OWN, ExportFormat::Pdf).await.unwrap();
    backend.stop().await;

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[1].name_en, "Approved");
    assert_eq!(&pdf[..], b"%PDF-1.7");
}

#[tokio::test]
async fn registration() {
    let backend = backend::start().await;
    let api = api(backend.base_url(), Arc::new(MemorySession::new()));
    let mut registration = Registration {
        user_name: "omar".into(),
        full_name: "Omar Haddad".into(),
        email: "omar@airport.example".into(),
        password: "secret1".into(),
        national_id: None,
    };

    api.register(&registration).await.unwrap();
    registration.password = "123".into();
    let err = api.register(&registration).await.unwrap_err();
    let calls = backend.calls();
    backend.stop().await;

    assert_eq!(calls, ["register \"omar\""]);
    assert_eq!(err.category(), permitdesk::Category::ValidationFailed);
}

#[tokio::test]
async fn desk_owner_records_actual_end() {
    let backend = backend::start().await;
    let (api, session) = signed_in(backend.base_url()).await;
    let desk = Desk::new(api, session);

    let view = desk.open(APPROVED_OWN).await.unwrap().unwrap();
    assert_eq!(view.edit_mode(), EditMode::Limited);
    assert!(view.access.can_initiate_change);

    desk.save(&view, PermitUpdate::actual_end(APPROVED_OWN, "2026-03-05", "17:30"))
        .await
        .unwrap();
    desk.change_status(&view, PermitStatus::InProgress).await.unwrap();

    let download = desk
        .export(&view, ExportFormat::Pdf, jiff::civil::date(2026, 3, 5))
        .await
        .unwrap();
    let calls = backend.calls();
    backend.stop().await;

    assert_eq!(download.file_name, "WorkPermit_41_2026-03-05.pdf");
    assert_eq!(
        calls,
        [
            "edit 41 \"2026-03-05\" \"17:30\"",
            "status workPermitId=41&statusId=4",
        ]
    );
    let toasts = desk.toasts().active(Instant::now());
    assert_eq!(toasts.len(), 2);
    assert!(toasts.iter().all(|t| t.kind == ToastKind::Success));
}

#[tokio::test]
async fn desk_signs_out_on_expired_session() {
    let backend = backend::start().await;
    let (api, session) = signed_in(backend.base_url()).await;
    let desk = Desk::new(api, session.clone());

    let err = desk.open(EXPIRES_SESSION).await.unwrap_err();
    backend.stop().await;

    assert_eq!(err.recovery(), Recovery::SignOut);
    assert!(!session.is_logged_in());
    let toasts = desk.toasts().active(Instant::now());
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
}

#[tokio::test]
async fn desk_member_cannot_touch_pending_status() {
    let backend = backend::start().await;
    let (api, session) = signed_in(backend.base_url()).await;
    let desk = Desk::new(api, session);

    let view = desk.open(PENDING_UNSIGNED).await.unwrap().unwrap();
    assert_eq!(view.edit_mode(), EditMode::Full);
    assert!(!view.access.can_initiate_change);
    assert!(!view.access.can_export);

    assert!(desk.change_status(&view, PermitStatus::Cancelled).await.is_err());
    let calls = backend.calls();
    backend.stop().await;

    assert!(calls.is_empty());
}

#[tokio::test]
async fn limited_save_sends_whole_record() {
    let backend = backend::start().await;
    let (api, session) = signed_in(backend.base_url()).await;
    let desk = Desk::new(api, session);

    let view = desk.open(APPROVED_OWN).await.unwrap().unwrap();
    desk.save(&view, PermitUpdate::actual_end(APPROVED_OWN, "2026-03-05", "17:30"))
        .await
        .unwrap();
    let edits = backend.edits();
    backend.stop().await;

    assert_eq!(edits.len(), 1);
    let body = &edits[0];
    assert_eq!(body["workPermitId"], APPROVED_OWN);
    assert_eq!(body["departmentId"], 2);
    assert_eq!(body["supervisorEng"], "Eng. Samir");
    assert_eq!(body["startWorkDate"], "2026-03-02");
    assert_eq!(body["workDescription"], "Replace apron lights");
    assert_eq!(body["workLocationIds"], serde_json::json!([1]));
    assert_eq!(body["workers"][0]["workerName"], "Ali Hassan");
    assert_eq!(body["actualWorkEndDate"], "2026-03-05");
    assert_eq!(body["actualWorkEndHour"], "17:30");
    assert!(body.get("createdById").is_none());
}

#[tokio::test]
async fn member_files_for_own_department() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let all = api.departments().await.unwrap();
    let choice = api.department_choice().await.unwrap();
    backend.stop().await;

    assert_eq!(all.total_count, 3);
    assert_eq!(choice.options.len(), 1);
    assert_eq!(choice.options[0].name, "Operations");
    assert_eq!(choice.preselected, Some(2));
}

#[tokio::test]
async fn department_choice_needs_a_session() {
    let backend = backend::start().await;
    let api = api(backend.base_url(), Arc::new(MemorySession::new()));

    let err = api.department_choice().await.unwrap_err();
    backend.stop().await;

    assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn user_administration_calls() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let filters = UserFilters {
        role: Some(Role::SafetyHealth),
        page_number: Some(1),
        page_size: Some(10),
        ..Default::default()
    };
    let page = api.users(&filters).await.unwrap();
    api.update_roles(UserId(10), &[Role::Supervisor].into_iter().collect::<Roles>())
        .await
        .unwrap();
    api.deactivate_user(UserId(10)).await.unwrap();
    api.reactivate_user(UserId(10)).await.unwrap();
    let empty = api.update_roles(UserId(10), &Roles::new()).await.unwrap_err();
    let calls = backend.calls();
    backend.stop().await;

    assert_eq!(page.total_count, 1);
    assert!(!page.data[0].is_active);
    assert!(page.data[0].roles.contains(Role::SafetyHealth));
    assert!(matches!(empty, Error::BadRequest(_)));
    assert_eq!(
        calls,
        [
            "users pageNumber=1&pageSize=10&role=S%26H",
            "roles 10 [\"Supervisor\"]",
            "deactivate 10",
            "reactivate 10",
        ]
    );
}

#[tokio::test]
async fn own_profile_and_signature() {
    let backend = backend::start().await;
    let (api, _session) = signed_in(backend.base_url()).await;

    let me = api.me().await.unwrap();
    api.update_signature("data:image/png;base64,iVBORw0KGgo=").await.unwrap();
    let rejected = api.update_signature("not an image").await.unwrap_err();
    backend.stop().await;

    assert_eq!(me.id, UserId(7));
    assert_eq!(me.department_id, Some(2));
    assert_eq!(rejected.category(), permitdesk::Category::ValidationFailed);
    assert!(PasswordChange::new("secret", "short", "short").is_err());
}
