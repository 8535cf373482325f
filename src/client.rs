//! Remote work-permit API.
//!
//! [`PermitSource`] is the seam the desk depends on; [`PermitApi`] implements
//! it over HTTP. Every request carries the session's bearer token, and an
//! authentication failure clears the session before the error is returned.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Method, RequestBuilder, header::RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Api;
use crate::department::{Department, DepartmentChoice, LOOKUP_PAGE_SIZE};
use crate::error::{Error, Recovery, Result};
use crate::export::ExportFormat;
use crate::permit::{Page, PermitDetail, PermitFilters, PermitId, PermitSummary, PermitUpdate};
use crate::problem;
use crate::session::Session;
use crate::status::{PermitStatus, StatusOption};
use crate::role::Roles;
use crate::user::{Account, PasswordChange, UserFilters, UserId, UserProfile};

/// Permit operations the desk needs from a backend.
pub trait PermitSource: Send + Sync {
    fn fetch(&self, id: PermitId) -> impl Future<Output = Result<PermitDetail>> + Send;

    fn update(&self, update: &PermitUpdate) -> impl Future<Output = Result<()>> + Send;

    fn change_status(
        &self,
        id: PermitId,
        target: PermitStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    fn export(&self, id: PermitId, format: ExportFormat) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Body of `POST /auth/register`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignIn<'a> {
    user_name: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    work_permit_id: PermitId,
    sh_user_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RolesUpdate<'a> {
    user_id: UserId,
    roles: &'a Roles,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordReset<'a> {
    user_id: UserId,
    new_password: &'a str,
}

/// HTTP client for the work-permit backend.
pub struct PermitApi {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn Session>,
}

impl PermitApi {
    pub fn new(config: &Api, session: Arc<dyn Session>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let body = response.bytes().await.unwrap_or_default();
        let err = problem::from_response(status.as_u16(), &body, retry_after);

        if err.recovery() == Recovery::SignOut {
            self.session.sign_out();
        }
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Exchange credentials for an account with a token.
    pub async fn sign_in(&self, user_name: &str, password: &str) -> Result<Account> {
        let body = SignIn { user_name, password };
        self.json(self.request(Method::POST, "auth/sign-in").json(&body))
            .await
    }

    pub async fn register(&self, registration: &Registration) -> Result<()> {
        self.send(self.request(Method::POST, "auth/register").json(registration))
            .await?;
        Ok(())
    }

    pub async fn list(&self, filters: &PermitFilters) -> Result<Page<PermitSummary>> {
        let builder = self
            .request(Method::GET, "work-permit/paginated")
            .query(&filters.query_pairs());
        self.json(builder).await
    }

    pub async fn create(&self, permit: &Value) -> Result<()> {
        self.send(self.request(Method::POST, "work-permit/create").json(permit))
            .await?;
        Ok(())
    }

    /// Record the Safety & Health signature on a permit.
    pub async fn sign(&self, id: PermitId, sh_user: UserId) -> Result<()> {
        let body = SignRequest {
            work_permit_id: id,
            sh_user_id: sh_user.to_string(),
        };
        self.send(self.request(Method::POST, "work-permit/sign").json(&body))
            .await?;
        Ok(())
    }

    pub async fn statuses(&self) -> Result<Vec<StatusOption>> {
        self.json(self.request(Method::GET, "lookups/work-permit-statuses"))
            .await
    }

    pub async fn departments(&self) -> Result<Page<Department>> {
        let builder = self
            .request(Method::GET, "lookups/departments")
            .query(&[("PageSize", LOOKUP_PAGE_SIZE)]);
        self.json(builder).await
    }

    /// Departments the signed-in user may file a permit for.
    pub async fn department_choice(&self) -> Result<DepartmentChoice> {
        let user = self.session.current_user().ok_or(Error::Unauthorized)?;
        let page = self.departments().await?;
        Ok(DepartmentChoice::for_user(page.data, &user, self.session.department()))
    }

    pub async fn users(&self, filters: &UserFilters) -> Result<Page<UserProfile>> {
        let builder = self
            .request(Method::GET, "user/paginated")
            .query(&filters.query_pairs());
        self.json(builder).await
    }

    pub async fn user(&self, id: UserId) -> Result<UserProfile> {
        self.json(self.request(Method::GET, &format!("user/{id}")))
            .await
    }

    pub async fn create_user(&self, user: &Value) -> Result<()> {
        self.send(self.request(Method::POST, "user/create").json(user))
            .await?;
        Ok(())
    }

    pub async fn update_user(&self, user: &Value) -> Result<()> {
        self.send(self.request(Method::PUT, "user/edit").json(user))
            .await?;
        Ok(())
    }

    pub async fn deactivate_user(&self, id: UserId) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("user/deactivate/{id}")))
            .await?;
        Ok(())
    }

    pub async fn reactivate_user(&self, id: UserId) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("user/reactivate/{id}"))
            .json(&serde_json::json!({}));
        self.send(builder).await?;
        Ok(())
    }

    /// Replace a user's roles. At least one role is required.
    pub async fn update_roles(&self, id: UserId, roles: &Roles) -> Result<()> {
        if roles.is_empty() {
            return Err(Error::BadRequest("A user needs at least one role".into()));
        }
        let body = RolesUpdate { user_id: id, roles };
        self.send(self.request(Method::PUT, "user/update-roles").json(&body))
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, id: UserId, new_password: &str) -> Result<()> {
        let body = PasswordReset {
            user_id: id,
            new_password,
        };
        self.send(self.request(Method::POST, "user/reset-password").json(&body))
            .await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<UserProfile> {
        self.json(self.request(Method::GET, "user/me")).await
    }

    pub async fn update_profile(&self, profile: &Value) -> Result<()> {
        self.send(self.request(Method::PUT, "user/me/update").json(profile))
            .await?;
        Ok(())
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        self.send(self.request(Method::POST, "user/change-password").json(change))
            .await?;
        Ok(())
    }

    /// Store the signed-in user's signature image (`data:image/png;base64,...`).
    pub async fn update_signature(&self, signature: &str) -> Result<()> {
        let builder = self
            .request(Method::PATCH, "user/signature")
            .json(&serde_json::json!({ "signature": signature }));
        self.send(builder).await?;
        Ok(())
    }
}

impl PermitSource for PermitApi {
    async fn fetch(&self, id: PermitId) -> Result<PermitDetail> {
        self.json(self.request(Method::GET, &format!("work-permit/{id}")))
            .await
    }

    async fn update(&self, update: &PermitUpdate) -> Result<()> {
        let builder = self.request(Method::PUT, "work-permit/edit").json(&update.body());
        self.send(builder).await?;
        Ok(())
    }

    async fn change_status(&self, id: PermitId, target: PermitStatus) -> Result<()> {
        let builder = self
            .request(Method::PATCH, "work-permit/status")
            .query(&[("workPermitId", id.to_string()), ("statusId", target.id().to_string())])
            .json(&serde_json::json!({}));
        self.send(builder).await?;
        Ok(())
    }

    async fn export(&self, id: PermitId, format: ExportFormat) -> Result<Bytes> {
        let path = format!("work-permit/{}/{id}", format.endpoint());
        Ok(self.send(self.request(Method::GET, &path)).await?.bytes().await?)
    }
}
