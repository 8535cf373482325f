//! permitdesk - edit and status-change decisions for airport work permits.
//!
//! The core is pure and synchronous:
//!
//! - **permission**: how much of a permit the acting user may edit
//! - **transition**: which status changes the acting user may request
//! - **export**: whether a permit may be exported as a document
//! - **access**: all of the above bundled for one user and one permit
//! - **form**: which form fields are enabled for an edit mode
//!
//! Around it sit the pieces that talk to the outside world:
//!
//! - **client**: the remote work-permit REST API, users and lookups
//! - **department**: which departments a user may file permits for
//! - **problem**: translation of remote failures into [`Error`]
//! - **desk**: loading, saving, status changes and exports with error reporting
//! - **session** / **notify**: signed-in user and toast queue
//! - **config** / **auth**: layered configuration and bearer tokens
//! - **router** / **server** / **routes**: the access decision service
//!
//! # Example
//!
//! ```no_run
//! use permitdesk::{ConfigLoader, Module, Overrides, Router};
//! use permitdesk::routes::AccessModule;
//!
//! #[tokio::main]
//! async fn main() -> permitdesk::Result<()> {
//!     let config = ConfigLoader::default().load(None, Overrides::default())?;
//!
//!     let mut router = Router::new();
//!     AccessModule.routes(&mut router);
//!
//!     permitdesk::server::run(config, router.into_handle()).await
//! }
//! ```

pub mod access;
pub mod auth;
pub mod client;
pub mod config;
pub mod department;
pub mod desk;
pub mod error;
pub mod export;
pub mod form;
pub mod module;
pub mod notify;
pub mod permission;
pub mod permit;
pub mod problem;
pub mod response;
pub mod role;
pub mod router;
pub mod routes;
pub mod server;
pub mod session;
pub mod status;
pub mod transition;
pub mod user;

pub use access::Access;
pub use client::{PermitApi, PermitSource};
pub use config::{Config, ConfigLoader, Overrides, SharedConfig};
pub use department::{Department, DepartmentChoice};
pub use desk::{Desk, PermitView};
pub use error::{Category, Error, Recovery, Result};
pub use export::{ExportFormat, can_export};
pub use module::Module;
pub use permission::EditMode;
pub use permit::{PermitId, PermitSnapshot};
pub use role::{Role, Roles};
pub use router::{Context, Router};
pub use session::{MemorySession, Session};
pub use status::PermitStatus;
pub use transition::{allowed_targets, can_initiate_change};
pub use user::{ActingUser, UserId};

pub use hyper::Method;
