//! Pluggable route groups.
//!
//! ```
//! use permitdesk::{Module, Router};
//!
//! struct Ping;
//!
//! impl Module for Ping {
//!     fn name(&self) -> &'static str {
//!         "ping"
//!     }
//!
//!     fn routes(&self, router: &mut Router) {
//!         router.get("/ping", |_ctx| async { permitdesk::response::ok(&"pong") });
//!     }
//! }
//!
//! let mut router = Router::new();
//! Ping.routes(&mut router);
//! ```

use crate::router::Router;

/// A group of routes registered together.
///
/// State a module needs is captured in the route closures, typically behind
/// an `Arc`.
pub trait Module: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn routes(&self, router: &mut Router);
}
