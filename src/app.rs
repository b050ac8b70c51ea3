//! Application composition: metadata plus the mounted routers, folded into
//! one dispatch table.

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::api::create_router;
use crate::metrics::track_http;
use crate::routers;

/// Static descriptive metadata published with the API document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

/// Metadata of this server. Kept identical to what existing clients read.
pub const APP_INFO: AppInfo = AppInfo {
    title: "dodream 파이썬 서버",
    description: "Spring 서버 JWT와 연동된 FastAPI 서버입니다.",
    version: "1.0.0",
};

/// A router module bound to a path prefix.
pub struct Mount {
    name: &'static str,
    prefix: String,
    router: Router,
}

impl Mount {
    /// Pair `router` with `prefix`. An empty or `/` prefix mounts at the root.
    pub fn new(name: &'static str, prefix: impl Into<String>, router: Router) -> Self {
        Self {
            name,
            prefix: prefix.into(),
            router,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn is_root(&self) -> bool {
        self.prefix.is_empty() || self.prefix == "/"
    }
}

/// The composed application: metadata plus a ready-to-serve router.
#[derive(Debug, Clone)]
pub struct App {
    info: AppInfo,
    mounted: Vec<&'static str>,
    router: Router,
}

impl App {
    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    /// Names of the mounted router modules, in mount order.
    pub fn mounted(&self) -> &[&'static str] {
        &self.mounted
    }

    /// A handle to the dispatch table. Cheap: axum routers are `Arc`-backed.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Fold `mounts` onto the API router, in order.
///
/// Root mounts are merged, prefixed mounts are nested. Route conflicts are
/// left to axum, which panics on duplicate registrations.
pub fn compose(info: AppInfo, mounts: Vec<Mount>) -> App {
    let mut mounted = Vec::with_capacity(mounts.len());

    let router = mounts
        .into_iter()
        .fold(create_router(&info), |router, mount| {
            debug!(name = mount.name(), prefix = mount.prefix(), "mounting router");
            mounted.push(mount.name());
            if mount.is_root() {
                router.merge(mount.router)
            } else {
                router.nest(&mount.prefix, mount.router)
            }
        })
        .layer(middleware::from_fn(track_http))
        .layer(TraceLayer::new_for_http());

    info!(title = info.title, version = info.version, mounted = ?mounted, "application composed");

    App {
        info,
        mounted,
        router,
    }
}

/// The application this process serves.
pub fn build_app() -> App {
    compose(APP_INFO, routers::all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    async fn status_of(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn root_prefixes_are_recognised() {
        assert!(Mount::new("a", "", Router::new()).is_root());
        assert!(Mount::new("b", "/", Router::new()).is_root());
        assert!(!Mount::new("c", "/c", Router::new()).is_root());
    }

    #[test]
    fn build_app_mounts_user_router() {
        let app = build_app();
        assert_eq!(app.info(), &APP_INFO);
        assert_eq!(app.mounted(), &["user"]);
    }

    #[tokio::test]
    async fn prefixed_mount_is_nested() {
        let items = Router::new().route("/list", get(|| async { "items" }));
        let app = compose(APP_INFO, vec![Mount::new("items", "/items", items)]);

        assert_eq!(status_of(app.router(), "/items/list").await, StatusCode::OK);
        assert_eq!(status_of(app.router(), "/list").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn root_mount_is_merged() {
        let extra = Router::new().route("/ping", get(|| async { "pong" }));
        let app = compose(APP_INFO, vec![Mount::new("extra", "/", extra)]);

        assert_eq!(status_of(app.router(), "/ping").await, StatusCode::OK);
        assert_eq!(status_of(app.router(), "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn mounts_are_folded_in_order() {
        let first = Router::new().route("/a", get(|| async { "a" }));
        let second = Router::new().route("/b", get(|| async { "b" }));
        let app = compose(
            APP_INFO,
            vec![Mount::new("first", "/x", first), Mount::new("second", "/y", second)],
        );

        assert_eq!(app.mounted(), &["first", "second"]);
        assert_eq!(status_of(app.router(), "/x/a").await, StatusCode::OK);
        assert_eq!(status_of(app.router(), "/y/b").await, StatusCode::OK);
        assert_eq!(status_of(app.router(), "/x/b").await, StatusCode::NOT_FOUND);
    }
}
