#![allow(dead_code)]

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

pub const ABA: &str = r#"[{"name":"one","group":"A","uris":["http://one"]},{"name":"two","group":"B"},{"name":"three","group":"A"}]"#;

pub const SINGLE: &str = r#"[{"name":"solo","group":"Z"}]"#;

/// Local HTTP server standing in for the remote channel manifest.
///
/// Routes:
/// - `/channels.json` → 200 with [`ABA`]
/// - `/single.json`   → 200 with [`SINGLE`]
/// - `/delayed.json`  → 200 with [`SINGLE`] after 300 ms
/// - `/slow.json`     → 200 after 30 s
/// - `/broken.json`   → 200 with a body that is not a channel list
/// - `/missing.json`  → 404
pub struct FixtureServer {
    base: String,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/channels.json", get(|| async { ABA }))
            .route("/single.json", get(|| async { SINGLE }))
            .route(
                "/delayed.json",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    SINGLE
                }),
            )
            .route(
                "/slow.json",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    ABA
                }),
            )
            .route("/broken.json", get(|| async { r#"{"channels": 3}"# }))
            .route("/missing.json", get(|| async { StatusCode::NOT_FOUND }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fixture server");
        let addr = listener.local_addr().expect("fixture server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fixture server crashed");
        });

        Self {
            base: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// A URL on a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}/channels.json")
}

/// Six channels across three groups, used as the bundled list in tests.
pub const BUNDLED: &str = r#"[
    {"name":"b0","group":"X"},
    {"name":"b1","group":"X"},
    {"name":"b2","group":"Y"},
    {"name":"b3","group":"Y"},
    {"name":"b4","group":"W"},
    {"name":"b5","group":"X"}
]"#;
