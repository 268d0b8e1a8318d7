use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A fixture tracker service bound to an OS-assigned port.
pub struct Fixture {
    pub base: String,
    _server: JoinHandle<()>,
}

/// Bind first so the router closure can bake the server's own base URL into
/// payloads (GitHub-style templated URLs point back at the fixture).
pub async fn start<F>(make_router: F) -> Fixture
where
    F: FnOnce(String) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let base = format!(
        "http://{}",
        listener.local_addr().expect("fixture local addr")
    );
    let router = make_router(base.clone());

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fixture");
    });

    Fixture {
        base,
        _server: server,
    }
}
