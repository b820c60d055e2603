//! Local HTTP server replaying one canned response, for tests.

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Canned {
    status: u16,
    /// `{path}`, `{accept}` and `{user-agent}` are replaced from the request.
    body: &'static str,
    delay: Duration,
}

impl Canned {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: 200,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: "",
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    fn body_for(&self, request: &Request<Body>) -> String {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-")
                .to_owned()
        };
        self.body
            .replace("{path}", request.uri().path())
            .replace("{accept}", &header("accept"))
            .replace("{user-agent}", &header("user-agent"))
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Must be called inside a tokio runtime, the server lives as long as the runtime.
    pub fn start(canned: Canned) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let make_service = make_service_fn(move |_| {
            let canned = canned.clone();
            let counter = counter.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request: Request<Body>| {
                    let canned = canned.clone();
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        tokio::time::sleep(canned.delay).await;
                        let response = Response::builder()
                            .status(canned.status)
                            .header("Content-Type", "application/json")
                            .body(Body::from(canned.body_for(&request)))
                            .unwrap();
                        Ok::<_, Infallible>(response)
                    }
                }))
            }
        });
        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_service);
        let addr = server.local_addr();
        tokio::spawn(server);
        Self { addr, hits }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
