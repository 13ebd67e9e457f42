//! HTTP server for the sync destination directory.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ServeError;

/// Body of every 404 response.
pub const NOT_FOUND_BODY: &str = "404 (Not Found)\n";

/// `http://localhost:<port>`
pub fn graph_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// Open `url` in the system browser.
pub fn open_browser(url: &str) -> Result<(), ServeError> {
    webbrowser::open(url).map_err(|source| ServeError::Browser {
        url: url.to_owned(),
        source,
    })
}

/// A bound, not yet running, static file server.
pub struct StaticServer {
    root: Arc<PathBuf>,
    listener: TcpListener,
    addr: SocketAddr,
}

impl StaticServer {
    pub async fn bind(root: impl Into<PathBuf>, addr: SocketAddr) -> Result<Self, ServeError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        let addr = listener.local_addr()?;
        Ok(Self {
            root: Arc::new(root.into()),
            listener,
            addr,
        })
    }

    /// Actual address, useful when bound to port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve connections until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServeError> {
        info!(addr = %self.addr, root = %self.root.display(), "static server listening");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, peer) = result?;
                    let io = TokioIo::new(stream);
                    let root = Arc::clone(&self.root);

                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                            let root = Arc::clone(&root);
                            async move {
                                debug!(%peer, method = %req.method(), path = %req.uri().path(), "request");
                                Ok::<_, Infallible>(respond(&root, req.uri().path()).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            error!(error = %e, "static server connection error");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("static server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Map a request path onto a file under `root`.
///
/// `/` means `/index.html`. Returns `None` for paths that are not valid UTF-8
/// after percent-decoding or that would leave `root`.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let relative = match decoded.trim_start_matches('/') {
        "" => "index.html",
        rest => rest,
    };
    if relative.contains('\\') {
        return None;
    }

    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(path)
}

/// Build the response for `request_path`: the file's bytes or a 404.
pub async fn respond(root: &Path, request_path: &str) -> Response<Full<Bytes>> {
    let Some(path) = resolve(root, request_path) else {
        return not_found();
    };
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(),
    }
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mut response = Response::new(Full::new(Bytes::from(bytes)));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type(&path)));
            response
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "read failed");
            not_found()
        }
    }
}

fn not_found() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(NOT_FOUND_BODY.as_bytes())));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("txt" | "csv") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// How [`serve_blocking`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Served until Ctrl-C.
    Stopped,
    /// The port was taken; the browser was pointed at whatever holds it.
    AlreadyServing,
}

/// Serve `root` on `127.0.0.1:<port>` until Ctrl-C, blocking the thread.
///
/// `on_ready` runs once the listener is bound. When `open` is set the browser
/// is opened on the page; if the port is already in use the browser is
/// opened anyway and the function returns [`ServeOutcome::AlreadyServing`].
pub fn serve_blocking(
    root: &Path,
    port: u16,
    open: bool,
    on_ready: impl FnOnce(SocketAddr),
) -> Result<ServeOutcome, ServeError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let url = graph_url(port);
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let server = match StaticServer::bind(root, addr).await {
            Ok(server) => server,
            Err(err) if err.is_addr_in_use() && open => {
                warn!(port, "port already in use; opening the browser anyway");
                open_browser(&url)?;
                return Ok(ServeOutcome::AlreadyServing);
            }
            Err(err) => return Err(err),
        };
        on_ready(server.local_addr());

        if open {
            if let Err(err) = open_browser(&url) {
                warn!(error = %err, "could not open browser");
            }
        }

        let shutdown = CancellationToken::new();
        let signal = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("received ctrl-c, stopping static server");
                        shutdown.cancel();
                    }
                    Err(err) => warn!(error = %err, "ctrl-c handler failed"),
                }
            })
        };

        let result = server.run(shutdown).await;
        signal.abort();
        result.map(|()| ServeOutcome::Stopped)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
