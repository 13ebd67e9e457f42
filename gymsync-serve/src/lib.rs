//! Static file responder for the graph page.
//!
//! Serves the files under one root directory on `127.0.0.1:<port>` and can
//! open the system browser on it. This sits beside the sync workflow; nothing
//! in `gymsync-sync` depends on it.

mod error;
pub mod server;

pub use error::ServeError;
pub use server::{
    graph_url, open_browser, respond, serve_blocking, ServeOutcome, StaticServer, NOT_FOUND_BODY,
};
