//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use dualwrite::domain::ports::RecordWriter;

/// Everything the HTTP server needs to start.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) writer: Arc<dyn RecordWriter>,
}

impl ServerConfig {
    /// Bind to `bind_addr` and serve writes through `writer`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, writer: Arc<dyn RecordWriter>) -> Self {
        Self { bind_addr, writer }
    }
}
