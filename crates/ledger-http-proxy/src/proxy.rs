//! Transport proxy: runs commands against the webservice and classifies
//! failures into the two-kind error taxonomy.

use crate::{
    router, CommandKind, Params, ProxyError, ProxyResult, Transport, TransportResponse,
    DEFAULT_COLLECTION, DEFAULT_TABLE,
};
use serde_json::Value;
use std::future::Future;
use tracing::debug;

/// Default webservice host.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:5000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP configuration for the proxy.
///
/// Passed in explicitly rather than read from ambient process state.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the webservice, scheme included.
    pub host: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Basic-auth username, if the service requires credentials.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Collection substituted when a command does not name one.
    pub default_collection: String,
    /// Table substituted when a command does not name one.
    pub default_table: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            username: None,
            password: None,
            default_collection: DEFAULT_COLLECTION.to_string(),
            default_table: DEFAULT_TABLE.to_string(),
        }
    }
}

/// Capability to run a named command with keyword parameters.
///
/// Implemented by [`Proxy`] and consumed unchanged by offline recovery, so
/// replay goes through exactly the same machinery as a direct run.
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        command: CommandKind,
        params: &Params,
    ) -> impl Future<Output = ProxyResult<Value>> + Send;
}

/// Proxy for communicating with the webservice via HTTP.
pub struct Proxy<T: Transport> {
    config: HttpConfig,
    transport: T,
}

impl Proxy<crate::HttpTransport> {
    /// Create a proxy backed by a real HTTP transport.
    pub fn new(config: HttpConfig) -> Self {
        let transport = crate::HttpTransport::new(&config);
        Self { config, transport }
    }
}

impl<T: Transport> Proxy<T> {
    /// Create a proxy over a caller-supplied transport.
    pub fn with_transport(config: HttpConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Convert the command and parameters into an HTTP request, send it to
    /// the webservice, and interpret the response.
    ///
    /// Transport-level failures (timeouts, refused connections) always map to
    /// [`ProxyError::Communication`]; 4xx responses map to
    /// [`ProxyError::InvalidRequest`], other non-success responses to
    /// [`ProxyError::Communication`].
    pub async fn run(&self, command: CommandKind, params: &Params) -> ProxyResult<Value> {
        let request = router::describe(command, params, &self.config)?;
        debug!(command = %command, method = %request.method, url = %request.url, "Dispatching command");

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| ProxyError::Communication(format!("Error sending request: {e}")))?;

        interpret_response(command, &response)
    }
}

impl<T: Transport> CommandExecutor for Proxy<T> {
    async fn execute(&self, command: CommandKind, params: &Params) -> ProxyResult<Value> {
        self.run(command, params).await
    }
}

fn interpret_response(command: CommandKind, response: &TransportResponse) -> ProxyResult<Value> {
    let status = response.status;

    if status.is_success() {
        let payload: Value = serde_json::from_str(&response.body).map_err(|e| {
            ProxyError::Communication(format!("Could not decode server response: {e}"))
        })?;

        if command == CommandKind::ServerInfo {
            return Ok(Value::String(format_version_banner(&payload)));
        }
        return Ok(payload);
    }

    // Extract the server-supplied error detail, falling back to "-" when the
    // body carries no parsable error field.
    let error = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "-".to_string());

    let phrase = status.canonical_reason().unwrap_or("Unknown");
    let message = format!(
        "Error handling request. Server returned '{} ({}): {}'",
        phrase,
        status.as_u16(),
        error
    );

    if status.is_client_error() {
        Err(ProxyError::InvalidRequest(message))
    } else {
        Err(ProxyError::Communication(message))
    }
}

/// Format the version payload into a two-line banner naming the webservice
/// component and the upstream core component it wraps.
fn format_version_banner(payload: &Value) -> String {
    let version = payload
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let upstream = payload
        .get("upstream_version")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    format!(
        "The webservice runs ledger-web {version}\n                and ledger-core {upstream}"
    )
}
