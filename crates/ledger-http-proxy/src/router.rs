//! Pure mapping from commands to HTTP request descriptors. No I/O happens here.

use crate::{CommandKind, HttpConfig, Params, ProxyError, ProxyResult};
use reqwest::Method;
use serde_json::Value;

/// Collection used when the caller does not name one.
pub const DEFAULT_COLLECTION: &str = "main";

/// Table used when the caller does not name one.
pub const DEFAULT_TABLE: &str = "standard";

/// How the remaining parameters travel with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    /// No payload is sent.
    None,
    /// Parameters as a JSON body.
    Json(Value),
    /// Parameters JSON-encoded into a single string, allowing server-side
    /// deserialization of nested filter values.
    EncodedFilters(String),
}

/// Ephemeral description of one HTTP request.
///
/// Built fresh per invocation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub payload: RequestPayload,
}

/// URL shapes the webservice exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlKind {
    /// `{host}/collections`
    Base,
    /// `{host}/collections/{collection}`
    Collection,
    /// `{host}/collections/{collection}/{table}/{id}`
    Entry,
    /// `{host}/collections/copy`
    Copy,
    /// `{host}/version`
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    None,
    Body,
    EncodedFilters,
}

/// One row of the static routing table.
struct Route {
    method: Method,
    url: UrlKind,
    payload: PayloadKind,
}

fn route(command: CommandKind) -> Route {
    match command {
        CommandKind::List => Route {
            method: Method::GET,
            url: UrlKind::Collection,
            payload: PayloadKind::EncodedFilters,
        },
        CommandKind::Add => Route {
            method: Method::POST,
            url: UrlKind::Collection,
            payload: PayloadKind::Body,
        },
        CommandKind::Get => Route {
            method: Method::GET,
            url: UrlKind::Entry,
            payload: PayloadKind::None,
        },
        CommandKind::Remove => Route {
            method: Method::DELETE,
            url: UrlKind::Entry,
            payload: PayloadKind::None,
        },
        CommandKind::Update => Route {
            method: Method::PATCH,
            url: UrlKind::Entry,
            payload: PayloadKind::Body,
        },
        CommandKind::CollectionCreate => Route {
            method: Method::POST,
            url: UrlKind::Base,
            payload: PayloadKind::None,
        },
        CommandKind::Copy => Route {
            method: Method::POST,
            url: UrlKind::Copy,
            payload: PayloadKind::Body,
        },
        CommandKind::ServerInfo => Route {
            method: Method::GET,
            url: UrlKind::Version,
            payload: PayloadKind::None,
        },
    }
}

/// Build the request descriptor for a command.
///
/// Parameters consumed by the URL (`collection`, `table`, `id`) are removed
/// from the payload; `collection` and `table` fall back to the configured
/// defaults when absent or null.
pub fn describe(
    command: CommandKind,
    params: &Params,
    config: &HttpConfig,
) -> ProxyResult<RequestDescriptor> {
    let route = route(command);
    let mut params = params.clone();
    let base_url = format!("{}/collections", config.host);

    let url = match route.url {
        UrlKind::Base => base_url,
        UrlKind::Collection => {
            let collection = take_segment(&mut params, "collection")
                .unwrap_or_else(|| config.default_collection.clone());
            format!("{base_url}/{collection}")
        }
        UrlKind::Entry => {
            let collection = take_segment(&mut params, "collection")
                .unwrap_or_else(|| config.default_collection.clone());
            let table = take_segment(&mut params, "table")
                .unwrap_or_else(|| config.default_table.clone());
            let id = take_segment(&mut params, "id").ok_or_else(|| {
                ProxyError::InvalidRequest(format!("Missing 'id' parameter for '{command}'"))
            })?;
            format!("{base_url}/{collection}/{table}/{id}")
        }
        UrlKind::Copy => format!("{base_url}/copy"),
        UrlKind::Version => format!("{}/version", config.host),
    };

    let payload = match route.payload {
        PayloadKind::None => RequestPayload::None,
        PayloadKind::Body => {
            if params.is_empty() {
                RequestPayload::None
            } else {
                RequestPayload::Json(Value::Object(params))
            }
        }
        PayloadKind::EncodedFilters => {
            // Always encoded, even when empty, so the server can rely on the field.
            let encoded = serde_json::to_string(&Value::Object(params))
                .map_err(|e| ProxyError::InvalidRequest(format!("Unencodable filters: {e}")))?;
            RequestPayload::EncodedFilters(encoded)
        }
    };

    Ok(RequestDescriptor {
        method: route.method,
        url,
        payload,
    })
}

/// Remove `key` from the parameters and render it as a URL path segment.
///
/// Null values count as absent so callers can pass them through unchanged.
fn take_segment(params: &mut Params, key: &str) -> Option<String> {
    match params.remove(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    }
}
