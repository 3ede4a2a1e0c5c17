//! Log-shipper envelope unwrapping.
//!
//! Filebeat (and compatible shippers) publish one JSON document per log line:
//!
//! ```text
//! {"@timestamp":"2018-07-07T02:46:46.780Z",
//!  "beat":{"name":"web-01","hostname":"web-01","version":"6.3.0"},
//!  "fields":{"ip":"10.0.0.1","app_id":"order-service"},
//!  "source":"/var/log/app/order-service.log","offset":1366406,
//!  "message":"[main] 2018-07-07 10:46:41,641 INFO  [...] Refreshing ..."}
//! ```
//!
//! Only `message` is required. `fields` is the optional per-message metadata
//! mapping configured on the shipper; `beat.hostname` identifies the
//! shipping agent and serves as the fallback host.

use serde_json::{Map, Value};

use crate::error::LograftError;

/// Metadata keys read from the envelope's `fields` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKeys {
    /// Key holding the originating host address.
    pub host: String,
    /// Key holding the application identifier.
    pub app_id: String,
}

impl Default for MetadataKeys {
    fn default() -> Self {
        Self {
            host: "ip".to_string(),
            app_id: "app_id".to_string(),
        }
    }
}

/// Per-message metadata supplied by the shipper's `fields` mapping.
///
/// Either key may be missing even when the mapping itself is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub host: Option<String>,
    pub app_id: Option<String>,
}

/// One unwrapped inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    raw_line: String,
    metadata: Option<Metadata>,
    fallback_host: String,
    source: Option<String>,
    offset: Option<u64>,
}

impl Envelope {
    pub fn new(
        raw_line: impl Into<String>,
        metadata: Option<Metadata>,
        fallback_host: impl Into<String>,
    ) -> Self {
        Self {
            raw_line: raw_line.into(),
            metadata,
            fallback_host: fallback_host.into(),
            source: None,
            offset: None,
        }
    }

    /// Parse one shipper document.
    ///
    /// Fails with [`LograftError::MalformedEnvelope`] when the payload is not
    /// a JSON object, or `message` is missing or not a string.
    pub fn unwrap(raw: &[u8], keys: &MetadataKeys) -> Result<Self, LograftError> {
        let parsed: Value = serde_json::from_slice(raw)
            .map_err(|e| LograftError::MalformedEnvelope(format!("invalid JSON: {e}")))?;

        let Value::Object(mut doc) = parsed else {
            return Err(LograftError::MalformedEnvelope(
                "document is not a JSON object".to_string(),
            ));
        };

        let raw_line = match doc.remove("message") {
            Some(Value::String(line)) => line,
            Some(Value::Null) | None => {
                return Err(LograftError::MalformedEnvelope(
                    "missing `message` field".to_string(),
                ));
            }
            Some(other) => {
                return Err(LograftError::MalformedEnvelope(format!(
                    "`message` is not a string: {other}"
                )));
            }
        };

        let metadata = match doc.remove("fields") {
            None | Some(Value::Null) => None,
            Some(Value::Object(mut fields)) => Some(Metadata {
                host: fields.remove(&keys.host).and_then(value_to_string),
                app_id: fields.remove(&keys.app_id).and_then(value_to_string),
            }),
            Some(other) => {
                return Err(LograftError::MalformedEnvelope(format!(
                    "`fields` is not an object: {other}"
                )));
            }
        };

        let fallback_host = shipper_hostname(&doc).unwrap_or_else(|| {
            tracing::debug!("envelope carries no shipper hostname");
            String::new()
        });

        Ok(Self {
            raw_line,
            metadata,
            fallback_host,
            source: doc.remove("source").and_then(value_to_string),
            offset: doc.get("offset").and_then(Value::as_u64),
        })
    }

    /// The shipped log line, verbatim.
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// The `fields` mapping, if the shipper sent one.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Hostname of the shipping agent.
    pub fn fallback_host(&self) -> &str {
        &self.fallback_host
    }

    /// Path of the file the line was read from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Byte offset of the line within [`source`](Self::source).
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }
}

/// Shipper identity: `beat.hostname`, then `beat.name`, then `host.name`.
fn shipper_hostname(doc: &Map<String, Value>) -> Option<String> {
    let lookup = |parent: &str, key: &str| {
        doc.get(parent)
            .and_then(|p| p.get(key))
            .filter(|v| !v.is_null())
    };
    lookup("beat", "hostname")
        .or_else(|| lookup("beat", "name"))
        .or_else(|| lookup("host", "name"))
        .cloned()
        .and_then(value_to_string)
}

/// Convert a JSON value to its string representation; `null` is absent.
fn value_to_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
