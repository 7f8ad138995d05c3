//! Collector endpoint parsing and the startup reachability probe.

use std::time::Duration;

use axum::http::Uri;
use thiserror::Error;
use tokio::net::TcpStream;

/// Port assumed when the endpoint omits one (OTLP/gRPC default).
pub const DEFAULT_OTLP_GRPC_PORT: u16 = 4317;

/// How long the startup probe waits for a TCP connection to the collector.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors produced while resolving or probing the collector endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The configured value is not a usable `http(s)://host[:port]` address.
    #[error("invalid OTLP endpoint {endpoint:?}: {reason}")]
    Invalid { endpoint: String, reason: String },

    /// The collector refused or reset the connection.
    #[error("OTLP collector at {authority} is unreachable: {source}")]
    Unreachable {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    /// No connection was established within the timeout.
    #[error("timed out after {timeout:?} connecting to OTLP collector at {authority}")]
    Timeout { authority: String, timeout: Duration },
}

/// A validated OTLP/gRPC collector address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorEndpoint {
    url: String,
    host: String,
    port: u16,
}

impl CollectorEndpoint {
    /// Parse an endpoint, accepting bare `host:port` by assuming `http://`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Invalid`] for unparsable values, unsupported
    /// schemes, or a missing host.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let raw = raw.trim();
        let invalid = |reason: String| EndpointError::Invalid {
            endpoint: raw.to_owned(),
            reason,
        };

        let url = if raw.contains("://") {
            raw.trim_end_matches('/').to_owned()
        } else {
            format!("http://{}", raw.trim_end_matches('/'))
        };

        let uri: Uri = url.parse().map_err(|e| invalid(format!("{e}")))?;

        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            other => {
                return Err(invalid(format!(
                    "unsupported scheme {}",
                    other.unwrap_or("<none>")
                )))
            }
        }

        let host = uri
            .host()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host".into()))?;

        Ok(Self {
            host: host.to_owned(),
            port: uri.port_u16().unwrap_or(DEFAULT_OTLP_GRPC_PORT),
            url,
        })
    }

    /// Endpoint URL handed to the tonic exporters.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `host:port` used for the TCP probe and in log fields.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open and immediately drop a TCP connection to the collector.
    ///
    /// The tonic exporters connect lazily, so without this a wrong address would
    /// only surface as export errors after the service is already serving.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Unreachable`] or [`EndpointError::Timeout`].
    pub async fn probe(&self, timeout: Duration) -> Result<(), EndpointError> {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(source)) => Err(EndpointError::Unreachable {
                authority: self.authority(),
                source,
            }),
            Err(_) => Err(EndpointError::Timeout {
                authority: self.authority(),
                timeout,
            }),
        }
    }
}
