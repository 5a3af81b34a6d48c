use reqwest::{Method, RequestBuilder, Response, StatusCode};

use crate::storage::StorageError;

/// A simple wrapper on an HTTP client for talking to the pinning service. Sets the user-agent and
/// classifies failures into storage errors.
///
/// Requests are sent exactly once. Retrying is left to the user re-invoking the operation, and no local
/// timeout is imposed; failures surface only from the transport or the service.
pub(crate) struct Request {
    client: reqwest::Client,
}

impl Request {
    /// Initializes a new `Request` instance.
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates a request builder with defaults applied.
    pub(crate) fn req(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).header(
            "User-Agent",
            format!("docvault-core/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Creates a POST request builder with defaults applied.
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.req(Method::POST, url)
    }

    /// Sends a request built by `req`/`post` and turns transport failures and non-success statuses into
    /// [`StorageError`]s.
    pub(crate) async fn handle(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, StorageError> {
        let response = request_builder.send().await.map_err(|err| {
            StorageError::Unavailable(format!("request failed: {err}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Unknown error"));
        Err(classify_status(status, body))
    }
}

/// Authentication failures, throttling and server errors mean the service is unusable right now; every
/// other failing status is a rejection of this particular upload.
fn classify_status(status: StatusCode, body: String) -> StorageError {
    let unavailable = status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error();

    if unavailable {
        StorageError::Unavailable(format!(
            "request error with status code {}: {body}",
            status.as_u16()
        ))
    } else {
        StorageError::Rejected {
            status: Some(status.as_u16()),
            reason: body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(401; "unauthorized")]
    #[test_case(403; "forbidden")]
    #[test_case(429; "throttled")]
    #[test_case(502; "bad gateway")]
    fn test_unavailable_statuses(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert!(matches!(
            classify_status(status, String::new()),
            StorageError::Unavailable(_)
        ));
    }

    #[test_case(400; "bad request")]
    #[test_case(413; "payload too large")]
    #[test_case(415; "unsupported media type")]
    fn test_rejected_statuses(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert_eq!(
            classify_status(status, "limit".to_string()),
            StorageError::Rejected {
                status: Some(code),
                reason: "limit".to_string()
            }
        );
    }
}
