//! `Transport` backed by a blocking ureq agent.

use std::time::Duration;

use notes_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    /// `timeout` bounds each request as a whole.
    pub fn new(timeout: Duration) -> Self {
        // Statuses are data; the core decides what a 4xx/5xx means.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    fn transport_error(&self, err: ureq::Error) -> ApiError {
        match err {
            ureq::Error::Timeout(_) => {
                ApiError::Transport(format!("request timed out after {}s", self.timeout.as_secs()))
            }
            other => ApiError::Transport(other.to_string()),
        }
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        if !(req.url.starts_with("http://") || req.url.starts_with("https://")) {
            return Err(ApiError::Transport(format!(
                "cannot send {} to relative URL {}; set {}",
                req.method.as_str(),
                req.url,
                crate::config::BASE_URL_VAR
            )));
        }

        let agent = &self.agent;
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => with_headers(agent.get(&req.url), &req.headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(&req.url), &req.headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(&req.url), &req.headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(agent.post(&req.url), &req.headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(&req.url), &req.headers).send(body.as_bytes()),
            (HttpMethod::Put, None) => with_headers(agent.put(&req.url), &req.headers).send_empty(),
        };
        let mut response = result.map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.transport_error(e))?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_urls_fail_before_sending() {
        let transport = UreqTransport::new(Duration::from_secs(1));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: "/api/notes".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref msg) if msg.contains("NOTES_API_BASE_URL")));
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = UreqTransport::new(Duration::from_secs(2));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://127.0.0.1:{port}/api/notes"),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn silent_server_times_out() {
        // Connections complete in the backlog but nothing ever answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let transport = UreqTransport::new(Duration::from_secs(1));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://{addr}/api/notes"),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert_eq!(err, ApiError::Transport("request timed out after 1s".to_string()));
        drop(listener);
    }
}
