//! HTTP implementation of the management API.
//!
//! [`ApiClient`] performs one HTTP exchange per operation against the
//! configured base URL. There is no retry, backoff or de-duplication here;
//! error policy lives in the [`crate::store`] actions.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::ManagementApi;
use crate::api::types::{
    CommandRequest, CommandResponse, ServerDescriptor, StartLogRequest, StopLogRequest,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for the management service.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Shared reqwest client. No timeout unless the configuration enables
    /// one; the service contract leaves requests open-ended.
    http: reqwest::Client,

    /// Configuration holding the normalized API base URL.
    config: ClientConfig,
}

impl ApiClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Joins a relative endpoint path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.config.endpoint(path)
    }

    /// Issues a GET and decodes the JSON response body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self.http.get(url.clone()).send().await?;
        Self::check_status(&url, &response)?;

        Ok(response.json().await?)
    }

    /// Issues a POST with a JSON body and returns the raw response.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self.http.post(url.clone()).json(body).send().await?;
        Self::check_status(&url, &response)?;

        Ok(response)
    }

    /// Maps non-success statuses to [`Error::Status`].
    fn check_status(url: &Url, response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::status(status.as_u16(), url.as_str()))
        }
    }
}

// ============================================================================
// ManagementApi Implementation
// ============================================================================

#[async_trait]
impl ManagementApi for ApiClient {
    async fn list_servers(&self) -> Result<Vec<ServerDescriptor>> {
        self.get_json("servers").await
    }

    async fn start_log_stream(&self, server: &str, file: &str, lines: u32) -> Result<()> {
        let body = StartLogRequest {
            server_name: server.to_string(),
            file_alias: file.to_string(),
            lines,
        };
        self.post_json("log/start", &body).await?;
        Ok(())
    }

    async fn stop_log_stream(&self, server: &str, file: &str) -> Result<()> {
        let body = StopLogRequest {
            server_name: server.to_string(),
            file_alias: file.to_string(),
        };
        self.post_json("log/stop", &body).await?;
        Ok(())
    }

    async fn execute_remote_command(&self, server: &str, command: &str) -> Result<String> {
        let body = CommandRequest {
            server_name: server.to_string(),
            command: command.to_string(),
        };
        let response = self.post_json("command", &body).await?;
        let decoded: CommandResponse = response.json().await?;
        Ok(decoded.output)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let config = ClientConfig::new("http://localhost:8080/api").expect("config");
        ApiClient::new(&config).expect("client")
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let client = client();

        assert_eq!(
            client.endpoint("servers").expect("url").as_str(),
            "http://localhost:8080/api/servers"
        );
        assert_eq!(
            client.endpoint("log/start").expect("url").as_str(),
            "http://localhost:8080/api/log/start"
        );
        assert_eq!(
            client.endpoint("log/stop").expect("url").as_str(),
            "http://localhost:8080/api/log/stop"
        );
        assert_eq!(
            client.endpoint("command").expect("url").as_str(),
            "http://localhost:8080/api/command"
        );
    }

    #[test]
    fn test_endpoint_tolerates_leading_slash() {
        let client = client();
        assert_eq!(
            client.endpoint("/servers").expect("url").as_str(),
            "http://localhost:8080/api/servers"
        );
    }

    #[test]
    fn test_client_is_cheap_to_clone() {
        let client = client();
        let clone = client.clone();
        assert_eq!(client.config, clone.config);
    }
}
