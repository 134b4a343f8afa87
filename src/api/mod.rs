//! Backend Gateway: HTTP+JSON client for the gate backend.

pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::RequestAuth;
use crate::error::{GateError, Result};
use crate::event::TaskStatus;
use types::{
    CaptureTaskResponse, CheckInRequest, CheckInResponse, CheckOutRequest, ErrorBody,
    EventsResponse, UpdatePlateRequest, UploadResponse,
};

/// Operations the client needs from the backend.
pub trait Gateway: Send + Sync + 'static {
    fn check_in(
        &self,
        request: &CheckInRequest,
    ) -> impl Future<Output = Result<CheckInResponse>> + Send;

    fn check_out(&self, request: &CheckOutRequest) -> impl Future<Output = Result<()>> + Send;

    fn update_plate(
        &self,
        request: &UpdatePlateRequest,
    ) -> impl Future<Output = Result<()>> + Send;

    /// The `limit` most recent events, in the backend's order.
    fn events(&self, limit: usize) -> impl Future<Output = Result<EventsResponse>> + Send;

    fn capture_task(&self) -> impl Future<Output = Result<CaptureTaskResponse>> + Send;

    fn upload_image(&self, jpeg: Vec<u8>) -> impl Future<Output = Result<UploadResponse>> + Send;

    fn task_status(&self, task_id: &str) -> impl Future<Output = Result<TaskStatus>> + Send;
}

pub struct ApiSpec {
    base_url: String,
}

impl ApiSpec {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn check_in_url(&self) -> String {
        format!("{}/check-in", self.base_url)
    }

    pub fn check_out_url(&self) -> String {
        format!("{}/check-out", self.base_url)
    }

    pub fn update_plate_url(&self) -> String {
        format!("{}/update-plate", self.base_url)
    }

    pub fn events_url(&self, limit: usize) -> String {
        format!("{}/events?limit={}", self.base_url, limit)
    }

    pub fn capture_task_url(&self) -> String {
        format!("{}/capture-task", self.base_url)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/recognize", self.base_url)
    }

    pub fn task_status_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, task_id)
    }
}

pub struct Api {
    spec: ApiSpec,
    auth: RequestAuth,
    client: reqwest::Client,
}

impl Api {
    pub fn new(base_url: &str, auth: RequestAuth, request_timeout: Duration) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(GateError::Config("backend URL is not configured".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GateError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            spec: ApiSpec::new(base_url),
            auth,
            client,
        })
    }

    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some((name, value)) = self.auth.header_for(url) {
            builder = builder.header(name, value);
        }
        builder
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(failure_from_body(status, &body))
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.execute(builder).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Turn a non-2xx response into a transport error carrying the backend's message.
pub fn failure_from_body(status: StatusCode, body: &str) -> GateError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.describe())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());
    GateError::Transport {
        status: Some(status.as_u16()),
        message,
    }
}

impl Gateway for Api {
    async fn check_in(&self, request: &CheckInRequest) -> Result<CheckInResponse> {
        let url = self.spec.check_in_url();
        debug!("POST {url}");
        self.fetch(self.request(Method::POST, &url).json(request))
            .await
    }

    async fn check_out(&self, request: &CheckOutRequest) -> Result<()> {
        let url = self.spec.check_out_url();
        debug!("POST {url}");
        self.execute(self.request(Method::POST, &url).json(request))
            .await?;
        Ok(())
    }

    async fn update_plate(&self, request: &UpdatePlateRequest) -> Result<()> {
        let url = self.spec.update_plate_url();
        debug!("POST {url}");
        self.execute(self.request(Method::POST, &url).json(request))
            .await?;
        Ok(())
    }

    async fn events(&self, limit: usize) -> Result<EventsResponse> {
        let url = self.spec.events_url(limit);
        debug!("GET {url}");
        self.fetch(self.request(Method::GET, &url)).await
    }

    async fn capture_task(&self) -> Result<CaptureTaskResponse> {
        let url = self.spec.capture_task_url();
        debug!("GET {url}");
        self.fetch(self.request(Method::GET, &url)).await
    }

    async fn upload_image(&self, jpeg: Vec<u8>) -> Result<UploadResponse> {
        let url = self.spec.upload_url();
        debug!("POST {url} ({} bytes)", jpeg.len());
        let builder = self
            .request(Method::POST, &url)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(jpeg);
        self.fetch(builder).await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let url = self.spec.task_status_url(task_id);
        debug!("GET {url}");
        self.fetch(self.request(Method::GET, &url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMode;

    #[test]
    fn urls_strip_trailing_slash() {
        let spec = ApiSpec::new("http://gate.local:8000/");
        assert_eq!(spec.check_in_url(), "http://gate.local:8000/check-in");
        assert_eq!(spec.events_url(50), "http://gate.local:8000/events?limit=50");
        assert_eq!(spec.task_status_url("T-9"), "http://gate.local:8000/tasks/T-9");
    }

    #[test]
    fn empty_backend_url_is_a_config_error() {
        let result = Api::new("  ", RequestAuth::none(), Duration::from_secs(5));
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn failure_uses_body_message_or_reason() {
        let err = failure_from_body(StatusCode::BAD_REQUEST, r#"{"message":"card unknown"}"#);
        assert_eq!(
            err,
            GateError::Transport {
                status: Some(400),
                message: "card unknown".into()
            }
        );

        let err = failure_from_body(StatusCode::UNAUTHORIZED, r#"{"detail":"Unauthorized"}"#);
        assert!(matches!(err, GateError::Transport { status: Some(401), ref message } if message == "Unauthorized"));

        let err = failure_from_body(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert!(matches!(err, GateError::Transport { status: Some(502), ref message } if message == "Bad Gateway"));
        assert!(err.is_transient());
    }

    #[test]
    fn auth_header_is_attached() {
        let auth = RequestAuth::new(AuthMode::Header, "X-Secret", Some("demo".into()));
        let api = Api::new("http://gate.local", auth, Duration::from_secs(5)).unwrap();
        let request = api
            .request(Method::GET, &api.spec().events_url(10))
            .build()
            .unwrap();
        assert!(request.headers().contains_key("X-Secret"));
    }
}
