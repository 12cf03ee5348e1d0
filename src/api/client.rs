//! Mockup Backend REST Client
//!
//! HTTP client for communicating with the mockup service's REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::*;
use super::error::GENERIC_FAILURE;
use super::{ClientError, ClientResult, Endpoints, MockupBackend};
use crate::config::Config;
use crate::model::{FeedbackItem, Mockup, MockupSummary, SimulatedFeedback, TrackerTicket};

/// REST client for the mockup backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Create a client with the given endpoint table and request timeout
    pub fn new(endpoints: Endpoints, request_timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { client, endpoints })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(
            Endpoints::from_config(&config.api, &config.tracker),
            Duration::from_secs(config.api.request_timeout_secs),
        )
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        self.execute(self.client.get(url), Method::GET, url).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.request(method.clone(), url).json(body);
        self.execute(request, method, url).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: Method,
        url: &str,
    ) -> ClientResult<T> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, %method, url, "Sending request");

        let response = request.send().await.map_err(|e| {
            warn!(%request_id, url, "Transport failure: {}", e);
            ClientError::from_transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ClientError::from_transport)?;
        debug!(%request_id, status = status.as_u16(), bytes = text.len(), "Received response");

        if !status.is_success() {
            // Only a JSON `error` field is shown to the user; proxies send HTML pages
            let message = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.error,
                Err(_) => {
                    debug!(%request_id, bytes = text.len(), "Error body was not JSON");
                    GENERIC_FAILURE.to_string()
                }
            };
            warn!(%request_id, status = status.as_u16(), "Backend error: {}", message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Turn a `success: false` body into an error
fn checked<T: Outcome>(response: T) -> ClientResult<T> {
    if response.succeeded() {
        Ok(response)
    } else {
        Err(ClientError::Rejected(
            response
                .error_message()
                .unwrap_or("The backend reported a failure")
                .to_string(),
        ))
    }
}

#[async_trait]
impl MockupBackend for ApiClient {
    async fn health(&self) -> ClientResult<()> {
        let _: serde_json::Value = self.get(&self.endpoints.health()).await?;
        Ok(())
    }

    async fn generate_mockup(&self, request: &GenerateMockupRequest) -> ClientResult<GenerateMockupResponse> {
        let response: GenerateMockupResponse = self
            .send(Method::POST, &self.endpoints.generate_mockup(), request)
            .await?;
        checked(response)
    }

    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        let response: ChatResponse = self.send(Method::POST, &self.endpoints.chat(), request).await?;
        checked(response)
    }

    async fn list_mockups(&self) -> ClientResult<Vec<MockupSummary>> {
        let response: MockupListResponse = self.get(&self.endpoints.list_mockups()).await?;
        Ok(response.mockups)
    }

    async fn get_mockup(&self, id: &str) -> ClientResult<Mockup> {
        let response: MockupResponse = self.get(&self.endpoints.mockup(id)).await?;
        Ok(response.mockup)
    }

    async fn update_mockup(&self, id: &str, html_content: &str) -> ClientResult<()> {
        let body = UpdateMockupRequest {
            html_content: html_content.to_string(),
        };
        let response: SuccessResponse = self
            .send(Method::PUT, &self.endpoints.update_mockup(id), &body)
            .await?;
        checked(response).map(|_| ())
    }

    async fn get_feedback(&self, id: &str) -> ClientResult<Vec<FeedbackItem>> {
        let response: FeedbackListResponse = self.get(&self.endpoints.feedback(id)).await?;
        Ok(response.feedback)
    }

    async fn add_feedback(&self, id: &str, request: &AddFeedbackRequest) -> ClientResult<()> {
        let response: AddFeedbackResponse = self
            .send(Method::POST, &self.endpoints.feedback(id), request)
            .await?;
        checked(response).map(|_| ())
    }

    async fn edit_html(&self, request: &EditHtmlRequest) -> ClientResult<String> {
        let response: EditHtmlResponse = self.send(Method::POST, &self.endpoints.edit_html(), request).await?;
        checked(response)?
            .html_content
            .ok_or_else(|| ClientError::Decode("edit response carried no html_content".to_string()))
    }

    async fn refine_mockup(&self, request: &RefineMockupRequest) -> ClientResult<RefineMockupResponse> {
        let response: RefineMockupResponse = self
            .send(Method::POST, &self.endpoints.refine_mockup(), request)
            .await?;
        checked(response)
    }

    async fn simulate_feedback(&self, html_content: &str) -> ClientResult<Vec<SimulatedFeedback>> {
        let body = SimulateFeedbackRequest {
            html_content: html_content.to_string(),
        };
        let response: SimulateFeedbackResponse = self
            .send(Method::POST, &self.endpoints.simulate_feedback(), &body)
            .await?;
        Ok(checked(response)?.feedback)
    }

    async fn submit_mockup(&self, id: &str) -> ClientResult<SubmitResponse> {
        let url = self.endpoints.submit_mockup(id);
        let response: SubmitResponse = self.execute(self.client.post(&url), Method::POST, &url).await?;
        // Per-ticket results are kept even when every ticket failed
        if !response.tickets.is_empty() {
            return Ok(response);
        }
        checked(response)
    }

    async fn tracker_connected(&self) -> ClientResult<bool> {
        let response: TrackerTestResponse = self.get(self.endpoints.tracker_test()).await?;
        if let Some(error) = response.error.as_deref() {
            debug!("Tracker check reported: {}", error);
        }
        Ok(response.success && response.connected)
    }

    async fn tracker_tickets(&self) -> ClientResult<Vec<TrackerTicket>> {
        let response: TrackerTicketsResponse = self.get(self.endpoints.tracker_tickets()).await?;
        Ok(checked(response)?.tickets)
    }
}
