use gloo::net::http::Request;
use seqmaster_core::{ApiRequest, Mode, RequestFailure, Response};
use seqmaster_protocol::{self as protocol, Endpoint, Method, ProtocolError};
use serde::de::DeserializeOwned;

/// Thin HTTP client for the game service.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ApiClient {
    base: String,
    timeout_ms: u32,
}

impl ApiClient {
    pub(crate) fn new(base: &str, timeout_ms: u32) -> Self {
        Self {
            base: base.trim_end_matches('/').into(),
            timeout_ms,
        }
    }

    pub(crate) fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base, endpoint.path)
    }

    async fn exchange(&self, endpoint: Endpoint, body: Option<String>) -> Result<(u16, String), RequestFailure> {
        let url = self.url(endpoint);
        log::trace!("{:?} {}", endpoint.method, url);
        let builder = match endpoint.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url).header("Content-Type", "application/json"),
        };
        let request = match body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|err| RequestFailure::Network(err.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|err| RequestFailure::Network(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RequestFailure::Network(err.to_string()))?;
        Ok((status, text))
    }

    /// Performs a controller request; never fails, failures become `Response::Failed`.
    pub(crate) async fn send(&self, request: &ApiRequest) -> Response {
        let body = match protocol::request_body(request) {
            Ok(body) => body,
            Err(err) => return Response::Failed(request.kind(), err.into()),
        };
        match self.exchange(Endpoint::for_request(request), body).await {
            Ok((status, text)) => protocol::decode(request, status, &text),
            Err(failure) => Response::Failed(request.kind(), failure),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint, body: Option<String>) -> Result<T, RequestFailure> {
        let (status, text) = self.exchange(endpoint, body).await?;
        protocol::decode_body(status, &text).map_err(RequestFailure::from)
    }

    pub(crate) async fn leaderboard(&self) -> Result<Vec<protocol::LeaderboardEntry>, RequestFailure> {
        self.fetch(Endpoint::LEADERBOARD, None).await
    }

    pub(crate) async fn submit_score(&self, name: &str, score: u64, mode: Mode) -> Result<(), RequestFailure> {
        let body = serde_json::to_string(&protocol::SubmitScoreRequest { name, score, mode })
            .map_err(|err| RequestFailure::from(ProtocolError::from(err)))?;
        self.fetch::<protocol::Ack>(Endpoint::SUBMIT_SCORE, Some(body))
            .await
            .map(|_| ())
    }

    pub(crate) async fn achievements(&self) -> Result<protocol::AchievementCatalog, RequestFailure> {
        self.fetch(Endpoint::ACHIEVEMENTS, None).await
    }

    pub(crate) async fn stats(&self) -> Result<serde_json::Value, RequestFailure> {
        self.fetch(Endpoint::STATS, None).await
    }
}
