//! API Client
//!
//! Thin wrapper over `reqwest` for the agent backend and the land data host.
//! Works natively and in the browser; request timeouts only apply natively.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Response, StatusCode};

use globe_core::land::parse_sample_points;
use globe_core::{DotSampler, FeatureCollection, SamplePoint};

use crate::backend::{ByteStream, ChatBackend};
use crate::config::{ClientConfig, LandSource};
use crate::error::{ClientError, Result};
use crate::user::{rejection_detail, PasswordChange, User};

/// Backend API client
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));

        let http = builder.build()?;

        tracing::debug!("API client targeting {}", config.backend_url);

        Ok(Self { http, config })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the signed-in user's profile
    pub async fn fetch_user(&self, token: &str) -> Result<User> {
        let response = self
            .http
            .get(self.config.endpoint("user/"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = check_status(response, "Loading your profile").await?;
        let body: serde_json::Value = response.json().await?;

        Ok(User::from_profile(body)?)
    }

    /// Change the signed-in user's password.
    ///
    /// Any 2xx is success. A rejection carries the backend's first
    /// validation message.
    pub async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<()> {
        change.validate()?;

        let response = self
            .http
            .put(self.config.endpoint("user/password"))
            .bearer_auth(token)
            .json(change)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Password changed");
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        Err(rejection_detail(&body).map_or_else(
            || ClientError::Status {
                status: status.as_u16(),
                context: "Changing your password".into(),
            },
            ClientError::Rejected,
        ))
    }

    /// Post a chat message and return the streamed reply body
    pub async fn chat(&self, token: &str, message: &str) -> Result<ByteStream> {
        let response = self
            .http
            .post(self.config.endpoint("agent/chat"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;

        let response = check_status(response, "Sending your message").await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from))
            .boxed_local())
    }

    /// Fetch land polygons as GeoJSON
    pub async fn fetch_land(&self, url: &str) -> Result<FeatureCollection> {
        let body = self.fetch_text(url, "Loading land map data").await?;
        Ok(FeatureCollection::from_json(&body)?)
    }

    /// Fetch a precomputed dot list
    pub async fn fetch_land_points(&self, url: &str) -> Result<Vec<SamplePoint>> {
        let body = self.fetch_text(url, "Loading land dots").await?;
        Ok(parse_sample_points(&body)?)
    }

    /// Land dots from the configured source
    pub async fn load_land(&self) -> Result<Vec<SamplePoint>> {
        match &self.config.land_source {
            LandSource::Precomputed { url } => self.fetch_land_points(url).await,
            LandSource::Sampled { url, dot_spacing } => {
                let land = self.fetch_land(url).await?;
                Ok(DotSampler::new(*dot_spacing).sample_collection(&land))
            }
        }
    }

    async fn fetch_text(&self, url: &str, context: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let response = check_status(response, context).await?;
        Ok(response.text().await?)
    }
}

#[async_trait(?Send)]
impl ChatBackend for ApiClient {
    async fn open_chat(&self, token: &str, message: &str) -> Result<ByteStream> {
        self.chat(token, message).await
    }
}

/// Map non-success statuses to errors
async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::warn!("{} failed with HTTP {}", context, status);

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    Err(status_error(status, context))
}

fn status_error(status: StatusCode, context: &str) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
            }
        }]
    }"#;

    fn client_for(server: &MockServer, land_source: LandSource) -> ApiClient {
        let mut config = ClientConfig::new(server.uri());
        config.land_source = land_source;
        ApiClient::new(config).unwrap()
    }

    fn sampled(server: &MockServer) -> LandSource {
        LandSource::Sampled {
            url: format!("{}/land.json", server.uri()),
            dot_spacing: 16.0,
        }
    }

    #[test]
    fn test_client_keeps_config() {
        let client = ApiClient::new(ClientConfig::new("https://api.example.com/")).unwrap();
        assert_eq!(client.config().backend_url, "https://api.example.com");
        assert_eq!(client.config().endpoint("agent/chat"), "https://api.example.com/agent/chat");
    }

    #[test]
    fn test_status_error_message() {
        let err = status_error(StatusCode::BAD_GATEWAY, "Sending your message");
        assert_eq!(err.to_string(), "Sending your message failed with HTTP 502");
        assert_eq!(err.user_message(), "Sending your message failed. Please try again later.");
    }

    #[tokio::test]
    async fn test_load_land_samples_geojson() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/land.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SQUARE))
            .mount(&server)
            .await;

        let points = client_for(&server, sampled(&server)).load_land().await.unwrap();
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| (0.0..=10.0).contains(&p.lon) && (0.0..=10.0).contains(&p.lat)));
    }

    #[tokio::test]
    async fn test_load_land_error_status_skips_sampling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/land.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server, sampled(&server)).load_land().await;
        assert!(matches!(result, Err(ClientError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_load_land_precomputed_points() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/land-dots.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[[1.5,2.5],[-3,4]]"))
            .mount(&server)
            .await;

        let source = LandSource::Precomputed {
            url: format!("{}/land-dots.json", server.uri()),
        };
        let points = client_for(&server, source).load_land().await.unwrap();
        assert_eq!(points, vec![SamplePoint::new(1.5, 2.5), SamplePoint::new(-3.0, 4.0)]);
    }

    #[tokio::test]
    async fn test_chat_posts_message_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent/chat"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"message": "Hello"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("data: {\"type\":\"content\",\"content\":\"Hi\"}\ndata: [DONE]\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = client_for(&server, LandSource::default()).chat("tok", "Hello").await.unwrap();
        let mut reply = String::new();
        let delivered = crate::stream::consume(body, |f| reply.push_str(f)).await.unwrap();

        assert_eq!(delivered, 1);
        assert_eq!(reply, "Hi");
    }

    #[tokio::test]
    async fn test_chat_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent/chat"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server, LandSource::default()).chat("stale", "Hello").await;
        assert!(matches!(result, Err(ClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_fetch_user_bare_username() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("ada")))
            .mount(&server)
            .await;

        let user = client_for(&server, LandSource::default()).fetch_user("tok").await.unwrap();
        assert_eq!(user.username, "ada");
    }

    #[tokio::test]
    async fn test_change_password_rejection_detail() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/user/password"))
            .and(body_json(json!({"password": "old-secret", "new_password": "new-secret"})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": [{"msg": "Incorrect password", "loc": ["body"]}]})),
            )
            .mount(&server)
            .await;

        let change = PasswordChange {
            password: "old-secret".into(),
            new_password: "new-secret".into(),
        };
        let result = client_for(&server, LandSource::default()).change_password("tok", &change).await;
        assert!(matches!(result, Err(ClientError::Rejected(msg)) if msg == "Incorrect password"));
    }

    #[tokio::test]
    async fn test_change_password_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/user/password"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let change = PasswordChange {
            password: "old-secret".into(),
            new_password: "new-secret".into(),
        };
        let client = client_for(&server, LandSource::default());
        assert!(client.change_password("tok", &change).await.is_ok());
    }

    #[tokio::test]
    async fn test_short_password_never_sent() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let change = PasswordChange {
            password: "old-secret".into(),
            new_password: "abc".into(),
        };
        let result = client_for(&server, LandSource::default()).change_password("tok", &change).await;
        assert!(matches!(result, Err(ClientError::Rejected(_))));
    }
}
