//! HTTP access to a Lavalink node, scoped to one websocket session.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serenity::all::GuildId;
use tracing::debug;
use url::Url;

use super::model::{LoadResult, NodeError, PlayerState, PlayerUpdate};
use super::{PlayerError, PlayerResult};

/// REST client for one node session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: Client,
    base_url: Url,
    session_id: Arc<str>,
}

impl NodeClient {
    pub fn new(
        base_url: Url,
        password: &str,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> PlayerResult<Self> {
        let mut headers = HeaderMap::new();
        let password = HeaderValue::from_str(password)
            .map_err(|e| PlayerError::Config(format!("invalid node password: {}", e)))?;
        headers.insert(AUTHORIZATION, password);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            session_id: Arc::from(session_id.into()),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> PlayerResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PlayerError::Config(format!("invalid node path {}: {}", path, e)))
    }

    /// Request against `/v4/sessions/{session}/players/{guild}{suffix}`.
    pub(crate) fn player_request(
        &self,
        method: Method,
        guild_id: GuildId,
        suffix: &str,
    ) -> PlayerResult<RequestBuilder> {
        let url = self.url(&format!(
            "/v4/sessions/{}/players/{}{}",
            self.session_id, guild_id, suffix
        ))?;
        Ok(self.http.request(method, url))
    }

    /// Resolve `identifier` (a URL or a `ytsearch:` style query) into tracks.
    pub async fn load_tracks(&self, identifier: &str) -> PlayerResult<LoadResult> {
        debug!("Loading tracks for identifier: {}", identifier);
        let request = self
            .http
            .get(self.url("/v4/loadtracks")?)
            .query(&[("identifier", identifier)]);

        let response = Self::execute(request).await?;
        Self::decode(response).await
    }

    /// The node's player for `guild_id`, or `None` if it has none.
    pub async fn player(&self, guild_id: GuildId) -> PlayerResult<Option<PlayerState>> {
        let response = self
            .player_request(Method::GET, guild_id, "")?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response).await?;
        Self::decode(response).await.map(Some)
    }

    pub async fn update_player(
        &self,
        guild_id: GuildId,
        update: &PlayerUpdate,
    ) -> PlayerResult<()> {
        let request = self
            .player_request(Method::PATCH, guild_id, "")?
            .json(update);
        Self::execute(request).await?;
        Ok(())
    }

    /// Remove the node's player for `guild_id`, disconnecting it from voice.
    pub async fn destroy_player(&self, guild_id: GuildId) -> PlayerResult<()> {
        let request = self.player_request(Method::DELETE, guild_id, "")?;
        Self::execute(request).await?;
        Ok(())
    }

    /// Send `request`, turning non-2xx responses into errors.
    pub(crate) async fn execute(request: RequestBuilder) -> PlayerResult<Response> {
        let response = request.send().await?;
        Self::check(response).await
    }

    /// Non-2xx responses carry a structured error body, which is returned as-is.
    async fn check(response: Response) -> PlayerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<NodeError>(&body) {
            Ok(error) => Err(PlayerError::Node(error)),
            Err(_) => Err(PlayerError::UnexpectedStatus(status)),
        }
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> PlayerResult<T> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(PlayerError::Decode)
    }
}
