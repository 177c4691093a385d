use std::time::Duration;

use attention_core::{ConversationDetail, SearchResult};
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::Error;
use crate::util::{API_KEY_ENV, pick_api_key, recent_window};

pub const DEFAULT_BASE_URL: &str = "https://api.attention.tech/v2";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_DAYS_BACK: i64 = 7;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Explicit key; falls back to ATTENTION_API_KEY when `None`.
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Filters for `GET /conversations`. Empty strings count as absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
    /// `YYYY-MM-DD`, expanded to the start of that day.
    pub from_date: Option<String>,
    /// `YYYY-MM-DD`, expanded to the end of that day.
    pub to_date: Option<String>,
    pub participant_email: Option<String>,
    pub owner_email: Option<String>,
    pub page: u32,
    pub size: u32,
    pub detailed_transcript: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            from_date: None,
            to_date: None,
            participant_email: None,
            owner_email: None,
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            detailed_transcript: false,
        }
    }
}

impl SearchParams {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
            (
                "detailedTranscript".to_string(),
                self.detailed_transcript.to_string(),
            ),
        ];
        if let Some(title) = non_empty(&self.query) {
            query.push(("filter[title]".to_string(), title.to_string()));
        }
        if let Some(from_date) = non_empty(&self.from_date) {
            query.push(("fromDateTime".to_string(), format!("{from_date}T00:00:00Z")));
        }
        if let Some(to_date) = non_empty(&self.to_date) {
            query.push(("toDateTime".to_string(), format!("{to_date}T23:59:59Z")));
        }
        if let Some(email) = non_empty(&self.participant_email) {
            query.push(("filter[participants.email]".to_string(), email.to_string()));
        }
        if let Some(email) = non_empty(&self.owner_email) {
            query.push(("filter[owner.email]".to_string(), email.to_string()));
        }
        query
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn conversation_query(
    detailed_transcript: bool,
    include_internal_participants: bool,
) -> Vec<(String, String)> {
    vec![
        (
            "detailedTranscript".to_string(),
            detailed_transcript.to_string(),
        ),
        (
            "filter[include_internal_participants]".to_string(),
            include_internal_participants.to_string(),
        ),
    ]
}

/// Authenticated client for the Attention REST API.
///
/// Holds one connection pool for its whole lifetime; the pool is released
/// when the client is dropped, on every exit path.
#[derive(Clone, Debug)]
pub struct AttentionClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AttentionClient {
    /// Fails with [`Error::Config`] when no key is available or the base URL
    /// is unusable. No request is made here.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::with_env_key(config, std::env::var(API_KEY_ENV).ok().as_deref())
    }

    /// Like [`AttentionClient::new`] with the environment's key supplied by
    /// the caller.
    pub(crate) fn with_env_key(config: ClientConfig, env_key: Option<&str>) -> Result<Self, Error> {
        let api_key = pick_api_key(config.api_key.as_deref(), env_key)?;
        let base_url = parse_base_url(&config.base_url)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::Config("API key contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn search_conversations(&self, params: &SearchParams) -> Result<SearchResult, Error> {
        let body = self
            .get_json(&["conversations"], &params.query_pairs())
            .await?;
        Ok(SearchResult::from_value(&body))
    }

    /// The id is sent as a single path segment without validation; malformed
    /// ids come back as a 4xx [`Error::Request`].
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
        detailed_transcript: bool,
        include_internal_participants: bool,
    ) -> Result<ConversationDetail, Error> {
        let body = self
            .get_json(
                &["conversations", conversation_id],
                &conversation_query(detailed_transcript, include_internal_participants),
            )
            .await?;
        Ok(ConversationDetail::from_value(&body))
    }

    pub async fn list_recent_conversations(
        &self,
        days_back: i64,
        size: u32,
    ) -> Result<SearchResult, Error> {
        let today = chrono::Local::now().date_naive();
        let (from_date, to_date) = recent_window(today, days_back)?;
        tracing::debug!(days_back, %from_date, %to_date, "listing recent conversations");
        self.search_conversations(&SearchParams {
            from_date: Some(from_date),
            to_date: Some(to_date),
            size,
            ..SearchParams::default()
        })
        .await
    }

    async fn get_json(&self, segments: &[&str], query: &[(String, String)]) -> Result<Value, Error> {
        let url = self.endpoint(segments, query)?;
        let started = std::time::Instant::now();

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        tracing::debug!(
            path = url.path(),
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "attention api request"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn endpoint(&self, segments: &[&str], query: &[(String, String)]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("Invalid API base URL: {}", self.base_url)))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid API base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("Invalid API base URL '{raw}'")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AttentionClient {
        AttentionClient::new(ClientConfig {
            api_key: Some("test-key".to_string()),
            base_url: format!("{}/v2", server.uri()),
        })
        .unwrap()
    }

    #[test]
    fn search_params_expand_dates_and_skip_empty_filters() {
        let params = SearchParams {
            query: Some("acme".to_string()),
            from_date: Some("2024-01-01".to_string()),
            to_date: Some("2024-01-31".to_string()),
            participant_email: Some(String::new()),
            owner_email: Some("owner@acme.io".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(
            params.query_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "20".to_string()),
                ("detailedTranscript".to_string(), "false".to_string()),
                ("filter[title]".to_string(), "acme".to_string()),
                ("fromDateTime".to_string(), "2024-01-01T00:00:00Z".to_string()),
                ("toDateTime".to_string(), "2024-01-31T23:59:59Z".to_string()),
                ("filter[owner.email]".to_string(), "owner@acme.io".to_string()),
            ]
        );
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let server_url = "http://127.0.0.1:9/v2".to_string();
        let err = AttentionClient::with_env_key(
            ClientConfig {
                api_key: None,
                base_url: server_url.clone(),
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "ATTENTION_API_KEY must be set");

        let err = AttentionClient::with_env_key(
            ClientConfig {
                api_key: Some("   ".to_string()),
                base_url: "not a url".to_string(),
            },
            Some(""),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "ATTENTION_API_KEY must be set");

        let client = AttentionClient::with_env_key(
            ClientConfig {
                api_key: None,
                base_url: server_url,
            },
            Some("from-env"),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = AttentionClient::new(ClientConfig {
            api_key: Some("key".to_string()),
            base_url: "not a url".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn conversation_ids_are_encoded_as_one_segment() {
        let client = AttentionClient::new(ClientConfig {
            api_key: Some("key".to_string()),
            base_url: "https://api.example.com/v2/".to_string(),
        })
        .unwrap();
        let url = client
            .endpoint(&["conversations", "a b/c"], &conversation_query(true, false))
            .unwrap();
        assert_eq!(url.path(), "/v2/conversations/a%20b%2Fc");
        assert_eq!(
            url.query(),
            Some("detailedTranscript=true&filter%5Binclude_internal_participants%5D=false")
        );
    }

    #[tokio::test]
    async fn search_sends_bearer_token_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/conversations"))
            .and(header("authorization", "Bearer test-key"))
            .and(query_param("page", "1"))
            .and(query_param("size", "5"))
            .and(query_param("detailedTranscript", "false"))
            .and(query_param("filter[title]", "renewal"))
            .and(query_param_is_missing("fromDateTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "c-1", "attributes": { "title": "Renewal" } }],
                "meta": { "totalRecords": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .search_conversations(&SearchParams {
                query: Some("renewal".to_string()),
                size: 5,
                ..SearchParams::default()
            })
            .await
            .unwrap();

        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].title, "Renewal");
        assert_eq!(result.total(), 1);
    }

    #[tokio::test]
    async fn get_conversation_embeds_id_in_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/conversations/c-42"))
            .and(query_param("detailedTranscript", "true"))
            .and(query_param("filter[include_internal_participants]", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "attributes": { "uuid": "c-42", "title": "Kickoff" }
            })))
            .mount(&server)
            .await;

        let detail = client_for(&server)
            .get_conversation("c-42", true, false)
            .await
            .unwrap();
        assert_eq!(detail.id, "c-42");
        assert_eq!(detail.title, "Kickoff");
    }

    #[tokio::test]
    async fn non_success_status_is_a_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/conversations/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":\"not found\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_conversation("missing", true, false)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.code(), "request_failed");
        assert!(err.to_string().contains("HTTP 404"));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search_conversations(&SearchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn recent_conversations_search_a_date_window() {
        let server = MockServer::start().await;
        let today = chrono::Local::now().date_naive();
        let (from_date, to_date) = recent_window(today, 3).unwrap();
        Mock::given(method("GET"))
            .and(path("/v2/conversations"))
            .and(query_param("size", "10"))
            .and(query_param("fromDateTime", format!("{from_date}T00:00:00Z")))
            .and(query_param("toDateTime", format!("{to_date}T23:59:59Z")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .list_recent_conversations(3, 10)
            .await
            .unwrap();
        assert!(result.data.is_empty());
    }
}
