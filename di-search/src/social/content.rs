//! Keyed content-platform APIs (video and image search).
//!
//! One call per platform, bounded result count. A missing key returns
//! [`SearchError::Credential`] before any request is built.

use serde::Deserialize;

use crate::error::SearchError;
use crate::types::ListingResult;

use super::{usable_key, SocialProvider};

/// YouTube Data API v3 video search.
#[derive(Clone)]
pub struct YouTubeApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct YouTubeResponse {
    #[serde(default)]
    items: Vec<YouTubeItem>,
}

#[derive(Debug, Deserialize)]
struct YouTubeItem {
    id: YouTubeId,
    #[serde(default)]
    snippet: Option<YouTubeSnippet>,
}

#[derive(Debug, Deserialize)]
struct YouTubeId {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YouTubeSnippet {
    #[serde(default)]
    title: String,
}

impl YouTubeApi {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: Option<String>,
        max_results: usize,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_owned(),
            api_key,
            max_results,
        }
    }
}

impl SocialProvider for YouTubeApi {
    fn name(&self) -> &str {
        "YouTube"
    }

    fn has_credential(&self) -> bool {
        usable_key(self.api_key.as_ref()).is_some()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ListingResult>, SearchError> {
        let key = usable_key(self.api_key.as_ref())
            .ok_or_else(|| SearchError::Credential("YouTube".into()))?;
        tracing::trace!(query, "YouTube search");

        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", key),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("YouTube request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!("YouTube API error {status}")));
        }

        let body: YouTubeResponse = response.json().await.map_err(|e| {
            SearchError::Parse(format!("YouTube response decode failed: {}", e.without_url()))
        })?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let title = item.snippet.map(|s| s.title).unwrap_or_default();
                let title = title.trim();
                if video_id.is_empty() || title.is_empty() {
                    return None;
                }
                let link = format!("https://www.youtube.com/watch?v={video_id}");
                Some(ListingResult::new(title, &link, self.name()))
            })
            .take(self.max_results)
            .collect())
    }
}

/// Flickr photo search (`flickr.photos.search`).
#[derive(Clone)]
pub struct FlickrApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct FlickrResponse {
    #[serde(default)]
    photos: Option<FlickrPhotos>,
}

#[derive(Debug, Deserialize)]
struct FlickrPhotos {
    #[serde(default)]
    photo: Vec<FlickrPhoto>,
}

#[derive(Debug, Deserialize)]
struct FlickrPhoto {
    #[serde(default)]
    id: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    title: String,
}

impl FlickrApi {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: Option<String>,
        max_results: usize,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_owned(),
            api_key,
            max_results,
        }
    }
}

impl SocialProvider for FlickrApi {
    fn name(&self) -> &str {
        "Flickr"
    }

    fn has_credential(&self) -> bool {
        usable_key(self.api_key.as_ref()).is_some()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ListingResult>, SearchError> {
        let key = usable_key(self.api_key.as_ref())
            .ok_or_else(|| SearchError::Credential("Flickr".into()))?;
        tracing::trace!(query, "Flickr search");

        let per_page = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("method", "flickr.photos.search"),
                ("api_key", key),
                ("text", query),
                ("per_page", per_page.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Flickr request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!("Flickr API error {status}")));
        }

        let body: FlickrResponse = response.json().await.map_err(|e| {
            SearchError::Parse(format!("Flickr response decode failed: {}", e.without_url()))
        })?;

        let photos = body.photos.map(|p| p.photo).unwrap_or_default();
        Ok(photos
            .into_iter()
            .filter(|p| !p.id.is_empty() && !p.owner.is_empty() && !p.title.trim().is_empty())
            .map(|p| {
                let link = format!("https://www.flickr.com/photos/{}/{}", p.owner, p.id);
                ListingResult::new(p.title.trim(), &link, self.name())
            })
            .take(self.max_results)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const KEY: &str = "yt-secret-123";

    async fn forbidden(route: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        server
    }

    fn assert_redacted(err: &SearchError) {
        let text = err.to_string();
        assert!(!text.contains(KEY), "key leaked: {text}");
        assert!(!text.contains("steel"), "query leaked: {text}");
    }

    #[tokio::test]
    async fn youtube_rejection_hides_key_and_query() {
        let server = forbidden("/yt").await;
        let api = YouTubeApi::new(
            reqwest::Client::new(),
            &format!("{}/yt", server.uri()),
            Some(KEY.into()),
            10,
        );
        let err = api.fetch("steel").await.unwrap_err();
        assert!(err.to_string().contains("403"), "{err}");
        assert_redacted(&err);
    }

    #[tokio::test]
    async fn flickr_rejection_hides_key_and_query() {
        let server = forbidden("/rest").await;
        let api = FlickrApi::new(
            reqwest::Client::new(),
            &format!("{}/rest", server.uri()),
            Some(KEY.into()),
            10,
        );
        let err = api.fetch("steel").await.unwrap_err();
        assert_redacted(&err);
    }

    #[tokio::test]
    async fn unreachable_api_hides_key_and_query() {
        let youtube = YouTubeApi::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/yt",
            Some(KEY.into()),
            10,
        );
        let err = youtube.fetch("steel").await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
        assert_redacted(&err);

        let flickr = FlickrApi::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/rest",
            Some(KEY.into()),
            10,
        );
        assert_redacted(&flickr.fetch("steel").await.unwrap_err());
    }

    #[tokio::test]
    async fn undecodable_body_hides_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let api = YouTubeApi::new(reqwest::Client::new(), &server.uri(), Some(KEY.into()), 10);
        let err = api.fetch("steel").await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
        assert_redacted(&err);
    }

    #[tokio::test]
    async fn youtube_without_key_is_credential_error() {
        let api = YouTubeApi::new(reqwest::Client::new(), "http://127.0.0.1:9/", None, 10);
        assert!(!api.has_credential());
        let err = api.fetch("steel").await.unwrap_err();
        assert!(matches!(err, SearchError::Credential(_)));
    }

    #[tokio::test]
    async fn blank_flickr_key_counts_as_missing() {
        let api = FlickrApi::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/",
            Some("   ".into()),
            10,
        );
        assert!(!api.has_credential());
        let err = api.fetch("steel").await.unwrap_err();
        assert!(matches!(err, SearchError::Credential(_)));
    }

    #[test]
    fn youtube_response_tolerates_missing_fields() {
        let body: YouTubeResponse = serde_json::from_str(
            r#"{"items": [{"id": {"kind": "youtube#channel"}}, {"id": {"videoId": "abc"}, "snippet": {"title": "Mill"}}]}"#,
        )
        .expect("decode");
        assert_eq!(body.items.len(), 2);
        assert!(body.items[0].id.video_id.is_none());
        assert_eq!(body.items[1].id.video_id.as_deref(), Some("abc"));
    }

    #[test]
    fn flickr_response_without_photos_decodes() {
        let body: FlickrResponse =
            serde_json::from_str(r#"{"stat": "fail", "code": 100}"#).expect("decode");
        assert!(body.photos.is_none());
    }
}
