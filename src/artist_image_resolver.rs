//! Resolves an artist name to a remote image URL through an artist search API.
//!
//! Only a candidate whose name fingerprint equals the queried name's fingerprint
//! is accepted, so "Coldplay (Live)" never stands in for "Coldplay".

use std::io::Read;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::fingerprint::fingerprint;

/// Response bodies larger than this are not a search result.
const MAX_SEARCH_RESPONSE_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Image URL of the first exactly matching candidate.
    Found(String),
    /// The search answered but nothing usable matched.
    NoMatch,
    /// The search could not be completed (network, timeout, HTTP status, bad JSON).
    Unavailable(String),
}

pub trait ArtistImageResolver: Send + Sync {
    fn resolve(&self, artist_name: &str) -> ResolveOutcome;
}

/// Picks the image URL of the first candidate named like `artist_name`.
///
/// Expects `{ "data": [ { "name": ..., "picture_big": ... }, ... ] }`. Shape
/// errors reached before a match end the lookup with `None`.
pub fn select_matching_image_url(artist_name: &str, payload: &Value) -> Option<String> {
    let wanted = fingerprint(artist_name);
    for candidate in payload.get("data")?.as_array()? {
        let name = candidate.get("name")?.as_str()?;
        if fingerprint(name) == wanted {
            return candidate
                .get("picture_big")?
                .as_str()
                .map(str::to_string)
                .filter(|url| !url.is_empty());
        }
    }
    None
}

pub fn search_request_url(search_url: &str, artist_name: &str) -> String {
    let separator = if search_url.contains('?') { '&' } else { '?' };
    format!(
        "{search_url}{separator}q={}",
        urlencoding::encode(artist_name)
    )
}

/// Resolver backed by the Deezer artist search endpoint (or a compatible one).
pub struct DeezerArtistResolver {
    http_client: ureq::Agent,
    search_url: String,
    user_agent: String,
}

impl DeezerArtistResolver {
    pub fn new(
        search_url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            http_client,
            search_url: search_url.into(),
            user_agent: user_agent.into(),
        }
    }

    fn http_get_json_once(&self, url: &str) -> Result<Value, String> {
        let response = self
            .http_client
            .get(url)
            .set("User-Agent", &self.user_agent)
            .set("Accept", "application/json")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(code, _) => format!("search returned HTTP {code}"),
                ureq::Error::Transport(transport) => {
                    format!("search request failed: {transport}")
                }
            })?;
        let mut body = String::new();
        response
            .into_reader()
            .take(MAX_SEARCH_RESPONSE_BYTES)
            .read_to_string(&mut body)
            .map_err(|error| format!("failed to read search response: {error}"))?;
        serde_json::from_str(&body).map_err(|error| format!("invalid JSON response: {error}"))
    }
}

impl ArtistImageResolver for DeezerArtistResolver {
    fn resolve(&self, artist_name: &str) -> ResolveOutcome {
        let url = search_request_url(&self.search_url, artist_name);
        let payload = match self.http_get_json_once(&url) {
            Ok(payload) => payload,
            Err(reason) => {
                debug!("Artist image lookup for '{}' failed: {}", artist_name, reason);
                return ResolveOutcome::Unavailable(reason);
            }
        };
        match select_matching_image_url(artist_name, &payload) {
            Some(image_url) => ResolveOutcome::Found(image_url),
            None => {
                debug!("No matching search result for '{}'", artist_name);
                ResolveOutcome::NoMatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        search_request_url, select_matching_image_url, ArtistImageResolver,
        DeezerArtistResolver, ResolveOutcome,
    };
    use crate::test_support::{http_response, refused_url, serve_once};
    use serde_json::json;
    use std::time::Duration;

    fn resolver_for(base_url: &str) -> DeezerArtistResolver {
        DeezerArtistResolver::new(
            format!("{base_url}/search/artist"),
            "artsync-test",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_select_matching_image_url_requires_exact_fingerprint() {
        let payload = json!({
            "data": [
                { "name": "Coldplay (Live)", "picture_big": "https://img/live.jpg" },
                { "name": "Coldplay", "picture_big": "https://img/coldplay.jpg" },
            ]
        });
        assert_eq!(
            select_matching_image_url("Coldplay", &payload),
            Some("https://img/coldplay.jpg".to_string())
        );
    }

    #[test]
    fn test_select_matching_image_url_takes_first_match() {
        let payload = json!({
            "data": [
                { "name": "Coldplay", "picture_big": "https://img/first.jpg" },
                { "name": "Coldplay (Live)", "picture_big": "https://img/live.jpg" },
                { "name": "COLDPLAY", "picture_big": "https://img/second.jpg" },
            ]
        });
        assert_eq!(
            select_matching_image_url("coldplay", &payload),
            Some("https://img/first.jpg".to_string())
        );
    }

    #[test]
    fn test_select_matching_image_url_matches_diacritic_variants() {
        let payload = json!({
            "data": [ { "name": "Beyoncé", "picture_big": "https://img/b.jpg" } ]
        });
        assert_eq!(
            select_matching_image_url("Beyonce", &payload),
            Some("https://img/b.jpg".to_string())
        );
    }

    #[test]
    fn test_select_matching_image_url_empty_or_malformed_is_none() {
        assert_eq!(select_matching_image_url("Low", &json!({ "data": [] })), None);
        assert_eq!(select_matching_image_url("Low", &json!({})), None);
        assert_eq!(select_matching_image_url("Low", &json!({ "data": "Low" })), None);
        assert_eq!(select_matching_image_url("Low", &json!([1, 2, 3])), None);
        let quota_error = json!({ "error": { "code": 4, "message": "Quota" } });
        assert_eq!(select_matching_image_url("Low", &quota_error), None);
    }

    #[test]
    fn test_select_matching_image_url_stops_at_candidate_without_name() {
        let payload = json!({
            "data": [
                { "id": 1, "picture_big": "https://img/anon.jpg" },
                { "name": "Low", "picture_big": "https://img/low.jpg" },
            ]
        });
        assert_eq!(select_matching_image_url("Low", &payload), None);
    }

    #[test]
    fn test_select_matching_image_url_matched_candidate_without_picture_is_none() {
        let payload = json!({ "data": [ { "name": "Low", "picture_big": null } ] });
        assert_eq!(select_matching_image_url("Low", &payload), None);
        let payload = json!({ "data": [ { "name": "Low" } ] });
        assert_eq!(select_matching_image_url("Low", &payload), None);
    }

    #[test]
    fn test_search_request_url_escapes_query() {
        assert_eq!(
            search_request_url("https://api.deezer.com/search/artist", "Simon & Garfunkel"),
            "https://api.deezer.com/search/artist?q=Simon%20%26%20Garfunkel"
        );
        assert_eq!(
            search_request_url("http://localhost/search?limit=5", "Sigur Rós"),
            "http://localhost/search?limit=5&q=Sigur%20R%C3%B3s"
        );
    }

    #[test]
    fn test_resolve_returns_matching_picture_from_search_response() {
        let body = json!({
            "data": [
                { "name": "Low Roar", "picture_big": "https://img/low-roar.jpg" },
                { "name": "LOW", "picture_big": "https://img/low.jpg" },
            ]
        })
        .to_string();
        let base_url = serve_once(http_response("200 OK", "application/json", body.as_bytes()));

        assert_eq!(
            resolver_for(&base_url).resolve("Low"),
            ResolveOutcome::Found("https://img/low.jpg".to_string())
        );
    }

    #[test]
    fn test_resolve_without_match_is_no_match() {
        let body = json!({ "data": [] }).to_string();
        let base_url = serve_once(http_response("200 OK", "application/json", body.as_bytes()));

        assert_eq!(resolver_for(&base_url).resolve("Low"), ResolveOutcome::NoMatch);
    }

    #[test]
    fn test_resolve_server_error_is_unavailable() {
        let base_url = serve_once(http_response(
            "500 Internal Server Error",
            "text/plain",
            b"oops",
        ));

        assert!(matches!(
            resolver_for(&base_url).resolve("Low"),
            ResolveOutcome::Unavailable(reason) if reason.contains("500")
        ));
    }

    #[test]
    fn test_resolve_html_body_is_unavailable() {
        let base_url = serve_once(http_response(
            "200 OK",
            "text/html",
            b"<html>rate limited</html>",
        ));

        assert!(matches!(
            resolver_for(&base_url).resolve("Low"),
            ResolveOutcome::Unavailable(_)
        ));
    }

    #[test]
    fn test_resolve_refused_connection_is_unavailable() {
        assert!(matches!(
            resolver_for(&refused_url()).resolve("Low"),
            ResolveOutcome::Unavailable(_)
        ));
    }
}
