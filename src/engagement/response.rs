//! Graph API object schema.
//!
//! Every field is optional: an absent or `null` field decodes to `None` rather
//! than failing the whole response.

use serde::Deserialize;

/// Top-level object returned for a URL lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphObject {
    /// Object id echoed back by the API.
    pub id: Option<String>,
    /// Aggregate engagement counters.
    pub engagement: Option<Engagement>,
    /// Open Graph object for the URL.
    pub og_object: Option<OgObject>,
    /// Present instead of data when the request failed.
    pub error: Option<GraphErrorBody>,
}

/// `engagement` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engagement {
    pub reaction_count: Option<i64>,
    pub share_count: Option<i64>,
    pub comment_count: Option<i64>,
}

/// `og_object` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OgObject {
    pub id: Option<String>,
    /// Comments left through the embedded comments plugin.
    pub comment_plugin_count: Option<i64>,
}

/// `error` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphErrorBody {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<i64>,
}

impl GraphObject {
    /// Parses a response body.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not a JSON object of
    /// this shape (for example a counter that is not an integer).
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    #[must_use]
    pub fn reactions(&self) -> Option<i64> {
        self.engagement.as_ref().and_then(|e| e.reaction_count)
    }

    #[must_use]
    pub fn shares(&self) -> Option<i64> {
        self.engagement.as_ref().and_then(|e| e.share_count)
    }

    #[must_use]
    pub fn comments(&self) -> Option<i64> {
        self.engagement.as_ref().and_then(|e| e.comment_count)
    }

    #[must_use]
    pub fn plugin_comments(&self) -> Option<i64> {
        self.og_object.as_ref().and_then(|o| o.comment_plugin_count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_object() {
        let body = r#"{
            "engagement": {"reaction_count": 3, "share_count": 7, "comment_count": 1, "comment_plugin_count": 0},
            "og_object": {"id": "1234", "comment_plugin_count": 2},
            "id": "https://example.org/a"
        }"#;
        let object = GraphObject::parse(body).unwrap();
        assert_eq!(object.reactions(), Some(3));
        assert_eq!(object.shares(), Some(7));
        assert_eq!(object.comments(), Some(1));
        assert_eq!(object.plugin_comments(), Some(2));
        assert!(object.error.is_none());
    }

    #[test]
    fn test_parse_missing_blocks_gives_none() {
        let object = GraphObject::parse(r#"{"id": "https://example.org/a"}"#).unwrap();
        assert_eq!(object.reactions(), None);
        assert_eq!(object.plugin_comments(), None);
    }

    #[test]
    fn test_parse_null_counters_gives_none() {
        let object =
            GraphObject::parse(r#"{"engagement": {"reaction_count": null}, "og_object": null}"#)
                .unwrap();
        assert_eq!(object.reactions(), None);
        assert_eq!(object.shares(), None);
    }

    #[test]
    fn test_parse_error_document() {
        let object = GraphObject::parse(
            r#"{"error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}}"#,
        )
        .unwrap();
        let error = object.error.unwrap();
        assert_eq!(error.code, Some(190));
        assert_eq!(error.kind.as_deref(), Some("OAuthException"));
    }

    #[test]
    fn test_parse_rejects_non_integer_counter() {
        assert!(GraphObject::parse(r#"{"engagement": {"share_count": "many"}}"#).is_err());
    }
}
