//! Share link codec for clip time ranges.
//!
//! A shared clip travels as three query parameters on the page URL:
//! `from` and `to` in raw seconds and `clip` carrying the label.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{form_urlencoded, Url};

use crate::clip::Clip;
use crate::timestamp::{format_display, parse_time_input};

/// Label used when the shared clip has none.
pub const DEFAULT_SHARE_LABEL: &str = "shared-clip";

const KEY_FROM: &str = "from";
const KEY_TO: &str = "to";
const KEY_CLIP: &str = "clip";

/// Share link errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShareError {
    #[error("Invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type ShareResult<T> = Result<T, ShareError>;

/// Time range decoded from (or destined for) a share link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SharePayload {
    /// Start in seconds
    pub from: f64,
    /// End in seconds
    pub to: f64,
    /// Clip label, if the link carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_name: Option<String>,
}

impl SharePayload {
    /// Label to show for this payload.
    pub fn display_name(&self) -> &str {
        self.clip_name.as_deref().unwrap_or(DEFAULT_SHARE_LABEL)
    }
}

/// Build a share URL for a clip from the current page URL.
///
/// Existing `from`/`to`/`clip` parameters are replaced; any other query
/// parameters are kept.
pub fn encode_share_url(current_url: &str, clip: &Clip) -> ShareResult<Url> {
    encode_range(current_url, &clip.label, clip.from, clip.to)
}

/// Build a share URL for an arbitrary range.
pub fn encode_range(current_url: &str, label: &str, from: f64, to: f64) -> ShareResult<Url> {
    let mut url = Url::parse(current_url).map_err(|source| ShareError::InvalidUrl {
        url: current_url.to_string(),
        source,
    })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !matches!(k.as_ref(), KEY_FROM | KEY_TO | KEY_CLIP))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let label = if label.is_empty() { DEFAULT_SHARE_LABEL } else { label };

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs
            .append_pair(KEY_FROM, &from.to_string())
            .append_pair(KEY_TO, &to.to_string())
            .append_pair(KEY_CLIP, label);
    }

    Ok(url)
}

/// Decode share parameters from a full URL or a bare query string.
///
/// Returns `None` if `from` or `to` is missing, empty, or not a finite number.
/// A missing or empty `clip` is allowed.
pub fn decode_share_query(input: &str) -> Option<SharePayload> {
    let query = match Url::parse(input) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => input.trim_start_matches('?').to_string(),
    };

    let mut from = None;
    let mut to = None;
    let mut clip_name = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            KEY_FROM if from.is_none() => from = Some(value.into_owned()),
            KEY_TO if to.is_none() => to = Some(value.into_owned()),
            KEY_CLIP if clip_name.is_none() => clip_name = Some(value.into_owned()),
            _ => {}
        }
    }

    let from = parse_finite(from.as_deref()?)?;
    let to = parse_finite(to.as_deref()?)?;

    Some(SharePayload {
        from,
        to,
        clip_name: clip_name.filter(|name| !name.is_empty()),
    })
}

fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Editable share form for one clip.
///
/// The from/to fields start out as the clip's display times and are
/// re-parsed with the time codec when the link is generated, so the shared
/// range is whatever the user left in the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShareDraft {
    pub label: String,
    pub from_text: String,
    pub to_text: String,
    /// The clip's own range, shown as "original" next to the fields
    pub original: String,
}

impl ShareDraft {
    pub fn for_clip(clip: &Clip) -> Self {
        Self {
            label: clip.label.clone(),
            from_text: format_display(clip.from),
            to_text: format_display(clip.to),
            original: clip.display_range(),
        }
    }

    pub fn with_from(mut self, text: impl Into<String>) -> Self {
        self.from_text = text.into();
        self
    }

    pub fn with_to(mut self, text: impl Into<String>) -> Self {
        self.to_text = text.into();
        self
    }

    /// The range the draft currently describes.
    pub fn payload(&self) -> SharePayload {
        SharePayload {
            from: parse_time_input(&self.from_text),
            to: parse_time_input(&self.to_text),
            clip_name: Some(self.label.clone()).filter(|l| !l.is_empty()),
        }
    }

    /// Generate the share URL against the current page URL.
    pub fn to_url(&self, current_url: &str) -> ShareResult<Url> {
        let payload = self.payload();
        encode_range(current_url, &self.label, payload.from, payload.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://clips.example.com/editor";

    #[test]
    fn test_encode_share_url() {
        let clip = Clip::new(1, "Intro", 10.0, 30.5);
        let url = encode_share_url(PAGE, &clip).unwrap();
        assert_eq!(
            url.as_str(),
            "https://clips.example.com/editor?from=10&to=30.5&clip=Intro"
        );
    }

    #[test]
    fn test_encode_replaces_existing_params() {
        let clip = Clip::new(1, "Second", 600.0, 700.0);
        let url = encode_share_url(
            "https://clips.example.com/editor?from=1&lang=ko&clip=Old&to=2",
            &clip,
        )
        .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("lang".to_string(), "ko".to_string()),
                ("from".to_string(), "600".to_string()),
                ("to".to_string(), "700".to_string()),
                ("clip".to_string(), "Second".to_string()),
            ]
        );
    }

    #[test]
    fn test_encode_empty_label_falls_back() {
        let clip = Clip::new(1, "", 0.0, 60.0);
        let url = encode_share_url(PAGE, &clip).unwrap();
        let payload = decode_share_query(url.as_str()).unwrap();
        assert_eq!(payload.clip_name.as_deref(), Some(DEFAULT_SHARE_LABEL));
    }

    #[test]
    fn test_encode_invalid_page_url() {
        let clip = Clip::new(1, "Intro", 10.0, 30.0);
        assert!(matches!(
            encode_share_url("not a url", &clip),
            Err(ShareError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_share_link_recovers_clip() {
        let clip = Clip::new(4, "하이라이트 장면", 1234.25, 1300.75);
        let url = encode_share_url(PAGE, &clip).unwrap();
        let payload = decode_share_query(url.as_str()).unwrap();
        assert_eq!(payload.from, 1234.25);
        assert_eq!(payload.to, 1300.75);
        assert_eq!(payload.clip_name.as_deref(), Some("하이라이트 장면"));
    }

    #[test]
    fn test_decode_query_forms() {
        let expected = SharePayload {
            from: 10.0,
            to: 20.0,
            clip_name: Some("a b".to_string()),
        };
        assert_eq!(decode_share_query("?from=10&to=20&clip=a+b"), Some(expected.clone()));
        assert_eq!(decode_share_query("from=10&to=20&clip=a%20b"), Some(expected));
    }

    #[test]
    fn test_decode_rejects_missing_or_invalid() {
        assert_eq!(decode_share_query("?from=10"), None);
        assert_eq!(decode_share_query("?to=10"), None);
        assert_eq!(decode_share_query("?from=&to=10"), None);
        assert_eq!(decode_share_query("?from=abc&to=10"), None);
        assert_eq!(decode_share_query("?from=10&to=inf"), None);
        assert_eq!(decode_share_query(""), None);
    }

    #[test]
    fn test_decode_without_clip_name() {
        let payload = decode_share_query("?from=5&to=95").unwrap();
        assert_eq!(payload.clip_name, None);
        assert_eq!(payload.display_name(), DEFAULT_SHARE_LABEL);
    }

    #[test]
    fn test_share_draft_uses_edited_text() {
        let clip = Clip::new(2, "Middle", 600.0, 1200.0);
        let draft = ShareDraft::for_clip(&clip);
        assert_eq!(draft.from_text, "10:00");
        assert_eq!(draft.to_text, "20:00");

        let draft = draft.with_from("11:30");
        let payload = decode_share_query(draft.to_url(PAGE).unwrap().as_str()).unwrap();
        assert_eq!(payload.from, 690.0);
        assert_eq!(payload.to, 1200.0);
        assert_eq!(payload.clip_name.as_deref(), Some("Middle"));
    }
}
