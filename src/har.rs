//! Archive-log (HAR 1.2) document model.
//!
//! Everything here is owned: values are copied out of the reusable parse
//! buffers while an exchange is being converted, so the finished [`Har`]
//! outlives every buffer reset.

use std::io::Write;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

pub const HAR_VERSION: &str = "1.2";

#[derive(Debug, Clone, Serialize)]
pub struct Har {
    pub log: Log,
}

impl Har {
    /// Serializes the document, two-space indented when `indented` is set.
    pub fn write_to<W: Write>(&self, writer: W, indented: bool) -> serde_json::Result<()> {
        if indented {
            serde_json::to_writer_pretty(writer, self)
        } else {
            serde_json::to_writer(writer, self)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Log {
    pub version: &'static str,
    pub creator: Creator,
    /// Always empty; captures carry no page information.
    pub pages: Vec<serde_json::Value>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Creator {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub comment: String,
    #[serde(serialize_with = "object_or_empty")]
    pub request: Option<Request>,
    #[serde(serialize_with = "object_or_empty")]
    pub response: Option<Response>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub url: String,
    pub http_version: String,
    pub headers: Vec<NameValue>,
    pub query_string: Vec<NameValue>,
    pub cookies: Vec<NameValue>,
    pub body_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub mime_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<NameValue>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub http_version: String,
    pub headers: Vec<NameValue>,
    /// One map per `Set-Cookie` header: `name`, `value`, then attributes.
    pub cookies: Vec<IndexMap<String, String>>,
    pub content: Content,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Body length as captured, before dechunking or decompression.
    pub size: usize,
    /// `"<Kind>: <message>"` when the body could not be normalized.
    #[serde(rename = ":error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub mime_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// A missing side of an exchange is still written, as `{}`
fn object_or_empty<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(value) => value.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content() -> Content {
        Content {
            size: 2,
            error: None,
            mime_type: "text/plain".to_string(),
            text: "hi".to_string(),
            encoding: None,
        }
    }

    #[test]
    fn test_write_compact_and_indented() {
        let har = Har {
            log: Log {
                version: HAR_VERSION,
                creator: Creator {
                    name: "saz2har".to_string(),
                    version: "0.1.0".to_string(),
                    comment: None,
                },
                pages: vec![],
                entries: vec![],
            },
        };

        let mut compact = Vec::new();
        har.write_to(&mut compact, false).unwrap();
        assert_eq!(
            String::from_utf8(compact).unwrap(),
            r#"{"log":{"version":"1.2","creator":{"name":"saz2har","version":"0.1.0"},"pages":[],"entries":[]}}"#
        );

        let mut indented = Vec::new();
        har.write_to(&mut indented, true).unwrap();
        assert!(String::from_utf8(indented).unwrap().starts_with("{\n  \"log\": {\n"));
    }

    #[test]
    fn test_missing_sides_are_empty_objects() {
        let entry = Entry {
            comment: "[#3]".to_string(),
            request: None,
            response: None,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({ "comment": "[#3]", "request": {}, "response": {} })
        );
    }

    #[test]
    fn test_request_field_names() {
        let request = Request {
            method: "POST".to_string(),
            url: "/f".to_string(),
            http_version: "http/1.1".to_string(),
            headers: vec![NameValue::new("Host", "h")],
            query_string: vec![],
            cookies: vec![],
            body_size: 3,
            post_data: Some(PostData {
                mime_type: "application/x-www-form-urlencoded".to_string(),
                text: "a=1".to_string(),
                encoding: None,
                params: Some(vec![NameValue::new("a", "1")]),
            }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "POST",
                "url": "/f",
                "httpVersion": "http/1.1",
                "headers": [{ "name": "Host", "value": "h" }],
                "queryString": [],
                "cookies": [],
                "bodySize": 3,
                "postData": {
                    "mimeType": "application/x-www-form-urlencoded",
                    "text": "a=1",
                    "params": [{ "name": "a", "value": "1" }]
                }
            })
        );
    }

    #[test]
    fn test_content_error_key() {
        let mut content = content();
        content.error = Some("UnsupportedContentEncoding: lzma".to_string());
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value[":error"], "UnsupportedContentEncoding: lzma");
        assert!(value.get("encoding").is_none());
    }

    #[test]
    fn test_set_cookie_map_keeps_order() {
        let mut cookie = IndexMap::new();
        cookie.insert("name".to_string(), "sid".to_string());
        cookie.insert("value".to_string(), "1".to_string());
        cookie.insert("path".to_string(), "/".to_string());
        let response = Response {
            status: 200,
            status_text: "OK".to_string(),
            http_version: "http/1.1".to_string(),
            headers: vec![],
            cookies: vec![cookie],
            content: content(),
        };
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains(r#""cookies":[{"name":"sid","value":"1","path":"/"}]"#));
    }
}
