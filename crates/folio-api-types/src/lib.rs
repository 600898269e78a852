//! Wire types shared by the post editor and the admin JSON endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /admin/posts/save`.
///
/// Every field is optional on the wire so that missing values surface as a
/// validation error instead of a decoding failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavePostRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub tags: Option<TagsInput>,
    pub content: Option<String>,
    pub original_slug: Option<String>,
    pub published: Option<bool>,
    pub password: Option<String>,
}

/// Tags arrive either as a JSON list or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    /// Split into raw entries; trimming and de-duplication happen downstream.
    pub fn into_entries(self) -> Vec<String> {
        match self {
            TagsInput::List(values) => values,
            TagsInput::Csv(value) => value.split(',').map(str::to_string).collect(),
        }
    }
}

/// Optional body of `POST /admin/posts/delete/{slug}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordBody {
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SavePostResponse {
    pub success: bool,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeletePostResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_accept_list_or_csv() {
        let list: SavePostRequest =
            serde_json::from_str(r#"{"tags": ["rust", "web"]}"#).expect("list tags");
        assert_eq!(
            list.tags,
            Some(TagsInput::List(vec!["rust".into(), "web".into()]))
        );

        let csv: SavePostRequest =
            serde_json::from_str(r#"{"tags": "rust, web"}"#).expect("csv tags");
        assert_eq!(
            csv.tags.expect("tags").into_entries(),
            vec!["rust".to_string(), " web".to_string()]
        );
    }

    #[test]
    fn original_slug_uses_camel_case() {
        let request: SavePostRequest =
            serde_json::from_str(r#"{"slug": "b", "originalSlug": "a"}"#).expect("request");
        assert_eq!(request.original_slug.as_deref(), Some("a"));
        assert_eq!(request.slug.as_deref(), Some("b"));
    }
}
