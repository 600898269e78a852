//! `---` delimited YAML frontmatter followed by a markdown body.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::posts::{
    PostRecord, UNTITLED_POST, format_post_date, normalize_tags, parse_post_date, today,
};
use crate::domain::slug::normalize_slug;

const DELIMITER: &str = "---";

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no usable slug in frontmatter or file name `{stem}`")]
    Slug { stem: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontmatter {
    title: Option<Value>,
    date: Option<Value>,
    author: Option<Value>,
    slug: Option<Value>,
    tags: Option<RawTags>,
    published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTags {
    List(Vec<Value>),
    Csv(String),
}

#[derive(Serialize)]
struct FrontmatterOut<'a> {
    title: &'a str,
    date: String,
    author: &'a str,
    slug: &'a str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "is_true")]
    published: bool,
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Split a document into its YAML block (if any) and body.
pub fn split_document(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = strip_delimiter_line(text) else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, text)
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// Parse a stored post. `stem` is the file name without extension and backs
/// up a missing or unusable `slug` key.
pub fn parse_document(
    stem: &str,
    text: &str,
    default_author: &str,
) -> Result<PostRecord, FrontmatterError> {
    let (yaml, body) = split_document(text);
    let raw = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str::<RawFrontmatter>(yaml)?,
        _ => RawFrontmatter::default(),
    };

    let slug = raw
        .slug
        .as_ref()
        .and_then(scalar_to_string)
        .and_then(|value| normalize_slug(&value).ok())
        .or_else(|| normalize_slug(stem).ok())
        .ok_or_else(|| FrontmatterError::Slug {
            stem: stem.to_string(),
        })?;

    let title = raw
        .title
        .as_ref()
        .and_then(scalar_to_string)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_POST.to_string());

    let author = raw
        .author
        .as_ref()
        .and_then(scalar_to_string)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_author.to_string());

    let date = match raw.date.as_ref().and_then(scalar_to_string) {
        Some(value) => parse_post_date(&value).unwrap_or_else(|err| {
            debug!(
                target = "infra::store::frontmatter",
                slug = %slug,
                error = %err,
                "unreadable date, using today"
            );
            today()
        }),
        None => today(),
    };

    let tags = match raw.tags {
        Some(RawTags::List(values)) => {
            normalize_tags(values.iter().filter_map(scalar_to_string))
        }
        Some(RawTags::Csv(value)) => normalize_tags(value.split(',')),
        None => Vec::new(),
    };

    let content = body.strip_suffix('\n').unwrap_or(body);
    let content = content.strip_suffix('\r').unwrap_or(content);

    Ok(PostRecord {
        slug,
        title,
        content: content.to_string(),
        author,
        date,
        tags,
        published: raw.published.unwrap_or(true),
    })
}

/// Serialize a post as `---\n<yaml>---\n<body>\n`.
pub fn render_document(post: &PostRecord) -> Result<String, FrontmatterError> {
    let frontmatter = FrontmatterOut {
        title: &post.title,
        date: format_post_date(post.date),
        author: &post.author,
        slug: &post.slug,
        tags: &post.tags,
        published: post.published,
    };
    let yaml = serde_yaml::to_string(&frontmatter)?;

    let mut out = String::with_capacity(yaml.len() + post.content.len() + 10);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&post.content);
    out.push('\n');
    Ok(out)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
