//! Blog post records and the pure rules applied to them.

use time::{
    Date, OffsetDateTime, Time, UtcOffset,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};

use super::error::DomainError;

pub const EXCERPT_CHARS: usize = 150;
pub const UNTITLED_POST: &str = "Untitled Post";

pub const ISO_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// A stored blog post. The slug is the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub date: OffsetDateTime,
    pub tags: Vec<String>,
    pub published: bool,
}

/// Listing view of a post, carrying the derived excerpt instead of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub date: OffsetDateTime,
    pub tags: Vec<String>,
    pub published: bool,
    pub excerpt: String,
}

impl From<&PostRecord> for PostSummary {
    fn from(record: &PostRecord) -> Self {
        Self {
            slug: record.slug.clone(),
            title: record.title.clone(),
            author: record.author.clone(),
            date: record.date,
            tags: record.tags.clone(),
            published: record.published,
            excerpt: excerpt(&record.content),
        }
    }
}

impl From<PostRecord> for PostSummary {
    fn from(record: PostRecord) -> Self {
        let excerpt = excerpt(&record.content);
        Self {
            slug: record.slug,
            title: record.title,
            author: record.author,
            date: record.date,
            tags: record.tags,
            published: record.published,
            excerpt,
        }
    }
}

/// First [`EXCERPT_CHARS`] characters of the trimmed body on a single line,
/// followed by `...`.
pub fn excerpt(content: &str) -> String {
    let normalized = content.trim().replace("\r\n", "\n");
    let mut out: String = normalized
        .chars()
        .take(EXCERPT_CHARS)
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    out.push_str("...");
    out
}

/// Trim every tag, drop blanks and keep the first occurrence of duplicates.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for entry in raw {
        let tag = entry.as_ref().trim();
        if tag.is_empty() || tags.iter().any(|existing| existing == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

/// Parse a post date given as `YYYY-MM-DD` (midnight UTC) or RFC 3339.
pub fn parse_post_date(value: &str) -> Result<OffsetDateTime, DomainError> {
    let trimmed = value.trim();
    if let Ok(date) = Date::parse(trimmed, ISO_DATE_FORMAT) {
        return Ok(date.midnight().assume_utc());
    }
    OffsetDateTime::parse(trimmed, &Rfc3339).map_err(|_| DomainError::invalid_date(trimmed))
}

/// The current calendar day at midnight UTC, used when a post has no date.
pub fn today() -> OffsetDateTime {
    OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT)
}

/// Render a date the way it is written to frontmatter: a bare day when the
/// timestamp is midnight UTC, RFC 3339 otherwise.
pub fn format_post_date(date: OffsetDateTime) -> String {
    if date.offset() == UtcOffset::UTC && date.time() == Time::MIDNIGHT {
        if let Ok(formatted) = date.date().format(ISO_DATE_FORMAT) {
            return formatted;
        }
    }
    date.format(&Rfc3339)
        .unwrap_or_else(|_| date.date().to_string())
}

pub fn human_date(date: OffsetDateTime) -> String {
    date.date()
        .format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| date.date().to_string())
}

/// Stable sort, newest first. Posts sharing a date keep their relative order.
pub fn sort_newest_first<T, F>(items: &mut [T], date_of: F)
where
    F: Fn(&T) -> OffsetDateTime,
{
    items.sort_by(|a, b| date_of(b).cmp(&date_of(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn excerpt_is_single_line_and_truncated() {
        let line = "x".repeat(60);
        let content = format!("  {line}\n{line}\r\n{line}\n{line}  ");
        let out = excerpt(&content);

        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), EXCERPT_CHARS + 3);
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
        assert_eq!(out.chars().nth(60), Some(' '));
    }

    #[test]
    fn excerpt_of_short_content_still_gets_suffix() {
        assert_eq!(excerpt("\n Hello\nthere \n"), "Hello there...");
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let content = "é".repeat(200);
        let out = excerpt(&content);
        assert_eq!(out.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = normalize_tags([" rust", "web ", "", "rust", "  ", "Rust"]);
        assert_eq!(tags, vec!["rust", "web", "Rust"]);
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(
            parse_post_date("2024-03-01").unwrap(),
            datetime!(2024-03-01 00:00 UTC)
        );
        assert_eq!(
            parse_post_date("2024-03-01T10:30:00+02:00").unwrap(),
            datetime!(2024-03-01 10:30 +02:00)
        );
        assert!(matches!(
            parse_post_date("March 1st"),
            Err(DomainError::InvalidDate { .. })
        ));
    }

    #[test]
    fn frontmatter_dates_prefer_the_short_form() {
        assert_eq!(format_post_date(datetime!(2024-03-01 00:00 UTC)), "2024-03-01");
        assert_eq!(
            format_post_date(datetime!(2024-03-01 08:15 UTC)),
            "2024-03-01T08:15:00Z"
        );
    }

    #[test]
    fn sorting_is_descending_and_stable() {
        let mut items = vec![
            ("a", datetime!(2024-01-01 00:00 UTC)),
            ("b", datetime!(2024-03-01 00:00 UTC)),
            ("c", datetime!(2024-02-01 00:00 UTC)),
            ("d", datetime!(2024-03-01 00:00 UTC)),
        ];
        sort_newest_first(&mut items, |item| item.1);
        let order: Vec<_> = items.iter().map(|item| item.0).collect();
        assert_eq!(order, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn human_dates_read_naturally() {
        assert_eq!(human_date(datetime!(2024-03-01 00:00 UTC)), "March 1, 2024");
    }
}
