//! Maps the loosely-shaped JSON coming back from the content API into the
//! stable view model in [`crate::model`].
//!
//! Every endpoint has its own envelope type; anything outside the envelope is
//! read field by field with explicit fallbacks so a missing optional field
//! never fails the whole response.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{
    ChapterId, ChapterImages, ChapterRef, Listing, ListingEntry, ManhwaDetail, PageImage,
    PLACEHOLDER_IMAGE,
};

pub const UNTITLED: &str = "Untitled Manhwa";
pub const NO_LATEST_CHAPTER: &str = "Chapter N/A";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const UNKNOWN_STATUS: &str = "Status unknown";
pub const UNKNOWN_AUTHOR: &str = "Author unknown";
pub const UNKNOWN_GENRE: &str = "Genre unknown";

/// Listing endpoints answer with either a bare array or `{data: [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListingEnvelope {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

/// Detail and chapter endpoints share `{success, data}`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Value,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    fn accepted(body: Value) -> Option<Value> {
        let envelope: Envelope = serde_json::from_value(body).ok()?;
        if truthy(&envelope.success) && truthy(&envelope.data) {
            Some(envelope.data)
        } else {
            None
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Non-empty string, or a number in its decimal form.
fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn listing_entry(raw: &Value) -> Result<ListingEntry> {
    let id = text(raw.get("manwhaId"))
        .or_else(|| text(raw.get("id")))
        .ok_or(Error::MissingIdentifier)?;

    let image_url = text(raw.get("image"))
        .or_else(|| text(raw.get("thumbnail")))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let latest_chapter_label = raw
        .get("latestEp")
        .and_then(Value::as_array)
        .and_then(|eps| eps.first())
        .and_then(|ep| text(ep.get("title")))
        .unwrap_or_else(|| NO_LATEST_CHAPTER.to_string());

    Ok(ListingEntry {
        id,
        title: text(raw.get("title")).unwrap_or_else(|| UNTITLED.to_string()),
        image_url,
        status: text(raw.get("status")),
        latest_chapter_label,
    })
}

/// Normalises a home/popular/search response. Entries without an identifier
/// are skipped and counted instead of failing the page.
pub fn listing(body: Value) -> Result<Listing> {
    let items = match serde_json::from_value::<ListingEnvelope>(body) {
        Ok(ListingEnvelope::Bare(items)) | Ok(ListingEnvelope::Wrapped { data: items }) => items,
        Err(_) => {
            return Err(Error::InvalidResponseShape(
                "expected an array of manhwa".to_string(),
            ))
        }
    };

    let mut listing = Listing::default();
    for raw in &items {
        match listing_entry(raw) {
            Ok(entry) => listing.entries.push(entry),
            Err(err) => {
                warn!("skipping listing entry: {err}");
                listing.skipped += 1;
            }
        }
    }
    Ok(listing)
}

fn flatten_summary(summary: String) -> String {
    if summary.contains('<') || summary.contains('&') {
        html2text::from_read(summary.as_bytes(), 10000)
            .trim()
            .to_string()
    } else {
        summary
    }
}

fn genre(info: Option<&Value>) -> String {
    let joined = match info.and_then(|i| i.get("Genre")) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|g| text(Some(g)))
            .collect::<Vec<_>>()
            .join(", "),
        other => text(other).unwrap_or_default(),
    };
    if joined.is_empty() {
        UNKNOWN_GENRE.to_string()
    } else {
        joined
    }
}

fn chapter(raw: &Value) -> Option<ChapterRef> {
    let Some(id) = text(raw.get("chapterId")) else {
        warn!("dropping chapter without chapterId");
        return None;
    };
    Some(ChapterRef {
        title: text(raw.get("name")).unwrap_or_else(|| format!("Chapter {id}")),
        date: text(raw.get("releaseDate")).unwrap_or_default(),
        chapter_number: ChapterId(id),
    })
}

pub fn detail(body: Value) -> Result<ManhwaDetail> {
    let data = Envelope::accepted(body)
        .ok_or_else(|| Error::InvalidResponseShape("expected {success, data}".to_string()))?;

    let info = data
        .get("info")
        .and_then(Value::as_array)
        .and_then(|items| items.first());

    let chapters = data
        .get("chapters")
        .and_then(Value::as_array)
        .map(|raw| raw.iter().filter_map(chapter).collect())
        .unwrap_or_default();

    Ok(ManhwaDetail {
        title: text(data.get("title")).unwrap_or_else(|| UNTITLED.to_string()),
        image_url: text(data.get("image")).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        description: text(data.get("summary"))
            .map(flatten_summary)
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        status: text(data.get("status")).unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
        author: text(info.and_then(|i| i.get("Author")))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        genre: genre(info),
        chapters,
    })
}

pub fn chapter_images(body: Value) -> Result<ChapterImages> {
    let data = Envelope::accepted(body).ok_or(Error::InvalidChapterFormat)?;
    let images = data
        .get("images")
        .and_then(Value::as_array)
        .ok_or(Error::InvalidChapterFormat)?;

    Ok(images
        .iter()
        .filter_map(Value::as_str)
        .map(|url| PageImage {
            url: url.to_string(),
        })
        .collect())
}
