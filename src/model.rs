use std::fmt;

/// Inline cover shown whenever an entry has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"300\" viewBox=\"0 0 200 300\"><rect width=\"200\" height=\"300\" fill=\"%23f0f0f0\"/><rect x=\"20\" y=\"20\" width=\"160\" height=\"220\" fill=\"%23e0e0e0\" rx=\"4\" ry=\"4\"/><text x=\"100\" y=\"120\" font-family=\"Arial\" font-size=\"14\" text-anchor=\"middle\" fill=\"%23999999\">MANHWA</text><text x=\"100\" y=\"140\" font-family=\"Arial\" font-size=\"14\" text-anchor=\"middle\" fill=\"%23999999\">COVER</text><text x=\"100\" y=\"280\" font-family=\"Arial\" font-size=\"12\" text-anchor=\"middle\" fill=\"%23999999\">Image Not Available</text></svg>";

pub fn is_placeholder(url: &str) -> bool {
    url == PLACEHOLDER_IMAGE
}

/// Opaque chapter identifier. The API hands these out as either strings or
/// numbers; both are kept in their string form so lookups compare like with like.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChapterId(pub String);

impl ChapterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChapterId {
    fn from(s: &str) -> Self {
        ChapterId(s.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListingEntry {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub status: Option<String>,
    pub latest_chapter_label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChapterRef {
    pub chapter_number: ChapterId,
    pub title: String,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ManhwaDetail {
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub status: String,
    pub author: String,
    pub genre: String,
    /// Source order, never re-sorted.
    pub chapters: Vec<ChapterRef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageImage {
    pub url: String,
}

pub type ChapterImages = Vec<PageImage>;

/// A normalised listing page. `skipped` counts entries dropped for lacking an identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub entries: Vec<ListingEntry>,
    pub skipped: usize,
}
