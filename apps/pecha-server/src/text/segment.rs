//! HFML segmentation
//!
//! Splits a volume's serialized text into page chunks and separates the body
//! from the trailing durchen (variant-reading notes) block.
//!
//! Markers recognised:
//!
//! - page: `[12b]`, optionally with a private-use sentinel after `[`
//! - line: `[12b.3]`
//! - durchen: opens with `<d` (sentinel allowed between `<` and `d`), closes with `d>`

use std::sync::LazyLock;

use regex::Regex;

static PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([\x{30D40}-\x{F4271}])?([0-9]+[a-z])\]").expect("valid page marker pattern")
});

static LINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)\.(\d+)\]").expect("valid line marker pattern"));

static DURCHEN_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[\x{30D40}-\x{F4271}]?d").expect("valid durchen pattern"));

const DURCHEN_END: &str = "d>";

/// Window inspected by [`has_leading_page_marker`], in characters
const LEADING_WINDOW: usize = 10;

/// Body text and durchen block of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurchenSplit<'a> {
    pub body: &'a str,
    /// Opening through closing marker, inclusive
    pub durchen: Option<&'a str>,
}

/// Split the durchen block off the body text.
///
/// Without a complete `<d ... d>` pair the whole input is body text.
pub fn split_durchen(text: &str) -> DurchenSplit<'_> {
    let Some(start) = DURCHEN_START.find(text) else {
        tracing::info!("durchen not found");
        return DurchenSplit {
            body: text,
            durchen: None,
        };
    };

    let Some(end) = text[start.end()..].find(DURCHEN_END) else {
        tracing::info!(offset = start.start(), "durchen is not closed");
        return DurchenSplit {
            body: text,
            durchen: None,
        };
    };
    let end = start.end() + end + DURCHEN_END.len();

    DurchenSplit {
        body: &text[..start.start()],
        durchen: Some(&text[start.start()..end]),
    }
}

/// Split text into page chunks.
///
/// Each chunk runs from a page marker up to the next one; text before the
/// first marker is dropped.
pub fn split_pages(text: &str) -> Vec<&str> {
    chunks_at(text, marker_starts(text))
}

/// Split a durchen block into page chunks.
///
/// Unlike [`split_pages`], text before the first marker (the `<d` opening)
/// stays at the head of the first chunk, so the chunks concatenate back to
/// the whole block.
pub fn split_notes_pages(durchen: &str) -> Vec<&str> {
    let mut starts = marker_starts(durchen);
    if let Some(first) = starts.first_mut() {
        *first = 0;
    }
    chunks_at(durchen, starts)
}

fn marker_starts(text: &str) -> Vec<usize> {
    PAGE_MARKER.find_iter(text).map(|m| m.start()).collect()
}

fn chunks_at(text: &str, starts: Vec<usize>) -> Vec<&str> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

/// Folio+side token of the first page marker, e.g. `12b` for `[12b]`
pub fn page_marker_index(chunk: &str) -> Option<&str> {
    PAGE_MARKER
        .captures(chunk)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Whether a page marker occurs within the first few characters
pub fn has_leading_page_marker(text: &str) -> bool {
    let window_end = text
        .char_indices()
        .nth(LEADING_WINDOW)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    PAGE_MARKER.is_match(&text[..window_end])
}

/// Prefix a page marker derived from the line marker on the second line.
///
/// `[5a.2]` on line two yields `"[5a]\n[5a.1]" + text`. Returns `None` when the
/// second line carries no usable line marker.
pub fn add_first_page_ann(text: &str) -> Option<String> {
    let second_line = text.lines().nth(1)?;
    let caps = LINE_MARKER.captures(second_line)?;
    let page = caps.get(1)?.as_str();
    let line: i64 = caps.get(2)?.as_str().parse().ok()?;

    Some(format!("[{page}]\n[{page}.{}]{text}", line - 1))
}

/// Remove page and line markers
pub fn clean_page(page: &str) -> String {
    let without_pages = PAGE_MARKER.replace_all(page, "");
    LINE_MARKER.replace_all(&without_pages, "").into_owned()
}
