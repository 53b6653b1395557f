//! Page numbering and page object construction

use crate::opf::{PaginationLayer, PechaMeta};

use super::segment::{clean_page, page_marker_index, split_notes_pages, split_pages};
use super::types::{NotesPage, Page};

/// Page number of a folio+side token: `12a` -> 23, `12b` -> 24
pub fn page_number(page_index: &str) -> Option<i64> {
    let side = page_index.chars().last()?;
    let folio: i64 = page_index[..page_index.len() - side.len_utf8()].parse().ok()?;
    let number = folio.checked_mul(2)?;
    Some(if side == 'a' { number - 1 } else { number })
}

/// Folio+side token of a page number: 23 -> `12a`, 24 -> `12b`
pub fn page_index(page_number: i64) -> String {
    let base = page_number / 2;
    if page_number % 2 == 0 {
        format!("{}b", base)
    } else {
        format!("{}a", base + 1)
    }
}

/// BDRC IIIF URL of the scanned image of a page
pub fn image_link(meta: &PechaMeta, vol: u32, page_number: i64) -> String {
    if page_number < 1 {
        tracing::warn!(vol, page_number, "image link for a non-positive page number");
    }
    let igroup = format!("{}{}", meta.pref, meta.img_grp_offset.saturating_add(i64::from(vol)));
    format!(
        "https://iiif.bdrc.io/bdr:{igroup}::{igroup}{page_number:04}.jpg/full/max/0/default.jpg"
    )
}

/// What a page chunk is resolved against
#[derive(Debug, Clone, Copy)]
pub struct VolumeContext<'a> {
    pub vol: u32,
    pub meta: &'a PechaMeta,
    pub pagination: &'a PaginationLayer,
}

/// Build a page from a chunk starting with a page marker.
///
/// Returns `None` for chunks that hold nothing but a newline once markers are
/// stripped. The returned content keeps its markers.
pub fn build_page(chunk: &str, ctx: &VolumeContext<'_>) -> Option<Page> {
    let Some(index) = page_marker_index(chunk) else {
        tracing::debug!("chunk without page marker skipped");
        return None;
    };
    let Some(page_no) = page_number(index) else {
        tracing::warn!(vol = ctx.vol, page_index = %index, "page number out of range");
        return None;
    };

    if clean_page(chunk) == "\n" {
        return None;
    }

    let record = ctx.pagination.find_by_page_index(index);
    if record.is_none() {
        tracing::debug!(vol = ctx.vol, page_index = %index, "page missing from pagination layer");
    }
    let id = record.map(|(id, _)| id.to_string()).unwrap_or_default();
    let note_ref = record
        .and_then(|(_, page)| page.note_ref.clone())
        .unwrap_or_default();

    Some(Page {
        id,
        page_no,
        content: chunk.to_string(),
        name: format!("Page {}", page_no),
        vol: ctx.vol.to_string(),
        image_link: Some(image_link(ctx.meta, ctx.vol, page_no)),
        note_ref: Some(note_ref),
    })
}

/// Body pages of a text
pub fn build_pages(text: &str, ctx: &VolumeContext<'_>) -> Vec<Page> {
    split_pages(text)
        .into_iter()
        .filter_map(|chunk| build_page(chunk, ctx))
        .collect()
}

/// Notes pages of a durchen block
pub fn build_notes_pages(durchen: &str, ctx: &VolumeContext<'_>) -> Vec<NotesPage> {
    split_notes_pages(durchen)
        .into_iter()
        .filter_map(|chunk| build_page(chunk, ctx))
        .map(NotesPage::from)
        .collect()
}
