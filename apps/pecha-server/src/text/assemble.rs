//! Text assembly
//!
//! Builds a [`Text`] for a work from its per-volume HFML and pagination
//! layers, and serializes edited texts back to HFML.

use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::opf::{OpfStore, PaginationLayer, PechaMeta};

use super::page::{build_notes_pages, build_pages, VolumeContext};
use super::segment::{add_first_page_ann, has_leading_page_marker, split_durchen};
use super::types::{NotesPage, Page, Text};

/// One volume of a work ready for assembly
#[derive(Debug, Clone)]
pub struct VolumeSource {
    pub vol: u32,
    pub hfml: String,
    pub pagination: PaginationLayer,
}

/// Pages and notes of a single volume
pub fn construct_volume(hfml: &str, ctx: &VolumeContext<'_>) -> (Vec<Page>, Vec<NotesPage>) {
    let hfml = with_leading_page_marker(hfml, ctx.vol);
    let split = split_durchen(&hfml);
    let pages = build_pages(split.body, ctx);

    let notes = match split.durchen {
        Some(durchen) => build_notes_pages(&with_leading_page_marker(durchen, ctx.vol), ctx),
        None => Vec::new(),
    };

    (pages, notes)
}

/// Text starting with a page marker, derived from the second line if missing
fn with_leading_page_marker(text: &str, vol: u32) -> String {
    if has_leading_page_marker(text) {
        return text.to_string();
    }
    add_first_page_ann(text).unwrap_or_else(|| {
        tracing::warn!(vol, "could not derive first page marker");
        text.to_string()
    })
}

/// Assemble a text from its volumes, in ascending volume order
pub fn construct_text(text_id: &str, meta: &PechaMeta, volumes: &[VolumeSource]) -> Text {
    let mut ordered: Vec<&VolumeSource> = volumes.iter().collect();
    ordered.sort_by_key(|source| source.vol);

    let mut pages = Vec::new();
    let mut notes = Vec::new();

    for source in ordered {
        let ctx = VolumeContext {
            vol: source.vol,
            meta,
            pagination: &source.pagination,
        };
        let (vol_pages, vol_notes) = construct_volume(&source.hfml, &ctx);
        tracing::debug!(
            vol = source.vol,
            pages = vol_pages.len(),
            notes = vol_notes.len(),
            "assembled volume"
        );
        pages.extend(vol_pages);
        notes.extend(vol_notes);
    }

    Text {
        id: text_id.to_string(),
        pages,
        notes: Some(notes),
    }
}

/// Load and assemble a work of a pecha
pub async fn get_text(store: &OpfStore, pecha_id: &str, work_id: &str) -> Result<Text> {
    let meta = store.load_meta(pecha_id).await?;
    let index = store.load_index(pecha_id).await?;
    let (text_uuid, _) = index
        .find_text(work_id)
        .ok_or_else(|| AppError::NotFound(format!("Text {} not found in {}", work_id, pecha_id)))?;

    let mut volumes = Vec::new();
    for (vol, hfml) in store.load_text_volumes(pecha_id, work_id).await? {
        let pagination = store.load_pagination(pecha_id, vol).await?;
        volumes.push(VolumeSource {
            vol,
            hfml,
            pagination,
        });
    }

    let text = construct_text(text_uuid, &meta, &volumes);
    tracing::info!(
        pecha_id = %pecha_id,
        work_id = %work_id,
        volumes = volumes.len(),
        pages = text.pages.len(),
        "assembled text"
    );
    Ok(text)
}

/// HFML of a text: page contents followed by note contents
pub fn serialize_text(text: &Text) -> String {
    let pages = text.pages.iter().map(|page| page.content.as_str());
    let notes = text
        .notes
        .iter()
        .flatten()
        .map(|note| note.content.as_str());
    pages.chain(notes).collect()
}

/// HFML of a text grouped by volume
pub fn serialize_volumes(text: &Text) -> Result<BTreeMap<u32, String>> {
    let mut volumes: BTreeMap<u32, String> = BTreeMap::new();

    let pages = text.pages.iter().map(|page| (&page.vol, &page.content));
    let notes = text
        .notes
        .iter()
        .flatten()
        .map(|note| (&note.vol, &note.content));

    for (vol, content) in pages.chain(notes) {
        let vol: u32 = vol
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid volume number: {:?}", vol)))?;
        volumes.entry(vol).or_default().push_str(content);
    }

    Ok(volumes)
}
