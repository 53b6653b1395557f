//! Pagination reconciler
//!
//! Links body pages to the durchen page that annotates them. Each edit names
//! a durchen page by scan number plus the printed body pages it covers; the
//! difference between scan and printed numbering locates those body pages in
//! the volume's pagination layer.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::opf::{OpfStore, PaginationLayer};
use crate::text::page_index;

use super::types::PedurmaNoteEdit;

/// Outcome of reconciling one volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeUpdate {
    pub vol: u32,
    /// Records whose `note_ref` was set
    pub updated: usize,
}

/// Apply one edit to a pagination layer, returning the number of records set
pub fn add_note_pg_ref(edit: &PedurmaNoteEdit, layer: &mut PaginationLayer) -> usize {
    let range = match edit
        .ref_range()
        .and_then(|range| range.within(layer.annotations.len()))
    {
        Ok(range) => range,
        Err(e) => {
            tracing::debug!(vol = edit.vol, image_no = edit.image_no, "edit skipped: {}", e);
            return 0;
        }
    };

    let Some(offset) = edit.offset() else {
        tracing::warn!(
            vol = edit.vol,
            image_no = edit.image_no,
            page_no = edit.page_no,
            "edit skipped: page offset out of range"
        );
        return 0;
    };

    let note_id = match folio_index(edit.image_no).and_then(|idx| layer.page_id(&idx)) {
        Some(id) => id.to_string(),
        None => {
            tracing::warn!(
                vol = edit.vol,
                image_no = edit.image_no,
                "durchen page missing from pagination layer"
            );
            String::new()
        }
    };

    let mut updated = 0;
    for pg in range.pages() {
        let Some(index) = pg.checked_add(offset).and_then(folio_index) else {
            continue;
        };
        if layer.set_note_ref(&index, &note_id) {
            updated += 1;
        }
    }
    updated
}

/// Folio index of a page number, `None` below the first page
fn folio_index(page_number: i64) -> Option<String> {
    (page_number >= 1).then(|| page_index(page_number))
}

/// Apply every edit of `vol` to the layer, in submission order
pub fn update_pg_ref(vol: u32, edits: &[PedurmaNoteEdit], layer: &mut PaginationLayer) -> usize {
    edits
        .iter()
        .filter(|edit| edit.vol == vol)
        .map(|edit| add_note_pg_ref(edit, layer))
        .sum()
}

/// Reconcile and persist the pagination layers of every volume of a work
pub async fn update_text_pagination(
    store: &OpfStore,
    pecha_id: &str,
    work_id: &str,
    edits: &[PedurmaNoteEdit],
) -> Result<Vec<VolumeUpdate>> {
    let index = store.load_index(pecha_id).await?;
    let (_, text) = index
        .find_text(work_id)
        .ok_or_else(|| AppError::NotFound(format!("Text {} not found in {}", work_id, pecha_id)))?;

    let mut updates = Vec::new();
    for vol in text.volumes() {
        let mut layer = store.load_pagination(pecha_id, vol).await?;
        let updated = update_pg_ref(vol, edits, &mut layer);
        store.save_pagination(pecha_id, vol, &layer).await?;

        tracing::info!(
            pecha_id = %pecha_id,
            work_id = %work_id,
            vol = vol,
            updated = updated,
            "Reconciled pagination"
        );
        updates.push(VolumeUpdate { vol, updated });
    }

    Ok(updates)
}
