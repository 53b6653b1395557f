//! Pedurma proofreading workflow

pub mod pagination;
pub mod types;

pub use pagination::{add_note_pg_ref, update_pg_ref, update_text_pagination, VolumeUpdate};
pub use types::{PageRange, PedurmaNoteEdit, RangeError};
