//! OPF annotation store
//!
//! Pechas are stored as OPF trees: YAML metadata, an index of the works they
//! contain, base texts and one YAML document per annotation layer.
//!
//! - `backend`: object access (local filesystem or S3-compatible bucket)
//! - `store`: typed loading and overwriting of OPF documents
//! - `types`: pagination layers, page records, metadata and index

mod backend;
mod store;
mod types;

pub use backend::{LocalOpfBackend, OpfBackend, S3OpfBackend};
pub use store::{volume_dir, OpfStore};
pub use types::{
    ExtraFields, LayerKind, PageRecord, PaginationLayer, PechaIndex, PechaMeta, Span, TextInfo,
    VolumeSpan,
};
