//! HFML text processing: segmentation, page objects, and text assembly

pub mod assemble;
pub mod page;
pub mod segment;
pub mod types;

pub use assemble::{construct_text, get_text, serialize_text, serialize_volumes, VolumeSource};
pub use page::{image_link, page_index, page_number, VolumeContext};
pub use types::{NotesPage, Page, Text};
