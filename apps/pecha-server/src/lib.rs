//! Pecha Server Library
//!
//! Serves OPF pechas (base texts with annotation layers) and the Pedurma
//! proofreading workflow. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `opf`: typed access to `.opf` trees over local or S3 storage
//! - `text`: HFML segmentation and assembly of page objects
//! - `pedurma`: pagination reconciliation for durchen note edits
//! - `routes`: HTTP API

pub mod config;
pub mod db;
pub mod error;
pub mod opf;
pub mod pedurma;
pub mod routes;
pub mod state;
pub mod text;
