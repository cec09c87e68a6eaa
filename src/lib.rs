//! Photo gallery: upload images over HTTP or from the command line, keep the
//! original and a thumbnail in object storage, record camera metadata, and
//! browse the result.
//!
//! The core is [`services::upload_pipeline::UploadPipeline`]; the binaries in
//! `src/main.rs` and `src/bin/gallery-upload.rs` are thin shells around it.

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod setup;
pub mod state;
pub mod views;

#[cfg(test)]
pub(crate) mod test_helpers;
