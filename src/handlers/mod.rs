//! HTTP handlers. Thin: parse input, call a service, shape the response.

pub mod gallery_handlers;
pub mod health_handlers;
pub mod object_handlers;
pub mod upload_handlers;
