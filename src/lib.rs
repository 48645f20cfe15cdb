//! Render block-structured pages (nested blocks with rich-text spans and
//! typed page properties) into Markdown with embedded HTML fragments.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
