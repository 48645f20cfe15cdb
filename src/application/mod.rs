//! Application services: the rendering engine and the content sources feeding it.

pub mod error;
pub mod render;
pub mod source;
