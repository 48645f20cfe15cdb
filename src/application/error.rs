use thiserror::Error;

use crate::{
    application::{render::RenderError, source::SourceError},
    config::LoadError,
    domain::id::IdError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Id(#[from] IdError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// The error followed by every underlying cause, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}
