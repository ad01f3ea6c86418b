//! Configuration loading errors

use std::path::PathBuf;
use thiserror::Error;
use udc_domain::DomainError;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not read configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl From<figment::Error> for ConfigLoadError {
    fn from(error: figment::Error) -> Self {
        ConfigLoadError::Figment(Box::new(error))
    }
}
