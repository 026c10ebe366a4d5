//! Install-time errors.

use thiserror::Error;

/// Errors returned by [`TagInjector::install`](super::TagInjector::install).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// Another container already owns the page. Uninstall it first.
    #[error("container {active} is already installed, refusing to install {requested}")]
    AlreadyInstalledDifferentContainer { active: String, requested: String },
}
