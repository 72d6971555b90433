#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Kind of database engine a connection profile points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackendKind {
    EmbeddedFile,
    EmbeddedMemory,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmbeddedFile => "file",
            Self::EmbeddedMemory => "memory",
        }
    }

    pub fn parse(value: &str) -> Result<Self, PersistenceError> {
        match value.trim() {
            "file" => Ok(Self::EmbeddedFile),
            "memory" => Ok(Self::EmbeddedMemory),
            other => Err(PersistenceError::UnrecognizedBackend(other.to_string())),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = PersistenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BackendKind> for String {
    fn from(value: BackendKind) -> Self {
        value.as_str().to_string()
    }
}

/// Where and how to open a database, stored as JSON alongside a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub backend: BackendKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ConnectionProfile {
    pub fn embedded_file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::EmbeddedFile,
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: BackendKind::EmbeddedMemory,
            path: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|err| PersistenceError::InvalidProfile(err.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|err| PersistenceError::InvalidProfile(err.to_string()))?;
        Ok(std::fs::write(path, text)?)
    }
}
