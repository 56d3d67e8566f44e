use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::code_input::CodeInputError;
use crate::config::ConfigError;
use crate::phone::PhoneError;
use crate::selector::SelectorError;
use crate::session::SessionError;
use crate::territory::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    InvalidState,
    Configuration,
    Deserialization,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Validation => ErrorSeverity::Transient,
            Self::Configuration | Self::Deserialization => ErrorSeverity::Permanent,
            Self::InvalidState => ErrorSeverity::Fatal,
        }
    }

    /// Programmer errors: the UI should have made them unreachable.
    #[must_use]
    pub const fn is_defect(self) -> bool {
        matches!(self, Self::InvalidState)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Configuration => {
                "The app is misconfigured. Please reinstall or contact support.".into()
            }
            ErrorKind::Deserialization => {
                "A data error occurred. Please contact support if this persists.".into()
            }
            ErrorKind::InvalidState => {
                "The app is in an invalid state. Please restart the app.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        let mut keys: Vec<&String> = self.context.keys().collect();
        keys.sort();
        for key in keys {
            write!(f, " {key}={}", self.context[key])?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<SelectorError> for AppError {
    fn from(e: SelectorError) -> Self {
        let level = match &e {
            SelectorError::InvalidHierarchy { level, .. }
            | SelectorError::LevelOutOfRange { level, .. }
            | SelectorError::LevelNotReached { level, .. }
            | SelectorError::NotACandidate { level, .. } => Some(*level),
            SelectorError::NoLevels | SelectorError::AtRoot => None,
        };
        let kind = match &e {
            SelectorError::NotACandidate { .. } => ErrorKind::Validation,
            SelectorError::LevelOutOfRange { .. }
            | SelectorError::LevelNotReached { .. }
            | SelectorError::AtRoot => ErrorKind::InvalidState,
            SelectorError::NoLevels | SelectorError::InvalidHierarchy { .. } => {
                ErrorKind::Configuration
            }
        };
        let error = AppError::new(kind, e.to_string());
        match level {
            Some(level) => error.with_context("level", level.to_string()),
            None => error,
        }
    }
}

impl From<CodeInputError> for AppError {
    fn from(e: CodeInputError) -> Self {
        match &e {
            CodeInputError::InvalidLength(_) => {
                AppError::new(ErrorKind::Configuration, e.to_string())
            }
            CodeInputError::CellOutOfRange { index, .. } => {
                AppError::new(ErrorKind::InvalidState, e.to_string())
                    .with_context("index", index.to_string())
            }
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(e: DatasetError) -> Self {
        let kind = match &e {
            DatasetError::Parse(_) => ErrorKind::Deserialization,
            DatasetError::Empty | DatasetError::Hierarchy(_) => ErrorKind::Configuration,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

impl From<PhoneError> for AppError {
    fn from(e: PhoneError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        let kind = match &e {
            SessionError::NotSignedIn => ErrorKind::InvalidState,
            SessionError::OnboardingIncomplete { .. } => ErrorKind::Validation,
        };
        AppError::new(kind, e.to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            error_code: e.code().to_string(),
        }
    }
}
