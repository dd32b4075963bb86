//! Domain errors

use thiserror::Error;

use crate::domain::{ItemId, MenuId};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed request body: {0}")]
    ParseError(String),

    #[error("Menu not found: {0}")]
    MenuNotFound(MenuId),

    #[error("Menu item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Parent item {parent_id} not found in menu {menu_id}")]
    ParentNotFound { menu_id: MenuId, parent_id: ItemId },

    #[error("Menu name already exists: {0}")]
    MenuNameAlreadyExists(String),

    #[error("Menu slug already exists: {0}")]
    MenuSlugAlreadyExists(String),

    #[error("Item id {0} appears more than once in the submitted tree")]
    DuplicateItemId(ItemId),

    #[error("Submitted tree is nested deeper than {max} levels")]
    TreeTooDeep { max: usize },

    #[error("Submitted tree has more than {max} items")]
    TreeTooLarge { max: usize },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse error category, stable across releases and safe to expose to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    NotFound,
    Validation,
    Conflict,
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "PARSE_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Persistence => "PERSISTENCE_ERROR",
        }
    }
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ParseError(_) => ErrorKind::Parse,
            DomainError::MenuNotFound(_)
            | DomainError::ItemNotFound(_)
            | DomainError::ParentNotFound { .. } => ErrorKind::NotFound,
            DomainError::DuplicateItemId(_)
            | DomainError::TreeTooDeep { .. }
            | DomainError::TreeTooLarge { .. }
            | DomainError::ValidationError(_) => ErrorKind::Validation,
            DomainError::MenuNameAlreadyExists(_) | DomainError::MenuSlugAlreadyExists(_) => {
                ErrorKind::Conflict
            }
            DomainError::DatabaseError(_) | DomainError::InternalError(_) => ErrorKind::Persistence,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::ParseError(err.to_string())
    }
}
