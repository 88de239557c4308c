//! Crate-level error aggregate and the transport-agnostic kind mapping.

use thiserror::Error;

use crate::application::access::AccessError;
use crate::application::admin::content::AdminContentError;
use crate::application::query::QueryError;
use crate::application::repos::RepoError;
use crate::application::resolver::ResolveError;
use crate::config::ConfigError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

/// Coarse classification that embedding callers (HTTP handlers, CLIs) map
/// onto their own status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Validation,
    GenerationFailed,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Validation => "validation",
            ErrorKind::GenerationFailed => "generation_failed",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Admin(#[from] AdminContentError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Resolve(ResolveError::NotFound { .. }) => ErrorKind::NotFound,
            AppError::Resolve(ResolveError::GenerationFailed { .. }) => ErrorKind::GenerationFailed,
            AppError::Resolve(ResolveError::Domain(err)) => domain_kind(err),
            AppError::Resolve(ResolveError::Repo(err)) => repo_kind(err),
            AppError::Query(QueryError::InvalidSort(_)) => ErrorKind::Validation,
            AppError::Query(QueryError::Repo(err)) => repo_kind(err),
            AppError::Admin(AdminContentError::Forbidden(AccessError::Forbidden { .. })) => {
                ErrorKind::Forbidden
            }
            AppError::Admin(AdminContentError::Conflict { .. }) => ErrorKind::Conflict,
            AppError::Admin(AdminContentError::NotFound { .. }) => ErrorKind::NotFound,
            AppError::Admin(AdminContentError::Validation { .. }) => ErrorKind::Validation,
            AppError::Admin(AdminContentError::Repo(err)) => repo_kind(err),
            AppError::Domain(err) => domain_kind(err),
            AppError::Infra(_) => ErrorKind::Unavailable,
            AppError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Short user-facing message; details stay in logs.
    pub fn presentation_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "Resource not found",
            ErrorKind::Conflict => "A record with this topic already exists",
            ErrorKind::Forbidden => "You do not have permission to do that",
            ErrorKind::Validation => "Request could not be processed",
            ErrorKind::GenerationFailed => "Adaptation could not be generated",
            ErrorKind::Unavailable => "Service temporarily unavailable",
            ErrorKind::Internal => "Unexpected error occurred",
        }
    }

    pub fn to_response(&self) -> chiaro_api_types::ErrorResponse {
        chiaro_api_types::ErrorResponse {
            kind: self.kind().as_str().to_string(),
            message: self.presentation_message().to_string(),
        }
    }
}

fn repo_kind(err: &RepoError) -> ErrorKind {
    match err {
        RepoError::NotFound => ErrorKind::NotFound,
        RepoError::Duplicate { .. } => ErrorKind::Conflict,
        RepoError::InvalidInput { .. } => ErrorKind::Validation,
        RepoError::Timeout => ErrorKind::Unavailable,
        RepoError::Persistence(_) | RepoError::Integrity { .. } => ErrorKind::Internal,
    }
}

fn domain_kind(err: &DomainError) -> ErrorKind {
    match err {
        DomainError::Validation { .. } => ErrorKind::Validation,
        DomainError::Invariant { .. } => ErrorKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::access::Actor;
    use crate::domain::types::Role;
    use uuid::Uuid;

    #[test]
    fn kinds_map_to_wire_tokens() {
        let actor = Actor::new(Uuid::new_v4(), Role::User);
        let err = AppError::Admin(AdminContentError::Forbidden(AccessError::Forbidden {
            role: actor.role,
        }));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_response().kind, "forbidden");
    }

    #[test]
    fn generation_failures_are_their_own_kind() {
        let err = AppError::Resolve(ResolveError::GenerationFailed {
            reason: "backend down".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::GenerationFailed);
    }
}
