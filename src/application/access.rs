//! Role gate applied ahead of every administrative content mutation.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::types::Role;

/// Caller identity as supplied by the external identity provider. The core
/// trusts it as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("role `{role}` may not modify content")]
    Forbidden { role: Role },
}

/// Fails with `Forbidden` unless the caller's role is creator or admin.
/// Checked before any store mutation so rejected calls leave no partial
/// writes.
pub fn require_content_manager(actor: &Actor) -> Result<(), AccessError> {
    if actor.role.can_manage_content() {
        Ok(())
    } else {
        Err(AccessError::Forbidden { role: actor.role })
    }
}
