use crate::error::ServiceError;
use crate::model::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

pub fn authorize(owner: &UserId, actor: &UserId) -> Decision {
    if owner == actor {
        Decision::Allowed
    } else {
        Decision::Denied
    }
}

/// `action` completes "User not authorized to ... this task".
pub fn require_owner(owner: &UserId, actor: &UserId, action: &str) -> Result<(), ServiceError> {
    match authorize(owner, actor) {
        Decision::Allowed => Ok(()),
        Decision::Denied => {
            tracing::warn!(owner = %owner, actor = %actor, action, "ownership check denied");
            Err(ServiceError::Forbidden(format!(
                "User not authorized to {} this task",
                action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_user_allowed() {
        let owner = UserId::new();
        assert_eq!(authorize(&owner, &owner), Decision::Allowed);
        assert!(require_owner(&owner, &owner, "edit").is_ok());
    }

    #[test]
    fn test_other_user_denied() {
        let owner = UserId::new();
        let other = UserId::new();
        assert_eq!(authorize(&owner, &other), Decision::Denied);
        match require_owner(&owner, &other, "delete") {
            Err(ServiceError::Forbidden(msg)) => {
                assert_eq!(msg, "User not authorized to delete this task")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
