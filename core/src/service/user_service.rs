use crate::auth::password::{hash_password, verify_password};
use crate::auth::SessionSigner;
use crate::error::{ServiceError, ServiceResult};
use crate::model::user::{normalize_email, PublicUser, User, UserId};
use crate::repository::{DuplicateEmail, UserRepository};
use crate::service::dto::{LoginInput, RegisterInput, UpdateProfileInput};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const USER_NOT_FOUND: &str = "User does not exist";

pub struct UserService<R: UserRepository> {
    repo: R,
    sessions: SessionSigner,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R, sessions: SessionSigner) -> Self {
        Self { repo, sessions }
    }

    pub fn register(&self, input: RegisterInput) -> ServiceResult<PublicUser> {
        let (Some(name), Some(email), Some(password)) = (
            filled(input.name.as_deref()),
            filled(input.email.as_deref()),
            filled(input.password.as_deref()),
        ) else {
            return Err(ServiceError::validation(ALL_FIELDS_REQUIRED));
        };

        let email = normalize_email(email);
        if self.repo.find_by_email(&email)?.is_some() {
            return Err(duplicate_email());
        }

        let user = User::new(name.trim().to_string(), email, hash_password(password)?);
        let user = self.repo.insert(user).map_err(|err| {
            if err.downcast_ref::<DuplicateEmail>().is_some() {
                duplicate_email()
            } else {
                ServiceError::Storage(err)
            }
        })?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.to_public())
    }

    /// Returns the user and a freshly signed session token.
    pub fn login(&self, input: LoginInput) -> ServiceResult<(PublicUser, String)> {
        let (Some(email), Some(password)) = (
            filled(input.email.as_deref()),
            filled(input.password.as_deref()),
        ) else {
            return Err(ServiceError::validation(ALL_FIELDS_REQUIRED));
        };

        let user = self
            .repo
            .find_by_email(&normalize_email(email))?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))?;
        if !verify_password(password, &user.password) {
            return Err(ServiceError::Unauthenticated("Invalid user credentials".to_string()));
        }

        let token = self
            .sessions
            .issue(&user.id)
            .map_err(|err| ServiceError::Storage(anyhow::Error::from(err)))?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user.to_public(), token))
    }

    pub fn resolve_session(&self, token: &str) -> ServiceResult<UserId> {
        self.sessions.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "session rejected");
            ServiceError::Unauthenticated("Invalid or expired session".to_string())
        })
    }

    pub fn profile(&self, actor: &UserId) -> ServiceResult<PublicUser> {
        Ok(self.load(actor)?.to_public())
    }

    pub fn update_profile(&self, actor: &UserId, input: UpdateProfileInput) -> ServiceResult<PublicUser> {
        let mut user = self.load(actor)?;

        if let Some(name) = filled(input.name.as_deref()) {
            user.name = name.trim().to_string();
        }

        match (
            filled(input.old_password.as_deref()),
            filled(input.new_password.as_deref()),
        ) {
            (Some(old), Some(new)) => {
                if !verify_password(old, &user.password) {
                    return Err(ServiceError::validation("The old password does not match"));
                }
                user.password = hash_password(new)?;
            }
            (None, Some(_)) => {
                return Err(ServiceError::validation(
                    "Old password is required to set a new password",
                ));
            }
            _ => {}
        }

        let saved = self.repo.update(user)?;
        tracing::info!(user_id = %saved.id, "profile updated");
        Ok(saved.to_public())
    }

    fn load(&self, id: &UserId) -> ServiceResult<User> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))
    }
}

// Passwords are not trimmed, only required to contain something besides whitespace.
fn filled(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn duplicate_email() -> ServiceError {
    ServiceError::Conflict("User with this email already exists".to_string())
}
