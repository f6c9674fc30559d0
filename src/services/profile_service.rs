use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Profile, UserAccount, UserRole};
use crate::repository::JobBoardRepository;

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn JobBoardRepository>,
}

/// Profile rebuilt from sign-up metadata when no `profiles` row exists.
pub fn profile_from_account(user: &UserAccount) -> Profile {
    let meta = &user.metadata;
    Profile {
        id: user.id,
        role: meta.role.unwrap_or(UserRole::Candidate),
        full_name: meta
            .full_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.email.clone()),
        company_name: meta.company_name.clone().unwrap_or_default(),
        is_verified: false,
    }
}

impl ProfileService {
    pub fn new(repo: Arc<dyn JobBoardRepository>) -> Self {
        Self { repo }
    }

    pub async fn account(&self, user_id: Uuid) -> Result<UserAccount> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
    }

    /// Stored profile, falling back to the account's sign-up metadata.
    pub async fn effective_profile(&self, user_id: Uuid) -> Result<Profile> {
        if let Some(profile) = self.repo.get_profile(user_id).await? {
            return Ok(profile);
        }
        let user = self.account(user_id).await?;
        Ok(profile_from_account(&user))
    }

    /// Inserts `candidate` unless a row already exists. Returns the stored
    /// profile and whether it was created by this call.
    pub async fn ensure_profile(&self, candidate: Profile) -> Result<(Profile, bool)> {
        if let Some(existing) = self.repo.get_profile(candidate.id).await? {
            return Ok((existing, false));
        }
        match self.repo.insert_profile(&candidate).await {
            Ok(()) => {
                tracing::info!(user_id = %candidate.id, role = %candidate.role, "profile created");
                Ok((candidate, true))
            }
            Err(Error::Conflict(_)) => {
                let stored = self.repo.get_profile(candidate.id).await?;
                Ok((stored.unwrap_or(candidate), false))
            }
            Err(e) => Err(e),
        }
    }
}
