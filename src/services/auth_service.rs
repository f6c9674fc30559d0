use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::profile_service::{profile_from_account, ProfileService};
use crate::dto::auth_dto::{AuthResponse, SignInPayload, SignUpPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::{Profile, SignUpMetadata, UserRole};
use crate::repository::JobBoardRepository;
use crate::utils::crypto::{hash_password, verify_password};

pub const ACCOUNT_EXISTS_MESSAGE: &str = "Account already exists. Please Sign In.";
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn JobBoardRepository>,
    profiles: ProfileService,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        repo: Arc<dyn JobBoardRepository>,
        profiles: ProfileService,
        jwt_secret: String,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            repo,
            profiles,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours.max(1)),
        }
    }

    pub async fn sign_up(&self, payload: SignUpPayload) -> Result<AuthResponse> {
        payload.validate()?;
        let email = payload.email.trim().to_lowercase();
        let password_hash = hash_password(&payload.password)?;
        let metadata = SignUpMetadata {
            full_name: payload.full_name.filter(|n| !n.trim().is_empty()),
            role: payload.role,
            company_name: payload.company_name.filter(|c| !c.trim().is_empty()),
        };

        let user = match self.repo.create_user(&email, &password_hash, &metadata).await {
            Ok(user) => user,
            Err(Error::Conflict(_)) => return Err(Error::Conflict(ACCOUNT_EXISTS_MESSAGE.to_string())),
            Err(e) => return Err(e),
        };

        let profile = Profile {
            is_verified: true,
            ..profile_from_account(&user)
        };
        let profile = match self.profiles.ensure_profile(profile.clone()).await {
            Ok((stored, _)) => stored,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "profile insert failed after sign-up");
                profile
            }
        };

        tracing::info!(user_id = %user.id, role = %profile.role, "account created");
        Ok(AuthResponse {
            token: self.issue_token(user.id, profile.role)?,
            user_id: user.id,
            email: user.email,
            profile,
        })
    }

    pub async fn sign_in(&self, payload: SignInPayload) -> Result<AuthResponse> {
        payload.validate()?;
        let user = self
            .repo
            .find_user_by_email(payload.email.trim())
            .await?
            .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&payload.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "sign-in rejected");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let profile = self.profiles.effective_profile(user.id).await?;
        Ok(AuthResponse {
            token: self.issue_token(user.id, profile.role)?,
            user_id: user.id,
            email: user.email,
            profile,
        })
    }

    pub fn issue_token(&self, user_id: Uuid, role: UserRole) -> Result<String> {
        let exp = (Utc::now() + self.token_ttl).timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            role: Some(role.as_str().to_string()),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}
