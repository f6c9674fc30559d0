use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::UserRole;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// The signed-in actor, inserted into request extensions by [`require_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_employer(&self) -> bool {
        self.role == UserRole::Employer
    }

    pub fn require_employer(&self) -> Result<()> {
        if self.is_employer() {
            Ok(())
        } else {
            Err(Error::Forbidden("Only employers can do this".to_string()))
        }
    }

    pub fn require_candidate(&self) -> Result<()> {
        if self.role == UserRole::Candidate {
            Ok(())
        } else {
            Err(Error::Forbidden("Only candidates can apply for jobs".to_string()))
        }
    }
}

impl TryFrom<&Claims> for CurrentUser {
    type Error = Error;

    fn try_from(claims: &Claims) -> Result<Self> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;
        let role = claims
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or(UserRole::Candidate);
        Ok(Self { id, role })
    }
}

fn bearer_token(req: &Request) -> Result<&str> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(Error::Unauthorized("missing_authorization".to_string()));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(Error::Unauthorized("bad_authorization".to_string()));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(Error::Unauthorized("unsupported_scheme".to_string()));
    };
    Ok(token)
}

pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let user = match bearer_token(&req)
        .and_then(|token| state.auth_service.decode_token(token))
        .and_then(|claims| CurrentUser::try_from(&claims))
    {
        Ok(user) => user,
        Err(Error::Token(_)) => {
            return Error::Unauthorized("invalid_token".to_string()).into_response()
        }
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(user);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_map_to_actor() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            exp: 0,
            role: Some("employer".into()),
        };
        let user = CurrentUser::try_from(&claims).unwrap();
        assert_eq!(user.id, id);
        assert!(user.require_employer().is_ok());
        assert!(user.require_candidate().is_err());

        let garbage = Claims {
            sub: "not-a-uuid".into(),
            exp: 0,
            role: None,
        };
        assert!(CurrentUser::try_from(&garbage).is_err());
    }
}
