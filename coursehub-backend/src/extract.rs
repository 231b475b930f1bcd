//! Bearer-token extractors. `Authenticated` resolves the token to a user id
//! through the Identity Gateway; `Caller` additionally loads the typed user
//! record so handlers can dispatch on role.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use coursehub_domain::{Admin, Lecturer, Student, User};

use crate::error::AppError;
use crate::state::AppState;

pub struct Authenticated {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;
        let user_id = state
            .identity
            .verify(bearer.token())
            .await
            .map_err(|_| AppError::Unauthorized)?;
        Ok(Self { user_id })
    }
}

pub struct Caller(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Authenticated::from_request_parts(parts, state).await?;
        // a valid token without a user record means the account is gone
        let user = state
            .accounts
            .get_user(&auth.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(Self(user))
    }
}

impl Caller {
    pub fn student(&self) -> Result<&Student, AppError> {
        match &self.0 {
            User::Student(student) => Ok(student),
            _ => Err(AppError::Forbidden("student role required".to_owned())),
        }
    }

    pub fn lecturer(&self) -> Result<&Lecturer, AppError> {
        match &self.0 {
            User::Lecturer(lecturer) => Ok(lecturer),
            _ => Err(AppError::Forbidden("lecturer role required".to_owned())),
        }
    }

    pub fn admin(&self) -> Result<&Admin, AppError> {
        match &self.0 {
            User::Admin(admin) => Ok(admin),
            _ => Err(AppError::Forbidden("admin role required".to_owned())),
        }
    }
}
