// storefront/src/web/auth.rs

use crate::errors::AppError;
use crate::models::UserId;
use crate::state::AppState;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

/// The user id the identity provider attached to the request.
///
/// Read from the header named by `AppConfig::auth_user_header`. Token verification
/// happens upstream; a request without the header is unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: UserId,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(extract_user(req))
  }
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Config("AppState is not registered with the app".to_string()))?;
  let header_name = state.config.auth_user_header.as_str();

  let user_id = req
    .headers()
    .get(header_name)
    .and_then(|value| value.to_str().ok())
    .map(str::trim)
    .filter(|value| !value.is_empty());

  match user_id {
    Some(id) => Ok(AuthenticatedUser {
      user_id: UserId::new(id),
    }),
    None => {
      warn!(header = header_name, "Request without an authenticated user.");
      Err(AppError::NotAuthenticated)
    }
  }
}
