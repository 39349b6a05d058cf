use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    entity::{carts, customers},
    error::AppError,
    middleware::auth::Identity,
    services::cart_service,
    state::AppState,
};

/// The cart attached to the current request.
///
/// Extracting it resolves the caller's identity, creating the customer and
/// the active cart on first use, before the handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentCart {
    pub identity: Identity,
    pub customer: Option<customers::Model>,
    pub cart: carts::Model,
}

impl CurrentCart {
    pub fn user_id(&self) -> Option<Uuid> {
        self.identity.user().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for CurrentCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        cart_service::resolve_cart(state, identity).await
    }
}
