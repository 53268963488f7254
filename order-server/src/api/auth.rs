//! Customer identity extractor
//!
//! Session issuance is an external collaborator: an upstream auth layer
//! authenticates the customer and injects `x-customer-id`. Requests
//! without the header are guest checkouts; whether that is acceptable is
//! the handler's decision.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Authenticated customer id, when the session layer supplied one
#[derive(Debug, Clone, Copy)]
pub struct AuthCustomer(pub Option<i64>);

impl<S> FromRequestParts<S> for AuthCustomer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer_id = parts
            .headers
            .get("x-customer-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok());
        Ok(AuthCustomer(customer_id))
    }
}
