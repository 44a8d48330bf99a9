//! HTTP handlers for dealflow-api.

pub mod fathom;
pub mod health;
pub mod import;
pub mod leads;
pub mod summaries;
pub mod webhook;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{ApiError, AppState};

/// Path parameters naming stored records.
///
/// A segment that does not parse as an id names no record, so the rejection
/// is a JSON 404 rather than axum's plain-text 400.
#[derive(Debug)]
pub struct RecordPath<T>(pub T);

#[axum::async_trait]
impl<T> FromRequestParts<AppState> for RecordPath<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(RecordPath(value)),
            Err(rejection) => {
                debug!(path = %parts.uri.path(), reason = %rejection.body_text(), "Unparseable record id");
                Err(ApiError::NotFound("Not found".to_string()))
            }
        }
    }
}
