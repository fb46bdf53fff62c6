use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use shared::flows::{AccountView, RegisterRequest};

use crate::custody::Custody;
use crate::error::ApiError;

pub async fn register(
    Extension(custody): Extension<Arc<Custody>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountView>), ApiError> {
    let account = custody.register(&payload.email, &payload.password).await?;

    Ok((StatusCode::CREATED, Json(account.view())))
}
