use std::sync::Arc;

use axum::{Extension, Json};
use shared::flows::{LoginRequest, LoginResponse};

use crate::custody::Custody;
use crate::error::ApiError;

pub async fn login(
    Extension(custody): Extension<Arc<Custody>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, account) = custody
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        account: account.view(),
    }))
}
