//! Client administration and limit verification handlers.

use actix_web::{HttpResponse, web};

use throttle_core::domain::ClientConfig;
use throttle_shared::dto::{
    ClientResponse, RegisterClientRequest, StatusResponse, UpdateClientRequest,
    VerifyLimitResponse,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn client_response(client: ClientConfig) -> ClientResponse {
    ClientResponse {
        id: client.id.to_string(),
        name: client.name,
        limit: client.limit,
        duration: client.duration,
    }
}

/// POST /api/clients
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterClientRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let client = state
        .clients
        .register(&req.name, req.limit, req.duration)
        .await?;

    Ok(HttpResponse::Created().json(client_response(client)))
}

/// GET /api/clients/{name}
pub async fn get(state: web::Data<AppState>, name: web::Path<String>) -> AppResult<HttpResponse> {
    let client = state.clients.get(&name).await?;
    Ok(HttpResponse::Ok().json(client_response(client)))
}

/// PUT /api/clients/{name}
pub async fn update(
    state: web::Data<AppState>,
    name: web::Path<String>,
    body: web::Json<UpdateClientRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state.clients.update(&name, req.limit, req.duration).await?;

    Ok(HttpResponse::Ok().json(StatusResponse { success: true }))
}

/// DELETE /api/clients/{name}
pub async fn delete(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.clients.delete(&name).await?;
    Ok(HttpResponse::Ok().json(StatusResponse { success: true }))
}

/// POST /api/clients/{name}/verify
///
/// A denial is a normal 200 response with `allowed: false`.
pub async fn verify(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> AppResult<HttpResponse> {
    let result = state.limiter.verify(&name).await?;
    let expires_at = result.expires_at.timestamp();

    let mut response = HttpResponse::Ok();
    response
        .insert_header(("X-RateLimit-Limit", result.limit.to_string()))
        .insert_header(("X-RateLimit-Reset", expires_at.to_string()));

    if !result.is_allowed() {
        let retry_after = (expires_at - chrono::Utc::now().timestamp()).max(1);
        response.insert_header(("Retry-After", retry_after.to_string()));
    }

    Ok(response.json(VerifyLimitResponse {
        allowed: result.is_allowed(),
        total_requests: i64::try_from(result.total_requests).unwrap_or(i64::MAX),
        expires_at,
    }))
}
