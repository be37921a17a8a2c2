use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use super::{Access, tenant_id};
use crate::models::*;
use crate::services::RewardService;

#[utoipa::path(
    post,
    path = "/rewards",
    tag = "reward",
    request_body = CreateRewardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Reward created", body = RewardResponse),
        (status = 400, description = "Invalid reward or unknown tier"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_reward(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
    request: web::Json<CreateRewardRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Manager) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service.create_reward(org_id, request.into_inner()).await {
        Ok(reward) => Ok(HttpResponse::Created().json(ApiResponse::success(reward))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/rewards",
    tag = "reward",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rewards of the organization", body = [RewardResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_rewards(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Member) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service.list_rewards(org_id).await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(ApiResponse::success(rewards))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reward_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rewards")
            .route("", web::post().to(create_reward))
            .route("", web::get().to(list_rewards)),
    );
}
