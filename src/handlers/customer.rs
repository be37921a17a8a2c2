use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

use super::{Access, tenant_id};
use crate::models::*;
use crate::services::{CustomerService, LedgerService, RewardService};

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customer",
    request_body = CreateCustomerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Customer enrolled", body = CustomerResponse),
        (status = 400, description = "Invalid request or unknown referral code"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    request: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service
        .create_customer(org_id, request.into_inner())
        .await
    {
        Ok(customer) => Ok(HttpResponse::Created().json(ApiResponse::success(customer))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers",
    tag = "customer",
    params(PaginationParams, CustomerFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Customers of the organization, newest first", body = [CustomerResponse]),
        (status = 400, description = "Unknown tier filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn list_customers(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
    filter: web::Query<CustomerFilter>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service
        .list_customers(org_id, query.into_inner(), filter.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/top",
    tag = "customer",
    params(TopCustomersParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Active customers ranked by points or spending", body = [CustomerResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn top_customers(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    query: web::Query<TopCustomersParams>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service.top_customers(org_id, query.into_inner()).await {
        Ok(customers) => Ok(HttpResponse::Ok().json(ApiResponse::success(customers))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customer",
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Customer with stored and resolved tier", body = CustomerResponse),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service
        .get_customer(org_id, path.into_inner())
        .await
    {
        Ok(customer) => Ok(HttpResponse::Ok().json(ApiResponse::success(customer))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/by-referral/{code}",
    tag = "customer",
    params(
        ("code" = String, Path, description = "Referral code")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Customer owning the referral code", body = CustomerResponse),
        (status = 404, description = "Referral code not found")
    )
)]
pub async fn get_by_referral_code(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service.get_by_referral_code(org_id, &path).await {
        Ok(customer) => Ok(HttpResponse::Ok().json(ApiResponse::success(customer))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/{id}/transactions",
    tag = "customer",
    params(
        ("id" = Uuid, Path, description = "Customer id"),
        PaginationParams
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Points ledger, newest first", body = [PointTransactionResponse]),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn list_transactions(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service
        .list_transactions(org_id, path.into_inner(), query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/{id}/rewards",
    tag = "customer",
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rewards the customer can redeem now", body = [RewardResponse]),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn available_rewards(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service
        .available_for_customer(org_id, path.into_inner())
        .await
    {
        Ok(rewards) => Ok(HttpResponse::Ok().json(ApiResponse::success(rewards))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers/{id}/purchases",
    tag = "points",
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    request_body = RecordPurchaseRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Purchase credited", body = PointsChangeResponse),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn record_purchase(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<RecordPurchaseRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service
        .record_purchase(org_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(change) => Ok(HttpResponse::Ok().json(ApiResponse::success(change))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers/{id}/referral-bonus",
    tag = "points",
    params(
        ("id" = Uuid, Path, description = "Referred customer id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Referrer credited", body = PointsChangeResponse),
        (status = 400, description = "Not referred or already awarded"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn award_referral_bonus(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service
        .award_referral_bonus(org_id, path.into_inner())
        .await
    {
        Ok(change) => Ok(HttpResponse::Ok().json(ApiResponse::success(change))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers/{id}/adjustments",
    tag = "points",
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    request_body = AdjustPointsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Balance adjusted", body = PointsChangeResponse),
        (status = 400, description = "Invalid adjustment or insufficient points"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn adjust_points(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<AdjustPointsRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Manager) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service
        .adjust_points(org_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(change) => Ok(HttpResponse::Ok().json(ApiResponse::success(change))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers/{id}/redemptions",
    tag = "points",
    params(
        ("id" = Uuid, Path, description = "Customer id")
    ),
    request_body = RedeemRewardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reward redeemed", body = PointsChangeResponse),
        (status = 404, description = "Customer or reward not found"),
        (status = 422, description = "Customer is not eligible for the reward")
    )
)]
pub async fn redeem_reward(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<RedeemRewardRequest>,
) -> Result<HttpResponse> {
    let org_id = match tenant_id(&req, Access::Staff) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service
        .redeem_reward(org_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(change) => Ok(HttpResponse::Ok().json(ApiResponse::success(change))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn customer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::post().to(create_customer))
            .route("", web::get().to(list_customers))
            .route("/top", web::get().to(top_customers))
            .route("/by-referral/{code}", web::get().to(get_by_referral_code))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}/transactions", web::get().to(list_transactions))
            .route("/{id}/rewards", web::get().to(available_rewards))
            .route("/{id}/purchases", web::post().to(record_purchase))
            .route("/{id}/referral-bonus", web::post().to(award_referral_bonus))
            .route("/{id}/adjustments", web::post().to(adjust_points))
            .route("/{id}/redemptions", web::post().to(redeem_reward)),
    );
}
