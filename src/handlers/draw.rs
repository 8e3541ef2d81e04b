use crate::models::*;
use crate::services::{DrawService, EligibilityService};
use crate::utils::{current_month, parse_month};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/draws/current",
    tag = "draw",
    responses(
        (status = 200, description = "当月抽奖概况", body = DrawResponse)
    )
)]
/// 当月抽奖（不存在则创建）
pub async fn get_current_draw(service: web::Data<DrawService>) -> Result<HttpResponse> {
    match service.current_draw().await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draws/{month}",
    tag = "draw",
    params(
        ("month" = String, Path, description = "YYYY-MM")
    ),
    responses(
        (status = 200, description = "指定月份抽奖概况", body = DrawResponse),
        (status = 400, description = "月份格式错误")
    )
)]
pub async fn get_draw(
    service: web::Data<DrawService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let month = match parse_month(&path.into_inner()) {
        Ok(m) => m,
        Err(e) => return Ok(e.error_response()),
    };
    match service.draw_for_month(month).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/entrants/{id}/eligibility",
    tag = "draw",
    params(
        ("id" = i64, Path, description = "Registration id"),
        ("month" = Option<String>, Query, description = "YYYY-MM，默认当月")
    ),
    responses(
        (status = 200, description = "抽奖资格", body = EligibilityResponse),
        (status = 404, description = "参赛者不存在")
    )
)]
pub async fn get_eligibility(
    service: web::Data<EligibilityService>,
    path: web::Path<i64>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse> {
    let month = match query.month.as_deref() {
        Some(m) => match parse_month(m) {
            Ok(m) => m,
            Err(e) => return Ok(e.error_response()),
        },
        None => current_month(),
    };
    match service.eligibility(path.into_inner(), month).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/entrants/{id}/winners",
    tag = "draw",
    params(
        ("id" = i64, Path, description = "Registration id")
    ),
    responses(
        (status = 200, description = "中奖记录", body = [WinnerResponse])
    )
)]
pub async fn get_entrant_winners(
    service: web::Data<DrawService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.winners_for_registration(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draws")
            .route("/current", web::get().to(get_current_draw))
            .route("/{month}", web::get().to(get_draw)),
    )
    .service(
        web::scope("/entrants")
            .route("/{id}/eligibility", web::get().to(get_eligibility))
            .route("/{id}/winners", web::get().to(get_entrant_winners)),
    );
}
