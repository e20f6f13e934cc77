use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use crate::server::AppContext;

pub(crate) async fn health_check_route(ctx: web::Data<AppContext>) -> impl Responder {
    let db_status = ctx.extensions.db_service.health_check().await.is_ok();
    let jobs_status = ctx.extensions.job_queue.health_check().await.is_ok();
    let all_good = db_status && jobs_status;
    let status_code = if all_good {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    HttpResponse::build(status_code).json(serde_json::json!({
        "database": db_status,
        "jobs": jobs_status,
    }))
}
