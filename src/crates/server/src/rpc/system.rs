use crate::rpc::response::Health;
use actix_web::web::Json;
use log::debug;

/// healthcheck - liveness probe, does not touch the store
pub async fn healthcheck() -> Json<Health> {
    debug!("healthcheck");
    Json(Health::ok())
}
