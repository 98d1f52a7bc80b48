pub mod counter;
pub mod helper;
pub mod response;
pub mod system;

use crate::consts;
use actix_web::web;

pub fn configure_service(svc: &mut web::ServiceConfig) {
    svc.service(web::scope(consts::URL_PATH_RPC).configure(configure_routes));
}

/// 注册所有 procedure 路由
fn configure_routes(cfg: &mut web::ServiceConfig) {
    // System
    register_get("healthcheck", system::healthcheck, cfg);

    // Queries
    register_get_post("getCounter", counter::get_counter, cfg);

    // Mutations
    register_post("incrementCounter", counter::increment_counter, cfg);
    register_post("decrementCounter", counter::decrement_counter, cfg);
    register_post("resetCounter", counter::reset_counter, cfg);
}

fn register_get<F, Args>(name: &str, handler: F, cfg: &mut web::ServiceConfig)
where
    F: actix_web::Handler<Args> + Copy,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    cfg.service(web::resource(format!("/{}", name)).route(web::get().to(handler)));
}

fn register_post<F, Args>(name: &str, handler: F, cfg: &mut web::ServiceConfig)
where
    F: actix_web::Handler<Args> + Copy,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    cfg.service(web::resource(format!("/{}", name)).route(web::post().to(handler)));
}

fn register_get_post<F, Args>(name: &str, handler: F, cfg: &mut web::ServiceConfig)
where
    F: actix_web::Handler<Args> + Copy,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    cfg.service(
        web::resource(format!("/{}", name))
            .route(web::get().to(handler))
            .route(web::post().to(handler)),
    );
}
