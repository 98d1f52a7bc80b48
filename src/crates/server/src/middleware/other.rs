use actix_cors::Cors;

/// The presentation layer is served from another origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "HEAD"])
        .allow_any_header()
        .max_age(3600)
}
