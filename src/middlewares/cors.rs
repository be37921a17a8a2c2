use actix_cors::Cors;

/// Staff dashboards and customer apps are served from per-tenant origins, so
/// any origin is accepted; requests still need a bearer token.
pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
