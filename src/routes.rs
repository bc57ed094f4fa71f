use crate::api::attendance;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::Context;
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = (60_000 / u64::from(requests_per_min.max(1))).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .with_context(|| format!("invalid rate limit: {requests_per_min} per minute"))?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<Limiter>) {
    cfg.app_data(web::JsonConfig::default().error_handler(attendance::json_error_handler));

    cfg.service(
        web::scope(api_prefix).service(
            web::scope("/attendance")
                .wrap(limiter)
                // /attendance
                .service(
                    web::resource("")
                        .route(web::get().to(attendance::list_records))
                        .route(web::post().to(attendance::replace_records)),
                )
                // /attendance/check-in
                .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
                // /attendance/check-out
                .service(web::resource("/check-out").route(web::post().to(attendance::check_out)))
                // /attendance/search?q=
                .service(web::resource("/search").route(web::get().to(attendance::search))),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_builds_for_any_positive_rate() {
        assert!(build_limiter(1).is_ok());
        assert!(build_limiter(120).is_ok());
        assert!(build_limiter(1_000_000).is_ok());
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(build_limiter(0).is_err());
    }
}
