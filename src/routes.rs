use crate::{
    api::{attendance, dashboard, import_students, report, student},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let general_limiter = Arc::new(build_limiter(config.rate_general_per_min));
    let import_limiter = Arc::new(build_limiter(config.rate_import_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(general_limiter)
            .service(
                web::scope("/students")
                    // /students/import (before the /{id} matcher)
                    .service(
                        web::resource("/import")
                            .wrap(import_limiter)
                            .route(web::post().to(import_students::import_students)),
                    )
                    // /students
                    .service(
                        web::resource("")
                            .route(web::get().to(student::list_students))
                            .route(web::post().to(student::create_student)),
                    )
                    // /students/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(student::get_student))
                            .route(web::put().to(student::update_student))
                            .route(web::delete().to(student::delete_student)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::marking_sheet))
                            .route(web::post().to(attendance::save_attendance)),
                    )
                    // /attendance/absentees
                    .service(
                        web::resource("/absentees").route(web::get().to(attendance::absentees)),
                    )
                    // /attendance/report
                    .service(
                        web::resource("/report").route(web::get().to(report::monthly_report)),
                    ),
            )
            .service(web::resource("/dashboard").route(web::get().to(dashboard::metrics))),
    );
}
