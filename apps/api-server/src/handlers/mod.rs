//! HTTP handlers and route configuration.

mod health;
mod posts;
mod users;

use actix_web::web;

#[cfg(test)]
pub(crate) mod testing;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Post routes; the literal segments must precede the slug catch-all.
            .service(
                web::scope("/posts")
                    .route("/upload-auth", web::get().to(posts::upload_auth))
                    .route("/feature", web::patch().to(posts::feature_post))
                    .route("/approve", web::patch().to(posts::approve_post))
                    .route("/awardNectar", web::patch().to(posts::award_nectar))
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{slug}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            // User routes
            .service(
                web::scope("/users")
                    .route("/me", web::get().to(users::me))
                    .route("/saved", web::get().to(users::saved_posts))
                    .route("/save", web::patch().to(users::save_post)),
            ),
    );
}
