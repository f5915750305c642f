//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod follows;
mod health;
mod likes;
mod mentors;
mod notifications;
mod posts;
mod tags;
mod uploads;
mod users;

use actix_web::{HttpResponse, error::ResponseError, web};

pub use auth::REFRESH_TOKEN_HEADER;
pub use uploads::MAX_UPLOAD_BYTES;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimit;

fn bad_request(err: impl std::fmt::Display) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

async fn route_not_found() -> HttpResponse {
    AppError::NotFound("Route not found".to_string()).error_response()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err)))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                // Sign-in, rate limited per client IP
                .service(
                    web::scope("/auth")
                        .wrap(RateLimit)
                        .route("/firebase", web::post().to(auth::firebase))
                        .route("/refresh", web::post().to(auth::refresh)),
                )
                .service(
                    web::resource("/register")
                        .wrap(RateLimit)
                        .route(web::post().to(auth::register)),
                )
                .service(
                    web::resource("/login")
                        .wrap(RateLimit)
                        .route(web::post().to(auth::login)),
                )
                // Own profile
                .service(
                    web::resource("/profile")
                        .route(web::get().to(users::get_profile))
                        .route(web::put().to(users::update_profile)),
                )
                .route("/profile/password", web::put().to(users::change_password))
                .route("/profile/saved-posts", web::get().to(users::saved_posts))
                .route("/profile/deactivate", web::post().to(users::deactivate))
                // Users and the follow graph
                .route("/users/{id}", web::get().to(users::get_user))
                .service(
                    web::resource("/users/{id}/follow")
                        .route(web::post().to(follows::follow))
                        .route(web::delete().to(follows::unfollow)),
                )
                .route("/users/{id}/followers", web::get().to(follows::followers))
                .route("/users/{id}/following", web::get().to(follows::following))
                // Mentors
                .route("/mentors", web::get().to(mentors::list))
                .route("/mentors/{user_id}", web::get().to(mentors::get))
                .route("/mentor/profile", web::post().to(mentors::upsert_profile))
                .route("/mentor/availability", web::put().to(mentors::set_availability))
                .route("/mentor/tags", web::post().to(tags::attach_to_mentor))
                // Tags
                .service(
                    web::resource("/tags")
                        .route(web::get().to(tags::list))
                        .route(web::post().to(tags::create)),
                )
                .route("/user/tags", web::post().to(tags::attach_to_user))
                // Notifications
                .route("/notifications", web::get().to(notifications::list))
                .route(
                    "/notifications/read-all",
                    web::put().to(notifications::mark_all_read),
                )
                .route(
                    "/notifications/{id}/read",
                    web::put().to(notifications::mark_read),
                )
                // Posts
                .service(
                    web::resource("/posts")
                        .route(web::get().to(posts::list))
                        .route(web::post().to(posts::create)),
                )
                .service(
                    web::resource("/posts/{id}")
                        .route(web::get().to(posts::get))
                        .route(web::delete().to(posts::delete)),
                )
                .route("/posts/{id}/share", web::post().to(posts::share))
                .route("/posts/{id}/save", web::post().to(posts::save))
                .route("/posts/{id}/analytics", web::get().to(posts::analytics))
                .route("/posts/{id}/tags", web::post().to(posts::attach_tags))
                .service(
                    web::resource("/posts/{id}/like")
                        .route(web::post().to(likes::like))
                        .route(web::delete().to(likes::unlike)),
                )
                .route("/posts/{id}/likes", web::get().to(likes::likers))
                .service(
                    web::resource("/posts/{id}/comments")
                        .route(web::get().to(comments::list))
                        .route(web::post().to(comments::create)),
                )
                .route("/comments/{id}/reply", web::post().to(comments::reply))
                // Uploads
                .service(
                    web::resource("/uploads")
                        .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
                        .route(web::post().to(uploads::upload)),
                ),
        )
        .default_service(web::to(route_not_found));
}
