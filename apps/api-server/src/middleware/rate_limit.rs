//! Rate limiting middleware.
//!
//! Keys on the client IP and uses the limiter held by [`AppState`].

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Rate limiting middleware factory.
pub struct RateLimit;

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService { service }))
    }
}

pub struct RateLimitService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let limiter = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.rate_limiter.clone());

        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        if let Some(limiter) = limiter {
            let result = limiter.check(&key);
            if !result.allowed {
                tracing::warn!(client = %key, path = %req.path(), "Rate limit exceeded");

                let response = AppError::TooManyRequests {
                    retry_after_secs: result.retry_after.as_secs().max(1),
                }
                .error_response();
                let (http_req, _payload) = req.into_parts();

                return Box::pin(async move {
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
