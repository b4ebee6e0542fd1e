use std::future::{Ready, ready};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const MAX_CORRELATION_ID_LENGTH: usize = 128;

/// Correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Echo the caller's `X-Correlation-ID` or generate one, and attach it to the response.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService { service }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: S,
}

fn incoming_id(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_CORRELATION_ID_LENGTH)
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let correlation_id = incoming_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut()
            .insert(CorrelationId(correlation_id.clone()));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            match HeaderValue::from_str(&correlation_id) {
                Ok(value) => {
                    res.headers_mut()
                        .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
                }
                Err(e) => log::warn!("Unusable correlation id {:?}: {}", correlation_id, e),
            }

            Ok(res)
        })
    }
}

pub trait RequestIdExt {
    fn correlation_id(&self) -> Option<String>;
}

impl RequestIdExt for actix_web::HttpRequest {
    fn correlation_id(&self) -> Option<String> {
        self.extensions()
            .get::<CorrelationId>()
            .map(|id| id.0.clone())
    }
}
