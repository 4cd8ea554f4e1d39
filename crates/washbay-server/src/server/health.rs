//! `washbay.v1.Health` service.
//!
//! Lightweight liveness check the mobile and web clients call to verify
//! connectivity after resuming from background.

use std::pin::Pin;

use tokio_stream::Stream;
use tonic::{Request, Response, Status};

use washbay_proto::v1::{
    HealthCheckRequest, HealthCheckResponse, ServingStatus, health_server::Health,
};

/// Server-side implementation of `washbay.v1.Health`.
#[derive(Clone, Default)]
pub struct MarketHealthService;

impl MarketHealthService {
    pub const fn new() -> Self {
        Self
    }
}

#[tonic::async_trait]
impl Health for MarketHealthService {
    type WatchStream =
        Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send + 'static>>;

    async fn check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        // If this handler runs, the server is alive and accepting gRPC.
        Ok(Response::new(HealthCheckResponse {
            status: ServingStatus::Serving.into(),
        }))
    }

    async fn watch(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        Err(Status::unimplemented("Health.Watch is not supported"))
    }
}
