//! `VendorService` gRPC implementation.

use tonic::{Request, Response, Status};
use tracing::{info, instrument};
use uuid::Uuid;

use washbay_proto::v1::vendor_service_server::VendorService;
use washbay_proto::v1::{
    CreateServiceRequest, CreateServiceResponse, GetVendorRequest, GetVendorResponse,
    ListServicesRequest, ListServicesResponse, ListVendorsRequest, ListVendorsResponse,
    RegisterVendorRequest, RegisterVendorResponse, ServiceInfo, SetVendorBannedRequest,
    SetVendorBannedResponse, SetVendorVerifiedRequest, SetVendorVerifiedResponse,
    UpdateServiceRequest, UpdateServiceResponse, VendorInfo,
};

use crate::server::grpc_util::{db_error_to_status, to_timestamp};
use crate::storage::{MarketDatabase, ServiceParams};

pub struct VendorServiceImpl {
    db: MarketDatabase,
}

impl VendorServiceImpl {
    pub const fn new(db: MarketDatabase) -> Self {
        Self { db }
    }
}

fn vendor_to_proto(v: &crate::storage::Vendor) -> VendorInfo {
    VendorInfo {
        id: v.id.clone(),
        user_id: v.user_id.clone(),
        name: v.name.clone(),
        city: v.city.clone(),
        banned: v.banned != 0,
        verified: v.verified != 0,
        created_at: to_timestamp(v.created_at),
    }
}

fn service_to_proto(s: &crate::storage::Service) -> ServiceInfo {
    ServiceInfo {
        id: s.id.clone(),
        vendor_id: s.vendor_id.clone(),
        name: s.name.clone(),
        description: s.description.clone().unwrap_or_default(),
        price_cents: s.price_cents,
        duration_minutes: u32::try_from(s.duration_minutes).unwrap_or(0),
        coin_reward: s.coin_reward,
        available: s.available != 0,
    }
}

#[tonic::async_trait]
impl VendorService for VendorServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "RegisterVendor"))]
    async fn register_vendor(
        &self,
        request: Request<RegisterVendorRequest>,
    ) -> Result<Response<RegisterVendorResponse>, Status> {
        let req = request.into_inner();

        if req.name.trim().is_empty() {
            return Err(Status::invalid_argument("name is required"));
        }

        // The owning account must exist.
        self.db
            .get_user(&req.user_id)
            .await
            .map_err(|_| Status::not_found("User not found"))?;

        let id = Uuid::new_v4().to_string();
        let vendor = self
            .db
            .create_vendor(&id, &req.user_id, req.name.trim(), &req.city)
            .await
            .map_err(|e| Status::internal(format!("Failed to register vendor: {e}")))?;

        info!(vendor_id = %vendor.id, name = %vendor.name, "Vendor registered");

        Ok(Response::new(RegisterVendorResponse {
            vendor: Some(vendor_to_proto(&vendor)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetVendor"))]
    async fn get_vendor(
        &self,
        request: Request<GetVendorRequest>,
    ) -> Result<Response<GetVendorResponse>, Status> {
        let req = request.into_inner();

        let vendor = self
            .db
            .get_vendor(&req.vendor_id)
            .await
            .map_err(|_| Status::not_found("Vendor not found"))?;

        Ok(Response::new(GetVendorResponse {
            vendor: Some(vendor_to_proto(&vendor)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "ListVendors"))]
    async fn list_vendors(
        &self,
        request: Request<ListVendorsRequest>,
    ) -> Result<Response<ListVendorsResponse>, Status> {
        let req = request.into_inner();

        let limit = if req.limit == 0 { 100 } else { req.limit };

        let vendors = self
            .db
            .list_vendors(req.include_banned, req.only_verified, limit, req.offset)
            .await
            .map_err(db_error_to_status)?;

        let total = self
            .db
            .count_vendors(req.include_banned, req.only_verified)
            .await
            .map_err(db_error_to_status)?;

        Ok(Response::new(ListVendorsResponse {
            vendors: vendors.iter().map(vendor_to_proto).collect(),
            total: u32::try_from(total).unwrap_or(u32::MAX),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "SetVendorBanned"))]
    async fn set_vendor_banned(
        &self,
        request: Request<SetVendorBannedRequest>,
    ) -> Result<Response<SetVendorBannedResponse>, Status> {
        let req = request.into_inner();

        let vendor = self
            .db
            .set_vendor_banned(&req.vendor_id, req.banned)
            .await
            .map_err(db_error_to_status)?;

        info!(vendor_id = %req.vendor_id, banned = req.banned, "Vendor ban state changed");

        Ok(Response::new(SetVendorBannedResponse {
            vendor: Some(vendor_to_proto(&vendor)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "SetVendorVerified"))]
    async fn set_vendor_verified(
        &self,
        request: Request<SetVendorVerifiedRequest>,
    ) -> Result<Response<SetVendorVerifiedResponse>, Status> {
        let req = request.into_inner();

        let vendor = self
            .db
            .set_vendor_verified(&req.vendor_id, req.verified)
            .await
            .map_err(db_error_to_status)?;

        info!(vendor_id = %req.vendor_id, verified = req.verified, "Vendor verification changed");

        Ok(Response::new(SetVendorVerifiedResponse {
            vendor: Some(vendor_to_proto(&vendor)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "CreateService"))]
    async fn create_service(
        &self,
        request: Request<CreateServiceRequest>,
    ) -> Result<Response<CreateServiceResponse>, Status> {
        let req = request.into_inner();

        if req.name.trim().is_empty() {
            return Err(Status::invalid_argument("name is required"));
        }
        if req.coin_reward < 0 {
            return Err(Status::invalid_argument("coin_reward must not be negative"));
        }

        self.db
            .get_vendor(&req.vendor_id)
            .await
            .map_err(|_| Status::not_found("Vendor not found"))?;

        let id = Uuid::new_v4().to_string();
        let service = self
            .db
            .create_service(&ServiceParams {
                id: &id,
                vendor_id: &req.vendor_id,
                name: req.name.trim(),
                description: if req.description.is_empty() {
                    None
                } else {
                    Some(&req.description)
                },
                price_cents: req.price_cents,
                duration_minutes: i64::from(req.duration_minutes),
                coin_reward: req.coin_reward,
                available: req.available,
            })
            .await
            .map_err(|e| Status::internal(format!("Failed to create service: {e}")))?;

        info!(service_id = %service.id, vendor_id = %service.vendor_id, "Service created");

        Ok(Response::new(CreateServiceResponse {
            service: Some(service_to_proto(&service)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "UpdateService"))]
    async fn update_service(
        &self,
        request: Request<UpdateServiceRequest>,
    ) -> Result<Response<UpdateServiceResponse>, Status> {
        let req = request.into_inner();

        if matches!(req.coin_reward, Some(r) if r < 0) {
            return Err(Status::invalid_argument("coin_reward must not be negative"));
        }

        // Empty string clears the nullable description.
        let description: Option<Option<&str>> = req
            .description
            .as_deref()
            .map(|d| if d.is_empty() { None } else { Some(d) });

        let service = self
            .db
            .update_service_partial(
                &req.service_id,
                req.name.as_deref(),
                description,
                req.price_cents,
                req.duration_minutes.map(i64::from),
                req.coin_reward,
                req.available,
            )
            .await
            .map_err(db_error_to_status)?;

        Ok(Response::new(UpdateServiceResponse {
            service: Some(service_to_proto(&service)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "ListServices"))]
    async fn list_services(
        &self,
        request: Request<ListServicesRequest>,
    ) -> Result<Response<ListServicesResponse>, Status> {
        let req = request.into_inner();

        let services = self
            .db
            .list_services(&req.vendor_id, req.only_available)
            .await
            .map_err(db_error_to_status)?;

        Ok(Response::new(ListServicesResponse {
            services: services.iter().map(service_to_proto).collect(),
        }))
    }
}
