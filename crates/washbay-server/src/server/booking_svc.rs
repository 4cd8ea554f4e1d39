//! `BookingService` gRPC implementation.
//!
//! Thin wire adapter over the booking coordinator; all invariants live
//! there.

use tonic::{Request, Response, Status};
use tracing::instrument;

use washbay_proto::v1::booking_service_server::BookingService;
use washbay_proto::v1::{
    Appointment, CreateAppointmentRequest, CreateAppointmentResponse, GetAppointmentRequest,
    GetAppointmentResponse, ListAppointmentsRequest, ListAppointmentsResponse,
    UpdateAppointmentRequest, UpdateAppointmentResponse,
};

use crate::booking::{AppointmentStatus, AppointmentUpdate, BookingCoordinator, NewAppointment};
use crate::server::grpc_util::{
    booking_error_to_status, db_error_to_status, decode_status, encode_status, none_if_empty,
    to_timestamp,
};
use crate::storage::MarketDatabase;

pub struct BookingServiceImpl {
    coordinator: BookingCoordinator,
    db: MarketDatabase,
}

impl BookingServiceImpl {
    pub const fn new(coordinator: BookingCoordinator, db: MarketDatabase) -> Self {
        Self { coordinator, db }
    }
}

pub(crate) fn appointment_to_proto(a: &crate::storage::Appointment) -> Appointment {
    Appointment {
        id: a.id.clone(),
        vendor_id: a.vendor_id.clone(),
        service_id: a.service_id.clone(),
        customer_id: a.customer_id.clone().unwrap_or_default(),
        starts_at: to_timestamp(a.starts_at),
        duration_minutes: u32::try_from(a.duration_minutes).unwrap_or(0),
        total_price_cents: a.total_price_cents,
        coins_used: a.coins_used,
        status: encode_status(&a.status) as i32,
        coin_reward_processed: a.coin_reward_processed != 0,
        coin_reward_amount: a.coin_reward_amount,
        customer_name: a.customer_name.clone(),
        customer_phone: a.customer_phone.clone(),
        notes: a.notes.clone().unwrap_or_default(),
        created_at: to_timestamp(a.created_at),
        updated_at: to_timestamp(a.updated_at),
    }
}

#[tonic::async_trait]
impl BookingService for BookingServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "CreateAppointment"))]
    async fn create_appointment(
        &self,
        request: Request<CreateAppointmentRequest>,
    ) -> Result<Response<CreateAppointmentResponse>, Status> {
        let req = request.into_inner();

        let starts_at = req
            .starts_at
            .ok_or_else(|| Status::invalid_argument("starts_at is required"))?
            .seconds;
        let initial_status =
            decode_status(req.initial_status)?.unwrap_or(AppointmentStatus::Confirmed);

        let new = NewAppointment {
            vendor_id: req.vendor_id,
            service_id: req.service_id,
            customer_id: none_if_empty(req.customer_id),
            starts_at,
            duration_minutes: i64::from(req.duration_minutes),
            total_price_cents: req.total_price_cents,
            coins_to_use: req.coins_to_use,
            customer_name: req.customer_name,
            customer_phone: req.customer_phone,
            notes: none_if_empty(req.notes),
            initial_status,
        };

        let appointment = self
            .coordinator
            .create_appointment(new)
            .await
            .map_err(booking_error_to_status)?;

        Ok(Response::new(CreateAppointmentResponse {
            appointment: Some(appointment_to_proto(&appointment)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "UpdateAppointment"))]
    async fn update_appointment(
        &self,
        request: Request<UpdateAppointmentRequest>,
    ) -> Result<Response<UpdateAppointmentResponse>, Status> {
        let req = request.into_inner();

        let status = match req.status {
            Some(value) => {
                let decoded = decode_status(value)?;
                if decoded.is_none() {
                    return Err(Status::invalid_argument(
                        "status must not be UNSPECIFIED when present",
                    ));
                }
                decoded
            }
            None => None,
        };

        let update = AppointmentUpdate {
            status,
            starts_at: req.starts_at.map(|t| t.seconds),
            duration_minutes: req.duration_minutes.map(i64::from),
            customer_name: req.customer_name,
            customer_phone: req.customer_phone,
            // Empty string clears the nullable notes column.
            notes: req.notes.map(none_if_empty),
        };

        let appointment = self
            .coordinator
            .update_appointment(&req.appointment_id, update)
            .await
            .map_err(booking_error_to_status)?;

        Ok(Response::new(UpdateAppointmentResponse {
            appointment: Some(appointment_to_proto(&appointment)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetAppointment"))]
    async fn get_appointment(
        &self,
        request: Request<GetAppointmentRequest>,
    ) -> Result<Response<GetAppointmentResponse>, Status> {
        let req = request.into_inner();

        let appointment = self
            .db
            .get_appointment(&req.appointment_id)
            .await
            .map_err(|_| Status::not_found("Appointment not found"))?;

        Ok(Response::new(GetAppointmentResponse {
            appointment: Some(appointment_to_proto(&appointment)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "ListAppointments"))]
    async fn list_appointments(
        &self,
        request: Request<ListAppointmentsRequest>,
    ) -> Result<Response<ListAppointmentsResponse>, Status> {
        let req = request.into_inner();

        let status_filter = decode_status(req.status_filter)?;
        let status_str = status_filter.map(AppointmentStatus::as_str);
        let limit = if req.limit == 0 { 100 } else { req.limit };

        let (appointments, total) = match (req.vendor_id.is_empty(), req.customer_id.is_empty()) {
            (false, true) => {
                let list = self
                    .db
                    .list_vendor_appointments(&req.vendor_id, status_str, limit, req.offset)
                    .await
                    .map_err(db_error_to_status)?;
                let total = self
                    .db
                    .count_vendor_appointments(&req.vendor_id, status_str)
                    .await
                    .map_err(db_error_to_status)?;
                (list, total)
            }
            (true, false) => {
                let list = self
                    .db
                    .list_customer_appointments(&req.customer_id, status_str, limit, req.offset)
                    .await
                    .map_err(db_error_to_status)?;
                let total = self
                    .db
                    .count_customer_appointments(&req.customer_id, status_str)
                    .await
                    .map_err(db_error_to_status)?;
                (list, total)
            }
            _ => {
                return Err(Status::invalid_argument(
                    "exactly one of vendor_id or customer_id must be set",
                ));
            }
        };

        Ok(Response::new(ListAppointmentsResponse {
            appointments: appointments.iter().map(appointment_to_proto).collect(),
            total: u32::try_from(total).unwrap_or(u32::MAX),
        }))
    }
}
