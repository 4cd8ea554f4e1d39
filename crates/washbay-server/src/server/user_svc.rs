//! `UserService` gRPC implementation.

use rand::RngExt;
use tonic::{Request, Response, Status};
use tracing::{info, instrument};
use uuid::Uuid;

use washbay_proto::v1::user_service_server::UserService;
use washbay_proto::v1::{
    GetUserRequest, GetUserResponse, RegisterUserRequest, RegisterUserResponse, UserProfile,
};

use crate::server::grpc_util::{db_error_to_status, to_timestamp};
use crate::storage::MarketDatabase;

const REFERRAL_CODE_ATTEMPTS: u32 = 5;

pub struct UserServiceImpl {
    db: MarketDatabase,
}

impl UserServiceImpl {
    pub const fn new(db: MarketDatabase) -> Self {
        Self { db }
    }
}

pub(crate) fn user_to_proto(u: &crate::storage::User) -> UserProfile {
    UserProfile {
        id: u.id.clone(),
        name: u.name.clone(),
        email: u.email.clone(),
        role: u.role.clone(),
        coins: u.coins,
        referral_code: u.referral_code.clone(),
        referral_count: u.referral_count,
        used_referral_code: u.used_referral_code.clone().unwrap_or_default(),
        created_at: to_timestamp(u.created_at),
    }
}

/// Generate a shareable referral code, e.g. `WASH-7K2PQX9M`.
///
/// Ambiguous characters (0/O, 1/I) are left out of the alphabet.
fn generate_referral_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    let suffix: String = (0..8)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("WASH-{suffix}")
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "RegisterUser"))]
    async fn register_user(
        &self,
        request: Request<RegisterUserRequest>,
    ) -> Result<Response<RegisterUserResponse>, Status> {
        let req = request.into_inner();

        if req.name.trim().is_empty() {
            return Err(Status::invalid_argument("name is required"));
        }
        if req.email.trim().is_empty() {
            return Err(Status::invalid_argument("email is required"));
        }
        let role = if req.role.is_empty() {
            "customer"
        } else {
            req.role.as_str()
        };
        if !matches!(role, "customer" | "vendor" | "admin") {
            return Err(Status::invalid_argument("role must be customer, vendor, or admin"));
        }

        // Referral codes are unique; regenerate on the (unlikely) collision.
        let mut referral_code = generate_referral_code();
        for _ in 0..REFERRAL_CODE_ATTEMPTS {
            let taken = self
                .db
                .referral_code_exists(&referral_code)
                .await
                .map_err(db_error_to_status)?;
            if !taken {
                break;
            }
            referral_code = generate_referral_code();
        }

        let id = Uuid::new_v4().to_string();
        let user = self
            .db
            .create_user(&id, req.name.trim(), req.email.trim(), role, &referral_code)
            .await
            .map_err(|e| Status::internal(format!("Failed to register user: {e}")))?;

        info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(Response::new(RegisterUserResponse {
            user: Some(user_to_proto(&user)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetUser"))]
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let req = request.into_inner();

        let user = self
            .db
            .get_user(&req.user_id)
            .await
            .map_err(|_| Status::not_found("User not found"))?;

        Ok(Response::new(GetUserResponse {
            user: Some(user_to_proto(&user)),
        }))
    }
}
