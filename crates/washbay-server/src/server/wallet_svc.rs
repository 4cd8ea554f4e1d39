//! `WalletService` gRPC implementation.

use tonic::{Request, Response, Status};
use tracing::instrument;

use washbay_proto::v1::wallet_service_server::WalletService;
use washbay_proto::v1::{
    AdjustCoinsRequest, AdjustCoinsResponse, ApplyReferralCodeRequest, ApplyReferralCodeResponse,
    GetWalletRequest, GetWalletResponse, ListTransactionsRequest, ListTransactionsResponse,
    TransactionKind, WalletTransaction,
};

use crate::booking::BookingCoordinator;
use crate::server::grpc_util::{booking_error_to_status, db_error_to_status, to_timestamp};
use crate::storage::MarketDatabase;

pub struct WalletServiceImpl {
    coordinator: BookingCoordinator,
    db: MarketDatabase,
}

impl WalletServiceImpl {
    pub const fn new(coordinator: BookingCoordinator, db: MarketDatabase) -> Self {
        Self { coordinator, db }
    }
}

fn transaction_to_proto(t: &crate::storage::WalletTransaction) -> WalletTransaction {
    let kind = match t.kind.as_str() {
        "credit" => TransactionKind::Credit,
        "debit" => TransactionKind::Debit,
        _ => TransactionKind::Unspecified,
    };
    WalletTransaction {
        id: t.id.clone(),
        user_id: t.user_id.clone(),
        amount: t.amount,
        kind: kind as i32,
        description: t.description.clone(),
        service_id: t.service_id.clone().unwrap_or_default(),
        appointment_id: t.appointment_id.clone().unwrap_or_default(),
        created_at: to_timestamp(t.created_at),
    }
}

#[tonic::async_trait]
impl WalletService for WalletServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "GetWallet"))]
    async fn get_wallet(
        &self,
        request: Request<GetWalletRequest>,
    ) -> Result<Response<GetWalletResponse>, Status> {
        let req = request.into_inner();

        let user = self
            .db
            .get_user(&req.user_id)
            .await
            .map_err(|_| Status::not_found("User not found"))?;

        Ok(Response::new(GetWalletResponse {
            coins: user.coins,
            referral_code: user.referral_code,
            referral_count: user.referral_count,
            used_referral_code: user.used_referral_code.unwrap_or_default(),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "ListTransactions"))]
    async fn list_transactions(
        &self,
        request: Request<ListTransactionsRequest>,
    ) -> Result<Response<ListTransactionsResponse>, Status> {
        let req = request.into_inner();

        let limit = if req.limit == 0 { 100 } else { req.limit };

        let transactions = self
            .db
            .list_wallet_transactions(&req.user_id, limit, req.offset)
            .await
            .map_err(db_error_to_status)?;

        let total = self
            .db
            .count_wallet_transactions(&req.user_id)
            .await
            .map_err(db_error_to_status)?;

        Ok(Response::new(ListTransactionsResponse {
            transactions: transactions.iter().map(transaction_to_proto).collect(),
            total: u32::try_from(total).unwrap_or(u32::MAX),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "ApplyReferralCode"))]
    async fn apply_referral_code(
        &self,
        request: Request<ApplyReferralCodeRequest>,
    ) -> Result<Response<ApplyReferralCodeResponse>, Status> {
        let req = request.into_inner();

        if req.code.trim().is_empty() {
            return Err(Status::invalid_argument("code is required"));
        }

        let outcome = self
            .coordinator
            .apply_referral_code(&req.user_id, req.code.trim())
            .await
            .map_err(booking_error_to_status)?;

        Ok(Response::new(ApplyReferralCodeResponse {
            referrer_bonus: outcome.referrer_bonus,
            redeemer_bonus: outcome.redeemer_bonus,
            new_balance: outcome.new_balance,
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "AdjustCoins"))]
    async fn adjust_coins(
        &self,
        request: Request<AdjustCoinsRequest>,
    ) -> Result<Response<AdjustCoinsResponse>, Status> {
        let req = request.into_inner();

        let description = if req.description.is_empty() {
            "manual adjustment"
        } else {
            req.description.as_str()
        };

        let new_balance = self
            .coordinator
            .adjust_coins(&req.user_id, req.delta, description)
            .await
            .map_err(booking_error_to_status)?;

        Ok(Response::new(AdjustCoinsResponse { new_balance }))
    }
}
