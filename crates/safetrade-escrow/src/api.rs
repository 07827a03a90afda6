//! Admin Entry Point
//!
//! Single multiplexed administrative action (`action` discriminator plus
//! action-specific parameters), exposed over HTTP. [`AdminApi`] owns the
//! dispatch and response shaping; the axum router is a thin layer over it.
//!
//! Response shapes: mutations answer `{"success": true, "message": ...}`,
//! get_list answers `{"data": [...]}`, get_stats answers a flat stats
//! object, failures answer a non-2xx status with `{"error": ...}`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;
use uuid::Uuid;

use safetrade_common::{EscrowError, Result, SettlementStatus};

use crate::auth::AuthorizationGate;
use crate::domain::query::QueryService;
use crate::domain::workflow::EscrowWorkflow;

/// One administrative action as received on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    #[serde(rename_all = "camelCase")]
    ConfirmDeposit {
        safe_transaction_id: String,
        admin_notes: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ConfirmShipping {
        safe_transaction_id: String,
        tracking_number: Option<String>,
        courier: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ProcessSettlement {
        safe_transaction_id: String,
        admin_notes: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateNotes {
        safe_transaction_id: String,
        admin_notes: String,
    },
    GetStats,
    GetList {
        status: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
    },
}

/// Dispatches authorized admin actions to the workflow and query service
pub struct AdminApi {
    gate: AuthorizationGate,
    workflow: EscrowWorkflow,
    queries: QueryService,
    default_list_limit: usize,
}

impl AdminApi {
    pub fn new(
        gate: AuthorizationGate,
        workflow: EscrowWorkflow,
        queries: QueryService,
        default_list_limit: usize,
    ) -> Self {
        Self {
            gate,
            workflow,
            queries,
            default_list_limit,
        }
    }

    /// Authorize the caller, run one action, shape the response
    pub async fn handle(
        &self,
        token: Option<&str>,
        action: AdminAction,
    ) -> Result<serde_json::Value> {
        self.gate.authorize(token).await?;

        match action {
            AdminAction::ConfirmDeposit {
                safe_transaction_id,
                admin_notes,
            } => {
                let id = parse_id(&safe_transaction_id)?;
                self.workflow
                    .confirm_deposit(id, admin_notes)
                    .await
                    .map_err(|e| sanitize(e, "Deposit confirmation failed"))?;
                Ok(json!({ "success": true, "message": "Deposit confirmed." }))
            }
            AdminAction::ConfirmShipping {
                safe_transaction_id,
                tracking_number,
                courier,
            } => {
                let id = parse_id(&safe_transaction_id)?;
                self.workflow
                    .confirm_shipping(id, tracking_number, courier)
                    .await
                    .map_err(|e| sanitize(e, "Shipping confirmation failed"))?;
                Ok(json!({ "success": true, "message": "Shipping confirmed." }))
            }
            AdminAction::ProcessSettlement {
                safe_transaction_id,
                admin_notes,
            } => {
                let id = parse_id(&safe_transaction_id)?;
                self.workflow
                    .process_settlement(id, admin_notes)
                    .await
                    .map_err(|e| sanitize(e, "Settlement processing failed"))?;
                Ok(json!({ "success": true, "message": "Settlement complete." }))
            }
            AdminAction::UpdateNotes {
                safe_transaction_id,
                admin_notes,
            } => {
                let id = parse_id(&safe_transaction_id)?;
                self.workflow
                    .update_notes(id, admin_notes)
                    .await
                    .map_err(|e| sanitize(e, "Notes update failed"))?;
                Ok(json!({ "success": true, "message": "Notes updated." }))
            }
            AdminAction::GetStats => {
                let stats = self.queries.stats().await?;
                Ok(serde_json::to_value(stats)?)
            }
            AdminAction::GetList {
                status,
                limit,
                offset,
            } => {
                let status = status.map(|s| parse_status(&s)).transpose()?;
                let limit = limit.unwrap_or(self.default_list_limit);
                let offset = offset.unwrap_or(0);
                let listings = self.queries.list(status, limit, offset).await?;
                Ok(json!({ "data": listings }))
            }
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| EscrowError::Validation(format!("invalid safe transaction id: {raw}")))
}

fn parse_status(raw: &str) -> Result<SettlementStatus> {
    raw.parse().map_err(EscrowError::Validation)
}

/// Replace store-level failure detail with a per-action message; callers
/// get a stable human string, the real cause goes to the log.
fn sanitize(err: EscrowError, message: &str) -> EscrowError {
    match err {
        EscrowError::Dependency(detail) | EscrowError::Internal(detail) => {
            error!(%detail, "escrow mutation failed");
            EscrowError::Dependency(message.to_string())
        }
        other => other,
    }
}

fn status_for(err: &EscrowError) -> StatusCode {
    match err {
        EscrowError::Unauthenticated => StatusCode::UNAUTHORIZED,
        EscrowError::Forbidden => StatusCode::FORBIDDEN,
        EscrowError::NotFound(_) => StatusCode::NOT_FOUND,
        EscrowError::Validation(_) => StatusCode::BAD_REQUEST,
        EscrowError::Dependency(_) => StatusCode::BAD_GATEWAY,
        EscrowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(
        value
            .strip_prefix("Bearer ")
            .unwrap_or(value)
            .trim()
            .to_string(),
    )
}

async fn dispatch(
    State(api): State<Arc<AdminApi>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let token = bearer_token(&headers);

    let action: AdminAction = match serde_json::from_value(body) {
        Ok(action) => action,
        Err(err) => {
            let err = EscrowError::Validation(err.to_string());
            return (status_for(&err), Json(json!({ "error": err.to_string() })));
        }
    };

    match api.handle(token.as_deref(), action).await {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(err) => (status_for(&err), Json(json!({ "error": err.to_string() }))),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Build the admin router
pub fn router(api: Arc<AdminApi>) -> Router {
    // CORS layer to allow the admin dashboard from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    Router::new()
        .route("/health", get(health))
        .route("/admin/safe-transactions", post(dispatch))
        .layer(cors)
        .with_state(api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use safetrade_common::{Contact, EscrowParties, EscrowRecord};

    use crate::auth::{Role, StaticTokenResolver, UserAccount};
    use std::collections::HashMap;
    use crate::domain::notification::NotificationDispatcher;
    use crate::infra::store::{EscrowStore, InMemoryStore, OwningTransaction};
    use crate::infra::transport::RecordingTransport;

    struct Fixture {
        api: AdminApi,
        store: Arc<InMemoryStore>,
        record: EscrowRecord,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), transport));

        let transaction = OwningTransaction::new(
            "Vintage camera",
            EscrowParties {
                buyer: Contact::new("Buyer Kim", Some("010-1111-2222".to_string())),
                seller: Contact::new("Seller Lee", Some("010-3333-4444".to_string())),
                reseller: None,
            },
        );
        let record = EscrowRecord::new(transaction.id, dec!(1_200_000));
        store.insert_transaction(transaction);
        store.insert_record(record.clone());

        let mut accounts = HashMap::new();
        accounts.insert(
            "admin-token".to_string(),
            UserAccount {
                id: Uuid::now_v7(),
                name: "operator-1".to_string(),
                role: Role::Admin,
            },
        );
        accounts.insert(
            "member-token".to_string(),
            UserAccount {
                id: Uuid::now_v7(),
                name: "shopper".to_string(),
                role: Role::Member,
            },
        );
        let gate = AuthorizationGate::new(Arc::new(StaticTokenResolver::new(accounts)));
        let workflow = EscrowWorkflow::new(store.clone(), dispatcher);
        let queries = QueryService::new(store.clone());

        Fixture {
            api: AdminApi::new(gate, workflow, queries, 50),
            store,
            record,
        }
    }

    fn confirm_deposit_action(id: &str) -> AdminAction {
        serde_json::from_value(json!({
            "action": "confirm_deposit",
            "safeTransactionId": id,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_mutation_response_shape() {
        let f = fixture();
        let response = f
            .api
            .handle(
                Some("admin-token"),
                confirm_deposit_action(&f.record.id.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(response["success"], json!(true));
        assert_eq!(response["message"], json!("Deposit confirmed."));
    }

    #[tokio::test]
    async fn test_missing_token_rejected_before_any_write() {
        let f = fixture();
        let before = f.store.get(f.record.id).await.unwrap().updated_at;

        let err = f
            .api
            .handle(None, confirm_deposit_action(&f.record.id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::Unauthenticated));

        let after = f.store.get(f.record.id).await.unwrap();
        assert_eq!(after.updated_at, before);
        assert!(!after.deposit_confirmed);
    }

    #[tokio::test]
    async fn test_member_token_forbidden_and_record_untouched() {
        let f = fixture();
        let before = f.store.get(f.record.id).await.unwrap().updated_at;

        let err = f
            .api
            .handle(
                Some("member-token"),
                confirm_deposit_action(&f.record.id.to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::Forbidden));

        let after = f.store.get(f.record.id).await.unwrap();
        assert_eq!(after.updated_at, before);
        assert!(!after.deposit_confirmed);
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let f = fixture();
        let err = f
            .api
            .handle(
                Some("not-a-token"),
                confirm_deposit_action(&f.record.id.to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_malformed_id_is_validation_failure() {
        let f = fixture();
        let err = f
            .api
            .handle(Some("admin-token"), confirm_deposit_action("not-a-uuid"))
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_record_is_not_found() {
        let f = fixture();
        let err = f
            .api
            .handle(
                Some("admin-token"),
                confirm_deposit_action(&Uuid::now_v7().to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_stats_is_flat_object() {
        let f = fixture();
        let response = f
            .api
            .handle(Some("admin-token"), AdminAction::GetStats)
            .await
            .unwrap();

        assert_eq!(response["totalCount"], json!(1));
        assert_eq!(response["waitingDepositCount"], json!(1));
        assert_eq!(response["completedCount"], json!(0));
    }

    #[tokio::test]
    async fn test_get_list_wraps_data_and_uses_default_limit() {
        let f = fixture();
        let response = f
            .api
            .handle(
                Some("admin-token"),
                AdminAction::GetList {
                    status: None,
                    limit: None,
                    offset: None,
                },
            )
            .await
            .unwrap();

        let data = response["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["productTitle"], json!("Vintage camera"));
        assert_eq!(data[0]["currentStep"], json!("AwaitingDeposit"));
        assert_eq!(data[0]["progress"], json!(0.0));
    }

    #[tokio::test]
    async fn test_get_list_rejects_unknown_status() {
        let f = fixture();
        let err = f
            .api
            .handle(
                Some("admin-token"),
                AdminAction::GetList {
                    status: Some("paid".to_string()),
                    limit: None,
                    offset: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_status_codes() {
        assert_eq!(
            status_for(&EscrowError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&EscrowError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&EscrowError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&EscrowError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&EscrowError::Dependency("x".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(header::AUTHORIZATION, "abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
