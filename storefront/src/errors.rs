// storefront/src/errors.rs

use crate::models::OrderStatus;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use storefront_flow::FlowError;
use thiserror::Error;
use uuid::Uuid;

/// Every way a storefront operation can fail.
///
/// Variants up to `AlreadyProcessed` are business rejections the caller can act on.
/// `PartialOrderCreationFailure`, `StoreUnavailable`, `Config` and `Workflow` are
/// incidents: they need an operator, not a different request.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Not authenticated")]
  NotAuthenticated,

  #[error("Product not found")]
  ProductNotFound,

  #[error("Product is no longer on sale")]
  ProductInactive,

  #[error("Insufficient stock (available: {available})")]
  InsufficientStock { available: i32 },

  #[error("Quantity must be at least 1")]
  InvalidQuantity,

  #[error("Cart item not found")]
  NotFound,

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Order not found")]
  OrderNotFound,

  #[error("Paid amount {paid} does not match order total {expected}")]
  AmountMismatch { expected: i64, paid: i64 },

  #[error("Order already processed (status: {status})")]
  AlreadyProcessed { status: OrderStatus },

  #[error("Order {order_id} was left without items and could not be removed: {source}")]
  PartialOrderCreationFailure {
    order_id: Uuid,
    #[source]
    source: anyhow::Error,
  },

  #[error("Store unavailable: {source}")]
  StoreUnavailable {
    #[source]
    source: anyhow::Error,
  },

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },
}

impl AppError {
  pub fn store(source: impl Into<anyhow::Error>) -> Self {
    AppError::StoreUnavailable { source: source.into() }
  }

  pub fn is_incident(&self) -> bool {
    matches!(
      self,
      AppError::PartialOrderCreationFailure { .. }
        | AppError::StoreUnavailable { .. }
        | AppError::Config(_)
        | AppError::Workflow { .. }
    )
  }

  /// Stable machine-readable kind, used as the `code` of error responses.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::NotAuthenticated => "not_authenticated",
      AppError::ProductNotFound => "product_not_found",
      AppError::ProductInactive => "product_inactive",
      AppError::InsufficientStock { .. } => "insufficient_stock",
      AppError::InvalidQuantity => "invalid_quantity",
      AppError::NotFound => "not_found",
      AppError::EmptyCart => "empty_cart",
      AppError::OrderNotFound => "order_not_found",
      AppError::AmountMismatch { .. } => "amount_mismatch",
      AppError::AlreadyProcessed { .. } => "already_processed",
      AppError::PartialOrderCreationFailure { .. } => "partial_order_creation_failure",
      AppError::StoreUnavailable { .. } => "store_unavailable",
      AppError::Validation(_) => "validation",
      AppError::Config(_) => "config",
      AppError::Workflow { .. } => "workflow",
    }
  }

  /// The reason shown to the shopper.
  pub fn user_message(&self) -> String {
    match self {
      AppError::NotAuthenticated => "로그인이 필요합니다.".to_string(),
      AppError::ProductNotFound => "상품을 찾을 수 없습니다.".to_string(),
      AppError::ProductInactive => "판매 중지된 상품입니다.".to_string(),
      AppError::InsufficientStock { available } => format!("재고가 부족합니다. (현재 재고: {}개)", available),
      AppError::InvalidQuantity => "수량은 1개 이상이어야 합니다.".to_string(),
      AppError::NotFound => "장바구니 아이템을 찾을 수 없습니다.".to_string(),
      AppError::EmptyCart => "장바구니가 비어있습니다.".to_string(),
      AppError::OrderNotFound => "주문을 찾을 수 없습니다.".to_string(),
      AppError::AmountMismatch { .. } => "결제 금액이 일치하지 않습니다.".to_string(),
      AppError::AlreadyProcessed { status } => format!("이미 처리된 주문입니다. (상태: {})", status.label()),
      AppError::PartialOrderCreationFailure { .. } => "주문 아이템 생성에 실패했습니다.".to_string(),
      AppError::Validation(m) => m.clone(),
      AppError::StoreUnavailable { .. } | AppError::Config(_) | AppError::Workflow { .. } => {
        "오류가 발생했습니다.".to_string()
      }
    }
  }
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    AppError::StoreUnavailable { source: err.into() }
  }
}

// An anyhow error that already carries an AppError keeps its variant.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => AppError::StoreUnavailable { source: err },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
      AppError::ProductNotFound | AppError::NotFound | AppError::OrderNotFound => StatusCode::NOT_FOUND,
      AppError::ProductInactive | AppError::InsufficientStock { .. } | AppError::AlreadyProcessed { .. } => {
        StatusCode::CONFLICT
      }
      AppError::EmptyCart | AppError::AmountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::InvalidQuantity | AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::PartialOrderCreationFailure { .. }
      | AppError::StoreUnavailable { .. }
      | AppError::Config(_)
      | AppError::Workflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    if self.is_incident() {
      tracing::error!(application_error = %self, code = self.code(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = self.code(), "Request rejected");
    }
    HttpResponse::build(self.status_code()).json(json!({
      "error": self.user_message(),
      "code": self.code(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
