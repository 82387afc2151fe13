use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenerateError {
  #[error("invalid {field}: {message}")]
  Validation { field: &'static str, message: String },
  #[error("product not found or inactive")]
  NotFound,
  // Designed branch, not a fault: carries what the client needs to offer
  // a pay-and-generate path instead of a dead end.
  #[error("insufficient balance for product {product_id}. Cost = {total_cost}")]
  InsufficientBalance { product_id: i64, total_cost: i64 },
  #[error("ledger operation failed")]
  Ledger,
}

impl GenerateError {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    GenerateError::Validation {
      field,
      message: message.into(),
    }
  }
}
