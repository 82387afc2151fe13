use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::catalog_manager::CatalogManager;
use crate::database::ledger_manager::LedgerManager;
use crate::database::models::{Account, Product};
use crate::utils::config::IssuerConfig;

use self::error::GenerateError;
use self::request::{GenerationRequest, SessionType};
use self::username::{encode_username, random_token, SessionParams};

pub mod error;
pub mod export;
pub mod request;
pub mod username;

const CORRELATION_ID_LEN: usize = 16;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyCredential {
  pub host: String,
  pub port: u16,
  pub username: String,
  pub password: String,
  pub country: Option<String>,
  pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Batch {
  pub correlation_id: String,
  pub total_cost: i64,
  pub balance_after: i64,
  pub proxies: Vec<ProxyCredential>,
}

#[derive(Clone)]
pub struct Issuer {
  catalog: CatalogManager,
  ledger: LedgerManager,
  config: IssuerConfig,
}

impl Issuer {
  pub fn new(catalog: CatalogManager, ledger: LedgerManager, config: IssuerConfig) -> Self {
    Self { catalog, ledger, config }
  }

  pub async fn generate(&self, request: &GenerationRequest, account: &Account) -> Result<Batch, GenerateError> {
    let product = self.catalog.get_or_fetch_and_insert(request.product_id).await.ok_or(GenerateError::NotFound)?;
    if !product.active {
      return Err(GenerateError::NotFound);
    }
    if product.gateway.is_empty() {
      warn!("product {} has an empty gateway pool", product.product_id);
      return Err(GenerateError::NotFound);
    }

    if let Some(code) = &request.country {
      if !product.countries.contains_key(code) {
        return Err(GenerateError::validation("country", format!("not available for product {}", product.slug)));
      }
    }

    let total_cost = total_cost(request.quantity, product.price_per_unit);

    // Single conditional update on the accounts collection; either the whole
    // batch is paid for or nothing happened.
    let balance_after = match self.ledger.debit_if_sufficient(&account.account_id, total_cost).await {
      Ok(Some(balance)) => balance,
      Ok(None) => {
        return Err(GenerateError::InsufficientBalance {
          product_id: product.product_id,
          total_cost,
        })
      }
      Err(e) => {
        warn!("debit failed for account {}. Err = {:?}", account.account_id, e);
        return Err(GenerateError::Ledger);
      }
    };

    let correlation_id = random_token(CORRELATION_ID_LEN);
    let expires_at = credential_expiry(self.config.credential_validity);
    let proxies = synthesize(&product, request, account, expires_at);

    // The debit already went through; an unrecorded debit would orphan the
    // ledger, so the entry insert gets one retry before surfacing.
    if let Err(e) = self.record_entry(account, &product, request, total_cost, balance_after, &correlation_id).await {
      warn!("ledger entry insert failed, retrying once. Err = {:?}", e);
      if let Err(e) = self.record_entry(account, &product, request, total_cost, balance_after, &correlation_id).await {
        error!("ledger entry insert failed after retry (correlation {}). Err = {:?}", correlation_id, e);
        return Err(GenerateError::Ledger);
      }
    }

    info!(
      "issued {} credentials to account {} (product {}, correlation {})",
      proxies.len(),
      account.account_id,
      product.product_id,
      correlation_id
    );

    Ok(Batch {
      correlation_id,
      total_cost,
      balance_after,
      proxies,
    })
  }

  async fn record_entry(
    &self,
    account: &Account,
    product: &Arc<Product>,
    request: &GenerationRequest,
    total_cost: i64,
    balance_after: i64,
    correlation_id: &str,
  ) -> Result<(), mongodb::error::Error> {
    self
      .ledger
      .record_debit(&account.account_id, total_cost, balance_after, product.product_id, request.quantity, correlation_id)
      .await
  }
}

pub fn total_cost(quantity: u32, price_per_unit: i64) -> i64 {
  quantity as i64 * price_per_unit
}

fn credential_expiry(validity: std::time::Duration) -> DateTime<Utc> {
  let window = chrono::Duration::from_std(validity).unwrap_or_else(|_| chrono::Duration::days(30));
  Utc::now() + window
}

// Pure credential synthesis; the gateway pool is cycled by index so the
// discriminator between credentials is the username encoding, never the
// endpoint. Callers have already verified the pool is non-empty.
pub fn synthesize(product: &Product, request: &GenerationRequest, account: &Account, expires_at: DateTime<Utc>) -> Vec<ProxyCredential> {
  let shared_session = match (request.session_type, product.shared_session) {
    (SessionType::Sticky, true) => Some(SessionParams::new(product.max_sticky_minutes)),
    _ => None,
  };

  let mut proxies: Vec<ProxyCredential> = Vec::with_capacity(request.quantity as usize);
  for i in 0..request.quantity as usize {
    let gateway = &product.gateway[i % product.gateway.len()];

    let session = match request.session_type {
      SessionType::Rotating => None,
      SessionType::Sticky => Some(shared_session.clone().unwrap_or_else(|| SessionParams::new(product.max_sticky_minutes))),
    };

    let username = encode_username(&account.proxy_username, request.country.as_deref(), request.city.as_deref(), session.as_ref());

    proxies.push(ProxyCredential {
      host: gateway.host.clone(),
      port: gateway.port,
      username,
      password: account.proxy_password.clone(),
      country: request.country.clone(),
      expires_at,
    });
  }

  proxies
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use mongodb::bson::oid::ObjectId;

  use super::request::{GenerationRequest, SessionType};
  use super::*;
  use crate::database::models::GatewayEntry;

  fn product(shared_session: bool) -> Product {
    let mut countries = HashMap::new();
    countries.insert(String::from("us"), String::from("United States"));
    countries.insert(String::from("de"), String::from("Germany"));
    Product {
      _id: ObjectId::new(),
      product_id: 7,
      name: String::from("Residential"),
      slug: String::from("residential"),
      active: true,
      price_per_unit: 10,
      unit: String::from("GB"),
      gateway: vec![
        GatewayEntry {
          host: String::from("gw1.keymint.io"),
          port: 8000,
        },
        GatewayEntry {
          host: String::from("gw2.keymint.io"),
          port: 8000,
        },
      ],
      countries,
      max_sticky_minutes: 30,
      shared_session,
    }
  }

  fn account() -> Account {
    Account {
      _id: ObjectId::new(),
      account_id: String::from("acc_1"),
      email: String::from("user@example.com"),
      balance: 100,
      proxy_username: String::from("km_user"),
      proxy_password: String::from("s3cret"),
      api_key: String::from("km_key"),
      active: true,
    }
  }

  fn request(quantity: u32, session_type: SessionType) -> GenerationRequest {
    GenerationRequest {
      product_id: 7,
      quantity,
      country: Some(String::from("us")),
      city: None,
      session_type,
    }
  }

  #[test]
  fn batch_size_matches_quantity() {
    let proxies = synthesize(&product(false), &request(5, SessionType::Rotating), &account(), Utc::now());
    assert_eq!(proxies.len(), 5);
  }

  #[test]
  fn gateway_pool_is_cycled_in_order() {
    let proxies = synthesize(&product(false), &request(5, SessionType::Rotating), &account(), Utc::now());
    let hosts: Vec<&str> = proxies.iter().map(|p| p.host.as_str()).collect();
    assert_eq!(hosts, vec!["gw1.keymint.io", "gw2.keymint.io", "gw1.keymint.io", "gw2.keymint.io", "gw1.keymint.io"]);
  }

  #[test]
  fn rotating_usernames_carry_no_session_segment() {
    let proxies = synthesize(&product(false), &request(3, SessionType::Rotating), &account(), Utc::now());
    for proxy in &proxies {
      assert!(!proxy.username.contains("session_"));
      assert!(!proxy.username.contains("lifetime_"));
      assert!(proxy.username.contains("country_us"));
    }
  }

  #[test]
  fn sticky_usernames_carry_one_session_and_lifetime_segment() {
    let proxies = synthesize(&product(false), &request(3, SessionType::Sticky), &account(), Utc::now());
    for proxy in &proxies {
      assert_eq!(proxy.username.matches("session_").count(), 1);
      assert_eq!(proxy.username.matches("lifetime_").count(), 1);
      assert!(proxy.username.ends_with("-lifetime_30"));
    }
  }

  #[test]
  fn shared_session_products_reuse_one_session_id() {
    let proxies = synthesize(&product(true), &request(4, SessionType::Sticky), &account(), Utc::now());
    let first = &proxies[0].username;
    assert!(proxies.iter().all(|p| &p.username == first));
  }

  #[test]
  fn independent_session_products_get_distinct_session_ids() {
    let proxies = synthesize(&product(false), &request(4, SessionType::Sticky), &account(), Utc::now());
    let usernames: std::collections::HashSet<&String> = proxies.iter().map(|p| &p.username).collect();
    assert_eq!(usernames.len(), 4);
  }

  #[test]
  fn credentials_use_the_account_proxy_password() {
    let proxies = synthesize(&product(false), &request(2, SessionType::Rotating), &account(), Utc::now());
    assert!(proxies.iter().all(|p| p.password == "s3cret"));
    assert!(proxies.iter().all(|p| p.username.starts_with("km_user")));
  }

  #[test]
  fn total_cost_multiplies_quantity_by_unit_price() {
    assert_eq!(total_cost(3, 10), 30);
    assert_eq!(total_cost(1000, 99), 99000);
  }
}
