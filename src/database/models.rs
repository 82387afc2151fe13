use std::collections::HashMap;

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
  pub _id: ObjectId,
  pub product_id: i64,
  pub name: String,
  pub slug: String,
  pub active: bool,
  pub price_per_unit: i64,
  pub unit: String,
  pub gateway: Vec<GatewayEntry>,
  pub countries: HashMap<String, String>,
  pub max_sticky_minutes: u32,
  pub shared_session: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayEntry {
  pub host: String,
  pub port: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
  pub _id: ObjectId,
  pub account_id: String,
  pub email: String,
  pub balance: i64,
  pub proxy_username: String,
  pub proxy_password: String,
  pub api_key: String,
  pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub _id: ObjectId,
  pub account_id: String,
  pub amount: i64,
  pub balance_after: i64,
  pub reason: String,
  pub product_id: i64,
  pub quantity: u32,
  pub correlation_id: String,
  pub created_at: DateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoSetting {
  pub code: String,
  pub name: String,
}
