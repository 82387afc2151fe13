use std::time::Duration;

use http::StatusCode;
use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

use crate::database::account_manager::AccountManager;
use crate::database::catalog_manager::CatalogManager;
use crate::database::geo_manager::GeoManager;
use crate::database::models::Account;
use crate::issuer::error::GenerateError;
use crate::issuer::export::{export, ExportFormat};
use crate::issuer::request::{GenerateBody, GenerationRequest};
use crate::issuer::Issuer;
use crate::utils;
use crate::utils::config::IssuerConfig;

use super::parser::{ApiParser, ApiRequest};
use super::utils::response::ApiResponse;

pub struct ApiHandler<'a> {
  stream: &'a mut TcpStream,
  account_manager: AccountManager,
  catalog_manager: CatalogManager,
  geo_manager: GeoManager,
  issuer: Issuer,
  issuer_config: IssuerConfig,
}

impl<'a> ApiHandler<'a> {
  const MAX_TIMEOUT: Duration = Duration::from_secs(10);

  pub fn new(
    stream: &'a mut TcpStream,
    account_manager: AccountManager,
    catalog_manager: CatalogManager,
    geo_manager: GeoManager,
    issuer: Issuer,
    issuer_config: IssuerConfig,
  ) -> ApiHandler<'a> {
    ApiHandler {
      stream,
      account_manager,
      catalog_manager,
      geo_manager,
      issuer,
      issuer_config,
    }
  }

  pub async fn execute(&mut self) {
    let request = match ApiParser::new(self.stream).read().await {
      Ok(r) => r,
      Err(e) => {
        warn!("{}", e);
        return self.reply(ApiResponse::error(StatusCode::BAD_REQUEST, "malformed request")).await;
      }
    };

    let account = match self.handle_authentication(&request.authorization).await {
      Some(a) => a,
      None => return self.reply(ApiResponse::error(StatusCode::UNAUTHORIZED, "invalid api key")).await,
    };

    let response = match (request.method.as_str(), request.path.as_str()) {
      ("POST", "/proxies/generate") => self.handle_generate(&request, &account).await,
      ("GET", "/products") => self.handle_products().await,
      ("GET", "/countries") => self.handle_countries(&request).await,
      _ => ApiResponse::error(StatusCode::NOT_FOUND, "no such endpoint"),
    };

    self.reply(response).await
  }

  async fn handle_authentication(&self, authorization: &Option<String>) -> Option<Account> {
    let header = authorization.as_deref()?;
    let api_key = utils::auth::extract_api_key(header)?;
    self.account_manager.find_by_api_key(&api_key).await
  }

  async fn handle_generate(&self, request: &ApiRequest, account: &Account) -> ApiResponse {
    let format = match request.query.get("format") {
      None => ExportFormat::Json,
      Some(raw) => match ExportFormat::parse(raw) {
        Some(f) => f,
        None => return ApiResponse::field_error(StatusCode::UNPROCESSABLE_ENTITY, "format", "must be txt, csv or json"),
      },
    };

    let body: GenerateBody = match serde_json::from_slice(&request.body) {
      Ok(b) => b,
      Err(e) => {
        debug!("rejected generate body. Err = {}", e);
        return ApiResponse::error(StatusCode::BAD_REQUEST, "body must be a valid generate request");
      }
    };

    let generation = match GenerationRequest::from_body(body, self.issuer_config.max_batch) {
      Ok(g) => g,
      Err(e) => return generate_error_response(e),
    };

    match self.issuer.generate(&generation, account).await {
      Ok(batch) => match format {
        ExportFormat::Json => ApiResponse::json(StatusCode::OK, serde_json::to_string(&batch).unwrap_or_else(|_| String::from("{}"))),
        _ => ApiResponse::text(StatusCode::OK, format.content_type(), export(&batch.proxies, format)),
      },
      Err(e) => generate_error_response(e),
    }
  }

  async fn handle_products(&self) -> ApiResponse {
    let products = self.catalog_manager.list_active().await;
    let summaries: Vec<serde_json::Value> = products
      .iter()
      .map(|p| {
        let mut codes: Vec<&String> = p.countries.keys().collect();
        codes.sort();
        serde_json::json!({
          "product_id": p.product_id,
          "name": p.name,
          "slug": p.slug,
          "price_per_unit": p.price_per_unit,
          "unit": p.unit,
          "countries": codes,
        })
      })
      .collect();
    ApiResponse::json(StatusCode::OK, serde_json::json!({ "products": summaries }).to_string())
  }

  async fn handle_countries(&self, request: &ApiRequest) -> ApiResponse {
    let product_id: i64 = match request.query.get("product_id").and_then(|raw| raw.parse().ok()) {
      Some(id) => id,
      None => return ApiResponse::field_error(StatusCode::UNPROCESSABLE_ENTITY, "product_id", "must be an integer"),
    };

    let product = match self.catalog_manager.get_or_fetch_and_insert(product_id).await {
      Some(p) if p.active => p,
      _ => return ApiResponse::error(StatusCode::NOT_FOUND, "product not found"),
    };

    // Product documents carry a fallback name per code; geo_settings wins when
    // a display name is configured there.
    let mut codes: Vec<(&String, &String)> = product.countries.iter().collect();
    codes.sort();

    let mut countries = serde_json::Map::new();
    for (code, fallback) in codes {
      let name = match self.geo_manager.display_name(code).await {
        Some(name) => name.as_ref().clone(),
        None => fallback.clone(),
      };
      countries.insert(code.clone(), serde_json::Value::String(name));
    }

    ApiResponse::json(StatusCode::OK, serde_json::json!({ "countries": countries }).to_string())
  }

  async fn reply(&mut self, response: ApiResponse) {
    match timeout(ApiHandler::MAX_TIMEOUT, self.stream.write_all(&response.to_bytes())).await {
      Ok(r) => {
        if let Err(e) = r {
          return warn!("stream write error. Err = {:?}", e);
        }
      }
      Err(_) => return warn!("stream write timeout"),
    }
  }
}

fn generate_error_response(error: GenerateError) -> ApiResponse {
  match error {
    GenerateError::Validation { field, message } => ApiResponse::field_error(StatusCode::UNPROCESSABLE_ENTITY, field, &message),
    GenerateError::NotFound => ApiResponse::error(StatusCode::NOT_FOUND, "product not found"),
    GenerateError::InsufficientBalance { product_id, total_cost } => ApiResponse::json(
      StatusCode::PAYMENT_REQUIRED,
      serde_json::json!({
        "can_direct_purchase": true,
        "product_id": product_id,
        "total_cost": total_cost,
      })
      .to_string(),
    ),
    GenerateError::Ledger => ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "ledger unavailable"),
  }
}
