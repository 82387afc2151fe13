use api::ApiServer;
use cache::{catalog::CatalogCache, geo::GeoCache};
use database::{
  account_manager::AccountManager, catalog_manager::CatalogManager, event_manager::DBEventManager, geo_manager::GeoManager,
  initialize_client, ledger_manager::LedgerManager,
};
use issuer::Issuer;
use utils::config::{load_config, parse_args};

#[macro_use]
extern crate log;

mod api;
mod cache;
mod database;
mod issuer;
mod utils;

#[tokio::main]
async fn main() {
  let config_path = parse_args().expect("Missing required option c (config)");
  let config = load_config(config_path).expect("Error parsing config.toml file");
  log4rs::init_file(config.log4rs.location, Default::default()).expect("Failed to initialize log4rs");

  let client = initialize_client(config.mongodb.uri).await.expect("Failed to initialize MongoDB Client");

  let catalog_cache = CatalogCache::new(config.cache.catalog);
  let geo_cache = GeoCache::new(config.cache.geo);

  let account_manager = AccountManager::new(&client, &config.mongodb.database).await;
  let catalog_manager = CatalogManager::new(&client, &config.mongodb.database, catalog_cache.clone()).await;
  let geo_manager = GeoManager::new(&client, &config.mongodb.database, geo_cache.clone()).await;
  let ledger_manager = LedgerManager::new(&client, &config.mongodb.database).await;
  let event_manager = DBEventManager::new(&client, &config.mongodb.database, catalog_cache.clone(), geo_cache.clone()).await;

  let issuer = Issuer::new(catalog_manager.clone(), ledger_manager, config.issuer.clone());
  let api_server = ApiServer::new(config.api, config.issuer, account_manager, catalog_manager, geo_manager, issuer);

  tokio::join!(event_manager.monitor(), api_server.listen(),);
}
