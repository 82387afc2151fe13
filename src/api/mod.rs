use std::net::SocketAddr;

use crate::database::account_manager::AccountManager;
use crate::database::catalog_manager::CatalogManager;
use crate::database::geo_manager::GeoManager;
use crate::issuer::Issuer;
use crate::utils::config::{ApiConfig, IssuerConfig};
use crate::utils::socket::make_listener;

use self::handler::ApiHandler;

mod handler;
mod parser;
mod utils;

#[derive(Clone)]
pub struct ApiServer {
  listen_addr: SocketAddr,
  backlog: u32,
  account_manager: AccountManager,
  catalog_manager: CatalogManager,
  geo_manager: GeoManager,
  issuer: Issuer,
  issuer_config: IssuerConfig,
}

impl ApiServer {
  pub fn new(
    config: ApiConfig,
    issuer_config: IssuerConfig,
    account_manager: AccountManager,
    catalog_manager: CatalogManager,
    geo_manager: GeoManager,
    issuer: Issuer,
  ) -> Self {
    Self {
      listen_addr: SocketAddr::from((config.listen, config.port)),
      backlog: config.backlog,
      account_manager,
      catalog_manager,
      geo_manager,
      issuer,
      issuer_config,
    }
  }

  pub async fn listen(&self) {
    let listener = match make_listener(self.listen_addr, self.backlog).await {
      Ok(l) => l,
      Err(e) => {
        return error!("Failed to initialize ApiServer listener. Err = {:?}", e);
      }
    };

    info!("API listening on {}", self.listen_addr);

    while let Ok((mut stream, _)) = listener.accept().await {
      let account_manager = self.account_manager.clone();
      let catalog_manager = self.catalog_manager.clone();
      let geo_manager = self.geo_manager.clone();
      let issuer = self.issuer.clone();
      let issuer_config = self.issuer_config.clone();

      tokio::spawn(async move {
        ApiHandler::new(&mut stream, account_manager, catalog_manager, geo_manager, issuer, issuer_config)
          .execute()
          .await;
      });
    }
  }
}
