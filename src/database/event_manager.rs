use mongodb::{
  change_stream::event::OperationType,
  options::{ChangeStreamOptions, FullDocumentBeforeChangeType, FullDocumentType},
};
use tokio_stream::StreamExt;

use crate::cache::{catalog::CatalogCache, geo::GeoCache};

use super::models::{GeoSetting, Product};

pub struct DBEventManager {
  catalog_cache: CatalogCache,
  geo_cache: GeoCache,
  products: mongodb::Collection<Product>,
  geo_settings: mongodb::Collection<GeoSetting>,
}

impl DBEventManager {
  pub async fn new(client: &mongodb::Client, database: &str, catalog_cache: CatalogCache, geo_cache: GeoCache) -> Self {
    let db = client.database(database);
    Self {
      catalog_cache,
      geo_cache,
      products: db.collection("products"),
      geo_settings: db.collection("geo_settings"),
    }
  }

  pub async fn monitor(&self) {
    info!("Started MongoDB EventManager");
    tokio::join!(self.monitor_products(), self.monitor_geo_settings(),);
  }

  async fn monitor_products(&self) {
    let cs_opts = ChangeStreamOptions::builder()
      .full_document(Some(FullDocumentType::UpdateLookup))
      .full_document_before_change(Some(FullDocumentBeforeChangeType::WhenAvailable))
      .build();

    let mut change_stream = self.products.watch(None, cs_opts).await.unwrap();
    while let Some(event) = change_stream.next().await.transpose().unwrap() {
      match event.operation_type {
        OperationType::Update | OperationType::Insert => self.handle_product_upsert(event.full_document).await,
        OperationType::Delete => self.handle_product_delete(event.full_document_before_change).await,
        _ => (),
      }
    }
  }

  async fn monitor_geo_settings(&self) {
    let cs_opts = ChangeStreamOptions::builder()
      .full_document(Some(FullDocumentType::UpdateLookup))
      .full_document_before_change(Some(FullDocumentBeforeChangeType::WhenAvailable))
      .build();

    let mut change_stream = self.geo_settings.watch(None, cs_opts).await.unwrap();
    while let Some(event) = change_stream.next().await.transpose().unwrap() {
      match event.operation_type {
        OperationType::Update | OperationType::Insert => self.handle_geo_upsert(event.full_document).await,
        OperationType::Delete => self.handle_geo_delete(event.full_document_before_change).await,
        _ => (),
      }
    }
  }

  async fn handle_product_upsert(&self, doc: Option<Product>) {
    if let Some(doc) = doc {
      debug!("handle_product_upsert called on product {}", doc.product_id);
      self.catalog_cache.insert(doc).await;
    } else {
      debug!("handle_product_upsert called on None");
    }
  }

  async fn handle_product_delete(&self, doc: Option<Product>) {
    if let Some(doc) = doc {
      debug!("handle_product_delete called on product {}", doc.product_id);
      self.catalog_cache.delete(doc.product_id).await;
    } else {
      debug!("handle_product_delete called on None");
    }
  }

  async fn handle_geo_upsert(&self, doc: Option<GeoSetting>) {
    if let Some(doc) = doc {
      debug!("handle_geo_upsert called on code {}", doc.code);
      self.geo_cache.insert(doc).await;
    } else {
      debug!("handle_geo_upsert called on None");
    }
  }

  async fn handle_geo_delete(&self, doc: Option<GeoSetting>) {
    if let Some(doc) = doc {
      debug!("handle_geo_delete called on code {}", doc.code);
      self.geo_cache.delete(&doc.code).await;
    } else {
      debug!("handle_geo_delete called on None");
    }
  }
}
