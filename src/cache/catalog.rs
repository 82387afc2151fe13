use std::sync::Arc;

use moka::future::Cache;

use crate::{database::models::Product, utils::config::CacheConfig};

#[derive(Clone)]
pub struct CatalogCache {
  pub inner: Cache<i64, Arc<Product>>,
}

impl CatalogCache {
  pub fn new(config: CacheConfig) -> Self {
    Self {
      inner: Cache::builder().max_capacity(config.max_size).time_to_live(config.time_to_live).build(),
    }
  }

  pub fn get(&self, product_id: i64) -> Option<Arc<Product>> {
    self.inner.get(&product_id)
  }

  pub async fn insert(&self, doc: Product) -> Arc<Product> {
    debug!("insert product - {} ({})", doc.product_id, doc.slug);
    let value = Arc::new(doc);
    self.inner.insert(value.product_id, value.clone()).await;
    return value;
  }

  pub async fn delete(&self, product_id: i64) {
    self.inner.invalidate(&product_id).await
  }
}
