use std::sync::Arc;

use moka::future::Cache;

use crate::{database::models::GeoSetting, utils::config::CacheConfig};

#[derive(Clone)]
pub struct GeoCache {
  pub inner: Cache<String, Arc<String>>,
}

impl GeoCache {
  pub fn new(config: CacheConfig) -> Self {
    Self {
      inner: Cache::builder().max_capacity(config.max_size).time_to_live(config.time_to_live).build(),
    }
  }

  pub fn get(&self, code: &str) -> Option<Arc<String>> {
    self.inner.get(code)
  }

  pub async fn insert(&self, doc: GeoSetting) -> Arc<String> {
    debug!("insert geo setting - {} = {}", doc.code, doc.name);
    let value = Arc::new(doc.name);
    self.inner.insert(doc.code, value.clone()).await;
    return value;
  }

  pub async fn delete(&self, code: &str) {
    self.inner.invalidate(code).await
  }
}
