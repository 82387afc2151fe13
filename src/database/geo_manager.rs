use std::sync::Arc;

use mongodb::bson::doc;

use crate::cache::geo::GeoCache;

use super::models::GeoSetting;

#[derive(Clone)]
pub struct GeoManager {
  cache: GeoCache,
  geo_settings: mongodb::Collection<GeoSetting>,
}

impl GeoManager {
  pub async fn new(client: &mongodb::Client, database: &str, cache: GeoCache) -> Self {
    let db = client.database(database);
    Self {
      cache,
      geo_settings: db.collection("geo_settings"),
    }
  }

  pub async fn display_name(&self, code: &str) -> Option<Arc<String>> {
    if let Some(name) = self.cache.get(code) {
      return Some(name);
    }

    let setting = match self
      .geo_settings
      .find_one(
        doc! {
          "code": code,
        },
        None,
      )
      .await
    {
      Ok(s) => s,
      Err(e) => {
        warn!("geo setting lookup failed. Err = {:?}", e);
        return None;
      }
    };

    if let Some(setting) = setting {
      return Some(self.cache.insert(setting).await);
    }

    None
  }
}
