use std::sync::Arc;

use mongodb::bson::doc;
use tokio_stream::StreamExt;

use crate::cache::catalog::CatalogCache;

use super::models::Product;

#[derive(Clone)]
pub struct CatalogManager {
  cache: CatalogCache,
  products: mongodb::Collection<Product>,
}

impl CatalogManager {
  pub async fn new(client: &mongodb::Client, database: &str, cache: CatalogCache) -> Self {
    let db = client.database(database);
    Self {
      cache,
      products: db.collection("products"),
    }
  }

  pub async fn get_or_fetch_and_insert(&self, product_id: i64) -> Option<Arc<Product>> {
    debug!("get_or_fetch_and_insert product {} from cache", product_id);
    if let Some(product) = self.cache.get(product_id) {
      return Some(product);
    }

    let product = match self
      .products
      .find_one(
        doc! {
          "product_id": product_id,
        },
        None,
      )
      .await
    {
      Ok(p) => p,
      Err(e) => {
        warn!("product lookup failed. Err = {:?}", e);
        return None;
      }
    };

    if let Some(product) = product {
      return Some(self.cache.insert(product).await);
    }

    None
  }

  pub async fn list_active(&self) -> Vec<Product> {
    let mut products: Vec<Product> = Vec::new();
    let filter = doc! {
      "active": true,
    };
    if let Ok(mut docs) = self.products.find(filter, None).await {
      while let Some(result) = docs.next().await {
        match result {
          Ok(entry) => products.push(entry),
          _ => (),
        }
      }
    }
    return products;
  }
}
