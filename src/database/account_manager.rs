use mongodb::bson::doc;

use super::models::Account;

#[derive(Clone)]
pub struct AccountManager {
  accounts: mongodb::Collection<Account>,
}

impl AccountManager {
  pub async fn new(client: &mongodb::Client, database: &str) -> Self {
    let db = client.database(database);
    Self {
      accounts: db.collection("accounts"),
    }
  }

  pub async fn find_by_api_key(&self, api_key: &str) -> Option<Account> {
    let filter = doc! {
      "api_key": api_key,
      "active": true,
    };
    match self.accounts.find_one(filter, None).await {
      Ok(account) => account,
      Err(e) => {
        warn!("account lookup failed. Err = {:?}", e);
        None
      }
    }
  }
}
