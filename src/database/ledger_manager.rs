use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

use super::models::{Account, LedgerEntry};

#[derive(Clone)]
pub struct LedgerManager {
  accounts: mongodb::Collection<Account>,
  ledger: mongodb::Collection<LedgerEntry>,
}

impl LedgerManager {
  pub async fn new(client: &mongodb::Client, database: &str) -> Self {
    let db = client.database(database);
    Self {
      accounts: db.collection("accounts"),
      ledger: db.collection("ledger"),
    }
  }

  // The balance check is the filter of a single conditional update, so two
  // concurrent debits can never both pass on a stale read. Returns the balance
  // after the debit, or None when the filter did not match (insufficient funds).
  pub async fn debit_if_sufficient(&self, account_id: &str, amount: i64) -> Result<Option<i64>, mongodb::error::Error> {
    let options = FindOneAndUpdateOptions::builder().return_document(Some(ReturnDocument::After)).build();
    let updated = self.accounts.find_one_and_update(debit_filter(account_id, amount), debit_update(amount), options).await?;
    Ok(updated.map(|account| account.balance))
  }

  pub async fn record_debit(
    &self,
    account_id: &str,
    amount: i64,
    balance_after: i64,
    product_id: i64,
    quantity: u32,
    correlation_id: &str,
  ) -> Result<(), mongodb::error::Error> {
    let entry = LedgerEntry {
      _id: ObjectId::new(),
      account_id: account_id.to_string(),
      amount: -amount,
      balance_after,
      reason: String::from("generate"),
      product_id,
      quantity,
      correlation_id: correlation_id.to_string(),
      created_at: DateTime::now(),
    };
    self.ledger.insert_one(entry, None).await?;
    Ok(())
  }
}

fn debit_filter(account_id: &str, amount: i64) -> Document {
  doc! {
    "account_id": account_id,
    "balance": { "$gte": amount },
  }
}

fn debit_update(amount: i64) -> Document {
  doc! {
    "$inc": { "balance": -amount },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mongodb::bson::Bson;

  #[test]
  fn debit_filter_guards_on_balance() {
    let filter = debit_filter("acc_1", 30);
    assert_eq!(filter.get_str("account_id").ok(), Some("acc_1"));
    let balance = filter.get_document("balance").unwrap();
    assert_eq!(balance.get("$gte"), Some(&Bson::Int64(30)));
  }

  #[test]
  fn debit_update_decrements_balance() {
    let update = debit_update(30);
    let inc = update.get_document("$inc").unwrap();
    assert_eq!(inc.get("balance"), Some(&Bson::Int64(-30)));
  }
}
