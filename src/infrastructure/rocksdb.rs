use crate::domain::customer::Customer;
use crate::domain::email::Email;
use crate::domain::order::{Order, TrackingNumber};
use crate::domain::ports::CustomerStore;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, ErrorKind, IteratorMode, Options, TransactionDB,
    TransactionDBOptions,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for customer aggregates, keyed by normalized email.
pub const CF_CUSTOMERS: &str = "customers";
/// Column Family mapping tracking numbers to the owning customer's email.
pub const CF_ORDERS: &str = "orders";

/// A persistent customer store backed by a RocksDB `TransactionDB`.
///
/// Each customer aggregate (with all of its orders) is one JSON value, so a
/// save is a single transaction: the customer key is locked with
/// `get_for_update`, its version checked, then the customer and its tracking
/// index entries are written and committed together.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<TransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("customers" and "orders") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_customers = ColumnFamilyDescriptor::new(CF_CUSTOMERS, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());

        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            vec![cf_customers, cf_orders],
        )
        .map_err(storage_error)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CheckoutError::store(format!("{name} column family not found")))
    }
}

fn storage_error(e: rocksdb::Error) -> CheckoutError {
    CheckoutError::Store(Box::new(e))
}

/// Lock timeouts and write conflicts mean another checkout holds the same
/// customer; those are retryable.
fn transaction_error(e: rocksdb::Error, email: &Email) -> CheckoutError {
    match e.kind() {
        ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain => CheckoutError::Conflict {
            email: email.clone(),
        },
        _ => storage_error(e),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CheckoutError::store(format!("Serialization error: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| CheckoutError::store(format!("Deserialization error: {e}")))
}

#[async_trait]
impl CustomerStore for RocksDBStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>> {
        let cf = self.cf(CF_CUSTOMERS)?;
        self.db
            .get_cf(cf, email.as_str())
            .map_err(storage_error)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    async fn save(&self, mut customer: Customer) -> Result<Customer> {
        let customers = self.cf(CF_CUSTOMERS)?;
        let orders = self.cf(CF_ORDERS)?;
        let key = customer.email.as_str().as_bytes().to_vec();

        // Dropping `txn` without commit rolls everything back.
        let txn = self.db.transaction();

        let stored_version = txn
            .get_for_update_cf(customers, &key, true)
            .map_err(|e| transaction_error(e, &customer.email))?
            .map(|bytes| decode::<Customer>(&bytes))
            .transpose()?
            .map_or(0, |stored| stored.version);
        if stored_version != customer.version {
            return Err(CheckoutError::Conflict {
                email: customer.email,
            });
        }

        for order in &customer.orders {
            let tracking_key = order.tracking_number.to_string();
            if let Some(owner) = txn
                .get_for_update_cf(orders, &tracking_key, true)
                .map_err(|e| transaction_error(e, &customer.email))?
                && owner != key
            {
                return Err(CheckoutError::store(format!(
                    "Tracking number {tracking_key} already assigned"
                )));
            }
            txn.put_cf(orders, &tracking_key, &key)
                .map_err(|e| transaction_error(e, &customer.email))?;
        }

        customer.version += 1;
        txn.put_cf(customers, &key, encode(&customer)?)
            .map_err(|e| transaction_error(e, &customer.email))?;
        txn.commit()
            .map_err(|e| transaction_error(e, &customer.email))?;

        Ok(customer)
    }

    async fn find_order(&self, tracking_number: &TrackingNumber) -> Result<Option<Order>> {
        let orders = self.cf(CF_ORDERS)?;
        let Some(owner) = self
            .db
            .get_cf(orders, tracking_number.to_string())
            .map_err(storage_error)?
        else {
            return Ok(None);
        };

        let customers = self.cf(CF_CUSTOMERS)?;
        let Some(bytes) = self.db.get_cf(customers, owner).map_err(storage_error)? else {
            return Ok(None);
        };
        let customer: Customer = decode(&bytes)?;

        Ok(customer
            .orders
            .into_iter()
            .find(|order| order.tracking_number == *tracking_number))
    }

    async fn all_customers(&self) -> Result<Vec<Customer>> {
        let cf = self.cf(CF_CUSTOMERS)?;

        let mut customers = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(storage_error)?;
            customers.push(decode(&value)?);
        }

        Ok(customers)
    }
}
