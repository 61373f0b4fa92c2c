//! Append-only ledger over SQLite.
//!
//! The ledger exposes exactly three write-side operations: append a
//! transaction, upsert a subscriber, and nothing else. Reports are derived
//! on demand from the full log.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseConnection, prelude::*};

pub use error::EngineError;
pub use money::{format_amount, parse_amount};
pub use report::{ReportSnapshot, TopExpense};
pub use subscribers::Subscriber;
pub use transactions::{Account, Transaction, TransactionKind, TransferDirection};

mod error;
mod money;
mod report;
mod subscribers;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Handle to the persisted ledger. Cheap to clone; all operations take
/// `&self`.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Appends one record. The amount invariant is enforced by the
    /// [`Transaction`] constructors, so anything that reaches this point is
    /// persistable as-is.
    pub async fn append(&self, tx: Transaction) -> ResultEngine<Transaction> {
        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        Ok(tx)
    }

    /// Derives the full report snapshot from the transaction log.
    pub async fn report(&self) -> ResultEngine<ReportSnapshot> {
        let models = transactions::Entity::find().all(&self.database).await?;

        let mut txs = Vec::with_capacity(models.len());
        for model in models {
            txs.push(Transaction::try_from(model)?);
        }
        Ok(ReportSnapshot::from_transactions(&txs))
    }

    /// Registers a chat for the daily broadcast. Idempotent: a known chat
    /// only gets its `updated_at` bumped.
    pub async fn upsert_subscriber(&self, chat_id: i64) -> ResultEngine<()> {
        let now = Utc::now();

        match subscribers::Entity::find_by_id(chat_id)
            .one(&self.database)
            .await?
        {
            Some(existing) => {
                let mut model: subscribers::ActiveModel = existing.into();
                model.updated_at = ActiveValue::Set(now);
                model.update(&self.database).await?;
            }
            None => {
                let model = subscribers::ActiveModel {
                    chat_id: ActiveValue::Set(chat_id),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                };
                model.insert(&self.database).await?;
            }
        }
        Ok(())
    }

    /// All registered subscribers.
    pub async fn subscribers(&self) -> ResultEngine<Vec<Subscriber>> {
        let models = subscribers::Entity::find().all(&self.database).await?;
        Ok(models.into_iter().map(Subscriber::from).collect())
    }
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub fn build(self) -> Ledger {
        Ledger {
            database: self.database,
        }
    }
}
