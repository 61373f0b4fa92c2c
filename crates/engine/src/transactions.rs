//! Transaction primitives.
//!
//! A `Transaction` is an immutable ledger event: an income, an expense, or a
//! transfer between the two fixed accounts (cash, bank).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// One of the two fixed accounts money lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Account {
    Cash,
    Bank,
}

impl Account {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
        }
    }

    /// Matches a user-typed account selector against the known synonym sets.
    ///
    /// No match is `None`, not an error; the caller decides how to react.
    pub fn parse_token(text: &str) -> Option<Account> {
        match text.trim().to_lowercase().as_str() {
            "tm" | "tienmat" | "cash" | "tiền mặt" => Some(Self::Cash),
            "tk" | "taikhoan" | "bank" | "tài khoản" => Some(Self::Bank),
            _ => None,
        }
    }
}

impl TryFrom<&str> for Account {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "bank" => Ok(Self::Bank),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid account: {other}"
            ))),
        }
    }
}

/// Direction of a transfer between the two fixed accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    BankToCash,
    CashToBank,
}

impl TransferDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankToCash => "bank_to_cash",
            Self::CashToBank => "cash_to_bank",
        }
    }

    /// Reason recorded when the user gives none.
    pub fn default_reason(self) -> &'static str {
        match self {
            Self::BankToCash => "Rút tiền",
            Self::CashToBank => "Nạp tiền",
        }
    }
}

impl TryFrom<&str> for TransferDirection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank_to_cash" => Ok(Self::BankToCash),
            "cash_to_bank" => Ok(Self::CashToBank),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid transfer direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub reason: String,
    pub account: Option<Account>,
    pub direction: Option<TransferDirection>,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates an income record. The account is required at write time; the
    /// cash default for a missing selector is the parser's job.
    pub fn income(
        amount_minor: i64,
        account: Account,
        reason: String,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Self::entry(TransactionKind::Income, amount_minor, account, reason, occurred_at)
    }

    /// Creates an expense record.
    pub fn expense(
        amount_minor: i64,
        account: Account,
        reason: String,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Self::entry(TransactionKind::Expense, amount_minor, account, reason, occurred_at)
    }

    /// Creates a transfer record. A missing reason falls back to the
    /// direction's default ("Rút tiền" / "Nạp tiền").
    pub fn transfer(
        direction: TransferDirection,
        amount_minor: i64,
        reason: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Self::validate_amount(amount_minor)?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::Transfer,
            amount_minor,
            reason: reason.unwrap_or_else(|| direction.default_reason().to_string()),
            account: None,
            direction: Some(direction),
            occurred_at,
        })
    }

    fn entry(
        kind: TransactionKind,
        amount_minor: i64,
        account: Account,
        reason: String,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Self::validate_amount(amount_minor)?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            amount_minor,
            reason,
            account: Some(account),
            direction: None,
            occurred_at,
        })
    }

    fn validate_amount(amount_minor: i64) -> ResultEngine<()> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The account this record affects. Rows written before the account
    /// column became mandatory may lack one; every reader treats those as
    /// cash.
    pub fn account_or_default(&self) -> Account {
        self.account.unwrap_or(Account::Cash)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub reason: String,
    pub account: Option<String>,
    pub direction: Option<String>,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            reason: ActiveValue::Set(tx.reason.clone()),
            account: ActiveValue::Set(tx.account.map(|a| a.as_str().to_string())),
            direction: ActiveValue::Set(tx.direction.map(|d| d.as_str().to_string())),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidRecord(format!("invalid id: {}", model.id)))?;
        let account = model
            .account
            .as_deref()
            .map(Account::try_from)
            .transpose()?;
        let direction = model
            .direction
            .as_deref()
            .map(TransferDirection::try_from)
            .transpose()?;

        Ok(Self {
            id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            reason: model.reason,
            account,
            direction,
            occurred_at: model.occurred_at,
        })
    }
}
