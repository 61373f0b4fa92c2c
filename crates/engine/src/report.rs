//! Report aggregation.
//!
//! A [`ReportSnapshot`] is derived from the full transaction log in a single
//! pass and is never persisted.

use serde::{Deserialize, Serialize};

use crate::transactions::{Account, Transaction, TransactionKind, TransferDirection};

const TOP_EXPENSES: usize = 3;

/// One of the largest expense records, annotated with its (defaulted)
/// account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopExpense {
    pub amount_minor: i64,
    pub reason: String,
    pub account: Account,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub income: i64,
    pub expense: i64,
    pub cash_balance: i64,
    pub bank_balance: i64,
    pub total_balance: i64,
    pub transaction_count: u64,
    pub top_expenses: Vec<TopExpense>,
}

impl ReportSnapshot {
    /// Folds the full transaction set into a snapshot.
    ///
    /// Per-account balances count income minus expense on that account;
    /// transfers then move money between the two balances and cancel out of
    /// the total, so `cash_balance + bank_balance == income - expense` always
    /// holds. An empty input yields all zeros.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut income = 0i64;
        let mut expense = 0i64;
        let mut cash_net = 0i64;
        let mut bank_net = 0i64;
        let mut bank_to_cash = 0i64;
        let mut cash_to_bank = 0i64;
        let mut top: Vec<TopExpense> = Vec::new();

        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => {
                    income += tx.amount_minor;
                    match tx.account_or_default() {
                        Account::Cash => cash_net += tx.amount_minor,
                        Account::Bank => bank_net += tx.amount_minor,
                    }
                }
                TransactionKind::Expense => {
                    expense += tx.amount_minor;
                    match tx.account_or_default() {
                        Account::Cash => cash_net -= tx.amount_minor,
                        Account::Bank => bank_net -= tx.amount_minor,
                    }
                    top.push(TopExpense {
                        amount_minor: tx.amount_minor,
                        reason: tx.reason.clone(),
                        account: tx.account_or_default(),
                    });
                }
                TransactionKind::Transfer => match tx.direction {
                    Some(TransferDirection::BankToCash) => bank_to_cash += tx.amount_minor,
                    Some(TransferDirection::CashToBank) => cash_to_bank += tx.amount_minor,
                    None => {}
                },
            }
        }

        // Stable sort keeps insertion order between equal amounts.
        top.sort_by(|a, b| b.amount_minor.cmp(&a.amount_minor));
        top.truncate(TOP_EXPENSES);

        let cash_balance = cash_net + bank_to_cash - cash_to_bank;
        let bank_balance = bank_net - bank_to_cash + cash_to_bank;

        Self {
            income,
            expense,
            cash_balance,
            bank_balance,
            total_balance: cash_balance + bank_balance,
            transaction_count: transactions.len() as u64,
            top_expenses: top,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn income(amount: i64, account: Account) -> Transaction {
        Transaction::income(amount, account, "thu".to_string(), Utc::now())
            .expect("valid income")
    }

    fn expense(amount: i64, account: Account, reason: &str) -> Transaction {
        Transaction::expense(amount, account, reason.to_string(), Utc::now())
            .expect("valid expense")
    }

    fn transfer(direction: TransferDirection, amount: i64) -> Transaction {
        Transaction::transfer(direction, amount, None, Utc::now()).expect("valid transfer")
    }

    #[test]
    fn empty_set_is_all_zeros() {
        let snapshot = ReportSnapshot::from_transactions(&[]);
        assert_eq!(snapshot, ReportSnapshot::default());
        assert!(snapshot.top_expenses.is_empty());
    }

    #[test]
    fn income_and_bank_expense() {
        let snapshot = ReportSnapshot::from_transactions(&[
            income(100_000, Account::Cash),
            expense(40_000, Account::Bank, "ăn trưa"),
        ]);

        assert_eq!(snapshot.income, 100_000);
        assert_eq!(snapshot.expense, 40_000);
        assert_eq!(snapshot.cash_balance, 100_000);
        assert_eq!(snapshot.bank_balance, -40_000);
        assert_eq!(snapshot.total_balance, 60_000);
        assert_eq!(snapshot.transaction_count, 2);
    }

    #[test]
    fn surplus_stays_on_the_bank_account() {
        // Both records on the bank account: the whole 60 000 surplus sits
        // on the bank balance.
        let snapshot = ReportSnapshot::from_transactions(&[
            income(100_000, Account::Bank),
            expense(40_000, Account::Bank, "ăn trưa"),
        ]);

        assert_eq!(snapshot.income, 100_000);
        assert_eq!(snapshot.expense, 40_000);
        assert_eq!(snapshot.bank_balance, 60_000);
        assert_eq!(snapshot.cash_balance, 0);
        assert_eq!(snapshot.total_balance, 60_000);
        assert_eq!(snapshot.transaction_count, 2);
    }

    #[test]
    fn transfers_cancel_out_of_the_total() {
        let transactions = vec![
            income(500_000, Account::Bank),
            expense(120_000, Account::Cash, "chợ"),
            transfer(TransferDirection::BankToCash, 200_000),
            transfer(TransferDirection::CashToBank, 50_000),
        ];
        let snapshot = ReportSnapshot::from_transactions(&transactions);

        assert_eq!(snapshot.cash_balance, -120_000 + 200_000 - 50_000);
        assert_eq!(snapshot.bank_balance, 500_000 - 200_000 + 50_000);
        assert_eq!(
            snapshot.cash_balance + snapshot.bank_balance,
            snapshot.income - snapshot.expense
        );
        assert_eq!(snapshot.transaction_count, 4);
    }

    #[test]
    fn top_expenses_capped_at_three_descending() {
        let transactions = vec![
            expense(10_000, Account::Cash, "a"),
            expense(50_000, Account::Bank, "b"),
            expense(30_000, Account::Cash, "c"),
            expense(20_000, Account::Cash, "d"),
            expense(50_000, Account::Cash, "e"),
        ];
        let snapshot = ReportSnapshot::from_transactions(&transactions);

        let amounts: Vec<i64> = snapshot
            .top_expenses
            .iter()
            .map(|e| e.amount_minor)
            .collect();
        assert_eq!(amounts, vec![50_000, 50_000, 30_000]);
        // Stable order between the two 50 000 entries.
        assert_eq!(snapshot.top_expenses[0].reason, "b");
        assert_eq!(snapshot.top_expenses[1].reason, "e");
    }
}
