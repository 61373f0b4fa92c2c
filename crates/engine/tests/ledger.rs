use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};

use engine::{Account, Ledger, Transaction, TransferDirection};
use migration::MigratorTrait;
use uuid::Uuid;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build();
    (ledger, db)
}

async fn ledger_with_file_db() -> (Ledger, DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build();

    (ledger, db, url, path)
}

#[tokio::test]
async fn empty_ledger_reports_zeroes() {
    let (ledger, _db) = ledger_with_db().await;

    let report = ledger.report().await.unwrap();
    assert_eq!(report.income, 0);
    assert_eq!(report.expense, 0);
    assert_eq!(report.total_balance, 0);
    assert_eq!(report.transaction_count, 0);
    assert!(report.top_expenses.is_empty());
}

#[tokio::test]
async fn append_then_report_aggregates() {
    let (ledger, _db) = ledger_with_db().await;

    ledger
        .append(
            Transaction::income(100_000, Account::Bank, "luong".to_string(), Utc::now()).unwrap(),
        )
        .await
        .unwrap();
    ledger
        .append(
            Transaction::expense(40_000, Account::Bank, "an trua".to_string(), Utc::now()).unwrap(),
        )
        .await
        .unwrap();

    let report = ledger.report().await.unwrap();
    assert_eq!(report.income, 100_000);
    assert_eq!(report.expense, 40_000);
    assert_eq!(report.bank_balance, 60_000);
    assert_eq!(report.cash_balance, 0);
    assert_eq!(report.total_balance, 60_000);
    assert_eq!(report.transaction_count, 2);
    assert_eq!(report.top_expenses.len(), 1);
    assert_eq!(report.top_expenses[0].reason, "an trua");
}

#[tokio::test]
async fn transfers_move_between_accounts_without_changing_total() {
    let (ledger, _db) = ledger_with_db().await;

    ledger
        .append(
            Transaction::income(500_000, Account::Bank, "luong".to_string(), Utc::now()).unwrap(),
        )
        .await
        .unwrap();
    ledger
        .append(
            Transaction::transfer(TransferDirection::BankToCash, 200_000, None, Utc::now())
                .unwrap(),
        )
        .await
        .unwrap();

    let report = ledger.report().await.unwrap();
    assert_eq!(report.bank_balance, 300_000);
    assert_eq!(report.cash_balance, 200_000);
    assert_eq!(report.total_balance, 500_000);
}

#[tokio::test]
async fn upsert_subscriber_is_idempotent() {
    let (ledger, _db) = ledger_with_db().await;

    ledger.upsert_subscriber(42).await.unwrap();
    ledger.upsert_subscriber(42).await.unwrap();
    ledger.upsert_subscriber(7).await.unwrap();

    let mut chat_ids: Vec<i64> = ledger
        .subscribers()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.chat_id)
        .collect();
    chat_ids.sort_unstable();
    assert_eq!(chat_ids, vec![7, 42]);
}

#[tokio::test]
async fn upsert_subscriber_bumps_updated_at() {
    let (ledger, _db) = ledger_with_db().await;

    ledger.upsert_subscriber(42).await.unwrap();
    let before = ledger.subscribers().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    ledger.upsert_subscriber(42).await.unwrap();
    let after = ledger.subscribers().await.unwrap();

    assert_eq!(before[0].created_at, after[0].created_at);
    assert!(after[0].updated_at > before[0].updated_at);
}

#[tokio::test]
async fn restart_ledger_reads_same_state() {
    let (ledger, db, url, path) = ledger_with_file_db().await;

    ledger
        .append(
            Transaction::income(100_000, Account::Cash, "luong".to_string(), Utc::now()).unwrap(),
        )
        .await
        .unwrap();
    ledger.upsert_subscriber(42).await.unwrap();

    drop(ledger);
    drop(db);

    let db2 = Database::connect(&url).await.unwrap();
    let ledger2 = Ledger::builder().database(db2.clone()).build();

    let report = ledger2.report().await.unwrap();
    assert_eq!(report.income, 100_000);
    assert_eq!(report.cash_balance, 100_000);
    assert_eq!(ledger2.subscribers().await.unwrap().len(), 1);

    drop(db2);
    let _ = std::fs::remove_file(path);
}
