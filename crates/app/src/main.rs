use std::net::SocketAddr;

use chrono_tz::Tz;
use migration::{Migrator, MigratorTrait};
use settings::Database;
use telegram_bot::schedule;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "soquy={level},telegram_bot={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let ledger = engine::Ledger::builder().database(db).build();

    let timezone: Tz = settings
        .reminder
        .timezone
        .parse()
        .map_err(|err| format!("invalid reminder timezone: {err}"))?;
    let listen = parse_listen(settings.server.as_ref())?;
    let polling = settings.telegram.webhook_url.is_none();

    let token = settings.telegram.token.clone();
    let webhook_url = settings.telegram.webhook_url.clone();
    let bot_ledger = ledger.clone();
    tasks.spawn(async move {
        match telegram_bot::Bot::builder()
            .token(&token)
            .ledger(bot_ledger)
            .listen(listen)
            .webhook_url(webhook_url)
            .build()
        {
            Ok(bot) => bot.run().await,
            Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
        }
    });

    let reminder = schedule::ReminderSettings {
        time: settings.reminder.time.clone(),
        timezone,
    };
    let token = settings.telegram.token.clone();
    let report_ledger = ledger.clone();
    tasks.spawn(async move {
        if let Err(err) = schedule::run_daily_report(token, report_ledger, reminder).await {
            tracing::error!("daily report disabled: {err}");
        }
    });

    // Webhook deployments are woken by Telegram itself, so only the polling
    // mode needs to keep the host awake.
    if polling {
        let keep_alive = schedule::KeepAliveSettings {
            external_url: settings.keep_alive.external_url.clone(),
            sleep_start: settings.keep_alive.sleep_start,
            sleep_end: settings.keep_alive.sleep_end,
            timezone,
        };
        tasks.spawn(schedule::run_keep_alive(keep_alive));
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn parse_listen(
    config: Option<&settings::Server>,
) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
    let (bind, port) = match config {
        Some(server) => (server.bind.as_deref().unwrap_or("0.0.0.0"), server.port),
        None => ("0.0.0.0", 10_000),
    };
    let addr = format!("{bind}:{port}").parse()?;
    Ok(addr)
}
