//! Telegram bot.
//!
//! All money handling lives in the `engine` crate; this crate deals with
//! conversation state, message parsing, and the Telegram transport. Updates
//! arrive either via long polling or via a webhook, selected by
//! configuration.

use std::net::SocketAddr;

use teloxide::{prelude::*, update_listeners::webhooks};

use engine::Ledger;

mod commands;
mod flow;
mod handlers;
mod parsing;
pub mod schedule;
mod state;
mod ui;

const DEFAULT_PORT: u16 = 10_000;

#[derive(Clone)]
pub struct ConfigParameters {
    ledger: Ledger,
    sessions: state::SessionStore,
}

pub struct Bot {
    token: String,
    ledger: Ledger,
    listen: SocketAddr,
    webhook_url: Option<reqwest::Url>,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        if let Err(err) = bot.set_my_commands(commands::bot_commands()).await {
            tracing::warn!("failed to register command menu: {err}");
        }

        let parameters = ConfigParameters {
            ledger: self.ledger.clone(),
            sessions: state::SessionStore::default(),
        };

        let handler =
            dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

        let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build();

        match self.webhook_url.clone() {
            Some(url) => {
                tracing::info!("Receiving updates via webhook at {url}");
                let options = webhooks::Options::new(self.listen, url);
                let (listener, stop_flag, bot_router) =
                    match webhooks::axum_to_router(bot, options).await {
                        Ok(parts) => parts,
                        Err(err) => {
                            tracing::error!("failed to register webhook: {err}");
                            return;
                        }
                    };

                // One listener serves both Telegram updates and /healthz.
                let app = bot_router.merge(server::router());
                let tcp = match tokio::net::TcpListener::bind(self.listen).await {
                    Ok(tcp) => tcp,
                    Err(err) => {
                        tracing::error!("failed to bind {}: {err}", self.listen);
                        return;
                    }
                };
                tokio::spawn(async move {
                    if let Err(err) = axum::serve(tcp, app)
                        .with_graceful_shutdown(stop_flag)
                        .await
                    {
                        tracing::error!("webhook server failed: {err}");
                    }
                });

                dispatcher
                    .dispatch_with_listener(
                        listener,
                        LoggingErrorHandler::with_custom_text(
                            "An error from the update listener",
                        ),
                    )
                    .await;
            }
            None => {
                tracing::info!("Receiving updates via long polling");
                if let Err(err) = bot.delete_webhook().await {
                    tracing::warn!("failed to clear webhook before polling: {err}");
                }

                tokio::spawn(server::run(self.listen));

                dispatcher.dispatch().await;
            }
        }
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    ledger: Option<Ledger>,
    listen: Option<SocketAddr>,
    webhook_url: Option<String>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn ledger(mut self, ledger: Ledger) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn listen(mut self, addr: SocketAddr) -> BotBuilder {
        self.listen = Some(addr);
        self
    }

    /// Public HTTPS URL Telegram should deliver updates to. Leave unset to
    /// use long polling.
    pub fn webhook_url(mut self, url: Option<String>) -> BotBuilder {
        self.webhook_url = url;
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");

        if self.token.is_empty() {
            return Err("telegram bot token is empty".to_string());
        }
        let ledger = self.ledger.ok_or("telegram bot needs a ledger")?;

        let webhook_url = self
            .webhook_url
            .map(|url| {
                reqwest::Url::parse(&url).map_err(|err| format!("invalid webhook url: {err}"))
            })
            .transpose()?;

        Ok(Bot {
            token: self.token,
            ledger,
            listen: self
                .listen
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))),
            webhook_url,
        })
    }
}
