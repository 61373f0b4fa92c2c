use chrono::Utc;
use teloxide::{prelude::*, types::ChatId};
use tokio::sync::OwnedMutexGuard;

use engine::{EngineError, Transaction, TransactionKind};

use crate::{
    ConfigParameters,
    commands::{self, Command},
    flow::{self, Completed, StepOutcome},
    parsing::{self, ParseError},
    state::{Flow, Session},
    ui,
};

#[derive(Debug, thiserror::Error)]
enum HandlerError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
    #[error(transparent)]
    Storage(#[from] EngineError),
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let text = text.trim();
    let chat_id = msg.chat.id;

    let result = match dispatch(&bot, chat_id, text, &cfg).await {
        Ok(()) => Ok(()),
        Err(HandlerError::Telegram(err)) => Err(err),
        Err(HandlerError::Storage(err)) => {
            tracing::error!("storage error while handling message: {err}");
            let mut slot = cfg.sessions.lock(chat_id).await;
            *slot = None;
            drop(slot);
            bot.send_message(chat_id, ui::MSG_HANDLER_FAILURE)
                .reply_markup(ui::main_menu_keyboard())
                .await?;
            Ok(())
        }
    };

    // A chat whose session just ended does not need to keep a slot.
    cfg.sessions.prune(chat_id).await;
    result
}

async fn dispatch(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    cfg: &ConfigParameters,
) -> Result<(), HandlerError> {
    // Cancel works at any point, with or without an active session.
    if is_cancel(text) {
        let mut slot = cfg.sessions.lock(chat_id).await;
        *slot = None;
        drop(slot);
        send_menu(bot, chat_id, ui::MSG_CANCELLED).await?;
        return Ok(());
    }

    let mut slot = cfg.sessions.lock(chat_id).await;
    if let Some(session) = slot.clone() {
        if text.starts_with('/') {
            // Mid-session commands are dropped; only /huy (above) interrupts.
            return Ok(());
        }
        if ui::is_menu_button(text) {
            bot.send_message(chat_id, ui::MSG_SESSION_IN_PROGRESS)
                .reply_markup(ui::conversation_keyboard())
                .await?;
            return Ok(());
        }
        return continue_session(bot, chat_id, text, cfg, session, slot).await;
    }
    drop(slot);

    cfg.ledger.upsert_subscriber(chat_id.0).await?;

    match text {
        ui::BUTTON_THU => return start_flow(bot, chat_id, cfg, Flow::Income).await,
        ui::BUTTON_CHI => return start_flow(bot, chat_id, cfg, Flow::Expense).await,
        ui::BUTTON_RUT => return start_flow(bot, chat_id, cfg, Flow::Withdraw).await,
        ui::BUTTON_NAP => return start_flow(bot, chat_id, cfg, Flow::Deposit).await,
        ui::BUTTON_THONGKE => return send_overview(bot, chat_id, cfg).await,
        ui::BUTTON_HELP => return send_help(bot, chat_id).await,
        _ => {}
    }

    if let Some(cmd) = commands::parse(text) {
        return run_command(bot, chat_id, cfg, cmd).await;
    }

    // Free text outside a session is ignored.
    Ok(())
}

async fn continue_session(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    cfg: &ConfigParameters,
    session: Session,
    mut slot: OwnedMutexGuard<Option<Session>>,
) -> Result<(), HandlerError> {
    match flow::advance(session, text) {
        StepOutcome::Reprompt(prompt) => {
            bot.send_message(chat_id, prompt)
                .reply_markup(ui::conversation_keyboard())
                .await?;
        }
        StepOutcome::Advance(next, prompt) => {
            *slot = Some(next);
            bot.send_message(chat_id, prompt)
                .reply_markup(ui::conversation_keyboard())
                .await?;
        }
        StepOutcome::Commit(completed) => {
            *slot = None;
            commit(bot, chat_id, cfg, completed).await?;
            send_menu(bot, chat_id, ui::MSG_MENU_DEFAULT).await?;
        }
    }
    Ok(())
}

async fn commit(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    completed: Completed,
) -> Result<(), HandlerError> {
    let (tx, saved) = match completed {
        Completed::Income {
            amount_minor,
            account,
            reason,
        } => (
            Transaction::income(amount_minor, account, reason.clone(), Utc::now())?,
            ui::entry_saved_message(TransactionKind::Income, amount_minor, account, &reason),
        ),
        Completed::Expense {
            amount_minor,
            account,
            reason,
        } => (
            Transaction::expense(amount_minor, account, reason.clone(), Utc::now())?,
            ui::entry_saved_message(TransactionKind::Expense, amount_minor, account, &reason),
        ),
        Completed::Transfer {
            direction,
            amount_minor,
            reason,
        } => (
            Transaction::transfer(direction, amount_minor, reason, Utc::now())?,
            ui::transfer_saved_message(direction, amount_minor),
        ),
    };

    cfg.ledger.append(tx).await?;
    bot.send_message(chat_id, saved).await?;
    Ok(())
}

async fn run_command(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    cmd: Command,
) -> Result<(), HandlerError> {
    match cmd {
        Command::Thu(Some(args)) => {
            inline_entry(bot, chat_id, cfg, TransactionKind::Income, &args).await
        }
        Command::Thu(None) => start_flow(bot, chat_id, cfg, Flow::Income).await,
        Command::Chi(Some(args)) => {
            inline_entry(bot, chat_id, cfg, TransactionKind::Expense, &args).await
        }
        Command::Chi(None) => start_flow(bot, chat_id, cfg, Flow::Expense).await,
        Command::Rut(Some(args)) => inline_transfer(bot, chat_id, cfg, Flow::Withdraw, &args).await,
        Command::Rut(None) => start_flow(bot, chat_id, cfg, Flow::Withdraw).await,
        Command::Nap(Some(args)) => inline_transfer(bot, chat_id, cfg, Flow::Deposit, &args).await,
        Command::Nap(None) => start_flow(bot, chat_id, cfg, Flow::Deposit).await,
        Command::ThongKe => send_overview(bot, chat_id, cfg).await,
        Command::Start | Command::Menu => send_menu(bot, chat_id, ui::MSG_MENU_START).await,
        // `dispatch` consumes every cancel before commands are routed.
        Command::Huy => Ok(()),
        Command::Help => send_help(bot, chat_id).await,
    }
}

/// Both cancel spellings: the ❌ Hủy button and `/huy`.
fn is_cancel(text: &str) -> bool {
    text == ui::BUTTON_HUY || matches!(commands::parse(text), Some(Command::Huy))
}

async fn inline_entry(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: TransactionKind,
    args: &str,
) -> Result<(), HandlerError> {
    let input = match parsing::parse_entry_input(args) {
        Ok(input) => input,
        Err(ParseError::InvalidAmount) => {
            let hint = match kind {
                TransactionKind::Income => "⚠️ Số tiền không hợp lệ. Ví dụ: /thu 100k tm lương",
                _ => "⚠️ Số tiền không hợp lệ. Ví dụ: /chi 50k tm ăn trưa",
            };
            bot.send_message(chat_id, hint).await?;
            return Ok(());
        }
        Err(ParseError::MissingReason) => {
            let hint = match kind {
                TransactionKind::Income => "⚠️ Vui lòng nhập lý do. Ví dụ: /thu 100k tk bán đồ cũ",
                _ => "⚠️ Vui lòng nhập lý do. Ví dụ: /chi 50k tk cafe",
            };
            bot.send_message(chat_id, hint).await?;
            return Ok(());
        }
    };

    let completed = match kind {
        TransactionKind::Income => Completed::Income {
            amount_minor: input.amount_minor,
            account: input.account,
            reason: input.reason,
        },
        _ => Completed::Expense {
            amount_minor: input.amount_minor,
            account: input.account,
            reason: input.reason,
        },
    };
    commit(bot, chat_id, cfg, completed).await
}

async fn inline_transfer(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    flow: Flow,
    args: &str,
) -> Result<(), HandlerError> {
    let Some(direction) = flow.direction() else {
        return Ok(());
    };

    let input = match parsing::parse_transfer_input(args) {
        Ok(input) => input,
        Err(_) => {
            let hint = match flow {
                Flow::Withdraw => "⚠️ Số tiền không hợp lệ. Ví dụ: /rut 500k rút ATM",
                _ => "⚠️ Số tiền không hợp lệ. Ví dụ: /nap 500k nạp vào tài khoản",
            };
            bot.send_message(chat_id, hint).await?;
            return Ok(());
        }
    };

    commit(
        bot,
        chat_id,
        cfg,
        Completed::Transfer {
            direction,
            amount_minor: input.amount_minor,
            reason: input.reason,
        },
    )
    .await
}

async fn start_flow(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    flow: Flow,
) -> Result<(), HandlerError> {
    let mut slot = cfg.sessions.lock(chat_id).await;
    *slot = Some(Session::new(flow));
    drop(slot);

    bot.send_message(chat_id, flow.start_prompt())
        .reply_markup(ui::conversation_keyboard())
        .await?;
    Ok(())
}

async fn send_overview(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
) -> Result<(), HandlerError> {
    let report = cfg.ledger.report().await?;
    bot.send_message(chat_id, ui::format_overview(&report))
        .reply_markup(ui::main_menu_keyboard())
        .await?;
    Ok(())
}

async fn send_help(bot: &Bot, chat_id: ChatId) -> Result<(), HandlerError> {
    bot.send_message(chat_id, ui::help_text())
        .reply_markup(ui::main_menu_keyboard())
        .await?;
    Ok(())
}

async fn send_menu(bot: &Bot, chat_id: ChatId, text: &str) -> Result<(), HandlerError> {
    bot.send_message(chat_id, text)
        .reply_markup(ui::main_menu_keyboard())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_matches_button_and_command() {
        assert!(is_cancel(ui::BUTTON_HUY));
        assert!(is_cancel("/huy"));
        assert!(is_cancel("/huy@soquy_bot"));
        assert!(!is_cancel("/menu"));
        assert!(!is_cancel("hủy"));
    }
}
