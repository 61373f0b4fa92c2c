//! Per-chat conversation sessions.
//!
//! Each chat owns at most one session. `SessionStore` hands out an owned
//! lock over the chat's slot so the whole read-modify-write for one message
//! happens under it; different chats never contend.

use std::{collections::HashMap, sync::Arc};

use teloxide::types::ChatId;
use tokio::sync::{Mutex, OwnedMutexGuard};

use engine::{Account, TransferDirection};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Income,
    Expense,
    Withdraw,
    Deposit,
}

impl Flow {
    pub(crate) fn direction(self) -> Option<TransferDirection> {
        match self {
            Flow::Withdraw => Some(TransferDirection::BankToCash),
            Flow::Deposit => Some(TransferDirection::CashToBank),
            Flow::Income | Flow::Expense => None,
        }
    }

    pub(crate) fn start_prompt(self) -> &'static str {
        match self {
            Flow::Income | Flow::Expense => "Nhập số tiền bạn muốn ghi nhận",
            Flow::Withdraw => "Nhập số tiền bạn muốn rút (từ tài khoản sang tiền mặt)",
            Flow::Deposit => "Nhập số tiền bạn muốn nạp (từ tiền mặt sang tài khoản)",
        }
    }
}

/// The step carries everything collected so far, so a session is always in
/// a consistent state without optional fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Amount,
    Account {
        amount_minor: i64,
    },
    Reason {
        amount_minor: i64,
        account: Option<Account>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Session {
    pub flow: Flow,
    pub step: Step,
}

impl Session {
    pub(crate) fn new(flow: Flow) -> Self {
        Self {
            flow,
            step: Step::Amount,
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, Arc<Mutex<Option<Session>>>>>>,
}

impl SessionStore {
    /// Locks the chat's session slot. The outer map lock is only held long
    /// enough to fetch the slot.
    pub(crate) async fn lock(&self, chat_id: ChatId) -> OwnedMutexGuard<Option<Session>> {
        let slot = {
            let mut guard = self.inner.lock().await;
            guard.entry(chat_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Drops the chat's slot when it holds no session, so the map does not
    /// grow with every chat ever seen. A slot whose lock is held stays.
    pub(crate) async fn prune(&self, chat_id: ChatId) {
        let mut guard = self.inner.lock().await;
        let Some(slot) = guard.get(&chat_id).cloned() else {
            return;
        };
        if let Ok(session) = slot.try_lock() {
            if session.is_none() {
                drop(session);
                guard.remove(&chat_id);
            }
        }
    }

    #[cfg(test)]
    async fn chat_count(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slots_are_independent_per_chat() {
        let store = SessionStore::default();

        let mut first = store.lock(ChatId(1)).await;
        *first = Some(Session::new(Flow::Income));

        // Holding chat 1's lock must not block chat 2.
        let second = store.lock(ChatId(2)).await;
        assert!(second.is_none());
        drop(second);
        drop(first);

        let first = store.lock(ChatId(1)).await;
        assert_eq!(
            first.as_ref().map(|s| s.flow),
            Some(Flow::Income)
        );
    }

    #[tokio::test]
    async fn prune_drops_empty_slots_only() {
        let store = SessionStore::default();

        let mut slot = store.lock(ChatId(7)).await;
        *slot = Some(Session::new(Flow::Expense));
        drop(slot);

        // A live session keeps its slot.
        store.prune(ChatId(7)).await;
        assert_eq!(store.chat_count().await, 1);

        let mut slot = store.lock(ChatId(7)).await;
        *slot = None;
        drop(slot);

        store.prune(ChatId(7)).await;
        assert_eq!(store.chat_count().await, 0);
    }

    #[tokio::test]
    async fn prune_skips_held_slots() {
        let store = SessionStore::default();

        let slot = store.lock(ChatId(1)).await;
        store.prune(ChatId(1)).await;
        assert_eq!(store.chat_count().await, 1);
        drop(slot);
    }
}
