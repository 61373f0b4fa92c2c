//! Conversation state machine.
//!
//! [`advance`] is a pure transition over a session and one message. The
//! handlers own the side effects: persisting the committed record and
//! sending the returned prompt.

use engine::{Account, TransferDirection};

use crate::{
    state::{Flow, Session, Step},
    ui,
};

/// Reason inputs equal to this phrase count as "no reason given".
pub(crate) const SKIP_PHRASE: &str = "bo qua";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// Input rejected, session unchanged; send the prompt again.
    Reprompt(&'static str),
    /// Input accepted; store the new session and send the next prompt.
    Advance(Session, &'static str),
    /// Terminal step done; destroy the session and persist the record.
    Commit(Completed),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Completed {
    Income {
        amount_minor: i64,
        account: Account,
        reason: String,
    },
    Expense {
        amount_minor: i64,
        account: Account,
        reason: String,
    },
    Transfer {
        direction: TransferDirection,
        amount_minor: i64,
        reason: Option<String>,
    },
}

pub(crate) fn advance(session: Session, input: &str) -> StepOutcome {
    let text = input.trim();

    match session.step {
        Step::Amount => match engine::parse_amount(text).filter(|amount| *amount > 0) {
            None => StepOutcome::Reprompt(ui::PROMPT_AMOUNT_INVALID),
            Some(amount_minor) => match session.flow {
                Flow::Income | Flow::Expense => StepOutcome::Advance(
                    Session {
                        flow: session.flow,
                        step: Step::Account { amount_minor },
                    },
                    ui::PROMPT_ACCOUNT,
                ),
                Flow::Withdraw | Flow::Deposit => StepOutcome::Advance(
                    Session {
                        flow: session.flow,
                        step: Step::Reason {
                            amount_minor,
                            account: None,
                        },
                    },
                    ui::PROMPT_TRANSFER_REASON,
                ),
            },
        },
        Step::Account { amount_minor } => match Account::parse_token(text) {
            None => StepOutcome::Reprompt(ui::PROMPT_ACCOUNT_INVALID),
            Some(account) => StepOutcome::Advance(
                Session {
                    flow: session.flow,
                    step: Step::Reason {
                        amount_minor,
                        account: Some(account),
                    },
                },
                ui::PROMPT_ENTRY_REASON,
            ),
        },
        Step::Reason {
            amount_minor,
            account,
        } => {
            let skipped = text.is_empty() || text.to_lowercase() == SKIP_PHRASE;

            match session.flow {
                Flow::Income | Flow::Expense => {
                    if skipped {
                        return StepOutcome::Reprompt(ui::PROMPT_ENTRY_REASON_REQUIRED);
                    }
                    let account = account.unwrap_or(Account::Cash);
                    let reason = text.to_string();
                    StepOutcome::Commit(match session.flow {
                        Flow::Income => Completed::Income {
                            amount_minor,
                            account,
                            reason,
                        },
                        _ => Completed::Expense {
                            amount_minor,
                            account,
                            reason,
                        },
                    })
                }
                Flow::Withdraw | Flow::Deposit => {
                    let direction = match session.flow {
                        Flow::Withdraw => TransferDirection::BankToCash,
                        _ => TransferDirection::CashToBank,
                    };
                    StepOutcome::Commit(Completed::Transfer {
                        direction,
                        amount_minor,
                        reason: (!skipped).then(|| text.to_string()),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(session: Session, input: &str) -> (Session, StepOutcome) {
        let outcome = advance(session.clone(), input);
        let next = match &outcome {
            StepOutcome::Advance(next, _) => next.clone(),
            _ => session,
        };
        (next, outcome)
    }

    #[test]
    fn income_walk_commits_full_record() {
        let session = Session::new(Flow::Income);

        let (session, outcome) = step(session, "100k");
        assert!(matches!(outcome, StepOutcome::Advance(_, ui::PROMPT_ACCOUNT)));

        let (session, outcome) = step(session, "tm");
        assert!(matches!(
            outcome,
            StepOutcome::Advance(_, ui::PROMPT_ENTRY_REASON)
        ));

        let (_, outcome) = step(session, "lương");
        assert_eq!(
            outcome,
            StepOutcome::Commit(Completed::Income {
                amount_minor: 100_000,
                account: Account::Cash,
                reason: "lương".to_string(),
            })
        );
    }

    #[test]
    fn invalid_amount_reprompts_in_place() {
        let outcome = advance(Session::new(Flow::Expense), "abc");
        assert_eq!(outcome, StepOutcome::Reprompt(ui::PROMPT_AMOUNT_INVALID));

        let outcome = advance(Session::new(Flow::Expense), "-5");
        assert_eq!(outcome, StepOutcome::Reprompt(ui::PROMPT_AMOUNT_INVALID));
    }

    #[test]
    fn unknown_account_token_reprompts() {
        let session = Session {
            flow: Flow::Expense,
            step: Step::Account {
                amount_minor: 50_000,
            },
        };
        let outcome = advance(session, "xyz");
        assert_eq!(outcome, StepOutcome::Reprompt(ui::PROMPT_ACCOUNT_INVALID));
    }

    #[test]
    fn entry_reason_cannot_be_skipped() {
        let session = Session {
            flow: Flow::Income,
            step: Step::Reason {
                amount_minor: 100_000,
                account: Some(Account::Bank),
            },
        };
        let outcome = advance(session.clone(), "bo qua");
        assert_eq!(
            outcome,
            StepOutcome::Reprompt(ui::PROMPT_ENTRY_REASON_REQUIRED)
        );
        let outcome = advance(session, "  ");
        assert_eq!(
            outcome,
            StepOutcome::Reprompt(ui::PROMPT_ENTRY_REASON_REQUIRED)
        );
    }

    #[test]
    fn transfer_skips_account_step() {
        let outcome = advance(Session::new(Flow::Withdraw), "500k");
        assert!(matches!(
            outcome,
            StepOutcome::Advance(
                Session {
                    step: Step::Reason {
                        amount_minor: 500_000,
                        account: None,
                    },
                    ..
                },
                ui::PROMPT_TRANSFER_REASON,
            )
        ));
    }

    #[test]
    fn transfer_skip_reason_commits_without_reason() {
        let session = Session {
            flow: Flow::Deposit,
            step: Step::Reason {
                amount_minor: 300_000,
                account: None,
            },
        };
        let outcome = advance(session, "BO QUA");
        assert_eq!(
            outcome,
            StepOutcome::Commit(Completed::Transfer {
                direction: TransferDirection::CashToBank,
                amount_minor: 300_000,
                reason: None,
            })
        );
    }

    #[test]
    fn transfer_reason_is_kept_when_given() {
        let session = Session {
            flow: Flow::Withdraw,
            step: Step::Reason {
                amount_minor: 500_000,
                account: None,
            },
        };
        let outcome = advance(session, "rút ATM");
        assert_eq!(
            outcome,
            StepOutcome::Commit(Completed::Transfer {
                direction: TransferDirection::BankToCash,
                amount_minor: 500_000,
                reason: Some("rút ATM".to_string()),
            })
        );
    }
}
