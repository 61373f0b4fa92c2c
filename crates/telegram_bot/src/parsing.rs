use engine::{Account, parse_amount};

/// One-line `/thu`/`/chi` arguments: amount, optional account token, reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EntryInput {
    pub amount_minor: i64,
    pub account: Account,
    pub reason: String,
}

/// One-line `/rut`/`/nap` arguments: amount and an optional reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TransferInput {
    pub amount_minor: i64,
    pub reason: Option<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("số tiền không hợp lệ")]
    InvalidAmount,
    #[error("thiếu lý do")]
    MissingReason,
}

/// First token is the amount, the second is consumed as the account when it
/// matches a known token (otherwise the account defaults to cash), the rest
/// is the reason.
pub(crate) fn parse_entry_input(input: &str) -> Result<EntryInput, ParseError> {
    let mut tokens = input.split_whitespace();
    let amount_minor = tokens
        .next()
        .and_then(parse_amount)
        .filter(|amount| *amount > 0)
        .ok_or(ParseError::InvalidAmount)?;

    let mut tokens = tokens.peekable();
    let account = match tokens.peek().copied().and_then(Account::parse_token) {
        Some(account) => {
            tokens.next();
            account
        }
        None => Account::Cash,
    };

    let reason = tokens.collect::<Vec<_>>().join(" ");
    if reason.is_empty() {
        return Err(ParseError::MissingReason);
    }

    Ok(EntryInput {
        amount_minor,
        account,
        reason,
    })
}

pub(crate) fn parse_transfer_input(input: &str) -> Result<TransferInput, ParseError> {
    let mut tokens = input.split_whitespace();
    let amount_minor = tokens
        .next()
        .and_then(parse_amount)
        .filter(|amount| *amount > 0)
        .ok_or(ParseError::InvalidAmount)?;

    let reason = tokens.collect::<Vec<_>>().join(" ");
    let reason = (!reason.is_empty()).then_some(reason);

    Ok(TransferInput {
        amount_minor,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_with_account_token() {
        let parsed = parse_entry_input("100k tm lương tháng").unwrap();
        assert_eq!(parsed.amount_minor, 100_000);
        assert_eq!(parsed.account, Account::Cash);
        assert_eq!(parsed.reason, "lương tháng");
    }

    #[test]
    fn entry_without_account_defaults_to_cash() {
        let parsed = parse_entry_input("50k ăn trưa").unwrap();
        assert_eq!(parsed.account, Account::Cash);
        assert_eq!(parsed.reason, "ăn trưa");
    }

    #[test]
    fn entry_with_bank_token() {
        let parsed = parse_entry_input("2tr tk bán đồ cũ").unwrap();
        assert_eq!(parsed.amount_minor, 2_000_000);
        assert_eq!(parsed.account, Account::Bank);
        assert_eq!(parsed.reason, "bán đồ cũ");
    }

    #[test]
    fn entry_rejects_bad_amount() {
        assert_eq!(
            parse_entry_input("abc lương"),
            Err(ParseError::InvalidAmount)
        );
        assert_eq!(parse_entry_input(""), Err(ParseError::InvalidAmount));
    }

    #[test]
    fn entry_rejects_missing_reason() {
        assert_eq!(parse_entry_input("100k"), Err(ParseError::MissingReason));
        assert_eq!(parse_entry_input("100k tk"), Err(ParseError::MissingReason));
    }

    #[test]
    fn transfer_reason_is_optional() {
        let parsed = parse_transfer_input("500k").unwrap();
        assert_eq!(parsed.amount_minor, 500_000);
        assert_eq!(parsed.reason, None);

        let parsed = parse_transfer_input("500k rút ATM").unwrap();
        assert_eq!(parsed.reason.as_deref(), Some("rút ATM"));
    }

    #[test]
    fn transfer_rejects_bad_amount() {
        assert_eq!(parse_transfer_input("xyz"), Err(ParseError::InvalidAmount));
    }
}
