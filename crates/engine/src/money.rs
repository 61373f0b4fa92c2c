//! Amount parsing and formatting.
//!
//! Amounts are unsigned integer amounts of the smallest currency unit (đồng).
//! User input supports the shorthand suffixes `k` (×1 000) and `tr`
//! (×1 000 000), e.g. `100k` or `2tr`.

/// Parses a free-text token into an amount in đồng.
///
/// The leading run of ASCII digits is the base value. A `k` anywhere in the
/// (lower-cased) text multiplies by 1 000, else a `tr` by 1 000 000. The
/// containment check is deliberately loose: `"100k abc"` and even `"5km"`
/// parse. Returns `None` when there is no leading integer.
///
/// `k` is tested first: amount-step input carries the whole message, and a
/// trailing word containing `tr` (say `"100k trà sữa"`) must not turn a
/// thousands amount into millions.
pub fn parse_amount(text: &str) -> Option<i64> {
    let text = text.to_lowercase();
    let value = leading_integer(&text)?;

    if text.contains('k') {
        return value.checked_mul(1_000);
    }
    if text.contains("tr") {
        return value.checked_mul(1_000_000);
    }
    Some(value)
}

fn leading_integer(text: &str) -> Option<i64> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Formats an amount with `.` thousands separators, e.g. `1234567` →
/// `"1.234.567"`. The currency sign is left to the caller.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }

    let first = digits.len() % 3;
    let first = if first == 0 { 3 } else { first };
    out.push_str(&digits[..first]);
    for chunk in digits[first..].as_bytes().chunks(3) {
        out.push('.');
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    out
}
