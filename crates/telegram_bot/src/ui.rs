//! Keyboards and user-facing message formatting.
//!
//! All user-visible strings live here so the handlers stay readable.

use engine::{Account, ReportSnapshot, TransactionKind, TransferDirection, format_amount};
use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub(crate) const BUTTON_THU: &str = "➕ Thu";
pub(crate) const BUTTON_CHI: &str = "➖ Chi";
pub(crate) const BUTTON_RUT: &str = "🏧 Rút";
pub(crate) const BUTTON_NAP: &str = "🏦 Nạp";
pub(crate) const BUTTON_THONGKE: &str = "📈 Thống kê";
pub(crate) const BUTTON_HELP: &str = "📘 Help";
pub(crate) const BUTTON_HUY: &str = "❌ Hủy";

pub(crate) const MSG_MENU_DEFAULT: &str = "Chọn thao tác bên dưới:";
pub(crate) const MSG_MENU_START: &str = "Chọn thao tác bằng nút bên dưới:";
pub(crate) const MSG_CANCELLED: &str = "Đã hủy thao tác hiện tại.";
pub(crate) const MSG_SESSION_IN_PROGRESS: &str =
    "Bạn đang nhập dở một thao tác. Bấm ❌ Hủy để hủy thao tác hiện tại.";
pub(crate) const MSG_HANDLER_FAILURE: &str = "❌ Có lỗi khi xử lý yêu cầu. Vui lòng thử lại.";

pub(crate) const PROMPT_AMOUNT_INVALID: &str =
    "⚠️ Số tiền không hợp lệ, vui lòng nhập lại (ví dụ: 100k)";
pub(crate) const PROMPT_ACCOUNT: &str =
    "Tiền thuộc nguồn nào? Nhập `tm` (tiền mặt) hoặc `tk` (tài khoản)";
pub(crate) const PROMPT_ACCOUNT_INVALID: &str =
    "⚠️ Nguồn tiền không hợp lệ. Vui lòng nhập `tm` hoặc `tk`.";
pub(crate) const PROMPT_ENTRY_REASON: &str = "Nhập lý do thu/chi";
pub(crate) const PROMPT_ENTRY_REASON_REQUIRED: &str = "⚠️ Vui lòng nhập lý do cho khoản thu/chi.";
pub(crate) const PROMPT_TRANSFER_REASON: &str = "Nhập lý do (có thể nhập `bo qua` nếu không có)";

pub(crate) fn main_menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(BUTTON_THU),
            KeyboardButton::new(BUTTON_CHI),
        ],
        vec![
            KeyboardButton::new(BUTTON_RUT),
            KeyboardButton::new(BUTTON_NAP),
        ],
        vec![
            KeyboardButton::new(BUTTON_THONGKE),
            KeyboardButton::new(BUTTON_HELP),
        ],
        vec![KeyboardButton::new(BUTTON_HUY)],
    ])
    .resize_keyboard()
}

pub(crate) fn conversation_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BUTTON_HUY)]]).resize_keyboard()
}

pub(crate) fn is_menu_button(text: &str) -> bool {
    [
        BUTTON_THU,
        BUTTON_CHI,
        BUTTON_RUT,
        BUTTON_NAP,
        BUTTON_THONGKE,
        BUTTON_HELP,
        BUTTON_HUY,
    ]
    .contains(&text)
}

pub(crate) fn account_label(account: Account) -> &'static str {
    match account {
        Account::Cash => "Tiền mặt",
        Account::Bank => "Tài khoản",
    }
}

pub(crate) fn format_overview(report: &ReportSnapshot) -> String {
    format!(
        "📈 THỐNG KÊ TỔNG QUÁT\n\
         -------------------\n\
         Tổng giao dịch: {}\n\
         Tổng thu: {}đ\n\
         Tổng chi: {}đ\n\
         Số dư tiền mặt: {}đ\n\
         Số dư tiền tài khoản: {}đ\n\
         Tổng số dư: {}đ",
        report.transaction_count,
        format_amount(report.income),
        format_amount(report.expense),
        format_amount(report.cash_balance),
        format_amount(report.bank_balance),
        format_amount(report.total_balance),
    )
}

/// The long form of the report, used by the daily broadcast. Carries the
/// top-3 expenses on top of the overview numbers.
pub(crate) fn format_summary(report: &ReportSnapshot, title: &str) -> String {
    let top_lines = if report.top_expenses.is_empty() {
        "- Chưa có khoản chi nào".to_string()
    } else {
        report
            .top_expenses
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let reason = if item.reason.is_empty() {
                    "Không có lý do"
                } else {
                    item.reason.as_str()
                };
                format!(
                    "{}. {}đ - {} ({})",
                    idx + 1,
                    format_amount(item.amount_minor),
                    reason,
                    account_label(item.account),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{title}\n\
         -------------------\n\
         Tổng thu: {}đ\n\
         Tổng chi: {}đ\n\
         Số dư tiền mặt: {}đ\n\
         Số dư tiền tài khoản: {}đ\n\
         Tổng số dư: {}đ\n\
         \n\
         Top 3 khoản chi lớn nhất:\n\
         {top_lines}",
        format_amount(report.income),
        format_amount(report.expense),
        format_amount(report.cash_balance),
        format_amount(report.bank_balance),
        format_amount(report.total_balance),
    )
}

pub(crate) fn help_text() -> &'static str {
    concat!(
        "📘 HƯỚNG DẪN SỬ DỤNG SỔ QUỸ\n",
        "-------------------\n",
        "Bạn có thể dùng 2 cách:\n",
        "\n",
        "1) Cách hội thoại\n",
        "- /thu, /chi, /rut, /nap\n",
        "Bot sẽ hỏi từng bước để nhập.\n",
        "\n",
        "2) Cách nhập 1 dòng\n",
        "- /thu <số_tiền> [tm|tk] <lý_do>\n",
        "  Ví dụ: /thu 100k tm lương tháng\n",
        "- /chi <số_tiền> [tm|tk] <lý_do>\n",
        "  Ví dụ: /chi 50k tk ăn trưa\n",
        "- /rut <số_tiền> [lý_do]\n",
        "  Ví dụ: /rut 500k rút ATM\n",
        "- /nap <số_tiền> [lý_do]\n",
        "  Ví dụ: /nap 300k nạp vào tài khoản\n",
        "\n",
        "Lệnh khác:\n",
        "- /thongke: xem thống kê tổng quát\n",
        "- /huy: hủy thao tác đang nhập\n",
        "\n",
        "Mẹo: bạn có thể bấm các nút ô vuông để thao tác nhanh, không cần gõ lệnh.",
    )
}

pub(crate) fn entry_saved_message(
    kind: TransactionKind,
    amount_minor: i64,
    account: Account,
    reason: &str,
) -> String {
    let (emoji, action) = match kind {
        TransactionKind::Income => ("✅", "thu"),
        _ => ("💸", "chi"),
    };
    format!(
        "{emoji} Đã ghi nhận {action} {}đ ({})\nLý do: {reason}",
        format_amount(amount_minor),
        account_label(account),
    )
}

pub(crate) fn transfer_saved_message(direction: TransferDirection, amount_minor: i64) -> String {
    match direction {
        TransferDirection::BankToCash => format!(
            "🏧 Đã rút {}đ từ Tài khoản sang Tiền mặt",
            format_amount(amount_minor)
        ),
        TransferDirection::CashToBank => format!(
            "🏦 Đã nạp {}đ từ Tiền mặt vào Tài khoản",
            format_amount(amount_minor)
        ),
    }
}
