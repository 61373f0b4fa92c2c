use teloxide::types::BotCommand;

/// Slash-command grammar. Entry and transfer commands carry their optional
/// one-line arguments; the split into amount/account/reason happens in
/// [`crate::parsing`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Thu(Option<String>),
    Chi(Option<String>),
    Rut(Option<String>),
    Nap(Option<String>),
    ThongKe,
    Huy,
    Start,
    Menu,
    Help,
}

/// Parses `/name[@botname] [args]`, case-insensitively on the name.
pub(crate) fn parse(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let head = parts.next()?;
    let args = parts
        .next()
        .map(str::trim)
        .filter(|args| !args.is_empty())
        .map(str::to_string);

    // "/thu@my_bot" addresses this bot in a group chat.
    let name = head.split('@').next()?.to_ascii_lowercase();

    match name.as_str() {
        "thu" => Some(Command::Thu(args)),
        "chi" => Some(Command::Chi(args)),
        "rut" => Some(Command::Rut(args)),
        "nap" => Some(Command::Nap(args)),
        "thongke" => Some(Command::ThongKe),
        "huy" => Some(Command::Huy),
        "start" => Some(Command::Start),
        "menu" => Some(Command::Menu),
        "help" => Some(Command::Help),
        _ => None,
    }
}

/// The command list registered with Telegram at startup.
pub(crate) fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Mở menu thao tác nhanh"),
        BotCommand::new("menu", "Hiển thị menu nút bấm"),
        BotCommand::new("thu", "Bắt đầu ghi khoản thu"),
        BotCommand::new("chi", "Bắt đầu ghi khoản chi"),
        BotCommand::new("rut", "Bắt đầu ghi giao dịch rút tiền"),
        BotCommand::new("nap", "Bắt đầu ghi giao dịch nạp tiền"),
        BotCommand::new("thongke", "Xem thống kê tổng quát"),
        BotCommand::new("huy", "Hủy thao tác đang nhập"),
        BotCommand::new("help", "Xem hướng dẫn sử dụng bot"),
    ]
}
