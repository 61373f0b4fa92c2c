//! Background jobs: the daily report broadcast and the keep-alive ping.
//!
//! Each job runs in its own task with its own error boundary. A failed
//! round is logged and the job keeps going; jobs never touch message
//! handling.

use std::time::Duration;

use chrono::{DateTime, Days, Duration as ChronoDuration, TimeZone, Utc};
use chrono_tz::Tz;
use teloxide::{prelude::*, types::ChatId};

use engine::Ledger;

use crate::ui;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(14 * 60);

#[derive(Clone, Debug)]
pub struct ReminderSettings {
    /// Local wall-clock time in `HH:mm`.
    pub time: String,
    pub timezone: Tz,
}

#[derive(Clone, Debug)]
pub struct KeepAliveSettings {
    /// Public base URL of this deployment; the ping hits `{url}/healthz`.
    pub external_url: Option<String>,
    pub sleep_start: u32,
    pub sleep_end: u32,
    pub timezone: Tz,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid reminder time '{0}': expected HH:mm, e.g. 22:20")]
    InvalidReminderTime(String),
}

/// Strict `HH:mm`, both fields two digits.
pub fn parse_reminder_time(text: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = text.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    (hour <= 23 && minute <= 59).then_some((hour, minute))
}

/// Sends the summary report to every subscriber once a day at the
/// configured local time. Returns early only on a malformed time string.
pub async fn run_daily_report(
    token: String,
    ledger: Ledger,
    settings: ReminderSettings,
) -> Result<(), ScheduleError> {
    let (hour, minute) = parse_reminder_time(&settings.time)
        .ok_or_else(|| ScheduleError::InvalidReminderTime(settings.time.clone()))?;

    let bot = Bot::new(token);
    tracing::info!(
        "Daily report enabled at {} ({})",
        settings.time,
        settings.timezone
    );

    loop {
        let next = next_occurrence(Utc::now(), hour, minute, settings.timezone);
        let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        if let Err(err) = broadcast_report(&bot, &ledger, &settings.time).await {
            tracing::error!("daily report broadcast failed: {err}");
        }
    }
}

async fn broadcast_report(
    bot: &Bot,
    ledger: &Ledger,
    time: &str,
) -> Result<(), engine::EngineError> {
    let subscribers = ledger.subscribers().await?;
    if subscribers.is_empty() {
        return Ok(());
    }

    let report = ledger.report().await?;
    let message = ui::format_summary(&report, &format!("📊 BÁO CÁO {time} HẰNG NGÀY"));

    for subscriber in subscribers {
        if let Err(err) = bot
            .send_message(ChatId(subscriber.chat_id), message.clone())
            .await
        {
            tracing::warn!(
                "failed to send daily report to chat {}: {err}",
                subscriber.chat_id
            );
        }
    }
    Ok(())
}

/// Pings our own health endpoint every 14 minutes so free-tier hosting does
/// not idle the process out, pausing inside the configured sleep window.
pub async fn run_keep_alive(settings: KeepAliveSettings) {
    let Some(base_url) = settings.external_url else {
        tracing::info!("No external url configured, keep-alive disabled");
        return;
    };
    let url = format!("{}/healthz", base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    tracing::info!(
        "Keep-alive enabled: ping every 14 minutes, sleeping {}:00-{}:00 ({})",
        settings.sleep_start,
        settings.sleep_end,
        settings.timezone
    );

    let mut interval = tokio::time::interval(KEEP_ALIVE_INTERVAL);
    loop {
        interval.tick().await;

        let hour = Utc::now().with_timezone(&settings.timezone).format("%H");
        let hour: u32 = hour.to_string().parse().unwrap_or(0);
        if in_sleep_window(hour, settings.sleep_start, settings.sleep_end) {
            tracing::debug!("Inside sleep window, skipping keep-alive ping");
            continue;
        }

        match client.get(&url).send().await {
            Ok(response) => tracing::debug!("Keep-alive ping: {}", response.status()),
            Err(err) => tracing::warn!("Keep-alive ping failed: {err}"),
        }
    }
}

/// Next UTC instant at which the local clock reads `hour:minute`.
fn next_occurrence(now: DateTime<Utc>, hour: u32, minute: u32, tz: Tz) -> DateTime<Utc> {
    let now_local = now.with_timezone(&tz);

    for offset in 0..3u64 {
        let Some(date) = now_local.date_naive().checked_add_days(Days::new(offset)) else {
            continue;
        };
        if let Some(candidate) = date
            .and_hms_opt(hour, minute, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
            && candidate > now_local
        {
            return candidate.with_timezone(&Utc);
        }
    }

    // The target fell into a DST gap; try again in an hour.
    now + ChronoDuration::hours(1)
}

fn in_sleep_window(hour: u32, start: u32, end: u32) -> bool {
    if start > end {
        // Window wraps across midnight, e.g. 23:00 -> 06:00.
        hour >= start || hour < end
    } else {
        hour >= start && hour < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Ho_Chi_Minh;

    #[test]
    fn reminder_time_accepts_strict_hh_mm() {
        assert_eq!(parse_reminder_time("22:00"), Some((22, 0)));
        assert_eq!(parse_reminder_time("00:59"), Some((0, 59)));
    }

    #[test]
    fn reminder_time_rejects_malformed_input() {
        assert_eq!(parse_reminder_time("9:30"), None);
        assert_eq!(parse_reminder_time("24:00"), None);
        assert_eq!(parse_reminder_time("22:60"), None);
        assert_eq!(parse_reminder_time("aa:bb"), None);
        assert_eq!(parse_reminder_time("2200"), None);
        assert_eq!(parse_reminder_time(""), None);
    }

    #[test]
    fn sleep_window_wraps_across_midnight() {
        assert!(in_sleep_window(23, 23, 6));
        assert!(in_sleep_window(2, 23, 6));
        assert!(!in_sleep_window(6, 23, 6));
        assert!(!in_sleep_window(12, 23, 6));
    }

    #[test]
    fn sleep_window_plain_range() {
        assert!(in_sleep_window(3, 1, 5));
        assert!(!in_sleep_window(5, 1, 5));
        assert!(!in_sleep_window(0, 1, 5));
    }

    #[test]
    fn next_occurrence_same_day_when_still_ahead() {
        // 20:00 local in Ho Chi Minh City is 13:00 UTC (+07:00, no DST).
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap();
        let next = next_occurrence(now, 22, 0, Ho_Chi_Minh);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn next_occurrence_rolls_to_next_day() {
        // 23:30 local.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 16, 30, 0).unwrap();
        let next = next_occurrence(now, 22, 0, Ho_Chi_Minh);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap());
    }
}
