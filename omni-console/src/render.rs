//! Plain-text rendering of feed state for the terminal.

use omni_feed::feed::FeedStats;
use omni_feed::utils::format_bogota;
use omni_feed::{ConversationSummary, Message, SocketStatus};

const PREVIEW_CHARS: usize = 48;

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out.replace('\n', " ")
}

/// One line per conversation: flags, channel, name, time and last message.
pub fn conversation_row(summary: &ConversationSummary) -> String {
    let unread = if summary.unread { '●' } else { ' ' };
    let managed = if summary.managed { '✓' } else { ' ' };
    let when = summary
        .last_timestamp
        .as_deref()
        .map(format_bogota)
        .unwrap_or_default();

    format!(
        "{}{} {:<9} {:<20} {:<16} {:<16} {}",
        unread,
        managed,
        summary.channel.normalized().as_str(),
        summary.display_name,
        summary.user_id,
        when,
        preview(&summary.last_message)
    )
}

pub fn message_line(message: &Message) -> String {
    let arrow = if message.from_customer { '<' } else { '>' };
    format!(
        "{} [{}] {}: {}",
        arrow,
        format_bogota(&message.timestamp),
        message.sender_name,
        message.body
    )
}

pub fn transcript(summary: &ConversationSummary) -> String {
    let mut out = format!(
        "{} ({}, {})\n",
        summary.display_name,
        summary.channel.normalized(),
        summary.user_id
    );
    if summary.messages.is_empty() {
        out.push_str("  (no messages)\n");
    }
    for message in &summary.messages {
        out.push_str(&message_line(message));
        out.push('\n');
    }
    out
}

pub fn stats(stats: &FeedStats) -> String {
    let mut out = format!(
        "total {}  unread {}  managed {}  pending {}\n",
        stats.total, stats.unread, stats.managed, stats.pending
    );
    for channel in &stats.channels {
        out.push_str(&format!(
            "  {:<9} total {:>4}  active {:>4}  managed {:>4}\n",
            channel.channel.as_str(), channel.total, channel.active, channel.managed
        ));
    }
    out
}

pub fn socket_status(status: &SocketStatus) -> String {
    match status {
        SocketStatus::Connecting => "connecting".to_string(),
        SocketStatus::Connected => "live".to_string(),
        SocketStatus::Reconnecting { attempt, delay } => {
            format!("reconnecting (attempt {} in {}ms)", attempt, delay.as_millis())
        }
        SocketStatus::Closed => "closed".to_string(),
        SocketStatus::GaveUp => "offline, retries exhausted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_feed::Channel;
    use std::time::Duration;

    fn summary() -> ConversationSummary {
        ConversationSummary {
            id: "c3".to_string(),
            conversation_id: Some("c3".to_string()),
            user_id: "psid-5".to_string(),
            channel: Channel::Messenger,
            display_name: "Luis".to_string(),
            last_message: "hola".to_string(),
            last_timestamp: Some("2025-03-01T15:00:00Z".to_string()),
            unread: true,
            urgent: false,
            managed: false,
            kind: "inbox".to_string(),
            messages: vec![Message {
                id: "c3-0".to_string(),
                from_customer: true,
                body: "hola".to_string(),
                timestamp: "2025-03-01T15:00:00Z".to_string(),
                sender_name: "Luis".to_string(),
            }],
        }
    }

    #[test]
    fn test_row_shows_facebook_and_bogota_time() {
        let row = conversation_row(&summary());
        assert!(row.starts_with('●'));
        assert!(row.contains("facebook"));
        assert!(row.contains("2025-03-01 10:00"));
        assert!(row.ends_with("hola"));
    }

    #[test]
    fn test_long_preview_truncated() {
        let mut s = summary();
        s.last_message = "x".repeat(100);
        let row = conversation_row(&s);
        assert!(row.ends_with('…'));
        assert!(!row.contains(&"x".repeat(49)));
    }

    #[test]
    fn test_transcript_lines() {
        let out = transcript(&summary());
        assert!(out.starts_with("Luis (facebook, psid-5)"));
        assert!(out.contains("< [2025-03-01 10:00] Luis: hola"));
    }

    #[test]
    fn test_stats_lists_every_channel() {
        let feed_stats = FeedStats::from_conversations(&[summary()]);
        let out = stats(&feed_stats);
        assert!(out.starts_with("total 1  unread 1  managed 0  pending 1"));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_status_text() {
        let status = SocketStatus::Reconnecting {
            attempt: 2,
            delay: Duration::from_millis(6000),
        };
        assert_eq!(socket_status(&status), "reconnecting (attempt 2 in 6000ms)");
        assert_eq!(socket_status(&SocketStatus::GaveUp), "offline, retries exhausted");
    }
}
