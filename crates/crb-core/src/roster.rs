//! Operator views over the channel roster.

use chrono::{DateTime, Utc};

use crate::formatting::escape_html;
use crate::store::{ChannelRecord, MemberGrowth, StoreStats};

/// Telegram hard-caps messages at 4096 chars; stop a little short.
const LIST_CHAR_LIMIT: usize = 4000;

pub fn render_channel_list(entries: &[(ChannelRecord, MemberGrowth)]) -> String {
    let mut out = String::from("📋 <b>Registered Channels:</b>\n\n");

    for (i, (rec, growth)) in entries.iter().enumerate() {
        let username = rec
            .username
            .as_deref()
            .map(|u| format!("@{u}"))
            .unwrap_or_else(|| "No Username".to_string());
        let entry = format!(
            "{}. <b>{}</b>\n   👥 Members: {}\n   📈 Today: {}\n   📧 Username: {}\n   📅 Registered: {}\n\n",
            i + 1,
            escape_html(&rec.name),
            rec.current_members,
            render_growth(growth),
            escape_html(&username),
            rec.registered_at.format("%Y-%m-%d"),
        );
        if out.len() + entry.len() > LIST_CHAR_LIMIT {
            out.push_str("... (list truncated)");
            break;
        }
        out.push_str(&entry);
    }

    out
}

pub fn render_stats(stats: &StoreStats, now: DateTime<Utc>) -> String {
    format!(
        "📊 <b>Bot Statistics</b>\n\n\
         🏢 Total Channels: {}\n\
         👥 Total Members: {}\n\
         🕒 Last Updated: {}\n\
         🤖 Bot Status: ✅ Running",
        stats.active_channels,
        stats.total_members,
        now.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn render_growth(growth: &MemberGrowth) -> String {
    match growth {
        MemberGrowth::Delta(d) if *d > 0 => format!("+{d}"),
        MemberGrowth::Delta(d) => d.to_string(),
        MemberGrowth::NewTracking => "New tracking".to_string(),
        MemberGrowth::NoData => "No data".to_string(),
    }
}
