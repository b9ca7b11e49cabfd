//! Operator-facing report rendering for fan-out runs.
//!
//! Reports are bounded: Telegram rejects over-long messages, so detailed
//! sections are cut off with a "... and N more" trailer.

use crate::fanout::{FanOutRun, TargetOutcome, TargetResult};
use crate::formatting::escape_html;

/// Per-target lines shown in ban/unban reports before truncation.
pub const DETAIL_LINE_LIMIT: usize = 15;
/// Failed-target lines shown in broadcast reports before truncation.
pub const FAILED_LINE_LIMIT: usize = 5;

pub fn render_ban_report(user_id: &str, run: &FanOutRun) -> String {
    let mut out = format!(
        "🔨 <b>Ban Operation Completed</b>\n\n\
         👤 User ID: <code>{}</code>\n\
         📊 Results:\n\
         • Total Channels: {}\n\
         • ✅ Successful Bans: {}\n\
         • ❌ Failed Bans: {}\n\n\
         📋 Detailed Results:\n",
        escape_html(user_id),
        run.results.len(),
        run.succeeded,
        run.failed,
    );
    push_result_lines(&mut out, &run.results, "Banned successfully");
    out
}

pub fn render_unban_report(user_id: &str, run: &FanOutRun) -> String {
    let mut out = format!(
        "🔓 <b>Unban Operation Completed</b>\n\n\
         👤 User ID: <code>{}</code>\n\
         📊 Results:\n\
         • Total Channels: {}\n\
         • ✅ Successful Unbans: {}\n\
         • ❌ Failed Unbans: {}\n\n\
         📋 Detailed Results:\n",
        escape_html(user_id),
        run.results.len(),
        run.succeeded,
        run.failed,
    );
    push_result_lines(&mut out, &run.results, "Unbanned successfully");
    out
}

pub fn render_broadcast_report(broadcast_id: &str, run: &FanOutRun) -> String {
    let mut out = format!(
        "📢 <b>Broadcast Completed</b>\n\n\
         📊 Results:\n\
         • Total Channels: {}\n\
         • ✅ Successful: {}\n\
         • ❌ Failed: {}\n\n\
         💾 Broadcast ID: <code>{}</code>\n\n\
         To delete this broadcast from all channels, use:\n\
         <code>/del {}</code>\n",
        run.results.len(),
        run.succeeded,
        run.failed,
        broadcast_id,
        broadcast_id,
    );

    let failed: Vec<&TargetResult> = run
        .results
        .iter()
        .filter(|r| !r.outcome.is_success())
        .collect();
    if !failed.is_empty() {
        out.push_str("\n❌ Failed Channels:\n");
        for (i, r) in failed.iter().take(FAILED_LINE_LIMIT).enumerate() {
            let reason = match &r.outcome {
                TargetOutcome::Skipped { reason } | TargetOutcome::Failed { reason } => {
                    reason.as_str()
                }
                TargetOutcome::Success => continue,
            };
            out.push_str(&format!(
                "{}. {} - {}\n",
                i + 1,
                escape_html(&r.name),
                escape_html(reason)
            ));
        }
        if failed.len() > FAILED_LINE_LIMIT {
            out.push_str(&format!("... and {} more", failed.len() - FAILED_LINE_LIMIT));
        }
    }

    out
}

pub fn render_delete_report(total_messages: usize, succeeded: usize, failed: usize) -> String {
    format!(
        "🗑 <b>Deletion Completed</b>\n\n\
         📊 Results:\n\
         • Total Messages: {total_messages}\n\
         • ✅ Successful Deletes: {succeeded}\n\
         • ❌ Failed Deletes: {failed}",
    )
}

pub fn render_progress(
    heading: &str,
    succeeded: usize,
    failed: usize,
    processed: usize,
    total: usize,
) -> String {
    format!(
        "{heading}\n\
         ✅ Successful: {succeeded}\n\
         ❌ Failed: {failed}\n\
         📊 Progress: {processed}/{total}",
    )
}

fn push_result_lines(out: &mut String, results: &[TargetResult], success_label: &str) {
    for (i, r) in results.iter().take(DETAIL_LINE_LIMIT).enumerate() {
        let line = match &r.outcome {
            TargetOutcome::Success => format!("✅ {} - {}", escape_html(&r.name), success_label),
            TargetOutcome::Skipped { reason } => {
                format!("ℹ️ {} - {}", escape_html(&r.name), escape_html(reason))
            }
            TargetOutcome::Failed { reason } => {
                format!("❌ {} - {}", escape_html(&r.name), escape_html(reason))
            }
        };
        out.push_str(&format!("{}. {}\n", i + 1, line));
    }
    if results.len() > DETAIL_LINE_LIMIT {
        out.push_str(&format!(
            "\n... and {} more channels",
            results.len() - DETAIL_LINE_LIMIT
        ));
    }
}
