//! Broadcast fan-out and retraction.
//!
//! Delivery results are held in process memory only, so a restart makes
//! older broadcasts impossible to retract.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    classify::{classify_broadcast, classify_delete},
    domain::{ChatId, MessageId},
    fanout::{self, FanOutAction, FanOutTarget, ProgressSink, TargetOutcome},
    moderation::{targets, NO_CHANNELS},
    ports::{BroadcastContent, ChannelApi, StatusMessage},
    report,
    store::ChannelStore,
    Error, Result,
};

pub const BROADCAST_NOT_FOUND: &str = "❌ Broadcast ID not found or already deleted.";

/// Pacing knobs for send/delete fan-outs.
#[derive(Clone, Copy, Debug)]
pub struct BroadcastPacing {
    pub send_delay: Duration,
    pub delete_delay: Duration,
    pub progress_every: usize,
}

impl Default for BroadcastPacing {
    fn default() -> Self {
        Self {
            send_delay: Duration::from_millis(500),
            delete_delay: Duration::from_millis(300),
            progress_every: 5,
        }
    }
}

/// Per-channel delivery result kept for later retraction.
#[derive(Clone, Debug)]
pub enum Delivery {
    Delivered { message_id: MessageId },
    Failed { reason: String },
}

/// Everything remembered about one completed broadcast, in fan-out order.
#[derive(Clone, Debug)]
pub struct BroadcastRecord {
    pub entries: Vec<(ChatId, String, Delivery)>,
}

/// Broadcast send/retract service. Constructed once at startup; the ledger
/// maps `broadcast_<messageId>` handles to their delivery records.
pub struct Broadcaster {
    api: Arc<dyn ChannelApi>,
    store: Arc<dyn ChannelStore>,
    pacing: BroadcastPacing,
    ledger: Mutex<HashMap<String, BroadcastRecord>>,
}

impl Broadcaster {
    pub fn new(
        api: Arc<dyn ChannelApi>,
        store: Arc<dyn ChannelStore>,
        pacing: BroadcastPacing,
    ) -> Self {
        Self {
            api,
            store,
            pacing,
            ledger: Mutex::new(HashMap::new()),
        }
    }

    /// Send `content` to every registered channel, editing `status` in place
    /// as the run progresses. Returns the final operator report.
    pub async fn broadcast(
        &self,
        content: &BroadcastContent,
        source_message: MessageId,
        status: &dyn StatusMessage,
    ) -> Result<String> {
        let channels = self.store.list_active().await?;
        if channels.is_empty() {
            return Ok(NO_CHANNELS.to_string());
        }

        let targets = targets(&channels);
        let action = SendAction {
            api: Arc::clone(&self.api),
            content: content.clone(),
            delay: self.pacing.send_delay,
        };
        let progress = StatusProgress {
            status,
            heading: "🔄 Broadcasting...",
            total: targets.len(),
        };
        let run = fanout::run(&targets, &action, Some(&progress), self.pacing.progress_every).await;

        let broadcast_id = format!("broadcast_{}", source_message.0);
        let entries = run
            .results
            .iter()
            .map(|r| {
                let delivery = match &r.outcome {
                    TargetOutcome::Success => match r.message_id {
                        Some(message_id) => Delivery::Delivered { message_id },
                        None => Delivery::Failed {
                            reason: "message id not recorded".to_string(),
                        },
                    },
                    TargetOutcome::Skipped { reason } | TargetOutcome::Failed { reason } => {
                        Delivery::Failed {
                            reason: reason.clone(),
                        }
                    }
                };
                (r.chat_id, r.name.clone(), delivery)
            })
            .collect();
        self.ledger
            .lock()
            .await
            .insert(broadcast_id.clone(), BroadcastRecord { entries });

        tracing::info!(
            broadcast_id = %broadcast_id,
            succeeded = run.succeeded,
            failed = run.failed,
            "broadcast finished"
        );
        Ok(report::render_broadcast_report(&broadcast_id, &run))
    }

    pub async fn contains(&self, broadcast_id: &str) -> bool {
        self.ledger.lock().await.contains_key(broadcast_id)
    }

    /// Delete every delivered message of a completed broadcast and drop its
    /// record. Entries that never got delivered are skipped outright: no
    /// delete call, no pacing delay, no progress tick.
    pub async fn delete_broadcast(
        &self,
        broadcast_id: &str,
        status: &dyn StatusMessage,
    ) -> Result<String> {
        let Some(record) = self.ledger.lock().await.remove(broadcast_id) else {
            return Ok(BROADCAST_NOT_FOUND.to_string());
        };
        let total = record.entries.len();

        let mut targets = Vec::new();
        let mut message_ids = HashMap::new();
        for (chat_id, name, delivery) in &record.entries {
            if let Delivery::Delivered { message_id } = delivery {
                targets.push(FanOutTarget {
                    chat_id: *chat_id,
                    name: name.clone(),
                });
                message_ids.insert(chat_id.0, *message_id);
            }
        }

        let action = DeleteAction {
            api: Arc::clone(&self.api),
            message_ids,
            delay: self.pacing.delete_delay,
        };
        let progress = StatusProgress {
            status,
            heading: "🔄 Deleting...",
            total,
        };
        let run = fanout::run(&targets, &action, Some(&progress), self.pacing.progress_every).await;

        tracing::info!(
            broadcast_id,
            succeeded = run.succeeded,
            failed = run.failed,
            "delete fan-out finished"
        );
        Ok(report::render_delete_report(total, run.succeeded, run.failed))
    }
}

struct SendAction {
    api: Arc<dyn ChannelApi>,
    content: BroadcastContent,
    delay: Duration,
}

#[async_trait]
impl FanOutAction for SendAction {
    async fn apply(&self, target: &FanOutTarget) -> Result<Option<MessageId>> {
        let id = self.api.send_content(target.chat_id, &self.content).await?;
        Ok(Some(id))
    }

    fn classify(&self, err: &Error) -> TargetOutcome {
        classify_broadcast(err)
    }

    fn pause_after(&self, outcome: &TargetOutcome) -> Option<Duration> {
        // Only delivered messages count against the flood limit.
        outcome.is_success().then_some(self.delay)
    }
}

struct DeleteAction {
    api: Arc<dyn ChannelApi>,
    message_ids: HashMap<i64, MessageId>,
    delay: Duration,
}

#[async_trait]
impl FanOutAction for DeleteAction {
    async fn apply(&self, target: &FanOutTarget) -> Result<Option<MessageId>> {
        let Some(message_id) = self.message_ids.get(&target.chat_id.0) else {
            return Err(Error::BadRequest("message id not recorded".to_string()));
        };
        self.api.delete_message(target.chat_id, *message_id).await?;
        Ok(None)
    }

    fn classify(&self, err: &Error) -> TargetOutcome {
        classify_delete(err)
    }

    fn pause_after(&self, _outcome: &TargetOutcome) -> Option<Duration> {
        Some(self.delay)
    }
}

struct StatusProgress<'a> {
    status: &'a dyn StatusMessage,
    heading: &'static str,
    total: usize,
}

#[async_trait]
impl ProgressSink for StatusProgress<'_> {
    async fn update(&self, processed: usize, succeeded: usize, failed: usize) {
        let text = report::render_progress(self.heading, succeeded, failed, processed, self.total);
        if let Err(err) = self.status.edit(&text).await {
            tracing::debug!(error = %err, "progress edit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{ApiCall, ErrSpec, FakeApi, FakeStore, RecordingStatus};

    fn zero_pacing() -> BroadcastPacing {
        BroadcastPacing {
            send_delay: Duration::ZERO,
            delete_delay: Duration::ZERO,
            progress_every: 5,
        }
    }

    fn broadcaster(api: Arc<FakeApi>, store: Arc<FakeStore>) -> Broadcaster {
        Broadcaster::new(api, store, zero_pacing())
    }

    fn text_content() -> BroadcastContent {
        BroadcastContent::Text {
            text: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_roster_reports_no_channels() {
        let api = Arc::new(FakeApi::new());
        let b = broadcaster(api.clone(), Arc::new(FakeStore::new()));
        let status = RecordingStatus::new();

        let reply = b.broadcast(&text_content(), MessageId(1), &status).await.unwrap();
        assert_eq!(reply, NO_CHANNELS);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn broadcast_then_delete_round_trip() {
        let api = Arc::new(FakeApi::new());
        let store = Arc::new(FakeStore::with_channels(4));
        api.fail_chat(-1003, ErrSpec::BadRequest("Bad Request: chat not found"));
        let b = broadcaster(api.clone(), store);
        let status = RecordingStatus::new();

        let report = b.broadcast(&text_content(), MessageId(99), &status).await.unwrap();
        assert!(report.contains("• ✅ Successful: 3"));
        assert!(report.contains("• ❌ Failed: 1"));
        assert!(report.contains("broadcast_99"));
        assert!(b.contains("broadcast_99").await);

        let delete_report = b.delete_broadcast("broadcast_99", &status).await.unwrap();
        assert!(delete_report.contains("• Total Messages: 4"));
        assert!(delete_report.contains("• ✅ Successful Deletes: 3"));

        // Exactly one delete per delivered message, none for the failed channel.
        let delete_count = api
            .calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Delete(..)))
            .count();
        assert_eq!(delete_count, 3);
        assert!(!api
            .calls()
            .iter()
            .any(|c| matches!(c, ApiCall::Delete(-1003, _))));

        // Record is gone; a second delete reports not-found.
        assert!(!b.contains("broadcast_99").await);
        let again = b.delete_broadcast("broadcast_99", &status).await.unwrap();
        assert_eq!(again, BROADCAST_NOT_FOUND);
    }

    #[tokio::test]
    async fn broadcast_progress_edits_every_five() {
        let api = Arc::new(FakeApi::new());
        let store = Arc::new(FakeStore::with_channels(12));
        let b = broadcaster(api, store);
        let status = RecordingStatus::new();

        let _ = b.broadcast(&text_content(), MessageId(5), &status).await.unwrap();

        let edits = status.edits();
        assert_eq!(edits.len(), 2); // floor(12 / 5)
        assert!(edits[0].contains("📊 Progress: 5/12"));
        assert!(edits[1].contains("📊 Progress: 10/12"));
    }

    #[tokio::test]
    async fn delete_progress_totals_count_all_entries() {
        let api = Arc::new(FakeApi::new());
        let store = Arc::new(FakeStore::with_channels(12));
        // Five channels never get the message delivered.
        for i in 1..=5 {
            api.fail_chat(-(1000 + i), ErrSpec::Forbidden);
        }
        let b = broadcaster(api.clone(), store);
        let status = RecordingStatus::new();

        let _ = b.broadcast(&text_content(), MessageId(7), &status).await.unwrap();

        let delete_status = RecordingStatus::new();
        let report = b
            .delete_broadcast("broadcast_7", &delete_status)
            .await
            .unwrap();

        // 7 delivered entries attempted; totals still speak of all 12.
        assert!(report.contains("• Total Messages: 12"));
        assert!(report.contains("• ✅ Successful Deletes: 7"));
        let edits = delete_status.edits();
        assert_eq!(edits.len(), 1); // floor(7 / 5)
        assert!(edits[0].contains("📊 Progress: 5/12"));
    }
}
