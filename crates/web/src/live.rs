//! Per-competition fan-out of committed scores and lane changes to connected
//! spectators. Publishing never fails the request that triggered it.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use storage::dto::run_order::LaneTransition;
use storage::dto::scoring::ScoreUpdate;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Outbound message. Serialized with a `type` tag so display clients can
/// dispatch on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    Score {
        athlete_id: Uuid,
        event_id: Uuid,
        value: String,
        points_earned: f64,
        total_points: f64,
    },
    RunOrder {
        event_id: Uuid,
        lane: i32,
        current_slot_id: Option<Uuid>,
        on_deck_slot_id: Option<Uuid>,
    },
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

impl From<&ScoreUpdate> for LiveMessage {
    fn from(update: &ScoreUpdate) -> Self {
        Self::Score {
            athlete_id: update.entry_id,
            event_id: update.event_id,
            value: update.value.clone(),
            points_earned: decimal_to_f64(update.points_earned),
            total_points: decimal_to_f64(update.total_points),
        }
    }
}

impl From<&LaneTransition> for LiveMessage {
    fn from(transition: &LaneTransition) -> Self {
        Self::RunOrder {
            event_id: transition.event_id,
            lane: transition.lane,
            current_slot_id: transition.current.as_ref().map(|s| s.id),
            on_deck_slot_id: transition.on_deck.as_ref().map(|s| s.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiveHub {
    channels: Arc<DashMap<Uuid, broadcast::Sender<LiveMessage>>>,
    capacity: usize,
}

impl LiveHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, competition_id: Uuid) -> broadcast::Receiver<LiveMessage> {
        self.channels
            .entry(competition_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Delivers to every current subscriber of the competition and returns how
    /// many received it. A competition nobody watches costs nothing.
    pub fn publish(&self, competition_id: Uuid, message: LiveMessage) -> usize {
        let delivered = match self.channels.get(&competition_id) {
            Some(sender) => sender.send(message).unwrap_or(0),
            None => return 0,
        };

        if delivered == 0 {
            self.channels
                .remove_if(&competition_id, |_, sender| sender.receiver_count() == 0);
        }

        tracing::debug!(%competition_id, delivered, "Published live update");
        delivered
    }

    pub fn subscriber_count(&self, competition_id: Uuid) -> usize {
        self.channels
            .get(&competition_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn publish_score(&self, update: &ScoreUpdate) -> usize {
        self.publish(update.competition_id, LiveMessage::from(update))
    }

    pub fn publish_lane(&self, transition: &LaneTransition) -> usize {
        self.publish(transition.competition_id, LiveMessage::from(transition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn score(competition_id: Uuid) -> ScoreUpdate {
        ScoreUpdate {
            competition_id,
            entry_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            value: "1+00:01:10.00".to_string(),
            points_earned: Decimal::new(25, 1),
            event_rank: Some(2),
            total_points: Decimal::new(125, 1),
        }
    }

    #[test]
    fn test_score_message_shape() {
        let update = score(Uuid::new_v4());
        let json = serde_json::to_value(LiveMessage::from(&update)).unwrap();

        assert_eq!(json["type"], "score");
        assert_eq!(json["athlete_id"], update.entry_id.to_string());
        assert_eq!(json["event_id"], update.event_id.to_string());
        assert_eq!(json["value"], "1+00:01:10.00");
        assert_eq!(json["points_earned"], 2.5);
        assert_eq!(json["total_points"], 12.5);
        assert_eq!(json.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_run_order_message_shape() {
        let message = LiveMessage::RunOrder {
            event_id: Uuid::nil(),
            lane: 2,
            current_slot_id: Some(Uuid::nil()),
            on_deck_slot_id: None,
        };
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "run_order");
        assert_eq!(json["lane"], 2);
        assert!(json["on_deck_slot_id"].is_null());
    }

    #[tokio::test]
    async fn test_publish_reaches_only_the_competition_subscribers() {
        let hub = LiveHub::new(16);
        let watched = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut first = hub.subscribe(watched);
        let mut second = hub.subscribe(watched);
        let mut elsewhere = hub.subscribe(other);
        assert_eq!(hub.subscriber_count(watched), 2);
        assert_eq!(hub.subscriber_count(other), 1);

        let update = score(watched);
        assert_eq!(hub.publish_score(&update), 2);

        assert_eq!(first.recv().await.unwrap(), LiveMessage::from(&update));
        assert_eq!(second.recv().await.unwrap(), LiveMessage::from(&update));
        assert!(matches!(elsewhere.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_no_op() {
        let hub = LiveHub::new(16);
        let competition_id = Uuid::new_v4();

        assert_eq!(hub.publish_score(&score(competition_id)), 0);

        let receiver = hub.subscribe(competition_id);
        drop(receiver);
        assert_eq!(hub.publish_score(&score(competition_id)), 0);
        assert_eq!(hub.subscriber_count(competition_id), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_skips_missed_messages() {
        let hub = LiveHub::new(2);
        let competition_id = Uuid::new_v4();
        let mut receiver = hub.subscribe(competition_id);

        let updates: Vec<ScoreUpdate> = (0..4).map(|_| score(competition_id)).collect();
        for update in &updates {
            hub.publish_score(update);
        }

        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(2))));
        assert_eq!(receiver.recv().await.unwrap(), LiveMessage::from(&updates[2]));
        assert_eq!(receiver.recv().await.unwrap(), LiveMessage::from(&updates[3]));
    }
}
