//! In-memory state machine for one lane of one event.
//!
//! The transactional layer loads a locked lane into a [`Lane`], applies one
//! transition, and writes back [`Lane::changed`]. Nothing here touches the
//! database, so every rule about who runs next lives in this file.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{RunSlot, SlotStatus};

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("run slot {0} is not in this lane")]
    UnknownSlot(Uuid),

    #[error("run slot {slot} is {status}, not current")]
    NotCurrent { slot: Uuid, status: SlotStatus },

    #[error("run slot {slot} is {status}, only completed slots can be reactivated")]
    NotCompleted { slot: Uuid, status: SlotStatus },

    #[error("run slot {0} is completed, reactivate it first")]
    AlreadyCompleted(Uuid),
}

impl From<TransitionError> for StorageError {
    fn from(error: TransitionError) -> Self {
        match error {
            TransitionError::UnknownSlot(_) => StorageError::NotFound(error.to_string()),
            TransitionError::NotCurrent { .. } => StorageError::Conflict(error.to_string()),
            TransitionError::NotCompleted { .. } | TransitionError::AlreadyCompleted(_) => {
                StorageError::InvalidTransition(error.to_string())
            }
        }
    }
}

/// What happens to the current lifter once their attempt is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Complete,
    /// Back to pending at the given run order, behind everyone already queued.
    Requeue { order: i32 },
}

impl Finish {
    pub fn decide(attempts_taken: i32, max_attempts: i32, force_complete: bool, next_order: i32) -> Self {
        if attempts_taken < max_attempts && !force_complete {
            Self::Requeue { order: next_order }
        } else {
            Self::Complete
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lane {
    number: i32,
    slots: Vec<RunSlot>,
    dirty: Vec<Uuid>,
}

impl Lane {
    pub fn new(number: i32, mut slots: Vec<RunSlot>) -> Self {
        slots.sort_by_key(RunSlot::queue_position);
        Self {
            number,
            slots,
            dirty: Vec::new(),
        }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn slots(&self) -> &[RunSlot] {
        &self.slots
    }

    pub fn get(&self, slot_id: Uuid) -> Option<&RunSlot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub fn current(&self) -> Option<&RunSlot> {
        self.slots.iter().find(|s| s.status == SlotStatus::Current)
    }

    /// Pending slots in promotion order.
    pub fn pending(&self) -> impl Iterator<Item = &RunSlot> {
        self.slots.iter().filter(|s| s.is_pending())
    }

    /// Advisory: the slot that would be promoted next.
    pub fn on_deck(&self) -> Option<&RunSlot> {
        self.pending().next()
    }

    pub fn completed(&self) -> impl Iterator<Item = &RunSlot> {
        self.slots
            .iter()
            .filter(|s| s.status == SlotStatus::Completed)
    }

    pub fn current_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.status == SlotStatus::Current)
            .count()
    }

    /// Makes `slot_id` current, demoting whoever held the lane.
    pub fn set_current(&mut self, slot_id: Uuid, now: DateTime<Utc>) -> Result<(), TransitionError> {
        let target = self.index_of(slot_id)?;
        if self.slots[target].status == SlotStatus::Completed {
            return Err(TransitionError::AlreadyCompleted(slot_id));
        }

        for i in 0..self.slots.len() {
            if i != target && self.slots[i].status == SlotStatus::Current {
                self.slots[i].status = SlotStatus::Pending;
                self.touch(i);
            }
        }

        self.promote(target, now);
        Ok(())
    }

    /// Fails unless `slot_id` is the lane's current slot.
    pub fn ensure_current(&self, slot_id: Uuid) -> Result<&RunSlot, TransitionError> {
        let slot = &self.slots[self.index_of(slot_id)?];
        if slot.status != SlotStatus::Current {
            return Err(TransitionError::NotCurrent {
                slot: slot_id,
                status: slot.status,
            });
        }
        Ok(slot)
    }

    /// Retires or re-queues the current slot, then promotes the lowest
    /// (heat, order) pending slot. Returns the promoted slot id, if any.
    pub fn finish_current(
        &mut self,
        slot_id: Uuid,
        finish: Finish,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, TransitionError> {
        self.ensure_current(slot_id)?;
        let index = self.index_of(slot_id)?;

        let slot = &mut self.slots[index];
        match finish {
            Finish::Complete => {
                slot.status = SlotStatus::Completed;
                slot.completed_at = Some(now);
            }
            Finish::Requeue { order } => {
                slot.status = SlotStatus::Pending;
                slot.completed_at = None;
                slot.order = order;
            }
        }
        self.touch(index);
        self.slots.sort_by_key(RunSlot::queue_position);

        let next = self.slots.iter().position(RunSlot::is_pending);
        Ok(next.map(|i| {
            self.promote(i, now);
            self.slots[i].id
        }))
    }

    /// completed -> pending. Other slots are left alone.
    pub fn reactivate(&mut self, slot_id: Uuid) -> Result<(), TransitionError> {
        let index = self.index_of(slot_id)?;
        let slot = &mut self.slots[index];
        if slot.status != SlotStatus::Completed {
            return Err(TransitionError::NotCompleted {
                slot: slot_id,
                status: slot.status,
            });
        }

        slot.status = SlotStatus::Pending;
        slot.completed_at = None;
        self.touch(index);
        Ok(())
    }

    /// Slots modified since load, demotions before promotions so a
    /// one-current-per-lane unique index never sees two current rows.
    pub fn changed(&self) -> Vec<&RunSlot> {
        let mut changed: Vec<&RunSlot> = self
            .slots
            .iter()
            .filter(|s| self.dirty.contains(&s.id))
            .collect();
        changed.sort_by_key(|s| s.status == SlotStatus::Current);
        changed
    }

    fn promote(&mut self, index: usize, now: DateTime<Utc>) {
        let slot = &mut self.slots[index];
        slot.status = SlotStatus::Current;
        slot.started_at = Some(now);
        self.touch(index);
        debug_assert!(self.current_count() <= 1);
    }

    fn index_of(&self, slot_id: Uuid) -> Result<usize, TransitionError> {
        self.slots
            .iter()
            .position(|s| s.id == slot_id)
            .ok_or(TransitionError::UnknownSlot(slot_id))
    }

    fn touch(&mut self, index: usize) {
        let id = self.slots[index].id;
        if !self.dirty.contains(&id) {
            self.dirty.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(order: i32, heat: i32, status: SlotStatus) -> RunSlot {
        RunSlot {
            id: Uuid::new_v4(),
            competition_id: Uuid::nil(),
            event_id: Uuid::nil(),
            entry_id: Uuid::new_v4(),
            lane: 1,
            heat,
            order,
            status,
            started_at: None,
            completed_at: None,
        }
    }

    fn status_of(lane: &Lane, id: Uuid) -> SlotStatus {
        lane.get(id).unwrap().status
    }

    #[test]
    fn test_forced_completion_promotes_next_in_order() {
        let first = slot(1, 1, SlotStatus::Current);
        let second = slot(2, 1, SlotStatus::Pending);
        let third = slot(3, 1, SlotStatus::Pending);
        let (a, b, c) = (first.id, second.id, third.id);
        let mut lane = Lane::new(1, vec![third, first, second]);

        let now = Utc::now();
        let finish = Finish::decide(1, 4, true, 4);
        let promoted = lane.finish_current(a, finish, now).unwrap();

        assert_eq!(promoted, Some(b));
        assert_eq!(status_of(&lane, a), SlotStatus::Completed);
        assert_eq!(lane.get(a).unwrap().completed_at, Some(now));
        assert_eq!(status_of(&lane, b), SlotStatus::Current);
        assert_eq!(lane.get(b).unwrap().started_at, Some(now));
        assert_eq!(status_of(&lane, c), SlotStatus::Pending);
        assert_eq!(lane.current_count(), 1);
    }

    #[test]
    fn test_requeue_goes_behind_the_queue() {
        let first = slot(1, 1, SlotStatus::Current);
        let second = slot(2, 1, SlotStatus::Pending);
        let (a, b) = (first.id, second.id);
        let mut lane = Lane::new(1, vec![first, second]);

        let finish = Finish::decide(1, 4, false, 3);
        assert_eq!(finish, Finish::Requeue { order: 3 });

        let promoted = lane.finish_current(a, finish, Utc::now()).unwrap();
        assert_eq!(promoted, Some(b));
        assert_eq!(status_of(&lane, a), SlotStatus::Pending);
        assert_eq!(lane.get(a).unwrap().order, 3);
        assert_eq!(lane.get(a).unwrap().completed_at, None);
        assert_eq!(lane.on_deck().map(|s| s.id), Some(a));
    }

    #[test]
    fn test_last_attempt_completes_without_force() {
        assert_eq!(Finish::decide(4, 4, false, 9), Finish::Complete);
        assert_eq!(Finish::decide(3, 4, false, 9), Finish::Requeue { order: 9 });
        assert_eq!(Finish::decide(0, 4, true, 9), Finish::Complete);
    }

    #[test]
    fn test_lane_goes_idle_when_queue_empties() {
        let only = slot(1, 1, SlotStatus::Current);
        let id = only.id;
        let mut lane = Lane::new(1, vec![only]);

        let promoted = lane.finish_current(id, Finish::Complete, Utc::now()).unwrap();
        assert_eq!(promoted, None);
        assert!(lane.current().is_none());
    }

    #[test]
    fn test_finishing_a_non_current_slot_is_a_conflict() {
        let current = slot(1, 1, SlotStatus::Current);
        let pending = slot(2, 1, SlotStatus::Pending);
        let pending_id = pending.id;
        let mut lane = Lane::new(1, vec![current, pending]);

        let err = lane
            .finish_current(pending_id, Finish::Complete, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotCurrent {
                slot: pending_id,
                status: SlotStatus::Pending
            }
        );
        assert!(matches!(StorageError::from(err), StorageError::Conflict(_)));
        assert!(lane.changed().is_empty());
    }

    #[test]
    fn test_reactivate_touches_only_its_slot() {
        let done = slot(1, 1, SlotStatus::Completed);
        let current = slot(2, 1, SlotStatus::Current);
        let pending = slot(3, 1, SlotStatus::Pending);
        let (a, b, c) = (done.id, current.id, pending.id);
        let mut lane = Lane::new(1, vec![done, current, pending]);

        lane.reactivate(a).unwrap();

        assert_eq!(status_of(&lane, a), SlotStatus::Pending);
        assert_eq!(lane.get(a).unwrap().completed_at, None);
        assert_eq!(status_of(&lane, b), SlotStatus::Current);
        assert_eq!(status_of(&lane, c), SlotStatus::Pending);
        assert_eq!(lane.changed().len(), 1);
    }

    #[test]
    fn test_reactivate_requires_completed() {
        let pending = slot(1, 1, SlotStatus::Pending);
        let id = pending.id;
        let mut lane = Lane::new(1, vec![pending]);

        let err = lane.reactivate(id).unwrap_err();
        assert!(matches!(
            StorageError::from(err),
            StorageError::InvalidTransition(_)
        ));
    }

    #[test]
    fn test_set_current_demotes_previous_holder() {
        let current = slot(1, 1, SlotStatus::Current);
        let pending = slot(2, 1, SlotStatus::Pending);
        let (a, b) = (current.id, pending.id);
        let mut lane = Lane::new(1, vec![current, pending]);

        lane.set_current(b, Utc::now()).unwrap();

        assert_eq!(status_of(&lane, a), SlotStatus::Pending);
        assert_eq!(status_of(&lane, b), SlotStatus::Current);
        assert_eq!(lane.current_count(), 1);

        let changed: Vec<Uuid> = lane.changed().iter().map(|s| s.id).collect();
        assert_eq!(changed, vec![a, b]);
    }

    #[test]
    fn test_set_current_rejects_completed_slot() {
        let done = slot(1, 1, SlotStatus::Completed);
        let id = done.id;
        let mut lane = Lane::new(1, vec![done]);

        assert_eq!(
            lane.set_current(id, Utc::now()),
            Err(TransitionError::AlreadyCompleted(id))
        );
    }

    #[test]
    fn test_promotion_uses_heat_then_order() {
        let current = slot(1, 1, SlotStatus::Current);
        let later_heat = slot(2, 2, SlotStatus::Pending);
        let same_heat_high_order = slot(7, 1, SlotStatus::Pending);
        let same_heat_low_order = slot(5, 1, SlotStatus::Pending);
        let current_id = current.id;
        let expected = same_heat_low_order.id;

        // Input order must not matter.
        let mut lane = Lane::new(
            1,
            vec![later_heat, same_heat_high_order, current, same_heat_low_order],
        );
        assert_eq!(lane.on_deck().map(|s| s.id), Some(expected));

        let promoted = lane
            .finish_current(current_id, Finish::Complete, Utc::now())
            .unwrap();
        assert_eq!(promoted, Some(expected));
    }

    #[test]
    fn test_single_current_holds_across_a_session() {
        let slots: Vec<RunSlot> = (1..=4)
            .map(|order| {
                let status = if order == 1 {
                    SlotStatus::Current
                } else {
                    SlotStatus::Pending
                };
                slot(order, 1, status)
            })
            .collect();
        let mut lane = Lane::new(1, slots);
        let mut next_order = 5;

        for round in 0..12 {
            let Some(current) = lane.current().map(|s| s.id) else {
                break;
            };
            let finish = Finish::decide(round / 4 + 1, 3, false, next_order);
            next_order += 1;
            lane.finish_current(current, finish, Utc::now()).unwrap();
            assert!(lane.current_count() <= 1);

            if round == 5 {
                let pending = lane.pending().last().map(|s| s.id).unwrap();
                lane.set_current(pending, Utc::now()).unwrap();
                assert_eq!(lane.current_count(), 1);
            }
        }
    }
}
