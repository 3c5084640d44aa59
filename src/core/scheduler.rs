use crate::domain::ports::{DeferredEvent, Scheduler};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug)]
struct Timer {
    due: Duration,
    seq: u64,
    event: DeferredEvent,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    // 反轉排序，讓 BinaryHeap 先彈出最早到期的計時器
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Virtual-time timer queue. Events scheduled for the same instant fire in scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_seq: u64,
    timers: BinaryHeap<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on this queue's clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time until the next timer fires, if any.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.timers
            .peek()
            .map(|timer| timer.due.saturating_sub(self.now))
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration, event: DeferredEvent) {
        let timer = Timer {
            due: self.now + delay,
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;
        self.timers.push(timer);
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<DeferredEvent> {
        self.now += elapsed;

        let mut fired = Vec::new();
        while self.timers.peek().is_some_and(|timer| timer.due <= self.now) {
            if let Some(timer) = self.timers.pop() {
                fired.push(timer.event);
            }
        }
        fired
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear(id: &str, generation: u64) -> DeferredEvent {
        DeferredEvent::ClearInsufficient {
            id: id.to_string(),
            generation,
        }
    }

    #[test]
    fn test_events_fire_only_when_due() {
        let mut queue = TimerQueue::new();
        queue.schedule(
            Duration::from_millis(1500),
            DeferredEvent::CompleteExchange { ticket: 1 },
        );
        queue.schedule(Duration::from_millis(2000), clear("a", 1));

        assert!(queue.advance(Duration::from_millis(1499)).is_empty());
        assert_eq!(queue.next_due_in(), Some(Duration::from_millis(1)));

        let fired = queue.advance(Duration::from_millis(1));
        assert_eq!(fired, vec![DeferredEvent::CompleteExchange { ticket: 1 }]);
        assert_eq!(queue.pending(), 1);

        let fired = queue.advance(Duration::from_secs(10));
        assert_eq!(fired, vec![clear("a", 1)]);
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.next_due_in(), None);
    }

    #[test]
    fn test_same_deadline_keeps_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(100), clear("b", 1));
        queue.schedule(Duration::from_millis(50), clear("a", 1));
        queue.schedule(Duration::from_millis(100), clear("c", 1));

        let fired = queue.advance(Duration::from_millis(100));
        assert_eq!(fired, vec![clear("a", 1), clear("b", 1), clear("c", 1)]);
        assert_eq!(queue.now(), Duration::from_millis(100));
    }
}
