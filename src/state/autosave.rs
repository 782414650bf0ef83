/// Debounced autosave
///
/// Every edit asks the debouncer for a fresh `Ticket` and starts a timer
/// carrying it (`elapsed`). When a timer fires, the ticket is redeemed with
/// `fire`, which only succeeds for the newest outstanding ticket. Older
/// timers still wake up but their tickets are rejected, so only the final
/// edit in a burst is saved.

use std::time::Duration;

/// Quiet period before edited text is written to the store
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

/// Identifies one scheduled save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<Ticket>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a save, superseding any pending one
    pub fn schedule(&mut self) -> Ticket {
        self.generation += 1;
        let ticket = Ticket(self.generation);
        self.pending = Some(ticket);
        ticket
    }

    /// Drop the pending save, if any
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("Pending autosave cancelled");
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Redeem a ticket whose timer elapsed.
    ///
    /// Returns true exactly once, for the newest ticket, unless it was
    /// cancelled in the meantime.
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(AUTOSAVE_DELAY)
    }
}

/// Timer for one ticket; resolves after `delay`
pub async fn elapsed(ticket: Ticket, delay: Duration) -> Ticket {
    tokio::time::sleep(delay).await;
    ticket
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_fires() {
        let mut debouncer = Debouncer::default();
        let first = debouncer.schedule();
        let second = debouncer.schedule();

        assert!(!debouncer.fire(first));
        assert!(debouncer.is_pending());
        assert!(debouncer.fire(second));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_ticket_fires_once() {
        let mut debouncer = Debouncer::default();
        let ticket = debouncer.schedule();

        assert!(debouncer.fire(ticket));
        assert!(!debouncer.fire(ticket));
    }

    #[test]
    fn test_cancel_rejects_pending_ticket() {
        let mut debouncer = Debouncer::default();
        let ticket = debouncer.schedule();
        debouncer.cancel();

        assert!(!debouncer.fire(ticket));
    }

    #[test]
    fn test_schedule_after_cancel() {
        let mut debouncer = Debouncer::default();
        let stale = debouncer.schedule();
        debouncer.cancel();
        let fresh = debouncer.schedule();

        assert_ne!(stale, fresh);
        assert!(!debouncer.fire(stale));
        assert!(debouncer.fire(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_waits_for_delay() {
        let mut debouncer = Debouncer::default();
        let ticket = debouncer.schedule();
        let start = tokio::time::Instant::now();

        let fired = elapsed(ticket, debouncer.delay()).await;

        assert_eq!(fired, ticket);
        assert!(start.elapsed() >= AUTOSAVE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_not_done_before_delay() {
        let timer = tokio::spawn(elapsed(Ticket(1), AUTOSAVE_DELAY));
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!timer.is_finished());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(timer.await.unwrap(), Ticket(1));
    }
}
