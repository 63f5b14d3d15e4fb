//! Timer service backed by tokio sleeps.
//!
//! Every registration spawns a task that sleeps until its deadline and then
//! sends the timer id on a channel. The host drains the channel and hands
//! each id to [`TimerCoordinator::on_fire`](super::TimerCoordinator::on_fire).

use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::TimerService;

/// Must be used from inside a tokio runtime.
pub struct TokioTimerService {
    fired: mpsc::UnboundedSender<String>,
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TokioTimerService {
    /// The receiver yields the id of each timer as it fires.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (
            Self {
                fired,
                tasks: HashMap::new(),
            },
            rx,
        )
    }

    /// Number of timers not yet cancelled. Includes ones that already fired.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TimerService for TokioTimerService {
    fn register_one_shot(&mut self, id: &str, at_ms: i64) {
        let delay_ms = at_ms.saturating_sub(Utc::now().timestamp_millis()).max(0) as u64;
        let fired = self.fired.clone();
        let timer_id = id.to_string();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // The receiver is gone only when the host is shutting down.
            let _ = fired.send(timer_id);
        });
        if let Some(previous) = self.tasks.insert(id.to_string(), task) {
            previous.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

impl Drop for TokioTimerService {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_ms(ms: i64) -> i64 {
        Utc::now().timestamp_millis() + ms
    }

    #[tokio::test]
    async fn fires_registered_timer() {
        let (mut service, mut rx) = TokioTimerService::new();
        service.register_one_shot("start:a", in_ms(10));
        let id = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("start:a"));
    }

    #[tokio::test]
    async fn past_deadlines_fire_immediately() {
        let (mut service, mut rx) = TokioTimerService::new();
        service.register_one_shot("end:a", in_ms(-60_000));
        let id = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("end:a"));
    }

    #[tokio::test]
    async fn cancelled_timers_never_fire() {
        let (mut service, mut rx) = TokioTimerService::new();
        service.register_one_shot("start:a", in_ms(50));
        service.cancel_all();
        assert!(service.is_empty());
        let waited = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn re_registering_replaces_the_timer() {
        let (mut service, mut rx) = TokioTimerService::new();
        service.register_one_shot("start:a", in_ms(30));
        service.register_one_shot("start:a", in_ms(30));
        assert_eq!(service.len(), 1);

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(first.as_deref(), Some("start:a"));
        let second = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(second.is_err());
    }
}
