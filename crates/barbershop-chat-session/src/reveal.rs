//! Staged reveal of a multi-bubble reply.
//!
//! The first bubble is shown at once. A background task then emits one tick
//! per remaining bubble, plus a final tick that hides the typing indicator,
//! each a fixed delay after the previous one. A single task sleeping in
//! sequence keeps ticks in order.

use std::collections::VecDeque;
use std::time::Duration;

use barbershop_chat_core::{Generation, MessageId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::ChatEvent;

/// A reveal sequence in progress.
#[derive(Debug)]
pub(crate) struct ActiveReveal {
    /// Sequence number, so ticks from an abandoned reveal can be told apart.
    pub(crate) id: u64,
    /// The bubble currently shown last (still incomplete).
    pub(crate) current: MessageId,
    /// Bubbles not yet shown.
    pub(crate) remaining: VecDeque<String>,
    task: JoinHandle<()>,
}

impl ActiveReveal {
    /// Start ticking for `remaining` bubbles after `current`.
    pub(crate) fn start(
        id: u64,
        generation: Generation,
        current: MessageId,
        remaining: Vec<String>,
        delay: Duration,
        events: mpsc::Sender<ChatEvent>,
    ) -> Self {
        let ticks = remaining.len() + 1;
        let task = tokio::spawn(async move {
            for _ in 0..ticks {
                tokio::time::sleep(delay).await;
                let tick = ChatEvent::RevealTick {
                    generation,
                    reveal: id,
                };
                if events.send(tick).await.is_err() {
                    tracing::debug!(reveal = id, "Event channel closed, stopping reveal");
                    return;
                }
            }
        });

        Self {
            id,
            current,
            remaining: remaining.into(),
            task,
        }
    }

    /// Whether every bubble has been shown.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl Drop for ActiveReveal {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_bubble_plus_final() {
        let (tx, mut rx) = mpsc::channel(8);
        let reveal = ActiveReveal::start(
            7,
            Generation::INITIAL,
            MessageId::generate(),
            vec!["b".into(), "c".into()],
            Duration::from_millis(1500),
            tx,
        );
        assert!(!reveal.is_exhausted());

        let start = tokio::time::Instant::now();
        for expected in 1..=3u32 {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, ChatEvent::RevealTick { reveal: 7, .. }));
            assert_eq!(start.elapsed(), Duration::from_millis(1500) * expected);
        }

        // The task exits after the last tick.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let reveal = ActiveReveal::start(
            1,
            Generation::INITIAL,
            MessageId::generate(),
            vec!["b".into()],
            Duration::from_secs(1),
            tx,
        );
        drop(reveal);
        assert!(rx.recv().await.is_none());
    }
}
