// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Debouncing of rapidly changing values.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Quiet period before a search query is acted upon.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Delays propagation of pushed values until they have been stable for a
/// fixed delay.
///
/// Every push restarts the single pending timer; a superseded timer is
/// dropped and never fires. A settled value equal to the last emitted one is
/// not emitted again. Dropping the debouncer discards any pending value.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    /// Spawn the timer task. Settled values arrive on the returned receiver.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (output, output_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(input_rx, output, delay));
        (Self { input, task }, output_rx)
    }

    pub fn push(&self, value: T) {
        // Only fails once the receiver side is gone, nothing left to notify
        let _ = self.input.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T: PartialEq + Clone>(
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
    delay: Duration,
) {
    let mut last_emitted: Option<T> = None;

    while let Some(mut pending) = input.recv().await {
        loop {
            tokio::select! {
                next = input.recv() => match next {
                    Some(value) => pending = value,
                    None => return,
                },
                _ = sleep(delay) => break,
            }
        }

        if last_emitted.as_ref() == Some(&pending) {
            continue;
        }
        if output.send(pending.clone()).is_err() {
            return;
        }
        last_emitted = Some(pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_only_final_value_of_burst_is_emitted() {
        let (debouncer, mut settled) = Debouncer::spawn(DELAY);

        for text in ["w", "wi", "win", "wind"] {
            debouncer.push(text.to_string());
            advance(Duration::from_millis(100)).await;
        }

        assert_eq!(settled.recv().await.as_deref(), Some("wind"));
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_emitted_before_delay() {
        let (debouncer, mut settled) = Debouncer::spawn(DELAY);

        debouncer.push(1);
        advance(Duration::from_millis(299)).await;
        assert!(settled.try_recv().is_err());

        assert_eq!(settled.recv().await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_pauses_emit_each_value() {
        let (debouncer, mut settled) = Debouncer::spawn(DELAY);

        debouncer.push("the".to_string());
        assert_eq!(settled.recv().await.as_deref(), Some("the"));

        debouncer.push("the mighty".to_string());
        assert_eq!(settled.recv().await.as_deref(), Some("the mighty"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_value_is_not_emitted_twice() {
        let (debouncer, mut settled) = Debouncer::spawn(DELAY);

        debouncer.push("wind".to_string());
        assert_eq!(settled.recv().await.as_deref(), Some("wind"));

        // Typed and erased within the window, settles on the same text
        debouncer.push("windy".to_string());
        debouncer.push("wind".to_string());
        sleep(Duration::from_millis(400)).await;
        assert!(settled.try_recv().is_err());

        debouncer.push("x".to_string());
        assert_eq!(settled.recv().await.as_deref(), Some("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_value() {
        let (debouncer, mut settled) = Debouncer::spawn(DELAY);

        debouncer.push(7);
        drop(debouncer);

        assert_eq!(settled.recv().await, None);
    }
}
