//! Handoff queues between pipeline stages.
//!
//! Each queue has one producer stage and one consumer stage. End-of-sequence
//! is the channel closing: once the producer drops its sender and the buffer
//! drains, `recv` yields `None`.

use tokio::sync::mpsc;

use crate::config::PipelineConfig;

/// Producer half of a handoff queue.
#[derive(Debug)]
pub enum HandoffSender<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

/// Consumer half of a handoff queue.
#[derive(Debug)]
pub enum HandoffReceiver<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

/// The consumer side has gone away; the item is handed back.
#[derive(Debug)]
pub struct Disconnected<T>(pub T);

impl<T> HandoffSender<T> {
    /// Hand an item to the next stage.
    ///
    /// On a bounded queue this waits while the buffer is full.
    pub async fn send(&self, item: T) -> Result<(), Disconnected<T>> {
        match self {
            HandoffSender::Bounded(tx) => tx.send(item).await.map_err(|e| Disconnected(e.0)),
            HandoffSender::Unbounded(tx) => tx.send(item).map_err(|e| Disconnected(e.0)),
        }
    }
}

impl<T> HandoffReceiver<T> {
    /// Wait for the next item; `None` once the producer is done.
    pub async fn recv(&mut self) -> Option<T> {
        match self {
            HandoffReceiver::Bounded(rx) => rx.recv().await,
            HandoffReceiver::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// Create a handoff queue. `None` capacity means unbounded.
pub fn handoff<T>(capacity: Option<usize>) -> (HandoffSender<T>, HandoffReceiver<T>) {
    match capacity {
        Some(n) => {
            let (tx, rx) = mpsc::channel(n.max(1));
            (HandoffSender::Bounded(tx), HandoffReceiver::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (HandoffSender::Unbounded(tx), HandoffReceiver::Unbounded(rx))
        }
    }
}

/// Create a handoff queue sized from the pipeline configuration.
pub fn stage_channel<T>(config: &PipelineConfig) -> (HandoffSender<T>, HandoffReceiver<T>) {
    handoff(config.buffer_size)
}

/// A pipeline stage that pulls from an input queue and pushes to an output queue.
///
/// Every input produces exactly one output, in arrival order. When the input
/// closes, the output sender is dropped, closing the next queue exactly once.
pub struct PipelineStage<I, O> {
    name: &'static str,
    input: HandoffReceiver<I>,
    output: HandoffSender<O>,
}

impl<I, O> PipelineStage<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Create a new pipeline stage.
    pub fn new(name: &'static str, input: HandoffReceiver<I>, output: HandoffSender<O>) -> Self {
        Self {
            name,
            input,
            output,
        }
    }

    /// Run the stage with a blocking per-item step.
    ///
    /// The step runs on the blocking pool so CPU-bound transforms never stall
    /// the async workers. Returns the number of items forwarded.
    pub async fn run<F>(mut self, step: F) -> Result<usize, String>
    where
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        let step = std::sync::Arc::new(step);
        let mut forwarded = 0usize;
        tracing::debug!(stage = self.name, "stage started");

        while let Some(item) = self.input.recv().await {
            let step = step.clone();
            let result = tokio::task::spawn_blocking(move || step(item))
                .await
                .map_err(|e| format!("{} worker lost an item: {}", self.name, e))?;

            if self.output.send(result).await.is_err() {
                // Downstream closed, nothing left to deliver to
                tracing::warn!(stage = self.name, "downstream closed early");
                break;
            }
            forwarded += 1;
        }

        tracing::debug!(stage = self.name, forwarded, "stage finished");
        Ok(forwarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_handoff() {
        let config = PipelineConfig {
            buffer_size: Some(2),
            ..PipelineConfig::default()
        };

        let (tx, mut rx) = stage_channel::<i32>(&config);
        assert!(matches!(tx, HandoffSender::Bounded(_)));

        tx.send(42).await.unwrap();
        assert_eq!(rx.recv().await, Some(42));
    }

    #[tokio::test]
    async fn test_unbounded_handoff_closes() {
        let (tx, mut rx) = handoff::<i32>(None);
        for i in 0..1000 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 1000);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped() {
        let (tx, rx) = handoff::<&str>(Some(1));
        drop(rx);
        let err = tx.send("lost").await.unwrap_err();
        assert_eq!(err.0, "lost");
    }

    #[tokio::test]
    async fn test_pipeline_stage_preserves_order() {
        let (input_tx, input_rx) = handoff::<i32>(Some(4));
        let (output_tx, mut output_rx) = handoff::<i32>(Some(4));

        let stage = PipelineStage::new("double", input_rx, output_tx);
        let handle = tokio::spawn(stage.run(|x| x * 2));

        for x in [5, 10, 15] {
            input_tx.send(x).await.unwrap();
        }
        drop(input_tx);

        assert_eq!(output_rx.recv().await, Some(10));
        assert_eq!(output_rx.recv().await, Some(20));
        assert_eq!(output_rx.recv().await, Some(30));
        assert_eq!(output_rx.recv().await, None);
        assert_eq!(handle.await.unwrap(), Ok(3));
    }

    #[tokio::test]
    async fn test_pipeline_stage_empty_input() {
        let (input_tx, input_rx) = handoff::<i32>(None);
        let (output_tx, mut output_rx) = handoff::<i32>(None);
        drop(input_tx);

        let forwarded = PipelineStage::new("idle", input_rx, output_tx)
            .run(|x| x)
            .await
            .unwrap();
        assert_eq!(forwarded, 0);
        assert_eq!(output_rx.recv().await, None);
    }
}
