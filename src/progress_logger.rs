//! Bus subscriber that turns artist image events into log lines.

use log::{info, warn};
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::protocol::{ArtistImageMessage, ArtistImageOutcome, Message};

/// Per-batch outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub stored: usize,
    pub no_image: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl OutcomeTally {
    fn record(&mut self, outcome: ArtistImageOutcome) {
        match outcome {
            ArtistImageOutcome::Stored => self.stored += 1,
            ArtistImageOutcome::NoImageFound => self.no_image += 1,
            ArtistImageOutcome::FetchFailed => self.failed += 1,
            ArtistImageOutcome::AlreadyCached | ArtistImageOutcome::Superseded => {
                self.skipped += 1
            }
        }
    }
}

/// Progress is logged roughly every tenth of a batch and on the last artist.
fn is_progress_milestone(completed: usize, total: usize) -> bool {
    let step = (total / 10).max(1);
    completed == total || completed % step == 0
}

pub struct ProgressLogger {
    bus_consumer: Receiver<Message>,
    generation: u64,
    tally: OutcomeTally,
}

impl ProgressLogger {
    pub fn new(bus_consumer: Receiver<Message>) -> Self {
        Self {
            bus_consumer,
            generation: 0,
            tally: OutcomeTally::default(),
        }
    }

    /// Blocks until every bus sender is gone.
    pub fn run(&mut self) {
        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(Message::ArtistImages(message)) => self.handle(message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Progress logger lagged on bus, skipped {} message(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn handle(&mut self, message: ArtistImageMessage) {
        match message {
            ArtistImageMessage::BatchStarted { generation, .. } => {
                self.generation = generation;
                self.tally = OutcomeTally::default();
            }
            ArtistImageMessage::ArtistProcessed {
                generation,
                outcome,
                completed,
                total,
                ..
            } => {
                // Events from a superseded batch still arrive while it drains.
                if generation != self.generation {
                    return;
                }
                self.tally.record(outcome);
                if is_progress_milestone(completed, total) {
                    info!("Artist images: {}/{}", completed, total);
                }
            }
            ArtistImageMessage::BatchFinished { generation, .. } => {
                if generation != self.generation {
                    return;
                }
                let tally = self.tally;
                info!(
                    "Artist image batch {}: {} stored, {} without image, {} failed, {} skipped",
                    generation, tally.stored, tally.no_image, tally.failed, tally.skipped
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_progress_milestone, OutcomeTally, ProgressLogger};
    use crate::protocol::{ArtistImageMessage, ArtistImageOutcome, Message};
    use tokio::sync::broadcast;

    fn processed(generation: u64, outcome: ArtistImageOutcome) -> ArtistImageMessage {
        ArtistImageMessage::ArtistProcessed {
            generation,
            artisthash: "0123456789".to_string(),
            outcome,
            completed: 1,
            total: 4,
        }
    }

    #[test]
    fn test_progress_milestones() {
        assert!(is_progress_milestone(1, 1));
        assert!(is_progress_milestone(3, 5));
        assert!(is_progress_milestone(10, 100));
        assert!(!is_progress_milestone(11, 100));
        assert!(is_progress_milestone(100, 100));
        assert!(is_progress_milestone(105, 105));
    }

    #[test]
    fn test_tally_ignores_events_from_older_batches() {
        let (_sender, receiver) = broadcast::channel::<Message>(4);
        let mut logger = ProgressLogger::new(receiver);

        logger.handle(ArtistImageMessage::BatchStarted {
            generation: 2,
            missing: 4,
            total_artists: 9,
        });
        logger.handle(processed(2, ArtistImageOutcome::Stored));
        logger.handle(processed(1, ArtistImageOutcome::Stored));
        logger.handle(processed(2, ArtistImageOutcome::NoImageFound));
        logger.handle(processed(2, ArtistImageOutcome::FetchFailed));
        logger.handle(processed(2, ArtistImageOutcome::AlreadyCached));

        assert_eq!(
            logger.tally,
            OutcomeTally {
                stored: 1,
                no_image: 1,
                failed: 1,
                skipped: 1,
            }
        );
    }

    #[test]
    fn test_run_returns_when_bus_closes() {
        let (sender, receiver) = broadcast::channel::<Message>(8);
        let mut logger = ProgressLogger::new(receiver);
        sender
            .send(Message::ArtistImages(ArtistImageMessage::BatchStarted {
                generation: 1,
                missing: 1,
                total_artists: 1,
            }))
            .expect("receiver is subscribed");
        sender
            .send(Message::ArtistImages(processed(1, ArtistImageOutcome::Stored)))
            .expect("receiver is subscribed");
        drop(sender);

        logger.run();

        assert_eq!(logger.generation, 1);
        assert_eq!(logger.tally.stored, 1);
    }
}
