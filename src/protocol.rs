//! Event-bus protocol shared by runtime components.
//!
//! Image batches publish their progress here; the CLI subscribes to log it.

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    ArtistImages(ArtistImageMessage),
}

/// How one artist's unit of work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistImageOutcome {
    /// Both renditions were written.
    Stored,
    /// The search had no exact match or could not be reached.
    NoImageFound,
    /// Download, decode, or write failed.
    FetchFailed,
    /// A thumbnail appeared after the batch scanned the cache.
    AlreadyCached,
    /// A newer batch took over before this artist was processed.
    Superseded,
}

/// Artist image batch notifications.
#[derive(Debug, Clone)]
pub enum ArtistImageMessage {
    BatchStarted {
        generation: u64,
        missing: usize,
        total_artists: usize,
    },
    ArtistProcessed {
        generation: u64,
        artisthash: String,
        outcome: ArtistImageOutcome,
        completed: usize,
        total: usize,
    },
    BatchFinished {
        generation: u64,
        completed: usize,
        total: usize,
    },
}
