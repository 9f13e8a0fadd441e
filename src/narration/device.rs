// Narration device seam: the scheduler submits utterances, the device reports
// completion later by handing the utterance's ticket back to the scheduler.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::voices::VoiceId;

/// Identifies one submitted utterance.
///
/// `generation` is the scheduler's playback generation at submission time;
/// `line` is the dialogue index, or `None` for standalone read-aloud text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceTicket {
    pub generation: u64,
    pub line: Option<usize>,
}

/// One unit of speech handed to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    /// `None` selects the device's own default voice
    pub voice: Option<VoiceId>,
    pub ticket: UtteranceTicket,
}

/// External speech capability.
///
/// Implementations must report each utterance that finishes naturally exactly
/// once, by passing its ticket to `NarrationScheduler::complete`. Utterances
/// silenced by `cancel_all` may or may not be reported; stale tickets are ignored.
pub trait NarrationDevice {
    /// Whether the device can speak at all (e.g. voices are loaded)
    fn is_available(&self) -> bool {
        true
    }

    /// Queue an utterance; must not block
    fn speak(&mut self, utterance: Utterance);

    /// Silence the current utterance and drop anything queued
    fn cancel_all(&mut self);
}

/// Console device: prints each utterance and reports completion over a channel.
///
/// Completions arrive on the receiver returned by [`ChannelNarrator::new`]; the
/// owner feeds them back into the scheduler from its event loop.
#[derive(Debug)]
pub struct ChannelNarrator {
    completions: mpsc::UnboundedSender<UtteranceTicket>,
    spoken: usize,
}

impl ChannelNarrator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UtteranceTicket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                completions: tx,
                spoken: 0,
            },
            rx,
        )
    }

    /// Number of utterances spoken so far
    pub fn spoken(&self) -> usize {
        self.spoken
    }
}

impl NarrationDevice for ChannelNarrator {
    fn speak(&mut self, utterance: Utterance) {
        let voice = utterance
            .voice
            .as_ref()
            .map_or("default", VoiceId::as_str);
        println!("[{voice}] {}", utterance.text);
        self.spoken += 1;

        if self.completions.send(utterance.ticket).is_err() {
            debug!("Completion receiver dropped, ticket {:?} discarded", utterance.ticket);
        }
    }

    fn cancel_all(&mut self) {
        info!("Narration cancelled");
    }
}
