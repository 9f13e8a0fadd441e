// Sequential narration of dialogue lines, one utterance in flight at a time.
// Progress is driven only by device completions; a generation counter makes
// completions from cancelled playback inert.

use tracing::{debug, warn};

use crate::record_parser::DialogueRecord;

pub mod device;
pub mod voices;

pub use device::{ChannelNarrator, NarrationDevice, Utterance, UtteranceTicket};
pub use voices::{SpeakerVoiceMap, Voice, VoiceDirectory, VoiceId, VoiceLookup, VoiceSetup};

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// Narrating the line at this index
    Speaking(usize),
    /// Cancellation requested, not yet settled
    Stopped,
}

/// State changes reported to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started {
        lines: usize,
    },
    LineStarted {
        index: usize,
        speaker: String,
        voice: Option<VoiceId>,
    },
    /// The highlighted line changed; `None` clears the highlight
    Highlight {
        line: Option<usize>,
    },
    /// The last line finished naturally
    Finished,
    /// Playback was cancelled mid-sequence
    Stopped,
}

/// Receives playback events as they happen
pub trait PlaybackObserver {
    fn on_event(&mut self, event: &PlaybackEvent);
}

impl<F> PlaybackObserver for F
where
    F: FnMut(&PlaybackEvent),
{
    fn on_event(&mut self, event: &PlaybackEvent) {
        self(event)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Voice for speakers without a mapping; `None` leaves it to the device
    pub default_voice: Option<VoiceId>,
}

pub struct NarrationScheduler<D: NarrationDevice> {
    device: D,
    config: SchedulerConfig,
    lines: Vec<DialogueRecord>,
    voices: Box<dyn VoiceLookup>,
    state: PlaybackState,
    generation: u64,
    highlighted: Option<usize>,
    observer: Option<Box<dyn PlaybackObserver>>,
}

impl<D: NarrationDevice> NarrationScheduler<D> {
    pub fn new(device: D, config: SchedulerConfig) -> Self {
        Self {
            device,
            config,
            lines: Vec::new(),
            voices: Box::new(SpeakerVoiceMap::new()),
            state: PlaybackState::Idle,
            generation: 0,
            highlighted: None,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl PlaybackObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the line being spoken, if any
    pub fn cursor(&self) -> Option<usize> {
        match self.state {
            PlaybackState::Speaking(i) => Some(i),
            _ => None,
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.state, PlaybackState::Speaking(_))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lines(&self) -> &[DialogueRecord] {
        &self.lines
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Start narrating `lines` from the first line, silencing anything in flight.
    pub fn play(&mut self, lines: Vec<DialogueRecord>, voices: impl VoiceLookup + 'static) {
        self.stop();

        self.lines = lines;
        self.voices = Box::new(voices);

        if self.lines.is_empty() {
            debug!("Play requested with no dialogue lines");
            return;
        }

        if !self.device.is_available() {
            warn!("Narration device unavailable, highlighting only");
            self.set_highlight(Some(0));
            return;
        }

        self.emit(PlaybackEvent::Started {
            lines: self.lines.len(),
        });
        self.enter(0);
    }

    /// Cancel any in-flight utterance and return to `Idle`. Safe from any state.
    pub fn stop(&mut self) {
        let was_speaking = self.is_speaking();

        self.state = PlaybackState::Stopped;
        self.generation += 1;
        self.device.cancel_all();
        self.state = PlaybackState::Idle;
        self.set_highlight(None);

        if was_speaking {
            debug!(generation = self.generation, "Narration stopped");
            self.emit(PlaybackEvent::Stopped);
        }
    }

    /// Report that the utterance behind `ticket` finished naturally.
    ///
    /// Advances the cursor only for the current generation's current line;
    /// returns whether the completion was accepted.
    pub fn complete(&mut self, ticket: UtteranceTicket) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Ignoring stale completion"
            );
            return false;
        }

        match (self.state, ticket.line) {
            (PlaybackState::Speaking(current), Some(line)) if current == line => {
                self.advance(current);
                true
            }
            _ => false,
        }
    }

    /// Speak one standalone text with the default voice, cancelling dialogue
    /// playback first. Its completion never moves the cursor.
    pub fn read_aloud(&mut self, text: &str) -> bool {
        self.stop();

        if text.trim().is_empty() || !self.device.is_available() {
            return false;
        }

        self.device.speak(Utterance {
            text: text.to_string(),
            voice: self.config.default_voice.clone(),
            ticket: UtteranceTicket {
                generation: self.generation,
                line: None,
            },
        });
        true
    }

    fn advance(&mut self, current: usize) {
        let next = current + 1;
        if next < self.lines.len() {
            self.enter(next);
        } else {
            debug!(lines = self.lines.len(), "Narration finished");
            self.state = PlaybackState::Idle;
            self.set_highlight(None);
            self.emit(PlaybackEvent::Finished);
        }
    }

    fn enter(&mut self, index: usize) {
        self.state = PlaybackState::Speaking(index);

        let line = &self.lines[index];
        let voice = self
            .voices
            .voice_for(&line.speaker)
            .or_else(|| self.config.default_voice.clone());
        let speaker = line.speaker.clone();
        let text = line.text.clone();

        debug!(index, %speaker, ?voice, "Speaking line");
        self.set_highlight(Some(index));
        self.emit(PlaybackEvent::LineStarted {
            index,
            speaker,
            voice: voice.clone(),
        });

        self.device.speak(Utterance {
            text,
            voice,
            ticket: UtteranceTicket {
                generation: self.generation,
                line: Some(index),
            },
        });
    }

    fn set_highlight(&mut self, line: Option<usize>) {
        if self.highlighted != line {
            self.highlighted = line;
            self.emit(PlaybackEvent::Highlight { line });
        }
    }

    fn emit(&mut self, event: PlaybackEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}
