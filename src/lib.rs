pub mod narration;
pub mod quiz;
pub mod reader;
pub mod record_parser;

// Re-export main types for convenient access
pub use record_parser::{
    parse, DialogueRecord, ParsedLesson, ParserRules, QuizRecord, RecordParser, TextRecord,
    TypedRecord,
};

pub use narration::{
    NarrationDevice, NarrationScheduler, PlaybackEvent, PlaybackState, SchedulerConfig,
    SpeakerVoiceMap, Utterance, UtteranceTicket, VoiceDirectory, VoiceId,
};

pub use quiz::{AnswerOutcome, QuizProgress, QuizSession};
