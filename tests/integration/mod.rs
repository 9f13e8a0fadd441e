// Integration test utilities and common code

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use lectern::narration::{NarrationDevice, Utterance, UtteranceTicket};

/// Lesson sheet with every row kind, a skipped tag, a blank row and CRLF endings
pub const LESSON_SHEET: &str = "Type,Field1,Field2,Field3,Field4,Field5,Field6\r\n\
QUIZ,\"What is 2, plus 2?\",4,5,3,6,0\r\n\
TEXT,Intro,Hello world\r\n\
DIALOGUE,Mike,\"Hi John, ready for the lesson?\"\r\n\
\r\n\
NOTE,foo,bar\r\n\
DIALOGUE,John,Ready when you are.\r\n\
quiz,Pick the vowel,b,c,a,d,2\r\n\
DIALOGUE,Mike,Let's begin.\r\n";

/// Temporary directory holding lesson sheets
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write a sheet file under the fixture root
    pub fn create_sheet<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        fs::write(&file_path, content).expect("Failed to write sheet");
        file_path
    }
}

/// Narration device that records every call and completes nothing on its own
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    pub spoken: Vec<Utterance>,
    pub cancel_calls: usize,
    /// Utterances spoken but neither finished nor cancelled
    pub in_flight: usize,
    pub max_in_flight: usize,
}

impl RecordingNarrator {
    pub fn last_ticket(&self) -> UtteranceTicket {
        self.spoken.last().expect("Nothing was spoken").ticket
    }

    pub fn texts(&self) -> Vec<&str> {
        self.spoken.iter().map(|u| u.text.as_str()).collect()
    }

    /// Finish the newest utterance on the device side and return its ticket
    pub fn finish_current(&mut self) -> UtteranceTicket {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.last_ticket()
    }
}

impl NarrationDevice for RecordingNarrator {
    fn speak(&mut self, utterance: Utterance) {
        self.spoken.push(utterance);
        self.in_flight += 1;
        self.max_in_flight = self.max_in_flight.max(self.in_flight);
    }

    fn cancel_all(&mut self) {
        self.cancel_calls += 1;
        self.in_flight = 0;
    }
}
