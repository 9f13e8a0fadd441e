// Voice directory and speaker-to-voice assignment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::record_parser::DialogueRecord;

/// Opaque identifier of a synthetic voice on the narration device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        VoiceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoiceId {
    fn from(id: &str) -> Self {
        VoiceId::new(id)
    }
}

/// A voice offered by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: VoiceId,
    pub name: String,
    /// Language tag as reported by the device, e.g. `en-US`
    pub lang: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: VoiceId::new(id),
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Stable ordered set of available voices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceDirectory {
    voices: Vec<Voice>,
}

impl VoiceDirectory {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// Voices whose language tag contains `tag`, case-insensitive, order kept
    pub fn filter_language(&self, tag: &str) -> Self {
        let tag = tag.to_lowercase();
        Self {
            voices: self
                .voices
                .iter()
                .filter(|v| v.lang.to_lowercase().contains(&tag))
                .cloned()
                .collect(),
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn get(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

/// Resolves a speaker name to a voice
pub trait VoiceLookup {
    fn voice_for(&self, speaker: &str) -> Option<VoiceId>;
}

impl<F> VoiceLookup for F
where
    F: Fn(&str) -> Option<VoiceId>,
{
    fn voice_for(&self, speaker: &str) -> Option<VoiceId> {
        self(speaker)
    }
}

/// Speaker name (case-sensitive) to voice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerVoiceMap {
    assignments: HashMap<String, VoiceId>,
}

impl SpeakerVoiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Round-robin assignment: the k-th distinct speaker (by first appearance)
    /// gets voice `k mod n`. An empty directory yields an empty map.
    pub fn assign(dialogue: &[DialogueRecord], directory: &VoiceDirectory) -> Self {
        let mut map = Self::new();
        if directory.is_empty() {
            return map;
        }

        for (k, speaker) in distinct_speakers(dialogue).into_iter().enumerate() {
            let voice = &directory.voices()[k % directory.len()];
            map.assignments.insert(speaker.to_string(), voice.id.clone());
        }

        debug!(
            speakers = map.len(),
            voices = directory.len(),
            "Assigned voices to speakers"
        );
        map
    }

    /// Override one speaker's voice
    pub fn insert(&mut self, speaker: impl Into<String>, voice: VoiceId) -> Option<VoiceId> {
        self.assignments.insert(speaker.into(), voice)
    }

    pub fn get(&self, speaker: &str) -> Option<&VoiceId> {
        self.assignments.get(speaker)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl VoiceLookup for SpeakerVoiceMap {
    fn voice_for(&self, speaker: &str) -> Option<VoiceId> {
        self.get(speaker).cloned()
    }
}

impl<S: Into<String>> FromIterator<(S, VoiceId)> for SpeakerVoiceMap {
    fn from_iter<I: IntoIterator<Item = (S, VoiceId)>>(iter: I) -> Self {
        Self {
            assignments: iter.into_iter().map(|(s, v)| (s.into(), v)).collect(),
        }
    }
}

/// Distinct speakers in order of first appearance
pub fn distinct_speakers(dialogue: &[DialogueRecord]) -> Vec<&str> {
    let mut seen = Vec::new();
    for line in dialogue {
        if !seen.contains(&line.speaker.as_str()) {
            seen.push(line.speaker.as_str());
        }
    }
    seen
}

/// Keeps the speaker map in step with the dialogue and the voice directory.
/// The map is rebuilt from scratch whenever either input changes.
#[derive(Debug, Default)]
pub struct VoiceSetup {
    speakers: Vec<String>,
    directory: VoiceDirectory,
    map: SpeakerVoiceMap,
}

impl VoiceSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild if the distinct speaker list or the directory changed.
    /// Returns whether a rebuild happened.
    pub fn refresh(&mut self, dialogue: &[DialogueRecord], directory: &VoiceDirectory) -> bool {
        let speakers: Vec<String> = distinct_speakers(dialogue)
            .into_iter()
            .map(str::to_string)
            .collect();

        if speakers == self.speakers && *directory == self.directory {
            return false;
        }

        self.map = SpeakerVoiceMap::assign(dialogue, directory);
        self.speakers = speakers;
        self.directory = directory.clone();
        true
    }

    pub fn map(&self) -> &SpeakerVoiceMap {
        &self.map
    }

    /// Mutable access for per-speaker overrides; the next rebuild discards them
    pub fn map_mut(&mut self) -> &mut SpeakerVoiceMap {
        &mut self.map
    }
}
