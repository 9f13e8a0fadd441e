use lectern::narration::{
    ChannelNarrator, NarrationScheduler, PlaybackState, SchedulerConfig, Voice, VoiceDirectory,
    VoiceId, VoiceSetup,
};
use lectern::quiz::{AnswerOutcome, QuizProgress, QuizSession};
use lectern::reader::{read_lesson_async, LessonReader, LessonSource, ReaderConfig};
use lectern::record_parser::parse;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{TestFixture, LESSON_SHEET};

fn directory() -> VoiceDirectory {
    VoiceDirectory::new(vec![
        Voice::new("en-1", "Alex", "en-US"),
        Voice::new("de-1", "Anna", "de-DE"),
        Voice::new("en-2", "Kate", "en-GB"),
    ])
}

/// Load a sheet from disk, assign voices and narrate it through the channel device
#[tokio::test]
async fn test_sheet_to_narration_pipeline() {
    let fixture = TestFixture::new();
    let path = fixture.create_sheet("lesson.csv", LESSON_SHEET);

    let text = read_lesson_async(&path).await.expect("Sheet should load");
    let lesson = parse(&text);
    assert_eq!(lesson.dialogue.len(), 3);

    let mut setup = VoiceSetup::new();
    assert!(setup.refresh(&lesson.dialogue, &directory().filter_language("en")));
    assert_eq!(setup.map().get("Mike"), Some(&VoiceId::new("en-1")));
    assert_eq!(setup.map().get("John"), Some(&VoiceId::new("en-2")));

    let (device, mut completions) = ChannelNarrator::new();
    let mut scheduler = NarrationScheduler::new(device, SchedulerConfig::default());
    scheduler.play(lesson.dialogue.clone(), setup.map().clone());

    let mut visited = Vec::new();
    while let Some(cursor) = scheduler.cursor() {
        visited.push(cursor);
        let ticket = completions.recv().await.expect("Device should report completion");
        assert!(scheduler.complete(ticket));
    }

    assert_eq!(visited, vec![0, 1, 2]);
    assert_eq!(scheduler.state(), PlaybackState::Idle);
    assert_eq!(scheduler.device().spoken(), 3);
}

/// A stop between submission and completion leaves the queued completion inert
#[tokio::test]
async fn test_queued_completion_after_stop_is_ignored() {
    let lesson = parse(LESSON_SHEET);

    let (device, mut completions) = ChannelNarrator::new();
    let mut scheduler = NarrationScheduler::new(device, SchedulerConfig::default());
    scheduler.play(lesson.dialogue, VoiceSetup::new().map().clone());
    scheduler.stop();

    let queued = completions.recv().await.expect("Completion should be queued");
    assert!(!scheduler.complete(queued));
    assert_eq!(scheduler.state(), PlaybackState::Idle);
    assert_eq!(scheduler.device().spoken(), 1);
}

#[tokio::test]
async fn test_unreadable_sheet_parses_to_empty_lesson() {
    let fixture = TestFixture::new();
    let reader = LessonReader::new(ReaderConfig::default());
    let source = LessonSource::Path(fixture.root_path.join("missing.csv"));

    let (text, stats) = reader.read_source(&source).await.expect("Non-fail-fast read");
    assert!(stats.read_error.is_some());
    assert!(parse(&text).is_empty());
}

#[test]
fn test_quiz_session_over_parsed_sheet() {
    let lesson = parse(LESSON_SHEET);
    let mut session = QuizSession::new(lesson.quiz);

    assert_eq!(session.len(), 2);
    assert_eq!(
        session.visible_choices(),
        vec![(0, "4"), (1, "5"), (2, "3"), (3, "6")]
    );
    assert_eq!(session.answer(1), AnswerOutcome::Incorrect);
    assert_eq!(session.answer(0), AnswerOutcome::Correct);

    assert_eq!(session.next_question(), QuizProgress::Question(1));
    assert_eq!(session.answer(2), AnswerOutcome::Correct);

    assert_eq!(session.next_question(), QuizProgress::Complete);
    assert_eq!(session.score(), 2);
}

#[test]
fn test_read_aloud_question_with_default_voice() {
    let lesson = parse(LESSON_SHEET);
    let (device, _completions) = ChannelNarrator::new();
    let config = SchedulerConfig {
        default_voice: Some(VoiceId::new("narrator")),
    };
    let mut scheduler = NarrationScheduler::new(device, config);

    assert!(scheduler.read_aloud(&lesson.quiz[0].question));
    assert_eq!(scheduler.state(), PlaybackState::Idle);
    assert_eq!(scheduler.device().spoken(), 1);
}
