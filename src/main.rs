use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lectern::narration::{
    ChannelNarrator, NarrationScheduler, PlaybackEvent, SchedulerConfig, Voice, VoiceDirectory,
    VoiceId, VoiceSetup,
};
use lectern::reader::{LessonReader, LessonSource, ReaderConfig};
use lectern::record_parser::{ParsedLesson, RecordParser};

#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Parse a lesson sheet and narrate its dialogue")]
#[command(version)]
struct Args {
    /// Lesson sheet path, or `-` for stdin
    source: LessonSource,

    /// Print the parsed collections as JSON
    #[arg(long)]
    json: bool,

    /// Narrate the dialogue through the console narrator
    #[arg(long)]
    narrate: bool,

    /// Available voices, in assignment order
    #[arg(long, value_delimiter = ',', default_value = "voice-a,voice-b")]
    voices: Vec<String>,

    /// Voice for speakers without an assigned voice
    #[arg(long)]
    default_voice: Option<String>,

    /// Abort if the sheet cannot be read
    #[arg(long)]
    fail_fast: bool,

    /// Log filter directive
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_new(&args.log_level)?)
        .json()
        .init();

    info!(?args, "Parsed CLI arguments");

    let reader = LessonReader::new(ReaderConfig {
        fail_fast: args.fail_fast,
        ..ReaderConfig::default()
    });
    let (text, _stats) = reader.read_source(&args.source).await?;

    let lesson = RecordParser::with_default_rules()?.parse(&text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lesson)?);
    } else {
        print_summary(&lesson);
    }

    if args.narrate {
        narrate(&lesson, &args).await?;
    }

    Ok(())
}

fn print_summary(lesson: &ParsedLesson) {
    println!(
        "lectern v{} - {} quiz questions, {} dialogue lines, {} text blocks",
        env!("CARGO_PKG_VERSION"),
        lesson.quiz.len(),
        lesson.dialogue.len(),
        lesson.texts.len()
    );

    for text in &lesson.texts {
        println!("\n## {}\n{}", text.title, text.body);
    }

    for (n, question) in lesson.quiz.iter().enumerate() {
        println!("\nQ{}. {}", n + 1, question.question);
        for (slot, choice) in question.visible_choices() {
            let marker = if question.is_correct(slot) { "*" } else { " " };
            println!("  {marker} {}) {choice}", slot + 1);
        }
    }

    if !lesson.dialogue.is_empty() {
        println!();
        for line in &lesson.dialogue {
            println!("{}", line.transcript_line());
        }
    }
}

async fn narrate(lesson: &ParsedLesson, args: &Args) -> Result<()> {
    if lesson.dialogue.is_empty() {
        println!("No dialogue to narrate");
        return Ok(());
    }

    let directory = VoiceDirectory::new(
        args.voices
            .iter()
            .map(|name| Voice::new(name.as_str(), name.as_str(), "en"))
            .collect(),
    );
    let mut setup = VoiceSetup::new();
    setup.refresh(&lesson.dialogue, &directory);

    let config = SchedulerConfig {
        default_voice: args.default_voice.as_deref().map(VoiceId::from),
    };
    let (device, mut completions) = ChannelNarrator::new();
    let mut scheduler = NarrationScheduler::new(device, config).with_observer(
        |event: &PlaybackEvent| {
            if let PlaybackEvent::LineStarted { index, speaker, .. } = event {
                info!(index, %speaker, "Narrating line");
            }
        },
    );

    println!("\nNarrating {} lines (Ctrl-C to stop)", lesson.dialogue.len());
    scheduler.play(lesson.dialogue.clone(), setup.map().clone());

    while scheduler.is_speaking() {
        tokio::select! {
            Some(ticket) = completions.recv() => {
                scheduler.complete(ticket);
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                scheduler.stop();
                println!("Narration stopped");
            }
        }
    }

    info!(spoken = scheduler.device().spoken(), "Narration loop finished");
    Ok(())
}
