use std::io::{Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use rtttl::{Clock, Note, Player, Song, SystemClock, Tick, ToneOutput};

#[derive(Parser)]
#[command(name = "rtttl", about = "Inspect and play RTTTL ringtones")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the decoded note schedule
    Plan(SongArgs),

    /// Play in real time against a logging speaker
    Play {
        #[command(flatten)]
        song: SongArgs,

        /// Milliseconds between ticks
        #[arg(long, default_value_t = 1)]
        poll_ms: u64,
    },
}

#[derive(Args)]
struct SongArgs {
    /// File holding one RTTTL song, or `-` for stdin
    #[arg(required_unless_present = "text")]
    file: Option<PathBuf>,

    /// Inline RTTTL text instead of a file
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
}

impl SongArgs {
    fn read(&self) -> Result<String> {
        let raw = match (&self.text, &self.file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => bail!("no song given"),
        };
        Ok(raw.trim().to_string())
    }
}

/// Logs every tone change instead of driving hardware.
struct Speaker {
    clock: SystemClock,
}

impl ToneOutput for Speaker {
    fn set_tone(&mut self, frequency_hz: u32) -> anyhow::Result<()> {
        info!(t = self.clock.now_millis(), "tone {frequency_hz} Hz");
        Ok(())
    }

    fn silence(&mut self) -> anyhow::Result<()> {
        tracing::debug!(t = self.clock.now_millis(), "silence");
        Ok(())
    }
}

const NAMES: [&str; 14] = [
    "rest", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B", "B#",
];

fn label(note: &Note) -> String {
    if note.is_rest() {
        return "rest".into();
    }
    let dot = if note.dotted { "." } else { "" };
    format!("{}{}{}", NAMES[note.pitch as usize], note.octave, dot)
}

/// Write the header line and one row per note: index, start, Hz, ms, name.
fn write_plan(text: &str, out: &mut impl Write) -> Result<()> {
    let song = Song::parse(text)?;
    let header = song.header();
    writeln!(
        out,
        "{}: d={} o={} b={} whole={}ms",
        song.name(),
        header.default_duration,
        header.default_octave,
        header.bpm,
        header.whole_note_ms
    )?;
    writeln!(out, "{:>4} {:>8} {:>7} {:>6}  note", "#", "start", "hz", "ms")?;

    let mut start: u64 = 0;
    for (i, note) in song.notes().enumerate() {
        let note = note?;
        writeln!(
            out,
            "{:>4} {:>8} {:>7} {:>6}  {}",
            i + 1,
            start,
            note.frequency_hz,
            note.duration_ms,
            label(&note)
        )?;
        start += note.hold_ms() as u64;
    }
    writeln!(out, "total {start} ms")?;
    Ok(())
}

fn play(text: &str, poll: Duration) -> Result<()> {
    let clock = SystemClock::new();
    let mut player = Player::new(Speaker { clock });
    player.load(text)?;
    player.start()?;

    loop {
        let tick = player.tick(clock.now_millis())?;
        if !tick.is_playing() {
            break;
        }
        match tick {
            Tick::Note(note) => info!("{} for {} ms", label(&note), note.duration_ms),
            _ => thread::sleep(poll),
        }
    }
    info!("done after {} ms", clock.now_millis());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .without_time()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rtttl=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(song) => write_plan(&song.read()?, &mut std::io::stdout().lock()),
        Command::Play { song, poll_ms } => play(&song.read()?, Duration::from_millis(poll_ms)),
    }
}
