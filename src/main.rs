use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use phonics_play::audio::AudioPlaybackManager;
use phonics_play::config::AppConfig;
use phonics_play::error::AppResult;
use phonics_play::games::{LetterRound, RoundTally};
use phonics_play::messaging::{Event, EventBus};
use phonics_play::services::{
    ActivityKind, ActivityStore, LetterStore, ProgressStore, WordStore,
};

/// Initialize tracing with file rotation
///
/// Logs are written to a `logs/` folder next to the config file:
/// - macOS: ~/Library/Application Support/PhonicsPlay/logs/
/// - Windows: %APPDATA%/PhonicsPlay/logs/
/// - Linux: ~/.config/PhonicsPlay/logs/
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("PhonicsPlay").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "phonics-play.log");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();
}

/// Render bus events as console toasts until shutdown.
fn spawn_toast_thread(bus: &EventBus) -> thread::JoinHandle<()> {
    let (rx, _id) = bus.subscribe();
    thread::spawn(move || {
        for event in rx.iter() {
            match event {
                Event::Notification { severity, message } => {
                    println!(
                        "\n  🔔 [{}] {} (dismisses in {}s)",
                        severity.label(),
                        message,
                        severity.auto_close().as_secs()
                    );
                }
                Event::PlaybackStarted { url } => {
                    tracing::debug!("Playback started: {}", url);
                }
                Event::Shutdown => break,
            }
        }
    })
}

fn main() {
    initialize_tracing();

    println!("===========================================");
    println!("  Phonics Play - letters, words and sounds");
    println!("===========================================\n");

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("✓ Configuration loaded");
            println!("  Sounds directory: {}", config.sounds_dir);
            println!("  Backend: {:?}", config.backend);
            println!("  Config file: {}\n", AppConfig::config_path_display());
            config
        }
        Err(e) => {
            eprintln!("✗ Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: AppConfig) -> AppResult<()> {
    let bus = EventBus::new();
    let toast_thread = spawn_toast_thread(&bus);

    let latency = config.store_latency();
    let letters = LetterStore::from_embedded()?.with_latency(latency);
    let words = WordStore::from_embedded()?.with_latency(latency);
    let progress = ProgressStore::from_embedded()?.with_latency(latency);
    let activities = ActivityStore::from_embedded()?.with_latency(latency);

    let manager = Arc::new(AudioPlaybackManager::new(config.playback(), bus.clone()));
    manager.initialize();
    manager.set_volume(config.default_volume);
    match manager.backend_kind() {
        Some(kind) => println!("✓ Audio ready ({} backend)", kind),
        None => println!("✗ Audio not initialized"),
    }

    let alphabet = letters.get_all();
    let preloaded = manager.preload_letter_sounds(&alphabet);
    println!("✓ Preloaded {}/{} letter sounds\n", preloaded, alphabet.len());

    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => continue,
            "quit" | "exit" => break,
            "help" => print_help(),
            "mute" => {
                manager.mute();
                println!("  Muted");
            }
            "unmute" => {
                manager.unmute();
                println!("  Unmuted (volume {:.1})", manager.get_volume());
            }
            "progress" => match progress.get() {
                Some(p) => println!(
                    "  Level {} · ⭐ {} · {} letters · {} words · {}-day streak",
                    p.current_level,
                    p.total_stars,
                    p.completed_letters.len(),
                    p.completed_words.len(),
                    p.streak_days
                ),
                None => println!("  No progress yet - play something!"),
            },
            "recent" => {
                for activity in activities.recent(5) {
                    println!("  {:?}: {}%", activity.kind, activity.score);
                }
            }
            "quiz" => run_quiz(&manager, &letters, &progress, &activities),
            other if other.starts_with("vol ") => match other[4..].trim().parse::<f32>() {
                Ok(value) => {
                    manager.set_volume(value);
                    println!("  Volume {:.1}", manager.get_volume());
                }
                Err(_) => println!("  Usage: vol <0.0-1.0>"),
            },
            other if other.len() == 1 && other.chars().all(|c| c.is_ascii_alphabetic()) => {
                play_letter(other, &manager, &letters, &progress);
            }
            other if other.chars().all(|c| c.is_ascii_alphabetic()) => {
                build_word(other, &manager, &words, &progress, &activities);
            }
            _ => println!("  Type a letter, a word, or 'help'"),
        }
    }

    bus.publish(Event::Shutdown);
    manager.cleanup();
    let _ = toast_thread.join();

    println!("\nGoodbye! 👋");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  <letter>   play a letter's sound and mark it learned");
    println!("  <word>     try to build a word from its letters");
    println!("  quiz       play a letter-sound quiz round");
    println!("  vol <x>    set volume (0.0-1.0)   mute / unmute");
    println!("  progress   show stars and streaks  recent  help  quit");
}

fn play_letter(
    input: &str,
    manager: &AudioPlaybackManager,
    letters: &LetterStore,
    progress: &ProgressStore,
) {
    let wanted = input.chars().next().unwrap_or(' ').to_ascii_uppercase();
    let Some(letter) = letters.get_all().into_iter().find(|l| l.character == wanted) else {
        println!("  Unknown letter: {}", input);
        return;
    };

    println!(
        "  {} says \"{}\" as in {}",
        letter.character, letter.phonics, letter.example_word
    );
    if manager.play_sound(&letter.sound_url()) {
        let _ = letters.mark_completed(letter.id);
        let updated = progress.add_completed_letter(letter.id);
        println!("  ⭐ total stars: {}", updated.total_stars);
    }
}

fn build_word(
    input: &str,
    manager: &AudioPlaybackManager,
    words: &WordStore,
    progress: &ProgressStore,
    activities: &ActivityStore,
) {
    let tiles: Vec<char> = input.chars().collect();
    match words.validate_word(&tiles) {
        Some(word) => {
            println!("  ✓ {} is a word! ({:?})", word.text, word.difficulty);
            manager.play_sound(&word.sound_url());
            let updated = progress.add_completed_word(word.id);
            activities.create(ActivityKind::WordBuilding, 100);
            println!("  ⭐ total stars: {}", updated.total_stars);
        }
        None => println!("  ✗ That's not a word we know - try again!"),
    }
}

fn run_quiz(
    manager: &AudioPlaybackManager,
    letters: &LetterStore,
    progress: &ProgressStore,
    activities: &ActivityStore,
) {
    let pool = letters.get_all();
    let mut rng = rand::thread_rng();
    let Some(round) = LetterRound::new(&pool, &mut rng) else {
        println!("  Not enough letters for a quiz");
        return;
    };

    println!("  Which letter makes the \"{}\" sound?", round.target().phonics);
    manager.play_sound(&round.target().sound_url());
    for (i, option) in round.options().iter().enumerate() {
        print!("  {}) {}  ", i + 1, option.character);
    }
    println!();

    print!("  your answer: ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return;
    }

    let choice = answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| round.options().get(n.wrapping_sub(1)));

    let mut tally = RoundTally::default();
    match choice {
        Some(option) if round.check(option.id) => {
            tally.record(true);
            println!("  ✓ Correct! {} it is", round.target().character);
            progress.add_completed_letter(round.target().id);
        }
        Some(option) => {
            tally.record(false);
            println!(
                "  ✗ That was {} - the answer was {}",
                option.character,
                round.target().character
            );
        }
        None => {
            tally.record(false);
            println!("  ✗ The answer was {}", round.target().character);
        }
    }

    let activity = activities.create(ActivityKind::LetterSound, tally.percent());
    println!("  Round score: {}% ({} stars)", activity.score, tally.stars());
}
