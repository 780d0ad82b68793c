//! Beatsync CLI — headless simulation, synthetic map generation, and map
//! inspection.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{error, info};

use beatsync::audio::{AudioClock, PlaybackClock};
use beatsync::beatmap::synth::{self, SynthParams};
use beatsync::beatmap::BeatMap;
use beatsync::conductor::Conductor;
use beatsync::config::SyncConfig;
use beatsync::loader::{loader_channel, BeatMapLoader, DirSource, RetrievalKey};
use beatsync::pool::EntityId;
use beatsync::scene::SimScene;
use beatsync::sync::SyncOutcome;

#[derive(Parser)]
#[command(name = "beatsync", version, about = "Beat-map scheduler and audio sync engine")]
struct Cli {
    /// Config file (defaults to ~/.beatsync/config.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a map through the scheduler with a simulated scene and audio clock.
    Simulate(SimulateArgs),
    /// Write a synthetic map as JSON.
    Generate(GenerateArgs),
    /// Print statistics for a map file.
    Inspect {
        /// Path to a map JSON document.
        file: PathBuf,
    },
}

#[derive(Args)]
struct SimulateArgs {
    /// Map JSON document. Without it, a map is loaded by id/difficulty from
    /// --map-dir, or a synthetic map is generated.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Directory of `{map_id}/{difficulty}.json` documents.
    #[arg(long)]
    map_dir: Option<PathBuf>,

    #[arg(long)]
    map_id: Option<String>,

    #[arg(long)]
    difficulty: Option<String>,

    /// Seed for the synthetic map.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Frame length in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    step_ms: f64,

    /// Audio clock speed relative to wall time (e.g. 0.995 for a slow device).
    #[arg(long, default_value_t = 1.0)]
    drift: f64,

    /// Override beat speed.
    #[arg(long)]
    speed: Option<f64>,

    /// Override anticipation time in seconds.
    #[arg(long)]
    anticipation: Option<f64>,

    /// Sleep between frames so the simulation runs at wall speed.
    #[arg(long)]
    realtime: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Output path.
    #[arg(long, short)]
    out: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 120.0)]
    bpm: f64,

    /// Map length in beats.
    #[arg(long, default_value_t = 64)]
    beats: u32,

    /// Probability that a slot holds a note.
    #[arg(long, default_value_t = 0.6)]
    density: f64,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "beatsync=debug"
    } else {
        "beatsync=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn load_config(path: Option<&Path>) -> Result<SyncConfig, String> {
    match path {
        Some(path) => SyncConfig::load_from(path).map_err(|e| format!("{}: {e}", path.display())),
        None => Ok(SyncConfig::load().unwrap_or_default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Simulate(args) => simulate(config, args),
        Command::Generate(args) => generate(args),
        Command::Inspect { file } => inspect(&file),
    });

    if let Err(e) = result {
        error!("{e}");
        eprintln!("beatsync: {e}");
        std::process::exit(1);
    }
}

fn read_map(path: &Path) -> Result<BeatMap, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    BeatMap::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn simulate(mut config: SyncConfig, args: SimulateArgs) -> Result<(), String> {
    if let Some(speed) = args.speed {
        config.beat_speed = speed;
    }
    if let Some(anticipation) = args.anticipation {
        config.beat_anticipation_time = anticipation;
    }
    if args.map_id.is_some() {
        config.map_id = args.map_id.clone();
    }
    if args.difficulty.is_some() {
        config.difficulty = args.difficulty.clone();
    }
    config.validate().map_err(|e| e.to_string())?;
    if !(args.step_ms.is_finite() && args.step_ms > 0.0) {
        return Err(format!("--step-ms must be positive, got {}", args.step_ms));
    }

    let pool = config.build_pool();
    let scene = SimScene::<EntityId>::new(config.listener_depth, config.despawn_depth);
    let mut conductor: Conductor<_, _, PlaybackClock> = Conductor::new(config.clone(), pool, scene);

    // Maps arrive through the loader channel, as they would from a
    // background fetch.
    let (tx, rx) = loader_channel();
    if let Some(path) = &args.map {
        let map = read_map(path)?;
        conductor.load_map(Arc::new(map));
    } else if let (Some(dir), Some(key)) = (&args.map_dir, config.retrieval_key()) {
        BeatMapLoader::new(DirSource::new(dir))
            .with_events(tx)
            .load(&key)
            .map_err(|e| e.to_string())?;
    } else if args.map_dir.is_some() {
        return Err("--map-dir needs --map-id and --difficulty".into());
    } else {
        let map = synth::generate(&SynthParams::default(), args.seed).map_err(|e| e.to_string())?;
        info!("using synthetic map (seed {})", args.seed);
        conductor.load_map(Arc::new(map));
    }
    for event in rx.drain() {
        conductor.handle_loader_event(event);
    }

    let map = conductor
        .map()
        .cloned()
        .ok_or_else(|| "no map loaded".to_string())?;

    // The song starts once the first entities have had time to travel.
    let lead_in_ms = config.beat_anticipation_time * 1000.0;
    conductor.attach_audio(
        PlaybackClock::new(map.bpm())
            .with_rate(args.drift)
            .with_lead_in(lead_in_ms),
    );

    let running = Arc::new(AtomicBool::new(true));
    if args.realtime {
        let flag = Arc::clone(&running);
        ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
            .map_err(|e| format!("cannot install Ctrl-C handler: {e}"))?;
    }

    let mut totals = Totals::default();
    let frame = Duration::from_secs_f64(args.step_ms / 1000.0);
    let end_ms = map.duration_ms() + lead_in_ms + 1000.0;
    let mut elapsed_ms = 0.0;

    while running.load(Ordering::SeqCst) && elapsed_ms <= end_ms {
        if let Some(audio) = conductor.audio_mut() {
            audio.advance(args.step_ms);
        }
        let (scene, pool) = conductor.scene_and_pool_mut();
        totals.released += scene.advance(args.step_ms, pool);
        let audio_before = conductor.audio().map_or(0.0, |a| a.position_ms());

        let report = conductor.tick(args.step_ms);
        totals.spawned += report.spawned;
        totals.dropped += report.dropped;
        totals.obstacles += report.obstacles;
        if let SyncOutcome::Synced { beat } = report.sync {
            let corrected = conductor.audio().map_or(0.0, |a| a.position_ms());
            println!(
                "sync at {:.0} ms: beat {beat}, audio {:.1} ms -> {:.1} ms (offset {:+.1} ms)",
                elapsed_ms + args.step_ms,
                audio_before,
                corrected,
                corrected - audio_before
            );
        }

        elapsed_ms += args.step_ms;
        if args.realtime {
            thread::sleep(frame);
        }
    }

    println!(
        "{} notes / {} obstacles at {} BPM over {:.1} s",
        map.note_count(),
        map.obstacle_count(),
        map.bpm(),
        elapsed_ms / 1000.0
    );
    println!(
        "spawned {}, dropped {}, obstacles {}, released {}",
        totals.spawned, totals.dropped, totals.obstacles, totals.released
    );
    if !conductor.is_synced() {
        println!("audio was never synced");
    }
    Ok(())
}

#[derive(Default)]
struct Totals {
    spawned: usize,
    dropped: usize,
    obstacles: usize,
    released: usize,
}

fn generate(args: GenerateArgs) -> Result<(), String> {
    let params = SynthParams {
        bpm: args.bpm,
        beats: args.beats,
        density: args.density,
        ..SynthParams::default()
    };
    let map = synth::generate(&params, args.seed).map_err(|e| e.to_string())?;
    let json = map.to_document().to_json().map_err(|e| e.to_string())?;
    std::fs::write(&args.out, json).map_err(|e| format!("{}: {e}", args.out.display()))?;
    println!(
        "wrote {} ({} notes, {} obstacles)",
        args.out.display(),
        map.note_count(),
        map.obstacle_count()
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<(), String> {
    let map = read_map(path)?;
    println!("tempo:     {} BPM ({:.1} ms/beat)", map.bpm(), map.ms_per_beat());
    println!("notes:     {}", map.note_count());
    println!("obstacles: {}", map.obstacle_count());
    println!("length:    {:.1} s", map.duration_ms() / 1000.0);
    if let Some(first) = map.notes().first() {
        println!(
            "first note: beat {} ({:.0} ms)",
            first.time,
            first.time * map.ms_per_beat()
        );
    }
    let key = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|id| Some((id.to_str()?, path.file_stem()?.to_str()?)))
        .and_then(|(id, diff)| RetrievalKey::new(id, diff).ok());
    if let Some(key) = key {
        println!("retrieval key: {key}");
    }
    Ok(())
}
