use anyhow::{bail, Context, Result};
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::time::Instant;

use tracing::{info, warn};

use pose_reps::classifier::{PoseClassifier, SampleDatabase};
use pose_reps::config::Config;
use pose_reps::pose::{read_landmark_file, FullBodyEmbedder};
use pose_reps::tracker::{ExerciseTracker, FrameResult};

const CONFIG_PATH: &str = "config.toml";
/// 進捗を表示する間隔（フレーム）
const PROGRESS_INTERVAL: usize = 50;

type LogFile = std::io::BufWriter<std::fs::File>;

fn open_log_file() -> Result<LogFile> {
    fs::create_dir_all("logs")?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = format!("logs/rep_counter_{}.log", ts);
    let file = std::fs::File::create(&path)?;
    info!("Log: {}", path);
    Ok(std::io::BufWriter::new(file))
}

/// "a=3 b=7" 形式
fn format_scores<'a, T: Display + 'a>(scores: impl Iterator<Item = (&'a str, T)>) -> String {
    scores
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_frame(log: &mut LogFile, frame: usize, result: &FrameResult) -> Result<()> {
    let raw = result
        .classification
        .as_ref()
        .map_or_else(|| "-".to_string(), |c| format_scores(c.iter()));
    let smoothed = result.smoothed.as_ref().map_or_else(
        || "-".to_string(),
        |s| format_scores(s.iter().map(|(k, v)| (k, format!("{:.2}", v)))),
    );
    writeln!(
        log,
        "frame={} reps={} raw=[{}] smoothed=[{}]",
        frame, result.repetitions, raw, smoothed
    )?;
    Ok(())
}

fn main() -> Result<()> {
    pose_reps::logging::init();

    // Usage: rep_counter <landmarks.csv> [class_name]
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        bail!("usage: rep_counter <landmarks.csv> [class_name]");
    }

    info!("Rep Counter ({})", env!("POSE_REPS_VERSION"));

    let mut config = Config::load_or_default(CONFIG_PATH);
    if let Some(class_name) = args.get(2) {
        config.counter.class_name = class_name.clone();
    }

    let embedder = FullBodyEmbedder::from_config(&config.embedder)?;
    let database =
        SampleDatabase::load_folder(&config.samples.folder, &config.samples.extension, &embedder)
            .with_context(|| format!("Failed to load samples from {}", config.samples.folder))?;
    if !database.classes().contains(&config.counter.class_name.as_str()) {
        warn!(
            class = %config.counter.class_name,
            available = ?database.classes(),
            "target class has no samples, count will stay at 0"
        );
    }

    let classifier = PoseClassifier::from_config(database, embedder, &config.classifier)?;
    let mut tracker = ExerciseTracker::from_config(&config)?;

    let frames = read_landmark_file(&args[1])
        .with_context(|| format!("Failed to read landmarks from {}", args[1]))?;
    info!(frames = frames.len(), class = %config.counter.class_name, "counting repetitions");

    let mut log = open_log_file()?;
    let timer = Instant::now();
    for (i, frame) in frames.iter().enumerate() {
        let result = match tracker.process(&classifier, frame.as_ref()) {
            Ok(result) => result,
            Err(e) => {
                // 分類できないフレームは姿勢なしとして扱う
                warn!(frame = i, "treating frame as no pose: {}", e);
                tracker.process(&classifier, None)?
            }
        };
        write_frame(&mut log, i, &result)?;

        if (i + 1) % PROGRESS_INTERVAL == 0 {
            info!(frame = i + 1, repetitions = result.repetitions, "progress");
        }
    }
    log.flush()?;

    let elapsed = timer.elapsed().as_secs_f32();
    info!(
        frames = frames.len(),
        fps = frames.len() as f32 / elapsed.max(f32::EPSILON),
        "done"
    );
    println!("{}: {}", config.counter.class_name, tracker.repetitions());
    Ok(())
}
