use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use tracing::info;

use pose_reps::classifier::{PoseClassifier, SampleDatabase};
use pose_reps::config::Config;
use pose_reps::pose::FullBodyEmbedder;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    pose_reps::logging::init();

    // Usage: find_outliers [--remove]
    let remove = std::env::args().skip(1).any(|a| a == "--remove");

    info!("Outlier Finder ({})", env!("POSE_REPS_VERSION"));

    let config = Config::load_or_default(CONFIG_PATH);
    let samples = &config.samples;
    let embedder = FullBodyEmbedder::from_config(&config.embedder)?;
    let database = SampleDatabase::load_folder(&samples.folder, &samples.extension, &embedder)
        .with_context(|| format!("Failed to load samples from {}", samples.folder))?;

    println!("サンプル数:");
    for (class_name, count) in database.class_counts() {
        println!("  {}: {}", class_name, count);
    }

    let classifier = PoseClassifier::from_config(database, embedder, &config.classifier)?;
    let outliers = classifier.find_sample_outliers()?;

    println!("外れ値: {}", outliers.len());
    for outlier in &outliers {
        let votes: Vec<String> = outlier
            .classification
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!(
            "  {} ({}) -> {:?} [{}]",
            outlier.name,
            outlier.class_name,
            outlier.detected_classes,
            votes.join(" ")
        );
    }

    if !remove || outliers.is_empty() {
        return Ok(());
    }

    let cleaned = classifier.database().without_outliers(&outliers);
    // 全サンプルが外れ値だったクラスのファイルは消す
    for class_name in classifier.database().classes() {
        if cleaned.samples_of(class_name).next().is_none() {
            let file_name = format!("{}.{}", class_name, samples.extension);
            let path = Path::new(&samples.folder).join(file_name);
            fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    cleaned
        .write_folder(&samples.folder, &samples.extension)
        .with_context(|| format!("Failed to write samples to {}", samples.folder))?;

    println!("{} 件を削除しました", outliers.len());
    for (class_name, count) in cleaned.class_counts() {
        println!("  {}: {}", class_name, count);
    }
    Ok(())
}
