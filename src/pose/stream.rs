//! フレームごとのランドマーク列の読み込み
//!
//! 1行 = 1フレーム。99個の数値 (x0, y0, z0, ..., x32, y32, z32) が検出済み姿勢、
//! `-` だけの行は「姿勢なし」のフレーム。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::landmark::{LandmarkIndex, PoseLandmarks};
use crate::error::{PoseError, Result};

/// 姿勢なしフレームの記号
pub const NO_POSE_MARKER: &str = "-";

/// CSV ファイルからフレーム列を読み込む
pub fn read_landmark_file<P: AsRef<Path>>(path: P) -> Result<Vec<Option<PoseLandmarks>>> {
    let file = File::open(path.as_ref())?;
    read_landmark_stream(file)
}

/// フレーム列を読み込む。姿勢なしは None
pub fn read_landmark_stream<R: Read>(reader: R) -> Result<Vec<Option<PoseLandmarks>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let expected = LandmarkIndex::COUNT * LandmarkIndex::DIMS;
    let mut frames = Vec::new();
    for (frame, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() == 1 && &record[0] == NO_POSE_MARKER {
            frames.push(None);
            continue;
        }
        if record.len() != expected {
            return Err(PoseError::InvalidInput(format!(
                "frame {}: expected {} values or '{}', got {} fields",
                frame,
                expected,
                NO_POSE_MARKER,
                record.len()
            )));
        }
        let values = record
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PoseError::InvalidInput(format!("frame {}: {}", frame, e)))?;
        frames.push(Some(PoseLandmarks::from_flat(&values)?));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_row(value: f32) -> String {
        vec![value.to_string(); 99].join(",")
    }

    #[test]
    fn test_read_mixed_frames() {
        let input = format!("{}\n-\n{}\n", pose_row(1.0), pose_row(2.5));
        let frames = read_landmark_stream(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_some());
        assert!(frames[1].is_none());
        let last = frames[2].as_ref().unwrap();
        assert_eq!(last.get(LandmarkIndex::RightFootIndex).z, 2.5);
    }

    #[test]
    fn test_wrong_width_is_invalid_input() {
        let input = "1.0,2.0,3.0\n";
        let err = read_landmark_stream(input.as_bytes()).unwrap_err();
        assert!(matches!(err, PoseError::InvalidInput(msg) if msg.starts_with("frame 0")));
    }

    #[test]
    fn test_unparsable_value() {
        let mut row = vec!["0".to_string(); 99];
        row[10] = "abc".to_string();
        let input = format!("-\n{}\n", row.join(","));
        let err = read_landmark_stream(input.as_bytes()).unwrap_err();
        assert!(matches!(err, PoseError::InvalidInput(msg) if msg.starts_with("frame 1")));
    }
}
