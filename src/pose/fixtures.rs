//! テスト用の合成ランドマーク

use super::embedding::FullBodyEmbedder;
use super::landmark::{LandmarkIndex, PoseLandmarks};
use crate::classifier::PoseSample;

/// 合成する姿勢の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    /// 直立、両腕を頭上に伸ばす
    ArmsUp,
    /// しゃがみ込み、両腕を前に下ろす
    Squat,
}

/// 正面向きの合成ポーズ（ピクセル座標、y は下向き）
/// `jitter` は腕と膝の位置をずらしてクラス内のばらつきを作る
pub fn pose(stance: Stance, jitter: f32) -> PoseLandmarks {
    use LandmarkIndex as L;

    let mut points = [[0.0f32; 3]; LandmarkIndex::COUNT];
    let mut set = |idx: L, x: f32, y: f32| {
        let i = idx as usize;
        // 奥行きはインデックスで少し変化させる
        points[i] = [x, y, (i as f32 - 16.0) * 0.5];
    };

    let (top, hip_y) = match stance {
        Stance::ArmsUp => (0.0, 300.0),
        Stance::Squat => (120.0, 400.0),
    };

    set(L::Nose, 300.0, 100.0 + top);
    set(L::LeftEyeInner, 305.0, 95.0 + top);
    set(L::LeftEye, 310.0, 95.0 + top);
    set(L::LeftEyeOuter, 315.0, 95.0 + top);
    set(L::RightEyeInner, 295.0, 95.0 + top);
    set(L::RightEye, 290.0, 95.0 + top);
    set(L::RightEyeOuter, 285.0, 95.0 + top);
    set(L::LeftEar, 320.0, 100.0 + top);
    set(L::RightEar, 280.0, 100.0 + top);
    set(L::MouthLeft, 307.0, 110.0 + top);
    set(L::MouthRight, 293.0, 110.0 + top);
    set(L::LeftShoulder, 340.0, 150.0 + top);
    set(L::RightShoulder, 260.0, 150.0 + top);
    set(L::LeftHip, 325.0, hip_y);
    set(L::RightHip, 275.0, hip_y);

    match stance {
        Stance::ArmsUp => {
            set(L::LeftElbow, 350.0 + jitter, 90.0);
            set(L::RightElbow, 250.0 - jitter, 90.0);
            set(L::LeftWrist, 355.0 + jitter, 30.0);
            set(L::RightWrist, 245.0 - jitter, 30.0);
            set(L::LeftKnee, 325.0, 400.0 + jitter);
            set(L::RightKnee, 275.0, 400.0 + jitter);
            set(L::LeftAnkle, 325.0, 500.0);
            set(L::RightAnkle, 275.0, 500.0);
        }
        Stance::Squat => {
            set(L::LeftElbow, 360.0 + jitter, 330.0);
            set(L::RightElbow, 240.0 - jitter, 330.0);
            set(L::LeftWrist, 345.0 + jitter, 390.0);
            set(L::RightWrist, 255.0 - jitter, 390.0);
            set(L::LeftKnee, 380.0 + jitter, 430.0);
            set(L::RightKnee, 220.0 - jitter, 430.0);
            set(L::LeftAnkle, 335.0, 500.0);
            set(L::RightAnkle, 265.0, 500.0);
        }
    }

    // 手と足の先は手首・足首の近くに置く
    let near = |points: &[[f32; 3]; LandmarkIndex::COUNT], idx: L, dx: f32, dy: f32| {
        let p = points[idx as usize];
        [p[0] + dx, p[1] + dy, p[2]]
    };
    points[L::LeftPinky as usize] = near(&points, L::LeftWrist, 6.0, -4.0);
    points[L::RightPinky as usize] = near(&points, L::RightWrist, -6.0, -4.0);
    points[L::LeftIndex as usize] = near(&points, L::LeftWrist, 3.0, -8.0);
    points[L::RightIndex as usize] = near(&points, L::RightWrist, -3.0, -8.0);
    points[L::LeftThumb as usize] = near(&points, L::LeftWrist, -3.0, -5.0);
    points[L::RightThumb as usize] = near(&points, L::RightWrist, 3.0, -5.0);
    points[L::LeftHeel as usize] = near(&points, L::LeftAnkle, -3.0, 8.0);
    points[L::RightHeel as usize] = near(&points, L::RightAnkle, 3.0, 8.0);
    points[L::LeftFootIndex as usize] = near(&points, L::LeftAnkle, 12.0, 10.0);
    points[L::RightFootIndex as usize] = near(&points, L::RightAnkle, -12.0, 10.0);

    PoseLandmarks::from_points(&points).expect("fixture has 33 finite points")
}

/// 全点に同じ平行移動とスケールを掛ける
pub fn transformed(pose: &PoseLandmarks, offset: [f32; 3], scale: f32) -> PoseLandmarks {
    let points: Vec<[f32; 3]> = pose
        .points
        .iter()
        .map(|p| {
            [
                p.x * scale + offset[0],
                p.y * scale + offset[1],
                p.z * scale + offset[2],
            ]
        })
        .collect();
    PoseLandmarks::from_points(&points).expect("fixture has 33 finite points")
}

/// デフォルトの埋め込みで作ったラベル付きサンプル
pub fn sample(
    name: impl Into<String>,
    class_name: &str,
    stance: Stance,
    jitter: f32,
) -> PoseSample {
    PoseSample::new(name, class_name, pose(stance, jitter), &FullBodyEmbedder::default())
        .expect("fixture pose embeds")
}
