use crate::error::{PoseError, Result};

/// BlazePose の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    /// x, y, z の3成分
    pub const DIMS: usize = 3;

    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 検出器の出力と同じ snake_case 名
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky_1",
            Self::RightPinky => "right_pinky_1",
            Self::LeftIndex => "left_index_1",
            Self::RightIndex => "right_index_1",
            Self::LeftThumb => "left_thumb_2",
            Self::RightThumb => "right_thumb_2",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// X座標（ピクセル）
    pub x: f32,
    /// Y座標（ピクセル）
    pub y: f32,
    /// 奥行き（フレーム幅に比例）
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// 33ランドマークからなる姿勢
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    pub points: [Landmark; LandmarkIndex::COUNT],
}

impl PoseLandmarks {
    pub fn new(points: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { points }
    }

    /// (x, y, z) 列から構築。33点以外は InvalidInput
    pub fn from_points(points: &[[f32; 3]]) -> Result<Self> {
        if points.len() != LandmarkIndex::COUNT {
            return Err(PoseError::InvalidInput(format!(
                "expected {} landmarks, got {}",
                LandmarkIndex::COUNT,
                points.len()
            )));
        }
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        for (dst, src) in landmarks.iter_mut().zip(points) {
            *dst = Landmark::new(src[0], src[1], src[2]);
            if !dst.is_finite() {
                return Err(PoseError::InvalidInput(format!(
                    "non-finite landmark value {:?}",
                    src
                )));
            }
        }
        Ok(Self::new(landmarks))
    }

    /// x0, y0, z0, x1, ... の 99 値から構築
    pub fn from_flat(values: &[f32]) -> Result<Self> {
        let expected = LandmarkIndex::COUNT * LandmarkIndex::DIMS;
        if values.len() != expected {
            return Err(PoseError::InvalidInput(format!(
                "expected {} landmark values, got {}",
                expected,
                values.len()
            )));
        }
        let points: Vec<[f32; 3]> = values
            .chunks_exact(LandmarkIndex::DIMS)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::from_points(&points)
    }

    /// 検出器の正規化座標 (0.0〜1.0) をピクセル座標に変換して構築
    /// z はフレーム幅でスケールする
    pub fn from_normalized(points: &[[f32; 3]], width: u32, height: u32) -> Result<Self> {
        let w = width as f32;
        let h = height as f32;
        let scaled: Vec<[f32; 3]> = points.iter().map(|p| [p[0] * w, p[1] * h, p[2] * w]).collect();
        Self::from_points(&scaled)
    }

    /// インデックスでランドマークを取得
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.points[index as usize]
    }

    /// 左右反転（x の符号を反転）
    pub fn mirrored(&self) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            p.x = -p.x;
        }
        Self::new(points)
    }

    pub fn to_flat(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| p.to_array()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_count() {
        assert_eq!(LandmarkIndex::COUNT, 33);
        assert_eq!(LandmarkIndex::ALL.len(), 33);
    }

    #[test]
    fn test_landmark_index_order() {
        for (i, idx) in LandmarkIndex::ALL.iter().enumerate() {
            assert_eq!(*idx as usize, i);
        }
    }

    #[test]
    fn test_landmark_index_from_index() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(LandmarkIndex::from_index(24), Some(LandmarkIndex::RightHip));
        assert_eq!(LandmarkIndex::from_index(32), Some(LandmarkIndex::RightFootIndex));
        assert_eq!(LandmarkIndex::from_index(33), None);
    }

    #[test]
    fn test_landmark_names() {
        assert_eq!(LandmarkIndex::LeftShoulder.name(), "left_shoulder");
        assert_eq!(LandmarkIndex::RightThumb.name(), "right_thumb_2");
    }

    #[test]
    fn test_from_points_rejects_wrong_count() {
        let points = vec![[0.0, 0.0, 0.0]; 17];
        let err = PoseLandmarks::from_points(&points).unwrap_err();
        assert!(matches!(err, PoseError::InvalidInput(_)));
    }

    #[test]
    fn test_from_points_rejects_nan() {
        let mut points = vec![[0.0, 0.0, 0.0]; 33];
        points[5][1] = f32::NAN;
        assert!(matches!(
            PoseLandmarks::from_points(&points),
            Err(PoseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_flat() {
        let values: Vec<f32> = (0..99).map(|v| v as f32).collect();
        let pose = PoseLandmarks::from_flat(&values).unwrap();
        let hip = pose.get(LandmarkIndex::LeftHip);
        assert_eq!(hip.x, 69.0);
        assert_eq!(hip.y, 70.0);
        assert_eq!(hip.z, 71.0);
        assert_eq!(pose.to_flat(), values);

        assert!(PoseLandmarks::from_flat(&values[..98]).is_err());
    }

    #[test]
    fn test_from_normalized() {
        let points = vec![[0.5, 0.25, -0.1]; 33];
        let pose = PoseLandmarks::from_normalized(&points, 640, 480).unwrap();
        let nose = pose.get(LandmarkIndex::Nose);
        assert_eq!(nose.x, 320.0);
        assert_eq!(nose.y, 120.0);
        assert!((nose.z - -64.0).abs() < 1e-4);
    }

    #[test]
    fn test_mirrored() {
        let mut points = vec![[0.0, 0.0, 0.0]; 33];
        points[0] = [3.0, 4.0, 5.0];
        let pose = PoseLandmarks::from_points(&points).unwrap();
        let nose = *pose.mirrored().get(LandmarkIndex::Nose);
        assert_eq!(nose, Landmark::new(-3.0, 4.0, 5.0));
    }
}
