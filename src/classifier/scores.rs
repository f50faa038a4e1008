use std::collections::BTreeMap;
use std::ops::Add;

/// クラス名 → スコアの対応
///
/// 登録されていないクラスのスコアは 0 として扱う。フレームによって候補から
/// 外れたクラスも、呼び出し側は `get` で 0 を受け取れる。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassScores<T> {
    scores: BTreeMap<String, T>,
}

/// 分類器の生の投票数
pub type PoseClassification = ClassScores<usize>;

/// 平滑化後のスコア
pub type SmoothedClassification = ClassScores<f32>;

impl<T> ClassScores<T>
where
    T: Copy + Default + PartialOrd + Add<Output = T>,
{
    pub fn new() -> Self {
        Self {
            scores: BTreeMap::new(),
        }
    }

    /// クラスのスコア。未登録なら 0
    pub fn get(&self, class_name: &str) -> T {
        self.scores.get(class_name).copied().unwrap_or_default()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.scores.contains_key(class_name)
    }

    pub fn insert(&mut self, class_name: impl Into<String>, value: T) {
        self.scores.insert(class_name.into(), value);
    }

    /// 既存スコアに加算（未登録なら 0 から）
    pub fn add(&mut self, class_name: &str, value: T) {
        let entry = self.scores.entry(class_name.to_string()).or_default();
        *entry = *entry + value;
    }

    /// クラス名の昇順
    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.scores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn total(&self) -> T {
        self.scores.values().fold(T::default(), |acc, v| acc + *v)
    }

    /// 最大スコアを持つクラス（同点なら全部、名前順）
    pub fn top_classes(&self) -> Vec<&str> {
        let max = self.scores.values().copied().fold(None, |acc: Option<T>, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        });
        match max {
            Some(max) => self
                .scores
                .iter()
                .filter(|(_, v)| **v == max)
                .map(|(k, _)| k.as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}

impl<T, K> FromIterator<(K, T)> for ClassScores<T>
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl PoseClassification {
    /// 投票数を浮動小数のスコアに変換
    pub fn to_smoothed(&self) -> SmoothedClassification {
        self.iter().map(|(k, v)| (k, v as f32)).collect()
    }
}
