//! 二値分類用の模擬データ生成
//!
//! 原点付近の直線でほぼ分離できる2つの2次元ガウス分布からサンプルを
//! 生成する。ノイズを含むため完全には分離できない。

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::StandardNormal;

/// クラス0のガウス分布の平均
pub const CLASS_ZERO_MEAN: [f32; 2] = [0.6, 0.2];
/// クラス1のガウス分布の平均
pub const CLASS_ONE_MEAN: [f32; 2] = [-0.4, -0.9];
/// クラス0のガウス分布の共分散行列
pub const CLASS_ZERO_COV: [[f32; 2]; 2] = [[0.1, 0.05], [0.05, 0.1]];
/// クラス1のガウス分布の共分散行列
pub const CLASS_ONE_COV: [[f32; 2]; 2] = [[0.2, 0.08], [0.08, 0.2]];

/// 1サンプル（2次元特徴量と二値ラベル）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub features: [f32; 2],
    /// 0.0 または 1.0
    pub label: f32,
}

/// ミニバッチ
#[derive(Clone, Debug)]
pub struct Batch {
    pub samples: Vec<Sample>,
}

/// 2次元ガウス分布（Cholesky分解済み）
struct Gaussian2d {
    mean: [f32; 2],
    /// 下三角因子 L（cov = L·Lᵀ）
    chol: [[f32; 2]; 2],
}

impl Gaussian2d {
    /// 共分散行列は正定値でなければならない
    fn new(mean: [f32; 2], cov: [[f32; 2]; 2]) -> Self {
        let a = cov[0][0];
        let b = cov[0][1];
        let c = cov[1][1];
        assert!(a > 0.0, "covariance matrix is not positive definite");
        let l00 = a.sqrt();
        let l10 = b / l00;
        let rem = c - l10 * l10;
        assert!(rem > 0.0, "covariance matrix is not positive definite");
        Self {
            mean,
            chol: [[l00, 0.0], [l10, rem.sqrt()]],
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> [f32; 2] {
        let z0: f32 = rng.sample(StandardNormal);
        let z1: f32 = rng.sample(StandardNormal);
        [
            self.mean[0] + self.chol[0][0] * z0,
            self.mean[1] + self.chol[1][0] * z0 + self.chol[1][1] * z1,
        ]
    }
}

/// ラベル付きデータセット
///
/// 生成後は不変。バッチ構成は `Loader` 側で行う。
#[derive(Clone, Debug)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    /// 模擬データを生成する
    ///
    /// 前半 `n_samples / 2` 件がクラス0、後半 `n_samples / 2` 件がクラス1。
    /// 奇数の場合は端数の1件を切り捨てる。同じシードのRNGからは
    /// ビット単位で同一のサンプル列が得られる。
    pub fn generate<R: Rng>(n_samples: usize, rng: &mut R) -> Self {
        let per_class = n_samples / 2;
        let class_zero = Gaussian2d::new(CLASS_ZERO_MEAN, CLASS_ZERO_COV);
        let class_one = Gaussian2d::new(CLASS_ONE_MEAN, CLASS_ONE_COV);

        let mut samples = Vec::with_capacity(per_class * 2);
        for _ in 0..per_class {
            samples.push(Sample {
                features: class_zero.sample(rng),
                label: 0.0,
            });
        }
        for _ in 0..per_class {
            samples.push(Sample {
                features: class_one.sample(rng),
                label: 1.0,
            });
        }

        Self { samples }
    }

    /// 既存のサンプル列からデータセットを構築する
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// サンプル数
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

/// ミニバッチローダ
///
/// 学習用はエポックごとにシャッフルして使う。検証用は全件を
/// 1バッチで返す構成（`full_batch`）にする。
#[derive(Clone, Debug)]
pub struct Loader {
    dataset: Dataset,
    batch_size: usize,
}

impl Loader {
    pub fn new(dataset: Dataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size,
        }
    }

    /// 全件を1バッチで返すローダ（検証用）
    pub fn full_batch(dataset: Dataset) -> Self {
        let batch_size = dataset.len();
        Self {
            dataset,
            batch_size,
        }
    }

    /// データセットのサンプル数
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 1エポックあたりのバッチ数
    pub fn batches_per_epoch(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// バッチ構成をシャッフルする
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.dataset.samples.shuffle(rng);
    }

    /// バッチを取得
    pub fn get_batch(&self, start: usize, batch_size: usize) -> Batch {
        let end = (start + batch_size).min(self.dataset.samples.len());
        let samples = self.dataset.samples[start..end].to_vec();
        Batch { samples }
    }

    /// エポックのイテレータ
    pub fn batches(&self) -> impl Iterator<Item = Batch> + '_ {
        (0..self.dataset.samples.len())
            .step_by(self.batch_size)
            .map(move |start| self.get_batch(start, self.batch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_counts_and_labels() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let dataset = Dataset::generate(100, &mut rng);
        assert_eq!(dataset.len(), 100);
        let zeros = dataset.samples().iter().filter(|s| s.label == 0.0).count();
        let ones = dataset.samples().iter().filter(|s| s.label == 1.0).count();
        assert_eq!(zeros, 50);
        assert_eq!(ones, 50);
        // 前半がクラス0、後半がクラス1
        assert!(dataset.samples()[..50].iter().all(|s| s.label == 0.0));
        assert!(dataset.samples()[50..].iter().all(|s| s.label == 1.0));
    }

    #[test]
    fn test_generate_odd_count_truncates() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let dataset = Dataset::generate(101, &mut rng);
        assert_eq!(dataset.len(), 100);

        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let dataset = Dataset::generate(1, &mut rng);
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_generate_deterministic() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        let a = Dataset::generate(64, &mut rng_a);
        let b = Dataset::generate(64, &mut rng_b);
        assert_eq!(a.samples(), b.samples());

        let mut rng_c = ChaCha8Rng::seed_from_u64(8);
        let c = Dataset::generate(64, &mut rng_c);
        assert_ne!(a.samples(), c.samples());
    }

    #[test]
    fn test_cholesky_reproduces_covariance() {
        let g = Gaussian2d::new(CLASS_ZERO_MEAN, CLASS_ZERO_COV);
        let l = g.chol;
        // L·Lᵀ が元の共分散行列に一致する
        let c00 = l[0][0] * l[0][0];
        let c01 = l[0][0] * l[1][0];
        let c11 = l[1][0] * l[1][0] + l[1][1] * l[1][1];
        assert!((c00 - CLASS_ZERO_COV[0][0]).abs() < 1e-6);
        assert!((c01 - CLASS_ZERO_COV[0][1]).abs() < 1e-6);
        assert!((c11 - CLASS_ZERO_COV[1][1]).abs() < 1e-6);
    }

    #[test]
    fn test_loader_batches() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let loader = Loader::new(Dataset::generate(100, &mut rng), 10);
        assert_eq!(loader.batches_per_epoch(), 10);
        let batches: Vec<_> = loader.batches().collect();
        assert_eq!(batches.len(), 10);
        assert!(batches.iter().all(|b| b.samples.len() == 10));

        // 端数バッチ
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let loader = Loader::new(Dataset::generate(100, &mut rng), 30);
        assert_eq!(loader.batches_per_epoch(), 4);
        let batches: Vec<_> = loader.batches().collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[3].samples.len(), 10);
    }

    #[test]
    fn test_full_batch_loader_yields_one_batch() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let loader = Loader::full_batch(Dataset::generate(40, &mut rng));
        let batches: Vec<_> = loader.batches().collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].samples.len(), 40);
    }

    #[test]
    fn test_shuffle_preserves_samples() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let dataset = Dataset::generate(50, &mut rng);
        let mut loader = Loader::new(dataset.clone(), 10);
        loader.shuffle(&mut rng);

        let mut before: Vec<_> = dataset
            .samples()
            .iter()
            .map(|s| (s.features[0].to_bits(), s.features[1].to_bits()))
            .collect();
        let mut after: Vec<_> = loader
            .batches()
            .flat_map(|b| b.samples)
            .map(|s| (s.features[0].to_bits(), s.features[1].to_bits()))
            .collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }
}
