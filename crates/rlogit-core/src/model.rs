//! 2パラメータのロジスティック回帰モデル
//!
//! バイアス項を持たないため、決定境界は常に原点を通る。

use rand::Rng;
use rand_distr::StandardNormal;

use crate::data::Batch;

/// ロジスティック回帰モデル
///
/// 2要素の重みベクトルを保持し、`sigmoid(x·w)` でクラス1の確率を返す。
/// 勾配の適用は Trainer 側が駆動する。
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticRegression {
    weights: [f32; 2],
}

impl LogisticRegression {
    /// 標準正規分布から重みを初期化する
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let w0: f32 = rng.sample(StandardNormal);
        let w1: f32 = rng.sample(StandardNormal);
        Self { weights: [w0, w1] }
    }

    /// 指定した重みでモデルを構築する
    pub fn from_weights(weights: [f32; 2]) -> Self {
        Self { weights }
    }

    /// 現在の重みのコピー
    pub fn weights(&self) -> [f32; 2] {
        self.weights
    }

    /// 重みを差し替える（オプティマイザステップ用）
    pub fn set_weights(&mut self, weights: [f32; 2]) {
        self.weights = weights;
    }

    /// クラス1の確率を返す（(0,1) の範囲）
    pub fn predict(&self, features: [f32; 2]) -> f32 {
        sigmoid(features[0] * self.weights[0] + features[1] * self.weights[1])
    }

    /// バッチ全体の予測確率
    pub fn predict_batch(&self, batch: &Batch) -> Vec<f32> {
        batch.samples.iter().map(|s| self.predict(s.features)).collect()
    }
}

/// シグモイド関数
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(100.0) > 0.99);
        assert!(sigmoid(-100.0) < 0.01);
    }

    #[test]
    fn test_predict_matches_sigmoid_of_dot() {
        let model = LogisticRegression::from_weights([2.0, -1.0]);
        let p = model.predict([0.5, 1.0]);
        // x·w = 2*0.5 - 1*1.0 = 0 → 0.5
        assert!((p - 0.5).abs() < 1e-6);
        assert!(model.predict([1.0, 0.0]) > 0.5);
        assert!(model.predict([0.0, 1.0]) < 0.5);
    }

    #[test]
    fn test_predict_is_probability() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let model = LogisticRegression::new(&mut rng);
        for x in [[-10.0, 3.0], [0.0, 0.0], [7.5, -2.0]] {
            let p = model.predict(x);
            assert!(p > 0.0 && p < 1.0);
        }
    }

    #[test]
    fn test_new_is_deterministic_per_seed() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(12);
        let mut rng_b = ChaCha8Rng::seed_from_u64(12);
        assert_eq!(
            LogisticRegression::new(&mut rng_a).weights(),
            LogisticRegression::new(&mut rng_b).weights()
        );
    }

    #[test]
    fn test_predict_batch() {
        let model = LogisticRegression::from_weights([1.0, 1.0]);
        let batch = Batch {
            samples: vec![
                Sample {
                    features: [0.0, 0.0],
                    label: 0.0,
                },
                Sample {
                    features: [1.0, 1.0],
                    label: 1.0,
                },
            ],
        };
        let preds = model.predict_batch(&batch);
        assert_eq!(preds.len(), 2);
        assert!((preds[0] - 0.5).abs() < 1e-6);
        assert!(preds[1] > 0.5);
    }
}
