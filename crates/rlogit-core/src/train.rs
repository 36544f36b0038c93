//! 学習ループ
//!
//! エポック/バッチ単位でSGD学習を回し、スカラーメトリクスを記録し、
//! ステップごとのパラメータスナップショットをテーブルへ追記する。

use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::{Batch, Loader};
use crate::metrics::ScalarLogger;
use crate::model::LogisticRegression;
use crate::params::{ParamRow, ParamTable};

/// 学習時メトリクスのタグ
pub const TAG_TRAIN_LOSS: &str = "Loss/Train";
pub const TAG_TRAIN_ACCURACY: &str = "Accuracy/Train";
/// 検証時メトリクスのタグ
pub const TAG_VAL_LOSS: &str = "Loss/Validation";
pub const TAG_VAL_ACCURACY: &str = "Accuracy/Validation";
pub const TAG_LEARNING_RATE: &str = "Training/LearningRate";
pub const TAG_EPOCH: &str = "Training/Epoch";

/// 確率クランプの下限（数値安定性のため）
const EPS: f32 = 1e-7;

/// 学習設定
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// エポック数
    pub epochs: usize,
    /// 学習率
    pub lr: f32,
    /// 検証を行うステップ間隔（グローバルステップ基準）
    pub val_interval: u64,
    /// シード値（モデル初期化とシャッフルに使う）
    pub seed: u64,
    /// スカラーログの出力ディレクトリ
    pub log_dir: PathBuf,
}

/// 登録済みメトリクスの集合
///
/// メトリクスは損失と正解率の2つで固定。名前→関数の動的な対応表は
/// 持たない。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// 二値交差エントロピー損失（バッチ平均）
    Loss,
    /// しきい値0.5での正解率
    Accuracy,
}

impl Metric {
    pub fn compute(self, preds: &[f32], labels: &[f32]) -> f32 {
        match self {
            Metric::Loss => bce_loss(preds, labels),
            Metric::Accuracy => accuracy(preds, labels),
        }
    }
}

/// 検証1回分の結果
#[derive(Clone, Copy, Debug)]
pub struct EvalMetrics {
    pub loss: f32,
    pub accuracy: f32,
}

/// 二値交差エントロピー損失（バッチ平均）
///
/// 確率は `[EPS, 1-EPS]` にクランプする。
pub fn bce_loss(preds: &[f32], labels: &[f32]) -> f32 {
    let n = preds.len() as f32;
    preds
        .iter()
        .zip(labels)
        .map(|(&p, &y)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            -y * p.ln() - (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f32>()
        / n
}

/// しきい値0.5での正解率
pub fn accuracy(preds: &[f32], labels: &[f32]) -> f32 {
    let n = preds.len() as f32;
    preds
        .iter()
        .zip(labels)
        .filter(|&(&p, &y)| p.round() == y)
        .count() as f32
        / n
}

/// バッチ平均BCE損失の重み勾配
///
/// シグモイドを通したBCEの閉形式: ∂L/∂w = mean((p - y)·x)
pub fn bce_grad(batch: &Batch, preds: &[f32]) -> [f32; 2] {
    let n = batch.samples.len() as f32;
    let mut grad = [0.0f32; 2];
    for (sample, &p) in batch.samples.iter().zip(preds) {
        let d = p - sample.label;
        grad[0] += d * sample.features[0];
        grad[1] += d * sample.features[1];
    }
    [grad[0] / n, grad[1] / n]
}

/// トレーナー
///
/// モデルとRNGとスカラーロガーを所有し、学習プロトコル全体を実行する。
pub struct Trainer {
    config: TrainConfig,
    model: LogisticRegression,
    logger: ScalarLogger,
    rng: ChaCha8Rng,
}

impl Trainer {
    /// 新しいトレーナーを作成する
    ///
    /// ログディレクトリはここで初期化される（既存の内容は消える）。
    pub fn new(config: TrainConfig) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let model = LogisticRegression::new(&mut rng);
        let logger = ScalarLogger::create(&config.log_dir)?;

        Ok(Self {
            config,
            model,
            logger,
            rng,
        })
    }

    /// モデルへの参照
    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    /// 学習を実行してパラメータ軌跡テーブルを返す
    ///
    /// 1バッチ処理するごとにグローバルステップが1進み、更新後の重みが
    /// 1行追記される。E エポック × B バッチ/エポックなら行数は E·B、
    /// step は 0 から欠番なく単調増加する。
    pub fn train(&mut self, train_loader: &mut Loader, val_loader: &Loader) -> Result<ParamTable> {
        eprintln!("Training with {} samples", train_loader.len());
        eprintln!("Validation with {} samples", val_loader.len());
        eprintln!("  Batch size: {}", train_loader.batch_size());
        eprintln!("  Epochs: {}", self.config.epochs);
        eprintln!("  Learning rate: {}", self.config.lr);
        eprintln!("  Val interval: {}", self.config.val_interval);

        let mut table = ParamTable::new();
        let mut global_step: u64 = 0;

        for epoch in 0..self.config.epochs {
            self.logger.add_scalar(TAG_EPOCH, epoch as f32, global_step)?;

            train_loader.shuffle(&mut self.rng);

            let progress = ProgressBar::new(train_loader.batches_per_epoch() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} loss:{msg}")
                    .expect("valid template"),
            );

            let mut epoch_loss = 0.0;
            let mut epoch_samples = 0usize;

            for batch in train_loader.batches() {
                let labels: Vec<f32> = batch.samples.iter().map(|s| s.label).collect();
                let preds = self.model.predict_batch(&batch);

                let train_loss = Metric::Loss.compute(&preds, &labels);
                let train_accuracy = Metric::Accuracy.compute(&preds, &labels);

                // SGD更新: w ← w - lr·grad
                let grad = bce_grad(&batch, &preds);
                let w = self.model.weights();
                self.model.set_weights([
                    w[0] - self.config.lr * grad[0],
                    w[1] - self.config.lr * grad[1],
                ]);

                self.logger.add_scalar(TAG_TRAIN_LOSS, train_loss, global_step)?;
                self.logger.add_scalar(TAG_TRAIN_ACCURACY, train_accuracy, global_step)?;

                if global_step % self.config.val_interval == 0 {
                    let val = self.evaluate(val_loader)?;
                    self.logger.add_scalar(TAG_VAL_LOSS, val.loss, global_step)?;
                    self.logger.add_scalar(TAG_VAL_ACCURACY, val.accuracy, global_step)?;
                    self.logger.add_scalar(TAG_LEARNING_RATE, self.config.lr, global_step)?;
                }

                // 更新後の重みを記録する
                let w = self.model.weights();
                table.push(ParamRow {
                    step: global_step,
                    w1: w[0],
                    w2: w[1],
                });

                global_step += 1;

                epoch_loss += train_loss * batch.samples.len() as f32;
                epoch_samples += batch.samples.len();
                progress.set_message(format!("{:.6}", epoch_loss / epoch_samples as f32));
                progress.inc(1);
            }

            progress.finish();

            let avg_loss = if epoch_samples > 0 {
                epoch_loss / epoch_samples as f32
            } else {
                0.0
            };
            eprintln!(
                "Epoch {}/{}: train_loss={:.6}, samples={}",
                epoch + 1,
                self.config.epochs,
                avg_loss,
                epoch_samples
            );
        }

        log::info!("training finished after {global_step} steps");
        Ok(table)
    }

    /// 検証セットで損失と正解率を計算する
    ///
    /// 前提: 検証ローダは全検証データを1バッチで返す構成にする。
    /// 複数バッチ返す構成でも先頭バッチしか評価しない。
    /// 読み取り専用で、モデルもオプティマイザ状態も変更しない。
    fn evaluate(&self, val_loader: &Loader) -> Result<EvalMetrics> {
        let batch = val_loader
            .batches()
            .next()
            .context("validation loader yielded no batches")?;

        let labels: Vec<f32> = batch.samples.iter().map(|s| s.label).collect();
        let preds = self.model.predict_batch(&batch);

        Ok(EvalMetrics {
            loss: Metric::Loss.compute(&preds, &labels),
            accuracy: Metric::Accuracy.compute(&preds, &labels),
        })
    }
}
