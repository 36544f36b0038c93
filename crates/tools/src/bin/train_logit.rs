//! ロジスティック回帰学習ツール
//!
//! 模擬データを生成してSGDで学習し、ステップごとのパラメータ軌跡を
//! CSVとして保存する。スカラーメトリクスはログディレクトリ配下の
//! タグ別CSVに逐次書き出される。
//!
//! # 使用例
//!
//! ```bash
//! # 基本的な学習
//! cargo run -p tools --release --bin train_logit -- \
//!   --n-train 1000 --n-val 200 --batch-size 10 --epochs 3 \
//!   --lr 0.1 --val-interval 5 \
//!   --log-dir logs --params-path out/params.csv
//!
//! # シード固定と要約JSONの保存
//! cargo run -p tools --release --bin train_logit -- \
//!   --n-train 1000 --n-val 200 --batch-size 10 --epochs 3 \
//!   --lr 0.1 --val-interval 5 \
//!   --log-dir logs --params-path out/params.csv \
//!   --seed 42 --report-json out/report.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rlogit_core::{Dataset, Loader, TrainConfig, Trainer};
use tools::report::{TrainReport, timestamp_now};

#[derive(Parser)]
#[command(
    name = "train-logit",
    version,
    about = "ロジスティック回帰学習ツール\n\n模擬データでSGD学習し、パラメータ軌跡をCSVに保存する"
)]
struct Cli {
    /// 学習サンプル数
    #[arg(long)]
    n_train: usize,

    /// 検証サンプル数
    #[arg(long)]
    n_val: usize,

    /// バッチサイズ
    #[arg(long)]
    batch_size: usize,

    /// エポック数
    #[arg(long)]
    epochs: usize,

    /// 学習率
    #[arg(long)]
    lr: f32,

    /// 検証を行うステップ間隔
    #[arg(long)]
    val_interval: u64,

    /// スカラーログの出力ディレクトリ（既存の内容は削除される）
    #[arg(long)]
    log_dir: PathBuf,

    /// パラメータ軌跡CSVの保存先
    #[arg(long)]
    params_path: PathBuf,

    /// シード値
    #[arg(long, default_value_t = 12)]
    seed: u64,

    /// 学習要約JSONの保存先（省略時は保存しない）
    #[arg(long)]
    report_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.batch_size == 0 {
        anyhow::bail!("--batch-size must be >= 1");
    }
    if cli.val_interval == 0 {
        anyhow::bail!("--val-interval must be >= 1");
    }

    // データローダの構築。検証ローダは全件を1バッチで返す。
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let train_dataset = Dataset::generate(cli.n_train, &mut rng);
    let val_dataset = Dataset::generate(cli.n_val, &mut rng);
    if train_dataset.is_empty() {
        anyhow::bail!("No training samples generated (--n-train {} too small)", cli.n_train);
    }
    if val_dataset.is_empty() {
        anyhow::bail!("No validation samples generated (--n-val {} too small)", cli.n_val);
    }
    let mut train_loader = Loader::new(train_dataset, cli.batch_size);
    let val_loader = Loader::full_batch(val_dataset);

    let config = TrainConfig {
        epochs: cli.epochs,
        lr: cli.lr,
        val_interval: cli.val_interval,
        seed: cli.seed,
        log_dir: cli.log_dir.clone(),
    };

    let mut trainer = Trainer::new(config).with_context(|| {
        format!("Failed to initialize log directory {}", cli.log_dir.display())
    })?;
    let table = trainer.train(&mut train_loader, &val_loader)?;

    table
        .save(&cli.params_path)
        .with_context(|| format!("Failed to save params to {}", cli.params_path.display()))?;

    if let Some(report_path) = &cli.report_json {
        let report = TrainReport {
            timestamp: timestamp_now(),
            seed: cli.seed,
            n_train: cli.n_train,
            n_val: cli.n_val,
            batch_size: cli.batch_size,
            epochs: cli.epochs,
            lr: cli.lr,
            val_interval: cli.val_interval,
            steps: table.len(),
            final_weights: trainer.model().weights(),
            params_path: cli.params_path.display().to_string(),
        };
        report.save_json(report_path)?;
        eprintln!("Saved training report to {}", report_path.display());
    }

    println!("Training successful; saved params to {}", cli.params_path.display());
    Ok(())
}
