//! 決定境界アニメーション生成ツール
//!
//! 学習で保存したパラメータ軌跡CSVを読み込み、パラメータ空間の軌跡と
//! 決定境界の変化を2パネルのGIFアニメーションとして描画する。
//!
//! # 使用例
//!
//! ```bash
//! # 全ステップを描画
//! cargo run -p tools --release --bin animate_boundary -- \
//!   --params-path out/params.csv --save-path out/boundary.gif \
//!   --n-samples 500 --fps 30
//!
//! # 長い学習では間引いて出力時間を抑える
//! cargo run -p tools --release --bin animate_boundary -- \
//!   --params-path out/params.csv --save-path out/boundary.gif \
//!   --n-samples 500 --fps 30 --frame-step 10
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rlogit_core::ParamTable;
use tools::anim::{AnimConfig, render_animation};

#[derive(Parser)]
#[command(
    name = "animate-boundary",
    version,
    about = "決定境界アニメーション生成ツール\n\nパラメータ軌跡CSVからGIFアニメーションを描画する"
)]
struct Cli {
    /// パラメータ軌跡CSVのパス
    #[arg(long)]
    params_path: PathBuf,

    /// アニメーションGIFの保存先
    #[arg(long)]
    save_path: PathBuf,

    /// 散布図用に生成するサンプル数
    #[arg(long)]
    n_samples: usize,

    /// フレームレート
    #[arg(long)]
    fps: u32,

    /// フレーム間引き幅（1 = 全行を描画）
    #[arg(long, default_value_t = 1)]
    frame_step: usize,

    /// 散布図生成用のシード値
    #[arg(long, default_value_t = 12)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.fps == 0 {
        anyhow::bail!("--fps must be >= 1");
    }
    if cli.frame_step == 0 {
        anyhow::bail!("--frame-step must be >= 1");
    }
    if cli.n_samples < 2 {
        anyhow::bail!("--n-samples must be >= 2");
    }

    let table = ParamTable::load(&cli.params_path)
        .with_context(|| format!("Failed to load params from {}", cli.params_path.display()))?;
    if table.is_empty() {
        anyhow::bail!("Parameter table {} has no rows", cli.params_path.display());
    }

    let config = AnimConfig {
        n_samples: cli.n_samples,
        fps: cli.fps,
        frame_step: cli.frame_step,
        seed: cli.seed,
    };

    let frames = render_animation(&table, &config, &cli.save_path)
        .map_err(|e| anyhow::anyhow!("failed to render animation: {e}"))?;

    println!(
        "Animation successful; saved {frames} frames to {}",
        cli.save_path.display()
    );
    Ok(())
}
