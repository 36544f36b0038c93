//! 2次元ロジスティック回帰のSGD学習コア
//!
//! 模擬データ生成、2パラメータモデル、学習ループ、スカラーメトリクスの
//! 記録、パラメータ軌跡テーブルの永続化を提供する。CLIと可視化は
//! `tools` クレート側。

pub mod data;
pub mod metrics;
pub mod model;
pub mod params;
pub mod train;

pub use data::{Batch, Dataset, Loader, Sample};
pub use metrics::ScalarLogger;
pub use model::LogisticRegression;
pub use params::{ParamRow, ParamTable, TableError};
pub use train::{EvalMetrics, Metric, TrainConfig, Trainer};
