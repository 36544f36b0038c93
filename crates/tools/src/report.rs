//! 学習実行レポート
//!
//! 学習設定と結果の要約をJSONで保存する。

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// 学習1回分の要約
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    /// 実行時刻（RFC3339）
    pub timestamp: String,
    pub seed: u64,
    pub n_train: usize,
    pub n_val: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub lr: f32,
    pub val_interval: u64,
    /// 学習ステップ総数（= パラメータ軌跡の行数）
    pub steps: usize,
    /// 学習終了時点の重み
    pub final_weights: [f32; 2],
    /// パラメータ軌跡CSVの保存先
    pub params_path: String,
}

impl TrainReport {
    /// JSON形式で保存
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).with_context(|| "Failed to write JSON")?;
        Ok(())
    }
}

/// 現在時刻のRFC3339文字列
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let report = TrainReport {
            timestamp: timestamp_now(),
            seed: 12,
            n_train: 100,
            n_val: 20,
            batch_size: 10,
            epochs: 1,
            lr: 0.1,
            val_interval: 5,
            steps: 10,
            final_weights: [0.5, -0.25],
            params_path: "out/params.csv".to_string(),
        };
        report.save_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["steps"], 10);
        assert_eq!(value["final_weights"][1], -0.25);
        assert_eq!(value["params_path"], "out/params.csv");
    }
}
