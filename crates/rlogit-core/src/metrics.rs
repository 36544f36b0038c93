//! スカラーメトリクスの記録
//!
//! (tag, value, step) の3つ組をタグ別のCSVファイルへ追記する。
//! 学習の進行中も外部ツールから逐次読めるよう、1行ごとにフラッシュする。

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// タグ別CSVへのスカラー時系列ロガー
pub struct ScalarLogger {
    log_dir: PathBuf,
    writers: HashMap<String, BufWriter<File>>,
}

impl ScalarLogger {
    /// ログディレクトリを初期化する
    ///
    /// 既存のディレクトリは内容ごと削除される。
    pub fn create<P: AsRef<Path>>(log_dir: P) -> Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();
        if log_dir.exists() {
            fs::remove_dir_all(&log_dir).with_context(|| {
                format!("failed to clear log directory {}", log_dir.display())
            })?;
        }
        fs::create_dir_all(&log_dir).with_context(|| {
            format!("failed to create log directory {}", log_dir.display())
        })?;

        Ok(Self {
            log_dir,
            writers: HashMap::new(),
        })
    }

    /// スカラー値を1件記録する
    ///
    /// タグごとのファイルは初回書き込み時に作られ、ヘッダ行
    /// `step,value` が先頭に入る。
    pub fn add_scalar(&mut self, tag: &str, value: f32, step: u64) -> Result<()> {
        let path = self.log_dir.join(file_name_for_tag(tag));
        let writer = match self.writers.entry(tag.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                writeln!(writer, "step,value")?;
                e.insert(writer)
            }
        };
        writeln!(writer, "{step},{value}")?;
        writer.flush()?;
        Ok(())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// タグをファイル名へ変換する（例: `Loss/Train` → `loss_train.csv`）
fn file_name_for_tag(tag: &str) -> String {
    let mut name: String = tag
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    name.push_str(".csv");
    name
}
