//! パラメータ軌跡テーブル
//!
//! 学習ステップごとの (step, w1, w2) スナップショットを記録し、
//! ヘッダ付きCSVとして永続化する。Trainer と可視化ツールの間の
//! 唯一の受け渡し形式。

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// CSVのヘッダ行
const HEADER: &str = "step,w1,w2";

/// スナップショット1行
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRow {
    pub step: u64,
    pub w1: f32,
    pub w2: f32,
}

/// テーブルの読み書きエラー
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    /// ファイルI/Oエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// ヘッダ行がない（空ファイル）
    #[error("missing header line")]
    MissingHeader,

    /// ヘッダ行が想定と異なる
    #[error("unexpected header {got:?}, expected {HEADER:?}")]
    BadHeader { got: String },

    /// 列数が3でない
    #[error("line {line}: expected 3 columns, got {got}")]
    ColumnCount { line: usize, got: usize },

    /// 数値として解釈できない
    #[error("line {line}: invalid {column} value {value:?}")]
    BadValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// パラメータ軌跡テーブル
///
/// 学習中は追記のみ。step は0起点で欠番・重複なく単調増加する。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamTable {
    rows: Vec<ParamRow>,
}

impl ParamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 行を追記する
    pub fn push(&mut self, row: ParamRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ParamRow] {
        &self.rows
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// w1列の (min, max)。空テーブルでは None
    pub fn w1_bounds(&self) -> Option<(f32, f32)> {
        column_bounds(self.rows.iter().map(|r| r.w1))
    }

    /// w2列の (min, max)。空テーブルでは None
    pub fn w2_bounds(&self) -> Option<(f32, f32)> {
        column_bounds(self.rows.iter().map(|r| r.w2))
    }

    /// ヘッダ付きCSVとして保存する
    ///
    /// 既存ファイルは削除し、親ディレクトリがなければ作る。
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{HEADER}")?;
        for row in &self.rows {
            writeln!(writer, "{},{},{}", row.step, row.w1, row.w2)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// CSVから読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = File::open(path.as_ref())?;
        let mut lines = BufReader::new(file).lines();

        let header = lines.next().ok_or(TableError::MissingHeader)??;
        if header.trim_end() != HEADER {
            return Err(TableError::BadHeader { got: header });
        }

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line?;
            // データ行は2行目から
            let line_no = i + 2;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 3 {
                return Err(TableError::ColumnCount {
                    line: line_no,
                    got: fields.len(),
                });
            }
            let step = fields[0].trim().parse::<u64>().map_err(|_| TableError::BadValue {
                line: line_no,
                column: "step",
                value: fields[0].to_string(),
            })?;
            let w1 = fields[1].trim().parse::<f32>().map_err(|_| TableError::BadValue {
                line: line_no,
                column: "w1",
                value: fields[1].to_string(),
            })?;
            let w2 = fields[2].trim().parse::<f32>().map_err(|_| TableError::BadValue {
                line: line_no,
                column: "w2",
                value: fields[2].to_string(),
            })?;
            rows.push(ParamRow { step, w1, w2 });
        }

        Ok(Self { rows })
    }
}

fn column_bounds(values: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    let mut bounds: Option<(f32, f32)> = None;
    for v in values {
        bounds = Some(match bounds {
            None => (v, v),
            Some((min, max)) => (min.min(v), max.max(v)),
        });
    }
    bounds
}
