//! 決定境界アニメーションの描画
//!
//! パラメータ軌跡テーブルを2パネルのGIFアニメーションとして描画する。
//! 左パネルはパラメータ空間 (w1, w2) の軌跡、右パネルは模擬データの
//! 散布図に重ねた決定境界 `w1·x + w2·y = 0` の変化。

use std::error::Error;
use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::full_palette::{ORANGE, PURPLE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rlogit_core::{Dataset, ParamRow, ParamTable};

/// 出力画像の大きさ（左右パネル合計）
const FRAME_SIZE: (u32, u32) = (1000, 500);

/// 描画設定
#[derive(Clone, Debug)]
pub struct AnimConfig {
    /// 散布図用に生成するサンプル数
    pub n_samples: usize,
    /// フレームレート
    pub fps: u32,
    /// フレーム間引き幅（1 = 全行）
    pub frame_step: usize,
    /// 散布図生成用のシード値
    pub seed: u64,
}

/// ストライド付きフレーム選択（行 0, s, 2s, ...）
///
/// `frame_step` は1以上であること。フレーム数は `ceil(len / frame_step)`。
pub fn frame_indices(len: usize, frame_step: usize) -> Vec<usize> {
    (0..len).step_by(frame_step).collect()
}

/// 決定境界 `w1·x + w2·y = 0` の線分端点
///
/// `w2 == 0` のとき境界は描けない（垂直または不定）ので None を返す。
pub fn boundary_line(w1: f64, w2: f64, x_range: (f64, f64)) -> Option<[(f64, f64); 2]> {
    if w2 == 0.0 {
        return None;
    }
    let slope = -w1 / w2;
    Some([
        (x_range.0, slope * x_range.0),
        (x_range.1, slope * x_range.1),
    ])
}

/// 範囲に10%の余白を付ける
///
/// 全点が同値で幅が0になる場合は固定幅で広げ、軸範囲が潰れないように
/// する。
pub fn pad_range(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span == 0.0 {
        return (min - 0.5, max + 0.5);
    }
    (min - 0.1 * span, max + 0.1 * span)
}

/// アニメーションを描画してフレーム数を返す
///
/// 保存先の既存ファイルは削除され、親ディレクトリがなければ作られる。
/// 同じテーブルと設定からは常に同じフレーム数が得られる。
pub fn render_animation(
    table: &ParamTable,
    config: &AnimConfig,
    save_path: &Path,
) -> Result<usize, Box<dyn Error>> {
    if table.is_empty() {
        return Err("parameter table has no rows".into());
    }
    if config.frame_step == 0 {
        return Err("frame_step must be >= 1".into());
    }
    if config.fps == 0 {
        return Err("fps must be >= 1".into());
    }

    if save_path.exists() {
        fs::remove_file(save_path)?;
    }
    if let Some(parent) = save_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // 左パネルの軸範囲はテーブル全体から固定で決める
    let (w1_min, w1_max) = table.w1_bounds().expect("table is non-empty");
    let (w2_min, w2_max) = table.w2_bounds().expect("table is non-empty");
    let w1_range = pad_range(w1_min as f64, w1_max as f64);
    let w2_range = pad_range(w2_min as f64, w2_max as f64);

    // 散布図は文脈表示用に独立して再サンプリングする（学習データとは別物）
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let scatter = Dataset::generate(config.n_samples, &mut rng);
    let ((x_min, x_max), (y_min, y_max)) =
        scatter_bounds(&scatter).ok_or("no context samples generated")?;
    let x_range = pad_range(x_min, x_max);
    let y_range = pad_range(y_min, y_max);

    let frames = frame_indices(table.len(), config.frame_step);
    eprintln!(
        "Creating animation with {} frames (sampling every {}th row)...",
        frames.len(),
        config.frame_step
    );

    let frame_delay_ms = 1000 / config.fps;
    let root = BitMapBackend::gif(save_path, FRAME_SIZE, frame_delay_ms)?.into_drawing_area();

    for &idx in &frames {
        let row = table.rows()[idx];
        root.fill(&WHITE)?;

        let (left, right) = root.split_horizontally(FRAME_SIZE.0 / 2);
        draw_trajectory_panel(&left, &row, w1_range, w2_range)?;
        draw_boundary_panel(&right, &row, &scatter, x_range, y_range)?;

        root.present()?;
    }

    log::info!("rendered {} frames to {}", frames.len(), save_path.display());
    Ok(frames.len())
}

/// 散布図全体の ((x_min, x_max), (y_min, y_max))
fn scatter_bounds(dataset: &Dataset) -> Option<((f64, f64), (f64, f64))> {
    let mut bounds: Option<((f64, f64), (f64, f64))> = None;
    for s in dataset.samples() {
        let x = s.features[0] as f64;
        let y = s.features[1] as f64;
        bounds = Some(match bounds {
            None => ((x, x), (y, y)),
            Some(((x_min, x_max), (y_min, y_max))) => {
                ((x_min.min(x), x_max.max(x)), (y_min.min(y), y_max.max(y)))
            }
        });
    }
    bounds
}

/// 左パネル: パラメータ空間の現在位置
fn draw_trajectory_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    row: &ParamRow,
    w1_range: (f64, f64),
    w2_range: (f64, f64),
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .caption("w2 vs w1 trajectory", ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(45)
        .build_cartesian_2d(w1_range.0..w1_range.1, w2_range.0..w2_range.1)?;
    chart.configure_mesh().x_desc("w1").y_desc("w2").draw()?;

    chart
        .draw_series(std::iter::once(Circle::new(
            (row.w1 as f64, row.w2 as f64),
            5,
            RED.filled(),
        )))?
        .label("model parameters")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

/// 右パネル: クラス別散布図と決定境界
fn draw_boundary_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    row: &ParamRow,
    scatter: &Dataset,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .caption("decision boundary", ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(45)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;
    chart.configure_mesh().x_desc("x1").y_desc("x2").draw()?;

    chart
        .draw_series(
            scatter
                .samples()
                .iter()
                .filter(|s| s.label == 0.0)
                .map(|s| {
                    Circle::new(
                        (s.features[0] as f64, s.features[1] as f64),
                        3,
                        ORANGE.mix(0.5).filled(),
                    )
                }),
        )?
        .label("class 0")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, ORANGE.filled()));

    chart
        .draw_series(
            scatter
                .samples()
                .iter()
                .filter(|s| s.label == 1.0)
                .map(|s| {
                    Circle::new(
                        (s.features[0] as f64, s.features[1] as f64),
                        3,
                        PURPLE.mix(0.5).filled(),
                    )
                }),
        )?
        .label("class 1")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, PURPLE.filled()));

    if let Some(segment) = boundary_line(row.w1 as f64, row.w2 as f64, x_range) {
        chart
            .draw_series(LineSeries::new(segment.to_vec(), BLUE.stroke_width(2)))?
            .label("decision boundary")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}
