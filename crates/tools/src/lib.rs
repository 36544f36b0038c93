//! rlogit のCLIツール群
//!
//! 学習CLI（`train_logit`）と可視化CLI（`animate_boundary`）の共通部品。

pub mod anim;
pub mod report;
