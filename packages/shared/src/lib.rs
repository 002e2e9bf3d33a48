//! Shared utilities for the Tsubame realtime chat layer.
//!
//! ロギング初期化と時刻ユーティリティを server / tooling から共有するためのパッケージ。

pub mod logger;
pub mod time;
