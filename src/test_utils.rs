//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use crate::types::{
    FlatMap,
    Leaf,
};

/// テスト用の `FlatMap` を作成する
///
/// # Arguments
/// * `entries` - キーと文字列値のペア
pub(crate) fn flat_map(entries: &[(&str, &str)]) -> FlatMap {
    entries.iter().map(|(key, value)| ((*key).to_string(), Leaf::from(*value))).collect()
}
