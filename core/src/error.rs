use serde::Serialize;
use thiserror::Error;

use crate::geo::{Category, Level};

/// A descent step that could not find its key in the lookup tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupMiss {
    #[error("データに {category} の階層が存在しません")]
    MissingCategory { category: Category },
    #[error("{category} に {name} が存在しません")]
    MissingName { category: Category, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{path} はオブジェクトである必要があります")]
    NotAnObject { path: String },
    #[error("{path} の年次データを解析できません: {message}")]
    InvalidYearPoint { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("未知のカテゴリです: {0}")]
    UnknownCategory(String),
    #[error("未知の階層です: {0}")]
    UnknownLevel(String),
    #[error("{level} より上位の階層が欠けています")]
    GapInChain { level: Level },
    #[error("{category} の {name} は選択されていません")]
    NotSelected { category: Category, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearRangeError {
    #[error("年の範囲が空です")]
    Empty,
    #[error("年ラベルは4桁の数字で指定してください: {0}")]
    InvalidLabel(String),
    #[error("年ラベルは昇順かつ重複なしで指定してください: {previous} の後に {next}")]
    NotAscending { previous: String, next: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("データセットが読み込まれていません: {collection} / {options}")]
    NotLoaded { collection: String, options: String },
}
