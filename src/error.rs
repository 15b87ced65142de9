use std::path::PathBuf;

use thiserror::Error;

use crate::parser::line_reader::HeaderError;
use crate::template::renderer::RenderError;

/// 解析请求定义文件时可能出现的错误
///
/// 每个变体都携带解析时定位到的文件路径，便于在多文件场景下定位问题。
/// 任何一个错误都会中止整次解析，不会返回部分结果。
#[derive(Debug, Error)]
pub enum ParseError {
    /// 模板渲染失败：文件不可读、占位符语法错误或变量缺失
    #[error("failed to process template file {file:?}: {source}")]
    Template {
        file: PathBuf,
        #[source]
        source: RenderError,
    },

    /// 读到文件末尾也没有找到任何请求
    #[error("failed to find any request in {file:?}")]
    InvalidRequestFile { file: PathBuf },

    /// 请求行字段数不在 1~3 之间
    #[error(
        "invalid request line in {file:?}: expected \"URL, METHOD URL or METHOD URL PROTO\", got {line:?}"
    )]
    InvalidRequestLine { file: PathBuf, line: String },

    /// 拼接 base URL 之后仍然无法解析的请求地址
    #[error("failed to parse URL {url:?} in {file:?}: {source}")]
    InvalidUrl {
        file: PathBuf,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Header 块中存在格式错误的行
    #[error("invalid header in {file:?}: {source}")]
    InvalidHeader {
        file: PathBuf,
        #[source]
        source: HeaderError,
    },

    /// 组装请求体时发生 IO 错误
    #[error("failed to read body in {file:?}: {source}")]
    Body {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for ruquest crate
pub type Result<T> = std::result::Result<T, ParseError>;
