pub mod line_reader;
pub mod request_file;
pub mod types;

// Re-export commonly used types
pub use line_reader::LineReader;
pub use request_file::RequestFileParser;
pub use types::{Headers, ParsedRequest};

use std::path::PathBuf;

use crate::error::Result;
use crate::template::context::TemplateContext;

/// 解析文件中的第一个请求，不使用 base URL 前缀
pub fn parse_file(
    root: impl Into<PathBuf>,
    file_name: &str,
    ctx: &TemplateContext,
) -> Result<ParsedRequest> {
    RequestFileParser::new(root).parse(file_name, ctx)
}

/// 解析文件中的所有请求，不使用 base URL 前缀
pub fn parse_all_file(
    root: impl Into<PathBuf>,
    file_name: &str,
    ctx: &TemplateContext,
) -> Result<Vec<ParsedRequest>> {
    RequestFileParser::new(root).parse_all(file_name, ctx)
}
