use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::error::{ParseError, Result};
use crate::parser::line_reader::{LineReader, is_comment, is_separator};
use crate::parser::types::{Headers, ParsedRequest};
use crate::template::context::TemplateContext;
use crate::template::renderer::TemplateRenderer;

/// body 统一使用的行结束符
const HTTP_EOL: &str = "\r\n";

/// 请求定义文件解析器
///
/// 先把文件内容渲染为纯文本，再按 请求行 -> Header -> Body 的顺序
/// 逐个解析请求单元。文件以 ### 行分隔多个单元。
pub struct RequestFileParser {
    base_url: String,
    renderer: TemplateRenderer,
}

impl RequestFileParser {
    /// 创建解析器，root 是请求文件和内嵌文件的查找目录
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            base_url: String::new(),
            renderer: TemplateRenderer::new(root),
        }
    }

    /// 设置 base URL 前缀，会拼接在每个请求行的 URL 字段之前
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 解析文件中的第一个请求
    ///
    /// 适用于已知只包含一个请求的文件。文件中没有请求时
    /// 返回 InvalidRequestFile。
    pub fn parse(&self, file_name: &str, ctx: &TemplateContext) -> Result<ParsedRequest> {
        let file = self.renderer.resolve(file_name);
        debug!(file = %file.display(), "parsing request file");

        let text = self.renderer.render_file(file_name, ctx)?;
        let mut reader = LineReader::new(&text);

        match self.parse_unit(&mut reader, &file, ctx)? {
            Some(request) => Ok(request),
            None => Err(ParseError::InvalidRequestFile { file }),
        }
    }

    /// 解析文件中的所有请求，按文件顺序返回
    ///
    /// 只渲染一次，然后重复 请求行 -> Header -> Body 的循环直到文件末尾。
    /// 空文件或只有注释的文件返回 InvalidRequestFile 而不是空列表。
    pub fn parse_all(&self, file_name: &str, ctx: &TemplateContext) -> Result<Vec<ParsedRequest>> {
        let file = self.renderer.resolve(file_name);

        let text = self.renderer.render_file(file_name, ctx)?;
        let mut reader = LineReader::new(&text);

        let mut requests = Vec::new();
        while let Some(request) = self.parse_unit(&mut reader, &file, ctx)? {
            requests.push(request);
        }

        if requests.is_empty() {
            return Err(ParseError::InvalidRequestFile { file });
        }

        debug!(file = %file.display(), count = requests.len(), "parsed request file");
        Ok(requests)
    }

    /// 解析一个请求单元，没有更多内容时返回 None
    fn parse_unit(
        &self,
        reader: &mut LineReader<'_>,
        file: &Path,
        ctx: &TemplateContext,
    ) -> Result<Option<ParsedRequest>> {
        // 定位请求行：跳过空行、注释和上一个单元留下的分隔符
        let line = loop {
            let Some(line) = reader.next_logical_line() else {
                return Ok(None);
            };
            if line.is_empty() || is_comment(&line) || is_separator(&line) {
                continue;
            }
            break line;
        };

        let mut request = self.parse_request_line(file, &line)?;

        request.headers = reader
            .read_header_block()
            .map_err(|source| ParseError::InvalidHeader {
                file: file.to_path_buf(),
                source,
            })?;

        request.body = self.read_body(reader, ctx)?;

        Ok(Some(request))
    }

    /// 解析请求行：URL / METHOD URL / METHOD URL PROTO
    fn parse_request_line(&self, file: &Path, line: &str) -> Result<ParsedRequest> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        let (method, url, protocol) = match fields.as_slice() {
            [url] => ("GET".to_string(), *url, None),
            [method, url] => (method.to_string(), *url, None),
            [method, url, protocol] => (method.to_string(), *url, Some(protocol.to_string())),
            _ => {
                return Err(ParseError::InvalidRequestLine {
                    file: file.to_path_buf(),
                    line: line.to_string(),
                });
            }
        };

        Ok(ParsedRequest {
            method,
            url: self.parse_url(file, url)?,
            protocol,
            headers: Headers::new(),
            body: None,
        })
    }

    /// 拼接 base URL 前缀后解析请求地址
    fn parse_url(&self, file: &Path, raw: &str) -> Result<Url> {
        let url = format!("{}{}", self.base_url, raw);

        Url::parse(&url).map_err(|source| ParseError::InvalidUrl {
            file: file.to_path_buf(),
            url: url.clone(),
            source,
        })
    }

    /// 逐原始行累积请求体，直到文件末尾或下一个单元分隔符
    ///
    /// 以 < 开头的行把引用文件的渲染结果原样拼入；其余行原样追加，
    /// 行结束符统一归一为 CRLF。分隔符不在这里消费，留给下一个
    /// 单元的定位逻辑跳过。
    fn read_body(&self, reader: &mut LineReader<'_>, ctx: &TemplateContext) -> Result<Option<Vec<u8>>> {
        let mut body = String::new();

        while let Some(peek) = reader.peek_raw_line() {
            if is_separator(peek) {
                break;
            }
            let Some(line) = reader.next_raw_line() else {
                break;
            };

            if let Some(rest) = line.strip_prefix('<') {
                let included = self.renderer.render_file(rest.trim(), ctx)?;
                body.push_str(&included);
                body.push_str(HTTP_EOL);
                continue;
            }

            body.push_str(line);
            body.push_str(HTTP_EOL);
        }

        if body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(body.into_bytes()))
        }
    }
}
