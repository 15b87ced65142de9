use thiserror::Error;

use crate::parser::types::Headers;

/// Header 行格式错误
#[derive(Debug, Error)]
#[error("malformed header line {line:?}: expected 'Name: value'")]
pub struct HeaderError {
    pub line: String,
}

/// 面向渲染结果的行读取器
///
/// 同一个游标上提供两种读取模式：
/// - 逻辑行：应用 header 续行折叠，用于请求行和 header 块
/// - 原始行：逐行原样返回，用于 body（body 必须保留精确的行边界）
pub struct LineReader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// 原样返回下一行，到达末尾返回 None
    pub fn next_raw_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied()?;
        self.pos += 1;
        Some(line)
    }

    /// 查看下一行但不消费
    pub fn peek_raw_line(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// 返回下一条逻辑行：后续以空白开头的行折叠进当前行
    ///
    /// 折叠时续行去掉首尾空白后以单个空格拼接。空行和纯空白行
    /// 原样返回，不参与折叠。
    pub fn next_logical_line(&mut self) -> Option<String> {
        let first = self.next_raw_line()?;
        if first.trim().is_empty() {
            return Some(first.to_string());
        }

        let mut line = first.trim_end().to_string();
        while let Some(next) = self.peek_raw_line() {
            if !next.starts_with(' ') && !next.starts_with('\t') {
                break;
            }
            self.pos += 1;
            line.push(' ');
            line.push_str(next.trim());
        }

        Some(line)
    }

    /// 连续消费逻辑行作为 MIME header，直到空行、单元分隔符或文件末尾
    ///
    /// 空行会被消费，分隔符留给调用方处理。读到文件末尾不是错误，
    /// 返回已经收集到的（可能为空的）header 集合。
    pub fn read_header_block(&mut self) -> Result<Headers, HeaderError> {
        let mut headers = Headers::new();

        loop {
            let Some(peek) = self.peek_raw_line() else {
                break;
            };
            if is_separator(peek) {
                break;
            }
            if peek.is_empty() {
                self.pos += 1;
                break;
            }

            let Some(line) = self.next_logical_line() else {
                break;
            };
            let (name, value) = parse_header_line(&line)?;
            headers.append(name, value);
        }

        Ok(headers)
    }
}

/// 把一条逻辑行拆成 header 键值对
fn parse_header_line(line: &str) -> Result<(String, String), HeaderError> {
    let malformed = || HeaderError {
        line: line.to_string(),
    };

    let (name, value) = line.split_once(':').ok_or_else(malformed)?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(malformed());
    }

    Ok((name.to_string(), value.trim().to_string()))
}

/// 注释行：以 # 或 // 开头
pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

/// 单元分隔符：去掉行首空白后以 ### 开头
pub(crate) fn is_separator(line: &str) -> bool {
    line.trim_start().starts_with("###")
}
