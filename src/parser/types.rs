use url::Url;

/// 单个解析后的 HTTP 请求
///
/// 只有完整通过 请求行 -> Header -> Body 三个阶段的请求才会被返回，
/// 任何阶段失败都会中止整次解析。
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    /// HTTP 方法，请求行缺失时默认为 GET
    pub method: String,

    /// 请求 URL，拼接 base URL 前缀后解析得到，保证语法合法
    pub url: Url,

    /// 协议版本（如 HTTP/1.1），None 表示未指定
    pub protocol: Option<String>,

    /// Header 集合，可能为空但永远存在
    pub headers: Headers,

    /// 请求体，None 表示没有任何 body 行（区别于空 body）
    pub body: Option<Vec<u8>>,
}

impl ParsedRequest {
    /// 以 UTF-8 文本视角读取请求体
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

/// Header 集合：保持插入顺序、键大小写不敏感、同名键可多值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个 header，保留已有的同名值
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// 获取第一个匹配的值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 获取所有匹配的值，按插入顺序
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// 是否包含指定键
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// 按插入顺序遍历所有键值对
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 键值对数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
