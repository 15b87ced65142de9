use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::error::ParseError;
use crate::template::context::TemplateContext;

/// 渲染阶段的底层错误，最终包装进 ParseError::Template
#[derive(Debug, Error)]
pub enum RenderError {
    /// 模板文件不可读
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    /// 占位符引用了上下文中不存在的变量
    #[error("undefined variable {0:?}")]
    UndefinedVariable(String),

    /// 占位符内容不是合法的变量名
    #[error("invalid placeholder {0:?}")]
    InvalidPlaceholder(String),
}

/// 模板渲染器
///
/// 在配置的根目录下定位文件，读取内容并执行变量替换。
/// 每次渲染相互独立，不缓存任何文件内容或替换结果。
pub struct TemplateRenderer {
    root: PathBuf,
}

impl TemplateRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 把文件名解析为根目录下的完整路径
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// 读取并渲染文件
    ///
    /// 失败时错误里带上解析后的完整路径，失败不返回任何部分结果。
    pub fn render_file(&self, file_name: &str, ctx: &TemplateContext) -> crate::Result<String> {
        let file = self.resolve(file_name);

        let text = fs::read_to_string(&file).map_err(|err| ParseError::Template {
            file: file.clone(),
            source: RenderError::Io(err),
        })?;

        Self::render(&text, ctx).map_err(|source| ParseError::Template { file, source })
    }

    /// 完整的渲染流程：先解析系统环境变量，再替换上下文变量
    pub fn render(text: &str, ctx: &TemplateContext) -> Result<String, RenderError> {
        let with_env = Self::resolve_env_vars(text);
        Self::substitute(&with_env, ctx)
    }

    /// 替换文本中的所有 {{variable}} 占位符
    ///
    /// 上下文中找不到的变量是硬错误，避免拼错的变量名悄悄流进
    /// 最终请求；占位符里不是合法变量名的内容同样报错。
    pub fn substitute(text: &str, ctx: &TemplateContext) -> Result<String, RenderError> {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").unwrap());

        // 先校验每个占位符，再一次性替换
        for caps in re.captures_iter(text) {
            let name = caps[1].trim();
            if !is_valid_name(name) {
                return Err(RenderError::InvalidPlaceholder(caps[0].to_string()));
            }
            if ctx.get(name).is_none() {
                return Err(RenderError::UndefinedVariable(name.to_string()));
            }
        }

        let result = re.replace_all(text, |caps: &Captures| {
            ctx.get(caps[1].trim()).unwrap_or_default().to_string()
        });

        Ok(result.to_string())
    }

    /// 解析并替换系统环境变量 ${VAR}
    ///
    /// 未设置的环境变量保持原样，由调用方决定如何处理。
    pub fn resolve_env_vars(text: &str) -> String {
        static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
    }
}

/// 合法变量名: 字母或下划线开头，之后是字母、数字或下划线
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_substitute_simple() {
        let mut ctx = TemplateContext::new();
        ctx.insert("base_url", "http://localhost:8080");

        let output = TemplateRenderer::substitute("{{base_url}}/api/users", &ctx).unwrap();
        assert_eq!(output, "http://localhost:8080/api/users");
    }

    #[test]
    fn test_substitute_multiple() {
        let mut ctx = TemplateContext::new();
        ctx.insert("host", "example.com");
        ctx.insert("port", "8080");
        ctx.insert("path", "api");

        let output =
            TemplateRenderer::substitute("https://{{host}}:{{port}}/{{path}}/users", &ctx).unwrap();
        assert_eq!(output, "https://example.com:8080/api/users");
    }

    #[test]
    fn test_substitute_allows_padding_inside_braces() {
        let mut ctx = TemplateContext::new();
        ctx.insert("host", "example.com");

        let output = TemplateRenderer::substitute("{{ host }}/get", &ctx).unwrap();
        assert_eq!(output, "example.com/get");
    }

    #[test]
    fn test_substitute_missing_variable_is_an_error() {
        let ctx = TemplateContext::new();

        let err = TemplateRenderer::substitute("{{missing}}/path", &ctx).unwrap_err();
        assert!(matches!(err, RenderError::UndefinedVariable(name) if name == "missing"));
    }

    #[test]
    fn test_substitute_invalid_placeholder() {
        let mut ctx = TemplateContext::new();
        ctx.insert("host", "example.com");

        let err = TemplateRenderer::substitute("{{9bad}}", &ctx).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPlaceholder(_)));

        let err = TemplateRenderer::substitute("{{bad name}}", &ctx).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPlaceholder(_)));

        let err = TemplateRenderer::substitute("{{}}", &ctx).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPlaceholder(_)));
    }

    #[test]
    fn test_render_literal_text_unchanged() {
        let ctx = TemplateContext::new();
        let text = "POST /post\nContent-Type: application/json\n\n{\"key\": \"value\"}\n";

        let output = TemplateRenderer::render(text, &ctx).unwrap();
        assert_eq!(output, text);
    }

    #[test]
    fn test_resolve_env_vars() {
        unsafe {
            std::env::set_var("RUQUEST_TEST_VAR", "test_value");
        }

        let output = TemplateRenderer::resolve_env_vars("Value: ${RUQUEST_TEST_VAR}");
        assert_eq!(output, "Value: test_value");

        unsafe {
            std::env::remove_var("RUQUEST_TEST_VAR");
        }
    }

    #[test]
    fn test_resolve_env_vars_missing_kept_verbatim() {
        let output = TemplateRenderer::resolve_env_vars("Value: ${RUQUEST_NONEXISTENT}");
        assert_eq!(output, "Value: ${RUQUEST_NONEXISTENT}");
    }

    #[test]
    fn test_render_combined() {
        unsafe {
            std::env::set_var("RUQUEST_TEST_KEY", "secret-key");
        }

        let mut ctx = TemplateContext::new();
        ctx.insert("host", "api.example.com");

        let output =
            TemplateRenderer::render("https://{{host}}/auth?key=${RUQUEST_TEST_KEY}", &ctx)
                .unwrap();
        assert_eq!(output, "https://api.example.com/auth?key=secret-key");

        unsafe {
            std::env::remove_var("RUQUEST_TEST_KEY");
        }
    }

    #[test]
    fn test_render_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("get.http"), "GET https://{{host}}/get\n").unwrap();

        let mut ctx = TemplateContext::new();
        ctx.insert("host", "httpbin.org");

        let renderer = TemplateRenderer::new(dir.path());
        let output = renderer.render_file("get.http", &ctx).unwrap();
        assert_eq!(output, "GET https://httpbin.org/get\n");
    }

    #[test]
    fn test_render_file_missing() {
        let dir = TempDir::new().unwrap();

        let renderer = TemplateRenderer::new(dir.path());
        let err = renderer
            .render_file("nope.http", &TemplateContext::new())
            .unwrap_err();

        assert!(matches!(err, ParseError::Template { .. }));
        assert!(err.to_string().contains("nope.http"));
    }

    #[test]
    fn test_resolve_joins_under_root() {
        let renderer = TemplateRenderer::new("/base/dir");
        assert_eq!(
            renderer.resolve("requests/get.http"),
            PathBuf::from("/base/dir/requests/get.http")
        );
    }
}
