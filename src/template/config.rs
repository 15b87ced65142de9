use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::template::context::{TemplateConfig, TemplateContext};
use crate::template::renderer::TemplateRenderer;

/// 加载变量配置文件时的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<TemplateConfig, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;

        Ok(toml::from_str(&content)?)
    }

    /// 构建模板上下文
    ///
    /// env_name: 环境名称（如 "dev", "prod"）
    /// overrides: 调用方传入的变量覆盖，优先级最高
    pub fn build_context(
        config: &TemplateConfig,
        env_name: Option<&str>,
        overrides: &[(String, String)],
    ) -> TemplateContext {
        let mut context = TemplateContext::new();

        // 环境里的值可以引用系统环境变量 ${VAR}，在这里就地解析
        if let Some(env) = env_name.and_then(|name| config.get_environment(name)) {
            for (key, value) in &env.variables {
                let resolved = TemplateRenderer::resolve_env_vars(value);
                context.insert(key.clone(), resolved);
            }
        }

        for (key, value) in overrides {
            context.insert(key.clone(), value.clone());
        }

        context
    }
}
