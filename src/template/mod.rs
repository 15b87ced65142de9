pub mod config;
pub mod context;
pub mod renderer;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader};
pub use context::{Environment, TemplateConfig, TemplateContext};
pub use renderer::{RenderError, TemplateRenderer};
