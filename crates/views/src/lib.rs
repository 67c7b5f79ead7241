//! Everything needed to turn one content field into a string: deciding how it
//! should be interpreted, rendering templates, reading raw files, and
//! inlining styles into rendered HTML.

pub mod config;
pub mod engine;
pub mod inline;
pub mod loader;
pub mod registry;
pub mod source;

pub use config::{EngineConfig, EngineKind, ViewsConfig};
pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use inline::StyleInliner;
pub use loader::{FileLoader, FsLoader};
pub use registry::EngineRegistry;
pub use source::classify;
