pub mod analysis;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod patterns;
pub mod render;
pub mod stats;
pub mod tree;
pub mod walker;

pub use analysis::{Analysis, AnalysisResult, ErrorInfo, Metadata, analyze};
pub use classify::{FileRecord, Role, classify, classify_all};
pub use config::{EngineConfig, OutputFormat, RenderConfig};
pub use error::{AppError, Result};
pub use patterns::{IgnoreRule, PatternMatcher};
pub use render::{RenderInput, Rendered, render, truncate_output};
pub use stats::{KeyFile, LanguageAggregate, RepoStats, aggregate};
pub use tree::{NodeType, TreeNode, build_tree};
pub use walker::{WalkResult, walk};
