//! # BOM Calculation Engine
//!
//! BOM 展開計算引擎：驗證、遞迴展開、成本與重量計算、樹查詢

pub mod builder;
pub mod calculator;
pub mod node_processor;
pub mod plan;
pub mod traverser;
pub mod validator;

// Re-export 主要類型
pub use builder::MaterialsTreeBuilder;
pub use calculator::{Calculator, NodeWeight};
pub use node_processor::NodeProcessor;
pub use plan::PlanAggregator;
pub use traverser::{LeafRequirement, MappedNode, TreeTraverser};
pub use validator::TreeValidator;
