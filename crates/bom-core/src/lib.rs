//! # BOM Core
//!
//! BOM 展開的核心資料模型與類型定義

pub mod config;
pub mod plan;
pub mod product;
pub mod rounding;
pub mod tree_node;
pub mod unit;

// Re-export 主要類型
pub use config::{DuplicatePolicy, ExplosionConfig, RoundingPolicy};
pub use plan::{PlanEntry, PlanStatus, ProductionPlan};
pub use product::{
    catalog_from_json, Catalog, Product, ProductRecord, RawCatalog, RecipeItem, RecipeItemRecord,
};
pub use tree_node::{
    is_reserved_field, ExtraProperties, MaterialsTree, NodeSet, TreeNode, RESERVED_FIELDS,
};
pub use unit::{Category, Unit};

/// BOM 錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BomError {
    #[error("缺少必要參數: {0}")]
    RequiredParameter(String),

    #[error("無效的產品資料 {id}: {reason}")]
    InvalidProduct { id: String, reason: String },

    #[error("無效的配方項目（產品 {product_id}）: {reason}")]
    InvalidRecipeItem { product_id: String, reason: String },

    #[error("找不到產品: {0}")]
    ProductNotFound(String),

    #[error("無效的數量: {0}")]
    InvalidQuantity(String),

    #[error("偵測到循環依賴: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("配方中重複的組件 {component_id}（產品 {product_id}）")]
    DuplicateComponent {
        product_id: String,
        component_id: String,
    },

    #[error("超過最大層級: {level} > {max_level}")]
    MaxLevelExceeded { level: usize, max_level: i32 },

    #[error("額外屬性 {0} 與節點固定欄位同名")]
    ReservedProperty(String),

    #[error("找不到計劃項目: {0}")]
    PlanEntryNotFound(uuid::Uuid),

    #[error("序列化錯誤: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BomError {
    fn from(err: serde_json::Error) -> Self {
        BomError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BomError>;
