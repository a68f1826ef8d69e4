//! # BOM Explosion
//!
//! 物料清單（BOM）展開引擎：依產品目錄遞迴展開配方，
//! 計算每個節點的數量、重量與成本。

pub mod logging;

pub use bom_core::rounding;

pub use bom_calc::{
    Calculator, LeafRequirement, MappedNode, MaterialsTreeBuilder, NodeProcessor, NodeWeight,
    PlanAggregator, TreeTraverser, TreeValidator,
};
pub use bom_core::{
    catalog_from_json, BomError, Catalog, Category, DuplicatePolicy, ExplosionConfig,
    ExtraProperties, MaterialsTree, NodeSet, PlanEntry, PlanStatus, Product, ProductRecord,
    ProductionPlan, RawCatalog, RecipeItem, RecipeItemRecord, Result, RoundingPolicy, TreeNode,
    Unit,
};

use rust_decimal::Decimal;

/// 以預設配置展開單一產品
pub fn explode(catalog: &RawCatalog, product_code: &str, quantity: Decimal) -> Result<MaterialsTree> {
    MaterialsTreeBuilder::new(catalog, product_code)?
        .with_initial_quantity(quantity)?
        .build()
}
