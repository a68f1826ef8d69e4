//! 物料樹建構器（公開入口）

use bom_core::{
    BomError, Catalog, DuplicatePolicy, ExplosionConfig, ExtraProperties, MaterialsTree,
    RawCatalog, Result,
};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::calculator::Calculator;
use crate::node_processor::NodeProcessor;
use crate::validator::TreeValidator;

/// 物料樹建構器
///
/// 每個設定方法都會重新驗證輸入並返回新的建構器，原建構器保持不變；
/// 已轉換的目錄以 `Arc` 共享，因此複製建構器的成本很低。
/// 每次 [`build`](Self::build) 都會重新計算整棵樹。
#[derive(Debug, Clone)]
pub struct MaterialsTreeBuilder {
    catalog: Arc<Catalog>,
    product_code: String,
    extra_properties: ExtraProperties,
    config: ExplosionConfig,
}

impl MaterialsTreeBuilder {
    /// 從原始目錄創建建構器（初始數量 1，最大層級 100）
    pub fn new(catalog: &RawCatalog, product_code: &str) -> Result<Self> {
        Self::from_config(catalog, product_code, ExplosionConfig::default())
    }

    /// 從原始目錄與配置創建建構器
    pub fn from_config(
        catalog: &RawCatalog,
        product_code: &str,
        config: ExplosionConfig,
    ) -> Result<Self> {
        TreeValidator::validate_required_params(catalog, product_code)?;
        let converted = TreeValidator::convert_catalog(catalog)?;
        Self::from_catalog(Arc::new(converted), product_code, config)
    }

    /// 從已轉換的目錄創建建構器（可供多次建樹共享）
    pub fn from_catalog(
        catalog: Arc<Catalog>,
        product_code: &str,
        config: ExplosionConfig,
    ) -> Result<Self> {
        TreeValidator::validate_required_params(catalog.as_ref(), product_code)?;
        TreeValidator::validate_product_exists(&catalog, product_code)?;
        TreeValidator::validate_initial_quantity(config.initial_quantity)?;
        TreeValidator::validate_max_level_setting(config.max_level)?;

        Ok(Self {
            catalog,
            product_code: product_code.to_string(),
            extra_properties: ExtraProperties::new(),
            config,
        })
    }

    /// 設定方法：目標產品
    pub fn with_product_code(self, product_code: &str) -> Result<Self> {
        if product_code.trim().is_empty() {
            return Err(BomError::RequiredParameter("product_code".to_string()));
        }
        TreeValidator::validate_product_exists(&self.catalog, product_code)?;
        Ok(Self {
            product_code: product_code.to_string(),
            ..self
        })
    }

    /// 設定方法：初始數量
    pub fn with_initial_quantity(self, quantity: Decimal) -> Result<Self> {
        TreeValidator::validate_initial_quantity(quantity)?;
        Ok(Self {
            config: self.config.clone().with_initial_quantity(quantity),
            ..self
        })
    }

    /// 設定方法：最大層級
    pub fn with_max_level(self, max_level: i32) -> Result<Self> {
        TreeValidator::validate_max_level_setting(max_level)?;
        Ok(Self {
            config: self.config.clone().with_max_level(max_level),
            ..self
        })
    }

    /// 設定方法：根節點額外屬性（不得使用節點固定欄位名稱）
    pub fn with_extra_properties(self, extra_properties: ExtraProperties) -> Result<Self> {
        TreeValidator::validate_extra_properties(&extra_properties)?;
        Ok(Self {
            extra_properties,
            ..self
        })
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn initial_quantity(&self) -> Decimal {
        self.config.initial_quantity
    }

    pub fn max_level(&self) -> i32 {
        self.config.max_level
    }

    pub fn config(&self) -> &ExplosionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// 建樹：返回 `{ 目標產品ID: 根節點 }`
    pub fn build(&self) -> Result<MaterialsTree> {
        tracing::info!(
            "開始展開 BOM：產品 {}，數量 {}，最大層級 {}",
            self.product_code,
            self.config.initial_quantity,
            self.config.max_level
        );

        let product = TreeValidator::validate_product_exists(&self.catalog, &self.product_code)?;
        TreeValidator::check_for_circular_dependencies(&self.catalog, &self.product_code)?;
        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            TreeValidator::check_duplicate_components(&self.catalog, &self.product_code)?;
        }
        if self.config.strict_references {
            TreeValidator::validate_references(&self.catalog, &self.product_code)?;
        }

        let processor = NodeProcessor::new(
            &self.catalog,
            self.config.max_level,
            Calculator::new(self.config.rounding),
        );
        let root = processor.process_root_node(
            product,
            self.config.initial_quantity,
            self.extra_properties.clone(),
        );

        tracing::info!(
            "BOM 展開完成：{} 成本 {}，重量 {}",
            root.id(),
            root.calculated_cost(),
            root.weight()
        );

        Ok(MaterialsTree::new(root))
    }
}
