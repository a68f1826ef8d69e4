//! 產品與配方模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rounding::{round_to, to_decimal, QUANTITY_SCALE};
use crate::unit::{Category, Unit};
use crate::{BomError, Result};

/// 已轉換的產品目錄（產品ID → 產品）
pub type Catalog = HashMap<String, Product>;

/// 外部提供的原始產品目錄（產品ID → 原始記錄）
pub type RawCatalog = HashMap<String, ProductRecord>;

/// 配方項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    /// 組件產品ID
    pub component_id: String,

    /// 每單位父件所需的數量
    pub quantity: Decimal,
}

impl RecipeItem {
    /// 創建新的配方項目
    pub fn new(component_id: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            component_id: component_id.into(),
            quantity,
        }
    }

    /// 以上層累積倍數縮放數量
    pub fn scaled_quantity(&self, ancestor_factor: Decimal) -> Decimal {
        self.scaled_quantity_with_scale(ancestor_factor, QUANTITY_SCALE)
    }

    /// 以上層累積倍數縮放數量（指定小數位）
    pub fn scaled_quantity_with_scale(&self, ancestor_factor: Decimal, scale: u32) -> Decimal {
        self.quantity
            .checked_mul(ancestor_factor)
            .map(|value| round_to(value, scale))
            .unwrap_or(Decimal::ZERO)
    }
}

/// 產品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 產品名稱
    pub name: String,

    /// 分類
    pub category: Category,

    /// 計量單位
    pub unit: Unit,

    /// 每單位自重（主要用於非質量單位）
    pub weight: Option<Decimal>,

    /// 單位成本
    pub unit_cost: Option<Decimal>,

    /// 備註
    pub notes: Option<String>,

    /// 配方（空表示原料/葉節點）
    pub recipe: Vec<RecipeItem>,
}

impl Product {
    /// 創建新的產品
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        unit: Unit,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            unit,
            weight: None,
            unit_cost: None,
            notes: None,
            recipe: Vec::new(),
        }
    }

    /// 建構器模式：設置自重
    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    /// 建構器模式：設置單位成本
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 建構器模式：添加配方項目
    pub fn with_component(mut self, component_id: impl Into<String>, quantity: Decimal) -> Self {
        self.recipe.push(RecipeItem::new(component_id, quantity));
        self
    }

    /// 是否有配方
    pub fn has_recipe(&self) -> bool {
        !self.recipe.is_empty()
    }

    /// 是否為葉節點（原料）
    pub fn is_leaf(&self) -> bool {
        self.recipe.is_empty()
    }

    /// 是否以質量單位計量
    pub fn is_mass_based(&self) -> bool {
        self.unit.is_mass()
    }
}

/// 原始配方項目記錄
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeItemRecord {
    pub component_id: Option<String>,
    pub quantity: Option<f64>,
}

/// 原始產品記錄（來自表單、範例資料或儲存層的未驗證資料）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub weight: Option<f64>,
    pub unit_cost: Option<f64>,
    pub notes: Option<String>,
    pub recipe: Option<Vec<RecipeItemRecord>>,
}

fn required_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl TryFrom<&ProductRecord> for Product {
    type Error = BomError;

    fn try_from(record: &ProductRecord) -> Result<Self> {
        let id = required_text(&record.id).ok_or_else(|| BomError::InvalidProduct {
            id: "<unknown>".to_string(),
            reason: "缺少 id".to_string(),
        })?;
        let invalid = |reason: String| BomError::InvalidProduct {
            id: id.to_string(),
            reason,
        };

        let name = required_text(&record.name).ok_or_else(|| invalid("缺少 name".to_string()))?;
        let category = required_text(&record.category)
            .ok_or_else(|| invalid("缺少 category".to_string()))?
            .parse::<Category>()
            .map_err(invalid)?;
        let unit = required_text(&record.unit)
            .ok_or_else(|| invalid("缺少 unit".to_string()))?
            .parse::<Unit>()
            .map_err(invalid)?;

        let recipe = record
            .recipe
            .iter()
            .flatten()
            .map(|item| -> Result<RecipeItem> {
                let component_id = required_text(&item.component_id).ok_or_else(|| {
                    BomError::InvalidRecipeItem {
                        product_id: id.to_string(),
                        reason: "缺少 component_id".to_string(),
                    }
                })?;
                Ok(RecipeItem::new(
                    component_id,
                    to_decimal(item.quantity.unwrap_or(0.0)),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            unit,
            // 自重為 0 視為未登錄
            weight: record.weight.map(to_decimal).filter(|w| *w > Decimal::ZERO),
            unit_cost: record.unit_cost.map(to_decimal),
            notes: record.notes.clone(),
            recipe,
        })
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        Self {
            id: Some(product.id.clone()),
            name: Some(product.name.clone()),
            category: Some(product.category.code().to_string()),
            unit: Some(product.unit.code().to_string()),
            weight: product.weight.and_then(|w| w.to_f64()),
            unit_cost: product.unit_cost.and_then(|c| c.to_f64()),
            notes: product.notes.clone(),
            recipe: if product.recipe.is_empty() {
                None
            } else {
                Some(
                    product
                        .recipe
                        .iter()
                        .map(|item| RecipeItemRecord {
                            component_id: Some(item.component_id.clone()),
                            quantity: item.quantity.to_f64(),
                        })
                        .collect(),
                )
            },
        }
    }
}

/// 從 JSON 物件（產品ID → 產品記錄）載入原始目錄
pub fn catalog_from_json(json: &str) -> Result<RawCatalog> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_scaled_quantity() {
        let item = RecipeItem::new("FLOUR", d("0.5"));

        assert_eq!(item.scaled_quantity(Decimal::from(3)), d("1.5"));
        assert_eq!(
            RecipeItem::new("SALT", d("0.0021")).scaled_quantity(Decimal::ONE),
            d("0.002")
        );
    }

    #[test]
    fn test_product_builder() {
        let product = Product::new("DOUGH", "Dough", Category::SemiFinished, Unit::Kilogram)
            .with_component("FLOUR", d("0.5"))
            .with_component("WATER", d("0.7"))
            .with_notes("base dough");

        assert!(product.has_recipe());
        assert!(!product.is_leaf());
        assert!(product.is_mass_based());
        assert_eq!(product.recipe.len(), 2);
        assert_eq!(product.unit_cost, None);
    }

    #[test]
    fn test_record_conversion() {
        let record = ProductRecord {
            id: Some("WATER".to_string()),
            name: Some("Water".to_string()),
            category: Some("raw_material".to_string()),
            unit: Some("L".to_string()),
            weight: Some(1.0),
            unit_cost: Some(0.0),
            ..Default::default()
        };

        let product = Product::try_from(&record).unwrap();
        assert_eq!(product.unit, Unit::Liter);
        assert_eq!(product.weight, Some(Decimal::ONE));
        assert_eq!(product.unit_cost, Some(Decimal::ZERO));
        assert!(product.is_leaf());
    }

    #[test]
    fn test_record_missing_fields() {
        let record = ProductRecord {
            id: Some("FLOUR".to_string()),
            name: Some("Flour".to_string()),
            unit: Some("KG".to_string()),
            ..Default::default()
        };

        let err = Product::try_from(&record).unwrap_err();
        assert!(matches!(err, BomError::InvalidProduct { ref id, .. } if id == "FLOUR"));
    }

    #[test]
    fn test_non_finite_quantity_becomes_zero() {
        let record = ProductRecord {
            id: Some("MIX".to_string()),
            name: Some("Mix".to_string()),
            category: Some("SEMI_FINISHED".to_string()),
            unit: Some("KG".to_string()),
            recipe: Some(vec![RecipeItemRecord {
                component_id: Some("FLOUR".to_string()),
                quantity: Some(f64::NAN),
            }]),
            ..Default::default()
        };

        let product = Product::try_from(&record).unwrap();
        assert_eq!(product.recipe[0].quantity, Decimal::ZERO);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "FLOUR": {"id": "FLOUR", "name": "Flour", "category": "RAW_MATERIAL", "unit": "KG", "unit_cost": 2.5},
            "DOUGH": {"id": "DOUGH", "name": "Dough", "category": "SEMI_FINISHED", "unit": "KG",
                      "recipe": [{"component_id": "FLOUR", "quantity": 0.5}]}
        }"#;

        let catalog = catalog_from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let dough = Product::try_from(&catalog["DOUGH"]).unwrap();
        assert_eq!(dough.recipe, vec![RecipeItem::new("FLOUR", d("0.5"))]);
    }

    #[test]
    fn test_product_to_record() {
        let product = Product::new("SALT", "Salt", Category::RawMaterial, Unit::Kilogram)
            .with_unit_cost(d("1.2"));

        let record = ProductRecord::from(&product);
        assert_eq!(Product::try_from(&record).unwrap(), product);
    }
}
