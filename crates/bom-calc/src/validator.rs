//! 建樹前的輸入驗證

use bom_core::{
    is_reserved_field, BomError, Catalog, ExtraProperties, Product, ProductRecord, RawCatalog,
    RecipeItemRecord, Result,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// 樹驗證器
pub struct TreeValidator;

impl TreeValidator {
    /// 檢查必要參數（目錄與目標產品ID）
    pub fn validate_required_params<T>(
        catalog: &HashMap<String, T>,
        product_code: &str,
    ) -> Result<()> {
        if catalog.is_empty() {
            return Err(BomError::RequiredParameter("catalog".to_string()));
        }
        if product_code.trim().is_empty() {
            return Err(BomError::RequiredParameter("product_code".to_string()));
        }
        Ok(())
    }

    /// 檢查產品是否存在於目錄中
    pub fn validate_product_exists<'a>(
        catalog: &'a Catalog,
        product_code: &str,
    ) -> Result<&'a Product> {
        catalog
            .get(product_code)
            .ok_or_else(|| BomError::ProductNotFound(product_code.to_string()))
    }

    /// 檢查原始產品記錄的結構
    pub fn validate_product(key: &str, record: &ProductRecord) -> Result<()> {
        let invalid = |reason: &str| BomError::InvalidProduct {
            id: key.to_string(),
            reason: reason.to_string(),
        };
        let present = |value: &Option<String>| value.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !present(&record.id) {
            return Err(invalid("缺少 id"));
        }
        if record.id.as_deref().map(str::trim) != Some(key) {
            return Err(invalid("id 與目錄鍵值不一致"));
        }
        if !present(&record.name) {
            return Err(invalid("缺少 name"));
        }
        if !present(&record.category) {
            return Err(invalid("缺少 category"));
        }
        if !present(&record.unit) {
            return Err(invalid("缺少 unit"));
        }
        if record.weight.is_some_and(|w| w.is_finite() && w < 0.0) {
            return Err(invalid("weight 不可為負數"));
        }
        if record.unit_cost.is_some_and(|c| c.is_finite() && c < 0.0) {
            return Err(invalid("unit_cost 不可為負數"));
        }

        for item in record.recipe.iter().flatten() {
            Self::validate_recipe_item(key, item)?;
        }
        Ok(())
    }

    /// 檢查配方項目結構
    pub fn validate_recipe_item(product_id: &str, item: &RecipeItemRecord) -> Result<()> {
        let invalid = |reason: String| BomError::InvalidRecipeItem {
            product_id: product_id.to_string(),
            reason,
        };

        if item
            .component_id
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            return Err(invalid("缺少 component_id".to_string()));
        }
        match item.quantity {
            Some(q) if q.is_finite() && q >= 0.0 => Ok(()),
            Some(q) => Err(invalid(format!("數量必須為非負有限數值，實際為 {q}"))),
            None => Err(invalid("缺少 quantity".to_string())),
        }
    }

    /// 檢查層級是否超過上限（上限 ≤ 0 時只允許根節點）
    pub fn validate_max_level(level: usize, max_level: i32) -> Result<()> {
        let limit = usize::try_from(max_level).unwrap_or(0);
        if level > limit {
            return Err(BomError::MaxLevelExceeded { level, max_level });
        }
        Ok(())
    }

    /// 檢查最大層級設定
    pub fn validate_max_level_setting(max_level: i32) -> Result<()> {
        if max_level < 0 {
            return Err(BomError::InvalidQuantity(format!(
                "最大層級不可為負數，實際為 {max_level}"
            )));
        }
        Ok(())
    }

    /// 檢查初始數量
    pub fn validate_initial_quantity(quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(BomError::InvalidQuantity(format!(
                "初始數量必須大於 0，實際為 {quantity}"
            )));
        }
        Ok(())
    }

    /// 檢查額外屬性不與節點固定欄位同名
    pub fn validate_extra_properties(extra: &ExtraProperties) -> Result<()> {
        match extra.keys().find(|key| is_reserved_field(key)) {
            Some(key) => Err(BomError::ReservedProperty(key.clone())),
            None => Ok(()),
        }
    }

    /// 驗證並轉換整個原始目錄
    pub fn convert_catalog(raw: &RawCatalog) -> Result<Catalog> {
        raw.iter()
            .map(|(key, record)| {
                Self::validate_product(key, record)?;
                let product = Product::try_from(record)?;
                Ok((key.clone(), product))
            })
            .collect()
    }

    /// 深度優先檢查循環依賴
    ///
    /// 以明確堆疊保存目前路徑（不受配方深度限制），產品ID 再次出現在路徑中
    /// 即回報完整循環路徑。路徑中途找不到的組件直接略過。
    pub fn check_for_circular_dependencies(catalog: &Catalog, start_id: &str) -> Result<()> {
        let start = Self::validate_product_exists(catalog, start_id)?;

        let mut verified: HashSet<&str> = HashSet::new();
        let mut on_path: HashSet<&str> = HashSet::from([start.id.as_str()]);
        // (產品, 下一個待檢查的配方項目索引)
        let mut stack: Vec<(&Product, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (product, index) = *frame;
            frame.1 += 1;

            let Some(item) = product.recipe.get(index) else {
                stack.pop();
                on_path.remove(product.id.as_str());
                verified.insert(product.id.as_str());
                continue;
            };
            let component_id = item.component_id.as_str();

            if on_path.contains(component_id) {
                let from = stack
                    .iter()
                    .position(|(p, _)| p.id == component_id)
                    .unwrap_or(0);
                let path = stack[from..]
                    .iter()
                    .map(|(p, _)| p.id.clone())
                    .chain(std::iter::once(component_id.to_string()))
                    .collect();
                return Err(BomError::CircularDependency { path });
            }
            if verified.contains(component_id) {
                continue;
            }
            let Some(component) = catalog.get(component_id) else {
                continue;
            };

            on_path.insert(component.id.as_str());
            stack.push((component, 0));
        }
        Ok(())
    }

    /// 列出自目標可達的所有無法解析引用 `(父件ID, 組件ID)`
    pub fn find_unresolved_references(catalog: &Catalog, start_id: &str) -> Vec<(String, String)> {
        let mut unresolved = Vec::new();
        for product in Self::reachable_products(catalog, start_id) {
            for item in &product.recipe {
                if !catalog.contains_key(&item.component_id) {
                    unresolved.push((product.id.clone(), item.component_id.clone()));
                }
            }
        }
        unresolved
    }

    /// 嚴格模式：任何無法解析的引用都視為錯誤
    pub fn validate_references(catalog: &Catalog, start_id: &str) -> Result<()> {
        match Self::find_unresolved_references(catalog, start_id).into_iter().next() {
            Some((_, component_id)) => Err(BomError::ProductNotFound(component_id)),
            None => Ok(()),
        }
    }

    /// 拒絕同一配方中重複的組件ID
    pub fn check_duplicate_components(catalog: &Catalog, start_id: &str) -> Result<()> {
        for product in Self::reachable_products(catalog, start_id) {
            let mut seen = HashSet::new();
            for item in &product.recipe {
                if !seen.insert(item.component_id.as_str()) {
                    return Err(BomError::DuplicateComponent {
                        product_id: product.id.clone(),
                        component_id: item.component_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// 自目標可達的產品（依發現順序，每個產品一次）
    fn reachable_products<'a>(catalog: &'a Catalog, start_id: &str) -> Vec<&'a Product> {
        let mut visited = HashSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![start_id];

        while let Some(id) = stack.pop() {
            let Some(product) = catalog.get(id) else {
                continue;
            };
            if !visited.insert(product.id.as_str()) {
                continue;
            }
            ordered.push(product);
            for item in product.recipe.iter().rev() {
                stack.push(&item.component_id);
            }
        }
        ordered
    }
}
