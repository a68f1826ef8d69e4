//! 節點遞迴展開

use bom_core::{Catalog, ExtraProperties, Product, RecipeItem, TreeNode};
use rust_decimal::Decimal;

use crate::calculator::Calculator;
use crate::validator::TreeValidator;

/// 節點處理器
///
/// 依產品配方遞迴產生已計算的節點。找不到的組件會被省略，
/// 超過最大層級的子件會被截斷（不視為錯誤）。
///
/// 展開時沿途記錄目前路徑，已在路徑中的組件不再展開；
/// 因此即使呼叫端未先執行循環檢查，展開也必定終止。
pub struct NodeProcessor<'a> {
    catalog: &'a Catalog,
    max_level: i32,
    calculator: Calculator,
}

impl<'a> NodeProcessor<'a> {
    /// 創建節點處理器（負數層級視為 0）
    pub fn new(catalog: &'a Catalog, max_level: i32, calculator: Calculator) -> Self {
        Self {
            catalog,
            max_level: max_level.max(0),
            calculator,
        }
    }

    /// 產生根節點（計算後數量即為初始數量）
    pub fn process_root_node(
        &self,
        product: &Product,
        initial_quantity: Decimal,
        extra: ExtraProperties,
    ) -> TreeNode {
        let calculated_quantity = self.calculator.scale_quantity(initial_quantity, Decimal::ONE);
        let mut path = vec![product.id.clone()];
        let children = self.process_children(product, calculated_quantity, &mut path, 0);

        self.finish_node(
            product,
            0,
            Decimal::ONE,
            None,
            initial_quantity,
            calculated_quantity,
            children,
        )
        .with_extra(extra)
    }

    /// 產生子節點；組件不在目錄中或已在 `parent_path` 中時返回 None
    pub fn process_child_node(
        &self,
        item: &RecipeItem,
        ancestor_factor: Decimal,
        parent_id: &str,
        parent_path: &[String],
        level: usize,
    ) -> Option<TreeNode> {
        let mut path = parent_path.to_vec();
        self.expand_child(item, ancestor_factor, parent_id, &mut path, level)
    }

    /// 展開單一配方項目；`path` 於返回前恢復原狀
    fn expand_child(
        &self,
        item: &RecipeItem,
        ancestor_factor: Decimal,
        parent_id: &str,
        path: &mut Vec<String>,
        level: usize,
    ) -> Option<TreeNode> {
        let Some(product) = self.catalog.get(&item.component_id) else {
            tracing::warn!(
                "組件 {} 不在目錄中，已自 {} 的展開中省略",
                item.component_id,
                parent_id
            );
            return None;
        };

        if path.iter().any(|id| *id == product.id) {
            tracing::warn!("組件 {} 已在路徑 {:?} 中，略過", product.id, path);
            return None;
        }

        let calculated_factor = item
            .scaled_quantity_with_scale(ancestor_factor, self.calculator.policy().quantity_scale);

        path.push(product.id.clone());
        let children = self.process_children(product, calculated_factor, path, level);
        path.pop();

        tracing::debug!(
            "展開: {} → {} (層級 {}, 數量 {} × {} = {})",
            parent_id,
            product.id,
            level,
            item.quantity,
            ancestor_factor,
            calculated_factor
        );

        Some(self.finish_node(
            product,
            level,
            ancestor_factor,
            Some(item.quantity),
            item.quantity,
            calculated_factor,
            children,
        ))
    }

    /// 依序展開配方；同一組件重複出現時，後者覆蓋前者（保留原位置）
    fn process_children(
        &self,
        product: &Product,
        factor: Decimal,
        path: &mut Vec<String>,
        level: usize,
    ) -> Option<Vec<TreeNode>> {
        if product.is_leaf() {
            return None;
        }
        let child_level = level + 1;
        if let Err(err) = TreeValidator::validate_max_level(child_level, self.max_level) {
            tracing::debug!("產品 {} 的子件已截斷: {}", product.id, err);
            return None;
        }

        let mut children: Vec<TreeNode> = Vec::with_capacity(product.recipe.len());
        for item in &product.recipe {
            let Some(node) = self.expand_child(item, factor, &product.id, path, child_level) else {
                continue;
            };
            match children.iter_mut().find(|c| c.id() == node.id()) {
                Some(existing) => *existing = node,
                None => children.push(node),
            }
        }

        (!children.is_empty()).then_some(children)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_node(
        &self,
        product: &Product,
        level: usize,
        mother_factor: Decimal,
        quantity: Option<Decimal>,
        original_quantity: Decimal,
        calculated_quantity: Decimal,
        children: Option<Vec<TreeNode>>,
    ) -> TreeNode {
        let child_nodes = children.as_deref().unwrap_or_default();
        let cost = self
            .calculator
            .node_cost(product.unit_cost, calculated_quantity, child_nodes);
        let weight = self.calculator.node_weight(
            product.unit,
            product.weight,
            calculated_quantity,
            child_nodes,
        );

        TreeNode::new(product, level)
            .with_quantities(mother_factor, quantity, original_quantity, calculated_quantity)
            .with_weights(weight.weight, weight.children_weight)
            .with_calculated_cost(cost)
            .with_children(children)
    }
}
