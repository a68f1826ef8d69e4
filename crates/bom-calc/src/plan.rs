//! 生產計劃物料需求彙總

use bom_core::rounding::checked_sum;
use bom_core::{
    Catalog, ExplosionConfig, MaterialsTree, ProductionPlan, RawCatalog, Result, TreeNode,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builder::MaterialsTreeBuilder;
use crate::traverser::TreeTraverser;
use crate::validator::TreeValidator;

/// 生產計劃彙總器
pub struct PlanAggregator;

impl PlanAggregator {
    /// 計算生產計劃所需物料
    ///
    /// 為每個有效項目（未取消）各建一棵樹，再依產品ID攤平合併：
    /// 同一產品在不同項目或同一棵樹的不同分支出現時，
    /// 計算後數量、重量與成本都會累加。
    pub fn calculate_materials_needed(
        plan: &ProductionPlan,
        catalog: &RawCatalog,
        config: &ExplosionConfig,
    ) -> Result<BTreeMap<String, TreeNode>> {
        let entries = plan.active_entries();
        if entries.is_empty() {
            tracing::info!("生產計劃 {} 沒有有效項目", plan.name);
            return Ok(BTreeMap::new());
        }

        TreeValidator::validate_required_params(catalog, &entries[0].product_id)?;
        let shared: Arc<Catalog> = Arc::new(TreeValidator::convert_catalog(catalog)?);

        tracing::info!(
            "計算生產計劃 {} 物料需求：{} 個項目",
            plan.name,
            entries.len()
        );

        let trees = entries
            .par_iter()
            .map(|entry| {
                MaterialsTreeBuilder::from_catalog(
                    Arc::clone(&shared),
                    &entry.product_id,
                    config.clone().with_initial_quantity(entry.planned_quantity),
                )?
                .build()
            })
            .collect::<Result<Vec<MaterialsTree>>>()?;

        Ok(Self::merge_trees(&trees, config))
    }

    /// 依產品ID攤平合併多棵樹（累加溢位時該值視為 0）
    pub fn merge_trees(
        trees: &[MaterialsTree],
        config: &ExplosionConfig,
    ) -> BTreeMap<String, TreeNode> {
        let cost_scale = config.rounding.cost_scale;
        let quantity_scale = config.rounding.quantity_scale;
        let mut merged: BTreeMap<String, TreeNode> = BTreeMap::new();

        for tree in trees {
            TreeTraverser::traverse(tree, |node, _| match merged.get_mut(node.id()) {
                Some(existing) => {
                    existing.absorb_quantities(node, quantity_scale);
                    existing.set_calculated_cost(checked_sum(
                        [existing.calculated_cost(), node.calculated_cost()],
                        cost_scale,
                    ));
                    existing.set_children_weight(checked_sum(
                        [existing.children_weight(), node.children_weight()],
                        quantity_scale,
                    ));
                }
                None => {
                    merged.insert(node.id().to_string(), node.detached());
                }
            });
        }

        tracing::debug!("合併後物料數量: {}", merged.len());
        merged
    }
}
