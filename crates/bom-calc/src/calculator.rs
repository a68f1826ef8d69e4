//! 成本與重量計算

use bom_core::rounding::{checked_product, checked_sum};
use bom_core::{RoundingPolicy, TreeNode, Unit};
use rust_decimal::Decimal;

/// 成本/重量計算器（無狀態，只持有捨入精度）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calculator {
    policy: RoundingPolicy,
}

/// 節點重量計算結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeWeight {
    /// 本節點重量
    pub weight: Decimal,
    /// 子件重量合計
    pub children_weight: Decimal,
}

impl Calculator {
    pub fn new(policy: RoundingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    /// 數量 × 倍數（數量精度）
    pub fn scale_quantity(&self, quantity: Decimal, factor: Decimal) -> Decimal {
        checked_product(quantity, factor, self.policy.quantity_scale)
    }

    /// 計算項目成本 = 數量 × 倍數 × 單位成本
    pub fn calculate_cost(&self, quantity: Decimal, factor: Decimal, unit_cost: Decimal) -> Decimal {
        let calculated_quantity = self.scale_quantity(quantity, factor);
        checked_product(unit_cost, calculated_quantity, self.policy.cost_scale)
    }

    /// 計算項目重量
    ///
    /// 質量單位時重量即為計算後數量；其他單位使用登錄的每單位自重。
    /// 非質量單位且未登錄自重時返回 None，重量須由子件推導
    /// （見 [`node_weight`](Self::node_weight)）。
    pub fn calculate_weight(
        &self,
        quantity: Decimal,
        factor: Decimal,
        unit: Unit,
        custom_weight: Option<Decimal>,
    ) -> Option<Decimal> {
        let calculated_quantity = self.scale_quantity(quantity, factor);
        if unit.is_mass() {
            return Some(calculated_quantity);
        }
        custom_weight.map(|w| checked_product(w, calculated_quantity, self.policy.quantity_scale))
    }

    /// 節點成本：有單位成本時直接計算，否則彙總子件成本（兩者不會同時適用）
    pub fn node_cost(
        &self,
        unit_cost: Option<Decimal>,
        calculated_quantity: Decimal,
        children: &[TreeNode],
    ) -> Decimal {
        match unit_cost {
            Some(cost) => self.calculate_cost(calculated_quantity, Decimal::ONE, cost),
            None => self.sum_children_cost(children),
        }
    }

    /// 節點重量（依單位區分）
    ///
    /// - 質量單位：重量 = 計算後數量，子件重量 = 子件重量合計
    /// - 非質量單位且有登錄自重：重量 = 自重 × 計算後數量，子件重量同此值
    /// - 非質量單位且無登錄自重：子件重量 = 子件重量合計，重量取該推導值
    pub fn node_weight(
        &self,
        unit: Unit,
        registered_weight: Option<Decimal>,
        calculated_quantity: Decimal,
        children: &[TreeNode],
    ) -> NodeWeight {
        let own = self.calculate_weight(calculated_quantity, Decimal::ONE, unit, registered_weight);
        match own {
            Some(weight) if unit.is_mass() => NodeWeight {
                weight,
                children_weight: self.sum_children_weight(children),
            },
            Some(weight) => NodeWeight {
                weight,
                children_weight: weight,
            },
            None => {
                let derived = self.sum_children_weight(children);
                NodeWeight {
                    weight: derived,
                    children_weight: derived,
                }
            }
        }
    }

    /// 子件成本合計
    pub fn sum_children_cost(&self, children: &[TreeNode]) -> Decimal {
        checked_sum(
            children.iter().map(TreeNode::calculated_cost),
            self.policy.cost_scale,
        )
    }

    /// 子件重量合計（使用子件的 weight，而非 children_weight）
    pub fn sum_children_weight(&self, children: &[TreeNode]) -> Decimal {
        checked_sum(
            children.iter().map(TreeNode::weight),
            self.policy.quantity_scale,
        )
    }
}
