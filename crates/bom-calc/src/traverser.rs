//! 展開樹的唯讀查詢

use bom_core::rounding::checked_total;
use bom_core::{NodeSet, TreeNode};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 映射後的節點（保持原樹結構）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedNode<T> {
    pub id: String,
    pub value: T,
    pub children: Vec<MappedNode<T>>,
}

/// 葉節點需求彙總
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeafRequirement {
    pub quantity: Decimal,
    pub cost: Decimal,
    pub occurrences: usize,
}

/// 樹遍歷工具
///
/// 所有函式都接受完整的樹或單一節點，且不修改輸入。
pub struct TreeTraverser;

impl TreeTraverser {
    /// 前序深度優先遍歷，每個節點恰好訪問一次
    pub fn traverse<T, F>(tree: &T, mut visit: F)
    where
        T: NodeSet + ?Sized,
        F: FnMut(&TreeNode, Option<&str>),
    {
        for root in tree.roots() {
            Self::visit_node(root, None, &mut visit);
        }
    }

    fn visit_node<F>(node: &TreeNode, parent_id: Option<&str>, visit: &mut F)
    where
        F: FnMut(&TreeNode, Option<&str>),
    {
        visit(node, parent_id);
        for child in node.children().unwrap_or_default() {
            Self::visit_node(child, Some(node.id()), visit);
        }
    }

    /// 所有節點（前序）
    pub fn collect_nodes<T>(tree: &T) -> Vec<&TreeNode>
    where
        T: NodeSet + ?Sized,
    {
        fn collect<'a>(node: &'a TreeNode, out: &mut Vec<&'a TreeNode>) {
            out.push(node);
            for child in node.children().unwrap_or_default() {
                collect(child, out);
            }
        }

        let mut nodes = Vec::new();
        for root in tree.roots() {
            collect(root, &mut nodes);
        }
        nodes
    }

    /// 依前序找到第一個符合ID的節點
    pub fn find_node<'a, T>(tree: &'a T, id: &str) -> Option<&'a TreeNode>
    where
        T: NodeSet + ?Sized,
    {
        Self::collect_nodes(tree).into_iter().find(|n| n.id() == id)
    }

    /// 保持結構的轉換；子節點先於父節點映射，轉換函式可讀取已映射的子節點
    pub fn map_nodes<T, V, F>(tree: &T, mut f: F) -> Vec<MappedNode<V>>
    where
        T: NodeSet + ?Sized,
        F: FnMut(&TreeNode, &[MappedNode<V>]) -> V,
    {
        tree.roots()
            .into_iter()
            .map(|root| Self::map_node(root, &mut f))
            .collect()
    }

    fn map_node<V, F>(node: &TreeNode, f: &mut F) -> MappedNode<V>
    where
        F: FnMut(&TreeNode, &[MappedNode<V>]) -> V,
    {
        let children: Vec<MappedNode<V>> = node
            .children()
            .unwrap_or_default()
            .iter()
            .map(|child| Self::map_node(child, f))
            .collect();
        let value = f(node, &children);
        MappedNode {
            id: node.id().to_string(),
            value,
            children,
        }
    }

    /// 逐節點篩選
    ///
    /// 不符合條件的節點本身不會被保留，但其子孫仍會各自判斷，
    /// 也就是篩選不會剪掉整棵子樹。
    pub fn filter_nodes<'a, T, P>(tree: &'a T, mut predicate: P) -> Vec<&'a TreeNode>
    where
        T: NodeSet + ?Sized,
        P: FnMut(&TreeNode) -> bool,
    {
        Self::collect_nodes(tree)
            .into_iter()
            .filter(|node| predicate(node))
            .collect()
    }

    /// 所有節點計算後成本的合計（重複出現的產品會重複計算；溢位視為 0）
    pub fn calculate_total_cost<T>(tree: &T) -> Decimal
    where
        T: NodeSet + ?Sized,
    {
        checked_total(Self::collect_nodes(tree).iter().map(|n| n.calculated_cost()))
    }

    /// 所有節點重量的合計（使用 weight，重複出現的產品會重複計算；溢位視為 0）
    pub fn calculate_total_weight<T>(tree: &T) -> Decimal
    where
        T: NodeSet + ?Sized,
    {
        checked_total(Self::collect_nodes(tree).iter().map(|n| n.weight()))
    }

    /// 葉節點
    pub fn get_leaf_nodes<T>(tree: &T) -> Vec<&TreeNode>
    where
        T: NodeSet + ?Sized,
    {
        Self::filter_nodes(tree, TreeNode::is_leaf)
    }

    /// 指定層級的節點
    pub fn get_nodes_at_level<T>(tree: &T, level: usize) -> Vec<&TreeNode>
    where
        T: NodeSet + ?Sized,
    {
        Self::filter_nodes(tree, |n| n.level() == level)
    }

    /// 節點總數
    pub fn count_nodes<T>(tree: &T) -> usize
    where
        T: NodeSet + ?Sized,
    {
        Self::collect_nodes(tree).len()
    }

    /// 樹的最大層級
    pub fn max_depth<T>(tree: &T) -> usize
    where
        T: NodeSet + ?Sized,
    {
        Self::collect_nodes(tree)
            .iter()
            .map(|n| n.level())
            .max()
            .unwrap_or(0)
    }

    /// 依產品ID彙總葉節點（原料）需求（溢位視為 0）
    pub fn summarize_leaves<T>(tree: &T) -> BTreeMap<String, LeafRequirement>
    where
        T: NodeSet + ?Sized,
    {
        let mut summary: BTreeMap<String, LeafRequirement> = BTreeMap::new();
        for leaf in Self::get_leaf_nodes(tree) {
            let entry = summary.entry(leaf.id().to_string()).or_default();
            entry.quantity = checked_total([entry.quantity, leaf.calculated_quantity()]);
            entry.cost = checked_total([entry.cost, leaf.calculated_cost()]);
            entry.occurrences += 1;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bom_core::{Category, Product, Unit};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn node(id: &str, level: usize, qty: &str, cost: &str, children: Vec<TreeNode>) -> TreeNode {
        let product = Product::new(id, id, Category::RawMaterial, Unit::Kilogram);
        TreeNode::new(&product, level)
            .with_quantities(Decimal::ONE, None, d(qty), d(qty))
            .with_weights(d(qty), Decimal::ZERO)
            .with_calculated_cost(d(cost))
            .with_children((!children.is_empty()).then_some(children))
    }

    // ROOT
    //   A
    //     SALT
    //   B
    //     SALT
    //     C
    fn sample() -> TreeNode {
        node(
            "ROOT",
            0,
            "1",
            "6",
            vec![
                node("A", 1, "2", "2", vec![node("SALT", 2, "0.5", "2", vec![])]),
                node(
                    "B",
                    1,
                    "1",
                    "4",
                    vec![
                        node("SALT", 2, "0.25", "1", vec![]),
                        node("C", 2, "3", "3", vec![]),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_traverse_preorder_with_parent() {
        let tree = sample();
        let mut visited = Vec::new();
        TreeTraverser::traverse(&tree, |n, parent| {
            visited.push(format!("{}<{}", n.id(), parent.unwrap_or("-")))
        });

        assert_eq!(
            visited,
            vec!["ROOT<-", "A<ROOT", "SALT<A", "B<ROOT", "SALT<B", "C<B"]
        );
    }

    #[test]
    fn test_find_node_first_match() {
        let tree = sample();

        let salt = TreeTraverser::find_node(&tree, "SALT").unwrap();
        assert_eq!(salt.calculated_quantity(), d("0.5"));
        assert!(TreeTraverser::find_node(&tree, "MISSING").is_none());
    }

    #[test]
    fn test_map_nodes_bottom_up() {
        let tree = sample();

        let mapped = TreeTraverser::map_nodes(&tree, |_, children: &[MappedNode<usize>]| {
            1 + children.iter().map(|c| c.value).sum::<usize>()
        });

        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].id, "ROOT");
        assert_eq!(mapped[0].value, 6);
        assert_eq!(mapped[0].children[1].value, 3);
    }

    #[test]
    fn test_filter_does_not_prune_subtrees() {
        let tree = sample();

        let matched = TreeTraverser::filter_nodes(&tree, |n| n.id() != "B");
        let ids: Vec<_> = matched.iter().map(|n| n.id()).collect();

        assert_eq!(ids, vec!["ROOT", "A", "SALT", "SALT", "C"]);
    }

    #[test]
    fn test_totals_double_count_repeats() {
        let tree = sample();

        assert_eq!(TreeTraverser::calculate_total_cost(&tree), d("18"));
        assert_eq!(TreeTraverser::calculate_total_weight(&tree), d("7.75"));
    }

    #[test]
    fn test_leaves_and_levels() {
        let tree = sample();

        let leaves: Vec<_> = TreeTraverser::get_leaf_nodes(&tree)
            .iter()
            .map(|n| n.id())
            .collect();
        assert_eq!(leaves, vec!["SALT", "SALT", "C"]);

        assert_eq!(TreeTraverser::get_nodes_at_level(&tree, 1).len(), 2);
        assert_eq!(TreeTraverser::get_nodes_at_level(&tree, 5).len(), 0);
        assert_eq!(TreeTraverser::count_nodes(&tree), 6);
        assert_eq!(TreeTraverser::max_depth(&tree), 2);
    }

    #[test]
    fn test_summarize_leaves() {
        let summary = TreeTraverser::summarize_leaves(&sample());

        let salt = &summary["SALT"];
        assert_eq!(salt.quantity, d("0.75"));
        assert_eq!(salt.cost, d("3"));
        assert_eq!(salt.occurrences, 2);
        assert_eq!(summary["C"].occurrences, 1);
    }

    #[test]
    fn test_totals_overflow_collapses_to_zero() {
        let half = Decimal::MAX / Decimal::from(2) + Decimal::ONE;
        let big = |id: &str| {
            let product = Product::new(id, id, Category::RawMaterial, Unit::Kilogram);
            TreeNode::new(&product, 1)
                .with_quantities(Decimal::ONE, Some(half), half, half)
                .with_weights(half, Decimal::ZERO)
                .with_calculated_cost(half)
        };
        let tree = node("ROOT", 0, "1", "0", vec![big("X"), big("X")]);

        assert_eq!(TreeTraverser::calculate_total_cost(&tree), Decimal::ZERO);
        assert_eq!(TreeTraverser::calculate_total_weight(&tree), Decimal::ZERO);

        let summary = TreeTraverser::summarize_leaves(&tree);
        assert_eq!(summary["X"].cost, Decimal::ZERO);
        assert_eq!(summary["X"].occurrences, 2);
    }

    #[test]
    fn test_single_node_as_tree() {
        let leaf = node("SALT", 0, "1", "1", vec![]);

        assert_eq!(TreeTraverser::count_nodes(&leaf), 1);
        assert_eq!(TreeTraverser::get_leaf_nodes(&leaf).len(), 1);
    }
}
