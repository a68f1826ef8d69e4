//! 展開樹節點模型

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::product::Product;
use crate::rounding::checked_sum;
use crate::unit::{Category, Unit};
use crate::Result;

/// 根節點上由呼叫端附加的額外屬性
pub type ExtraProperties = BTreeMap<String, serde_json::Value>;

/// 節點固定欄位名稱；額外屬性不得使用
pub const RESERVED_FIELDS: [&str; 14] = [
    "id",
    "name",
    "category",
    "unit",
    "level",
    "mother_factor",
    "quantity",
    "original_quantity",
    "calculated_quantity",
    "weight",
    "children_weight",
    "original_cost",
    "calculated_cost",
    "children",
];

/// 是否為節點固定欄位名稱
pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// 展開樹中的一個已計算節點
///
/// 同一產品可能在樹的不同位置重複出現，每個出現位置都是獨立的節點實例。
/// 節點建立後不可變，僅 [`set_calculated_cost`](Self::set_calculated_cost) 與
/// [`set_children_weight`](Self::set_children_weight) 供生產計劃彙總時使用。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// 產品ID
    id: String,

    /// 產品名稱
    name: String,

    /// 分類
    category: Category,

    /// 計量單位
    unit: Unit,

    /// 層級（0 = 根節點）
    level: usize,

    /// 從父件繼承的倍數
    mother_factor: Decimal,

    /// 父件配方中指定的原始數量（根節點為 None）
    quantity: Option<Decimal>,

    /// 原始數量
    original_quantity: Decimal,

    /// 計算後數量（= 數量 × 所有上層倍數）
    calculated_quantity: Decimal,

    /// 本節點重量
    weight: Decimal,

    /// 子件重量合計
    children_weight: Decimal,

    /// 目錄中的單位成本
    original_cost: Option<Decimal>,

    /// 計算後成本
    calculated_cost: Decimal,

    /// 子節點（葉節點為 None）
    #[serde(serialize_with = "serialize_children")]
    children: Option<Vec<TreeNode>>,

    /// 額外屬性（僅根節點）
    #[serde(flatten)]
    extra: ExtraProperties,
}

fn serialize_children<S>(
    children: &Option<Vec<TreeNode>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match children {
        Some(nodes) => serializer.collect_map(nodes.iter().map(|node| (&node.id, node))),
        None => serializer.serialize_none(),
    }
}

impl TreeNode {
    /// 以產品資料創建節點（數值欄位為 0，由建構器方法補齊）
    pub fn new(product: &Product, level: usize) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category,
            unit: product.unit,
            level,
            mother_factor: Decimal::ONE,
            quantity: None,
            original_quantity: Decimal::ZERO,
            calculated_quantity: Decimal::ZERO,
            weight: Decimal::ZERO,
            children_weight: Decimal::ZERO,
            original_cost: product.unit_cost,
            calculated_cost: Decimal::ZERO,
            children: None,
            extra: ExtraProperties::new(),
        }
    }

    /// 建構器模式：設置數量相關欄位
    pub fn with_quantities(
        mut self,
        mother_factor: Decimal,
        quantity: Option<Decimal>,
        original_quantity: Decimal,
        calculated_quantity: Decimal,
    ) -> Self {
        self.mother_factor = mother_factor;
        self.quantity = quantity;
        self.original_quantity = original_quantity;
        self.calculated_quantity = calculated_quantity;
        self
    }

    /// 建構器模式：設置重量
    pub fn with_weights(mut self, weight: Decimal, children_weight: Decimal) -> Self {
        self.weight = weight;
        self.children_weight = children_weight;
        self
    }

    /// 建構器模式：設置計算後成本
    pub fn with_calculated_cost(mut self, calculated_cost: Decimal) -> Self {
        self.calculated_cost = calculated_cost;
        self
    }

    /// 建構器模式：設置子節點
    pub fn with_children(mut self, children: Option<Vec<TreeNode>>) -> Self {
        self.children = children;
        self
    }

    /// 建構器模式：設置額外屬性（與固定欄位同名的鍵會被捨棄）
    pub fn with_extra(mut self, mut extra: ExtraProperties) -> Self {
        extra.retain(|key, _| !is_reserved_field(key));
        self.extra = extra;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn mother_factor(&self) -> Decimal {
        self.mother_factor
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    pub fn original_quantity(&self) -> Decimal {
        self.original_quantity
    }

    pub fn calculated_quantity(&self) -> Decimal {
        self.calculated_quantity
    }

    /// 本節點重量（子件彙總時使用此欄位）
    pub fn weight(&self) -> Decimal {
        self.weight
    }

    /// 子件重量合計（僅描述本節點的組成，不應再向上加總）
    pub fn children_weight(&self) -> Decimal {
        self.children_weight
    }

    pub fn original_cost(&self) -> Option<Decimal> {
        self.original_cost
    }

    pub fn calculated_cost(&self) -> Decimal {
        self.calculated_cost
    }

    pub fn children(&self) -> Option<&[TreeNode]> {
        self.children.as_deref()
    }

    /// 依ID查找直接子節點
    pub fn child(&self, id: &str) -> Option<&TreeNode> {
        self.children()?.iter().find(|child| child.id == id)
    }

    pub fn extra(&self) -> &ExtraProperties {
        &self.extra
    }

    /// 是否為葉節點
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().map_or(true, Vec::is_empty)
    }

    /// 設置計算後成本（生產計劃彙總用）
    pub fn set_calculated_cost(&mut self, calculated_cost: Decimal) {
        self.calculated_cost = calculated_cost;
    }

    /// 設置子件重量合計（生產計劃彙總用）
    pub fn set_children_weight(&mut self, children_weight: Decimal) {
        self.children_weight = children_weight;
    }

    /// 累加另一節點的數量與重量（生產計劃彙總用，溢位視為 0）
    pub fn absorb_quantities(&mut self, other: &TreeNode, quantity_scale: u32) {
        self.calculated_quantity = checked_sum(
            [self.calculated_quantity, other.calculated_quantity],
            quantity_scale,
        );
        self.weight = checked_sum([self.weight, other.weight], quantity_scale);
    }

    /// 複製節點但不含子節點與額外屬性
    pub fn detached(&self) -> TreeNode {
        TreeNode {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category,
            unit: self.unit,
            level: self.level,
            mother_factor: self.mother_factor,
            quantity: self.quantity,
            original_quantity: self.original_quantity,
            calculated_quantity: self.calculated_quantity,
            weight: self.weight,
            children_weight: self.children_weight,
            original_cost: self.original_cost,
            calculated_cost: self.calculated_cost,
            children: None,
            extra: ExtraProperties::new(),
        }
    }

    /// JSON 投影
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}{} [{}] {} {}",
            "  ".repeat(self.level),
            self.id,
            self.category,
            self.calculated_quantity.normalize(),
            self.unit
        )?;
        for child in self.children().unwrap_or_default() {
            child.render(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

/// 建樹結果：`{ 目標產品ID: 根節點 }`
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialsTree {
    root: TreeNode,
}

impl MaterialsTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    /// 目標產品ID
    pub fn product_code(&self) -> &str {
        self.root.id()
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn into_root(self) -> TreeNode {
        self.root
    }

    /// 依目標產品ID取得根節點
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        (self.root.id() == id).then_some(&self.root)
    }

    /// 轉為單一項目的映射
    pub fn into_map(self) -> BTreeMap<String, TreeNode> {
        BTreeMap::from([(self.root.id.clone(), self.root)])
    }

    /// JSON 投影
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for MaterialsTree {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(std::iter::once((self.root.id(), &self.root)))
    }
}

impl fmt::Display for MaterialsTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f)
    }
}

/// 可被遍歷的節點集合（完整的樹或單一節點）
pub trait NodeSet {
    fn roots(&self) -> Vec<&TreeNode>;
}

impl NodeSet for TreeNode {
    fn roots(&self) -> Vec<&TreeNode> {
        vec![self]
    }
}

impl NodeSet for MaterialsTree {
    fn roots(&self) -> Vec<&TreeNode> {
        vec![&self.root]
    }
}

impl NodeSet for BTreeMap<String, TreeNode> {
    fn roots(&self) -> Vec<&TreeNode> {
        self.values().collect()
    }
}

impl NodeSet for [TreeNode] {
    fn roots(&self) -> Vec<&TreeNode> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_tree() -> TreeNode {
        let flour = Product::new("FLOUR", "Flour", Category::RawMaterial, Unit::Kilogram)
            .with_unit_cost(d("2.5"));
        let dough = Product::new("DOUGH", "Dough", Category::SemiFinished, Unit::Kilogram);

        let child = TreeNode::new(&flour, 1)
            .with_quantities(Decimal::ONE, Some(d("0.5")), d("0.5"), d("0.5"))
            .with_weights(d("0.5"), Decimal::ZERO)
            .with_calculated_cost(d("1.25"));

        TreeNode::new(&dough, 0)
            .with_quantities(Decimal::ONE, None, Decimal::ONE, Decimal::ONE)
            .with_weights(Decimal::ONE, d("0.5"))
            .with_calculated_cost(d("1.25"))
            .with_children(Some(vec![child]))
    }

    #[test]
    fn test_accessors() {
        let root = sample_tree();

        assert_eq!(root.id(), "DOUGH");
        assert_eq!(root.level(), 0);
        assert_eq!(root.quantity(), None);
        assert_eq!(root.original_cost(), None);
        assert!(!root.is_leaf());

        let flour = root.child("FLOUR").unwrap();
        assert!(flour.is_leaf());
        assert_eq!(flour.original_cost(), Some(d("2.5")));
        assert_eq!(flour.calculated_cost(), d("1.25"));
    }

    #[test]
    fn test_text_rendering() {
        let rendered = sample_tree().to_string();

        assert_eq!(
            rendered,
            "DOUGH [SEMI_FINISHED] 1 KG\n  FLOUR [RAW_MATERIAL] 0.5 KG\n"
        );
    }

    #[test]
    fn test_json_projection() {
        let tree = MaterialsTree::new(sample_tree());
        let json = tree.to_json().unwrap();

        assert_eq!(json["DOUGH"]["level"], 0);
        assert!(json["DOUGH"]["quantity"].is_null());
        assert_eq!(json["DOUGH"]["children"]["FLOUR"]["level"], 1);
        assert!(json["DOUGH"]["children"]["FLOUR"]["children"].is_null());
    }

    #[test]
    fn test_extra_properties_flattened() {
        let mut extra = ExtraProperties::new();
        extra.insert("order_ref".to_string(), serde_json::json!("SO-001"));

        let root = sample_tree().with_extra(extra);
        let json = root.to_json().unwrap();

        assert_eq!(json["order_ref"], "SO-001");
        assert_eq!(root.extra().len(), 1);
    }

    #[test]
    fn test_extra_cannot_shadow_fixed_fields() {
        let mut extra = ExtraProperties::new();
        extra.insert("id".to_string(), serde_json::json!("OTHER"));
        extra.insert("calculated_cost".to_string(), serde_json::json!(999));
        extra.insert("batch".to_string(), serde_json::json!(7));

        let root = sample_tree().with_extra(extra);
        let json = root.to_json().unwrap();

        assert_eq!(root.extra().len(), 1);
        assert_eq!(json["id"], "DOUGH");
        assert_eq!(json["calculated_cost"], serde_json::to_value(d("1.25")).unwrap());
        assert_eq!(json["batch"], 7);
    }

    #[test]
    fn test_absorb_overflow_collapses_to_zero() {
        let product = Product::new("X", "X", Category::RawMaterial, Unit::Kilogram);
        let big = TreeNode::new(&product, 0)
            .with_quantities(Decimal::ONE, None, Decimal::MAX, Decimal::MAX)
            .with_weights(Decimal::MAX, Decimal::ZERO);

        let mut total = big.clone();
        total.absorb_quantities(&big, 3);

        assert_eq!(total.calculated_quantity(), Decimal::ZERO);
        assert_eq!(total.weight(), Decimal::ZERO);
    }

    #[test]
    fn test_setters_and_detached() {
        let mut root = sample_tree();
        root.set_calculated_cost(d("3"));
        root.set_children_weight(d("2"));

        let flat = root.detached();
        assert_eq!(flat.calculated_cost(), d("3"));
        assert_eq!(flat.children_weight(), d("2"));
        assert!(flat.children().is_none());

        let mut total = flat.clone();
        total.absorb_quantities(&flat, 3);
        assert_eq!(total.calculated_quantity(), d("2"));
        assert_eq!(total.weight(), d("2"));
    }

    #[test]
    fn test_materials_tree_lookup() {
        let tree = MaterialsTree::new(sample_tree());

        assert_eq!(tree.product_code(), "DOUGH");
        assert!(tree.get("DOUGH").is_some());
        assert!(tree.get("FLOUR").is_none());
        assert_eq!(tree.roots().len(), 1);
        assert!(tree.into_map().contains_key("DOUGH"));
    }
}
