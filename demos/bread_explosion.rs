//! 麵包 BOM 展開示例

use bom_explosion::{
    catalog_from_json, logging, ExplosionConfig, MaterialsTreeBuilder, PlanAggregator, PlanEntry,
    ProductionPlan, TreeTraverser,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

const CATALOG: &str = r#"{
    "FLOUR": {"id": "FLOUR", "name": "Wheat flour", "category": "RAW_MATERIAL", "unit": "KG", "unit_cost": 2.5},
    "WATER": {"id": "WATER", "name": "Water", "category": "RAW_MATERIAL", "unit": "L", "weight": 1, "unit_cost": 0},
    "SALT":  {"id": "SALT", "name": "Salt", "category": "RAW_MATERIAL", "unit": "KG", "unit_cost": 1.2},
    "YEAST": {"id": "YEAST", "name": "Yeast", "category": "RAW_MATERIAL", "unit": "KG", "unit_cost": 8.0},
    "BAG":   {"id": "BAG", "name": "Paper bag", "category": "PACKAGING", "unit": "UN", "weight": 0.01, "unit_cost": 0.05},
    "DOUGH": {"id": "DOUGH", "name": "Bread dough", "category": "SEMI_FINISHED", "unit": "KG",
              "recipe": [
                  {"component_id": "FLOUR", "quantity": 0.5},
                  {"component_id": "WATER", "quantity": 0.7},
                  {"component_id": "SALT", "quantity": 0.002},
                  {"component_id": "YEAST", "quantity": 0.003}
              ]},
    "LOAF":  {"id": "LOAF", "name": "Bagged loaf", "category": "FINAL_PRODUCT", "unit": "UN",
              "recipe": [
                  {"component_id": "DOUGH", "quantity": 0.6},
                  {"component_id": "BAG", "quantity": 1}
              ]}
}"#;

fn main() -> anyhow::Result<()> {
    logging::init();

    println!("=== 麵包 BOM 展開示例 ===\n");

    let catalog = catalog_from_json(CATALOG)?;

    let tree = MaterialsTreeBuilder::new(&catalog, "LOAF")?
        .with_initial_quantity(Decimal::from(20))?
        .build()?;

    println!("展開樹:");
    print!("{tree}");
    println!();
    println!("總成本: {}", tree.root().calculated_cost());
    println!("總重量: {}", tree.root().weight());

    println!("\n原料需求:");
    for (id, requirement) in TreeTraverser::summarize_leaves(&tree) {
        println!(
            "  - {}: 數量 {}, 成本 {}",
            id, requirement.quantity, requirement.cost
        );
    }

    let mut plan = ProductionPlan::new("Week 45");
    plan.add_entry(PlanEntry::new(
        "LOAF",
        Decimal::from(120),
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap_or_default(),
    ))?;
    plan.add_entry(PlanEntry::new(
        "DOUGH",
        Decimal::from(15),
        NaiveDate::from_ymd_opt(2025, 11, 4).unwrap_or_default(),
    ))?;

    let needed = PlanAggregator::calculate_materials_needed(&plan, &catalog, &ExplosionConfig::new())?;

    println!("\n生產計劃 {} 物料需求:", plan.name);
    for (id, node) in &needed {
        println!(
            "  - {} [{}] {} {}, 成本 {}",
            id,
            node.category(),
            node.calculated_quantity(),
            node.unit(),
            node.calculated_cost()
        );
    }

    println!("\nJSON:");
    println!("{}", serde_json::to_string_pretty(&tree.to_json()?)?);

    Ok(())
}
