//! 計量單位與產品分類

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 計量單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// 公斤（唯一的質量單位）
    #[serde(rename = "KG")]
    Kilogram,
    /// 公升
    #[serde(rename = "L")]
    Liter,
    /// 個
    #[serde(rename = "UN")]
    Unit,
    /// 箱
    #[serde(rename = "BOX")]
    Box,
    /// 包
    #[serde(rename = "PACK")]
    Package,
    /// 袋
    #[serde(rename = "BAG")]
    Bag,
}

impl Unit {
    /// 單位代碼
    pub fn code(&self) -> &'static str {
        match self {
            Unit::Kilogram => "KG",
            Unit::Liter => "L",
            Unit::Unit => "UN",
            Unit::Box => "BOX",
            Unit::Package => "PACK",
            Unit::Bag => "BAG",
        }
    }

    /// 是否為質量單位（1 單位數量 = 1 單位質量）
    pub fn is_mass(&self) -> bool {
        matches!(self, Unit::Kilogram)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KG" | "KILOGRAM" => Ok(Unit::Kilogram),
            "L" | "LITER" | "LITRE" => Ok(Unit::Liter),
            "UN" | "UNIT" => Ok(Unit::Unit),
            "BOX" => Ok(Unit::Box),
            "PACK" | "PACKAGE" => Ok(Unit::Package),
            "BAG" => Ok(Unit::Bag),
            other => Err(format!("未知的單位: {other}")),
        }
    }
}

/// 產品分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// 原料
    RawMaterial,
    /// 半成品
    SemiFinished,
    /// 單件產品
    UnitProduct,
    /// 成品
    FinalProduct,
    /// 包材
    Packaging,
    /// 清潔用品
    Cleaning,
}

impl Category {
    /// 分類代碼
    pub fn code(&self) -> &'static str {
        match self {
            Category::RawMaterial => "RAW_MATERIAL",
            Category::SemiFinished => "SEMI_FINISHED",
            Category::UnitProduct => "UNIT_PRODUCT",
            Category::FinalProduct => "FINAL_PRODUCT",
            Category::Packaging => "PACKAGING",
            Category::Cleaning => "CLEANING",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "RAW_MATERIAL" => Ok(Category::RawMaterial),
            "SEMI_FINISHED" => Ok(Category::SemiFinished),
            "UNIT_PRODUCT" => Ok(Category::UnitProduct),
            "FINAL_PRODUCT" => Ok(Category::FinalProduct),
            "PACKAGING" => Ok(Category::Packaging),
            "CLEANING" => Ok(Category::Cleaning),
            _ => Err(format!("未知的分類: {}", s.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("KG", Unit::Kilogram)]
    #[case("kg", Unit::Kilogram)]
    #[case(" l ", Unit::Liter)]
    #[case("unit", Unit::Unit)]
    #[case("Package", Unit::Package)]
    fn test_parse_unit(#[case] input: &str, #[case] expected: Unit) {
        assert_eq!(input.parse::<Unit>().unwrap(), expected);
    }

    #[rstest]
    #[case("raw_material", Category::RawMaterial)]
    #[case("semi-finished", Category::SemiFinished)]
    #[case("FINAL PRODUCT", Category::FinalProduct)]
    #[case("cleaning", Category::Cleaning)]
    fn test_parse_category(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn test_only_kilogram_is_mass() {
        assert!(Unit::Kilogram.is_mass());
        assert!(!Unit::Liter.is_mass());
        assert!(!Unit::Box.is_mass());
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert!("TON".parse::<Unit>().is_err());
        assert!("TOOLING".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_codes() {
        assert_eq!(serde_json::to_string(&Unit::Kilogram).unwrap(), "\"KG\"");
        assert_eq!(
            serde_json::to_string(&Category::SemiFinished).unwrap(),
            "\"SEMI_FINISHED\""
        );
    }
}
