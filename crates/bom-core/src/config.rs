//! BOM 展開配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rounding::{COST_SCALE, QUANTITY_SCALE};
use crate::{BomError, Result};

/// 預設最大展開層級
pub const DEFAULT_MAX_LEVEL: i32 = 100;

/// 捨入精度設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingPolicy {
    /// 數量與重量的小數位
    pub quantity_scale: u32,

    /// 成本的小數位
    pub cost_scale: u32,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            quantity_scale: QUANTITY_SCALE,
            cost_scale: COST_SCALE,
        }
    }
}

/// 同一配方內重複組件的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 後出現的項目覆蓋先前項目
    #[default]
    Overwrite,
    /// 驗證階段直接拒絕
    Reject,
}

/// BOM 展開配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// 初始數量
    pub initial_quantity: Decimal,

    /// 最大展開層級（超過的子件會被截斷）
    pub max_level: i32,

    /// 捨入精度
    pub rounding: RoundingPolicy,

    /// 重複組件策略
    pub duplicate_policy: DuplicatePolicy,

    /// 是否將無法解析的組件引用視為錯誤
    ///
    /// - false: 缺少的組件直接從樹中省略（預設，允許目錄尚未填完）
    /// - true: 建樹前回報第一個找不到的組件
    pub strict_references: bool,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            initial_quantity: Decimal::ONE,
            max_level: DEFAULT_MAX_LEVEL,
            rounding: RoundingPolicy::default(),
            duplicate_policy: DuplicatePolicy::default(),
            strict_references: false,
        }
    }
}

impl ExplosionConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置初始數量
    pub fn with_initial_quantity(mut self, quantity: Decimal) -> Self {
        self.initial_quantity = quantity;
        self
    }

    /// 建構器模式：設置最大層級
    pub fn with_max_level(mut self, max_level: i32) -> Self {
        self.max_level = max_level;
        self
    }

    /// 建構器模式：設置捨入精度
    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    /// 建構器模式：設置重複組件策略
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// 建構器模式：設置嚴格引用檢查
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.initial_quantity <= Decimal::ZERO {
            return Err(BomError::InvalidQuantity(format!(
                "初始數量必須大於 0，實際為 {}",
                self.initial_quantity
            )));
        }
        if self.max_level < 0 {
            return Err(BomError::InvalidQuantity(format!(
                "最大層級不可為負數，實際為 {}",
                self.max_level
            )));
        }
        Ok(())
    }
}
