//! 數值捨入規則
//!
//! 所有數量、重量、成本在每一步運算後都以固定小數位捨入，
//! 避免重複相乘造成的精度漂移。

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 數量與重量的小數位數
pub const QUANTITY_SCALE: u32 = 3;

/// 成本的小數位數
pub const COST_SCALE: u32 = 4;

/// 捨入到指定小數位（遠離零方向，保留正負號）
pub fn round_to(value: Decimal, scale: u32) -> Decimal {
    value
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// 以數量精度捨入
pub fn round3(value: Decimal) -> Decimal {
    round_to(value, QUANTITY_SCALE)
}

/// 相乘後捨入；溢位視為 0
pub fn checked_product(a: Decimal, b: Decimal, scale: u32) -> Decimal {
    a.checked_mul(b)
        .map(|value| round_to(value, scale))
        .unwrap_or(Decimal::ZERO)
}

/// 相加（不捨入）；溢位視為 0
pub fn checked_total<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .unwrap_or(Decimal::ZERO)
}

/// 相加後捨入；溢位視為 0
pub fn checked_sum<I>(values: I, scale: u32) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_to(checked_total(values), scale)
}

/// 將浮點數轉為 Decimal；NaN 與 ±Infinity 視為 0
pub fn to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value)
        .map(|v| v.normalize())
        .unwrap_or(Decimal::ZERO)
}
