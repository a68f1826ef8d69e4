//! 生產計劃模型

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BomError, Result};

/// 計劃項目狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanStatus {
    /// 已計劃
    #[default]
    Planned,
    /// 生產中
    InProgress,
    /// 已完成
    Completed,
    /// 已取消
    Cancelled,
}

impl PlanStatus {
    /// 是否需要計入物料需求
    pub fn is_active(&self) -> bool {
        !matches!(self, PlanStatus::Cancelled)
    }
}

/// 生產計劃項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// 項目ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 計劃生產數量
    pub planned_quantity: Decimal,

    /// 生產日期
    pub production_date: NaiveDate,

    /// 狀態
    pub status: PlanStatus,

    /// 備註
    pub notes: Option<String>,
}

impl PlanEntry {
    /// 創建新的計劃項目
    pub fn new(
        product_id: impl Into<String>,
        planned_quantity: Decimal,
        production_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            planned_quantity,
            production_date,
            status: PlanStatus::Planned,
            notes: None,
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: PlanStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// 生產計劃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionPlan {
    /// 計劃ID
    pub id: Uuid,

    /// 計劃名稱
    pub name: String,

    /// 建立時間
    pub created_at: DateTime<Utc>,

    /// 最後更新時間（每次變更都會前進）
    pub updated_at: DateTime<Utc>,

    /// 計劃項目（保持加入順序）
    entries: Vec<PlanEntry>,
}

impl ProductionPlan {
    /// 創建新的生產計劃
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// 依ID取得項目
    pub fn entry(&self, entry_id: Uuid) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    /// 指定狀態的項目
    pub fn entries_with_status(&self, status: PlanStatus) -> Vec<&PlanEntry> {
        self.entries.iter().filter(|e| e.status == status).collect()
    }

    /// 需要計入物料需求的項目
    pub fn active_entries(&self) -> Vec<&PlanEntry> {
        self.entries.iter().filter(|e| e.status.is_active()).collect()
    }

    /// 添加計劃項目，返回項目ID
    pub fn add_entry(&mut self, entry: PlanEntry) -> Result<Uuid> {
        Self::validate_quantity(entry.planned_quantity)?;
        let id = entry.id;
        self.entries.push(entry);
        self.touch();
        Ok(id)
    }

    /// 移除計劃項目
    pub fn remove_entry(&mut self, entry_id: Uuid) -> Result<PlanEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(BomError::PlanEntryNotFound(entry_id))?;
        let removed = self.entries.remove(index);
        self.touch();
        Ok(removed)
    }

    /// 更新項目狀態
    pub fn update_entry_status(&mut self, entry_id: Uuid, status: PlanStatus) -> Result<()> {
        self.entry_mut(entry_id)?.status = status;
        self.touch();
        Ok(())
    }

    /// 更新項目計劃數量
    pub fn update_entry_quantity(&mut self, entry_id: Uuid, quantity: Decimal) -> Result<()> {
        Self::validate_quantity(quantity)?;
        self.entry_mut(entry_id)?.planned_quantity = quantity;
        self.touch();
        Ok(())
    }

    fn entry_mut(&mut self, entry_id: Uuid) -> Result<&mut PlanEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or(BomError::PlanEntryNotFound(entry_id))
    }

    fn validate_quantity(quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(BomError::InvalidQuantity(format!(
                "計劃數量必須大於 0，實際為 {quantity}"
            )));
        }
        Ok(())
    }

    /// 推進更新時間（時鐘未前進時至少加 1 微秒）
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    #[test]
    fn test_create_plan() {
        let plan = ProductionPlan::new("Week 45");

        assert_eq!(plan.name, "Week 45");
        assert!(plan.entries().is_empty());
        assert_eq!(plan.created_at, plan.updated_at);
    }

    #[test]
    fn test_add_and_remove_entry() {
        let mut plan = ProductionPlan::new("Week 45");
        let created = plan.updated_at;

        let id = plan
            .add_entry(PlanEntry::new("BREAD", Decimal::from(100), date(3)).with_notes("morning"))
            .unwrap();
        assert!(plan.updated_at > created);
        assert_eq!(plan.entry(id).unwrap().status, PlanStatus::Planned);

        let after_add = plan.updated_at;
        let removed = plan.remove_entry(id).unwrap();
        assert_eq!(removed.product_id, "BREAD");
        assert!(plan.updated_at > after_add);
        assert!(plan.entries().is_empty());
    }

    #[test]
    fn test_status_updates() {
        let mut plan = ProductionPlan::new("Week 46");
        let first = plan
            .add_entry(PlanEntry::new("BREAD", Decimal::from(10), date(10)))
            .unwrap();
        plan.add_entry(PlanEntry::new("ROLLS", Decimal::from(20), date(11)))
            .unwrap();

        let before = plan.updated_at;
        plan.update_entry_status(first, PlanStatus::Cancelled).unwrap();

        assert!(plan.updated_at > before);
        assert_eq!(plan.entries_with_status(PlanStatus::Cancelled).len(), 1);
        assert_eq!(plan.active_entries().len(), 1);
        assert_eq!(plan.active_entries()[0].product_id, "ROLLS");
    }

    #[test]
    fn test_invalid_operations() {
        let mut plan = ProductionPlan::new("Week 47");

        assert!(matches!(
            plan.add_entry(PlanEntry::new("BREAD", Decimal::ZERO, date(17))),
            Err(BomError::InvalidQuantity(_))
        ));

        let missing = Uuid::new_v4();
        assert_eq!(
            plan.remove_entry(missing).unwrap_err(),
            BomError::PlanEntryNotFound(missing)
        );
        assert!(plan.update_entry_status(missing, PlanStatus::Completed).is_err());

        let id = plan
            .add_entry(PlanEntry::new("BREAD", Decimal::ONE, date(17)))
            .unwrap();
        assert!(plan.update_entry_quantity(id, Decimal::from(-1)).is_err());
        plan.update_entry_quantity(id, Decimal::from(5)).unwrap();
        assert_eq!(plan.entry(id).unwrap().planned_quantity, Decimal::from(5));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&PlanStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert!(!PlanStatus::Cancelled.is_active());
        assert!(PlanStatus::Completed.is_active());
    }
}
