use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 주문 처리 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl OrderStatus {
    /// Statuses an order can be stuck in
    pub const UNFINISHED: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Processing];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Failed => "FAILED",
        }
    }

    pub fn is_unfinished(&self) -> bool {
        Self::UNFINISHED.contains(self)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoicing order, owned by the invoicing service. Timestamps are UTC.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub external_order_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime,
    pub updated_at: Option<DateTime>,
    pub retry_count: i32,
    pub error_message: Option<String>,
}

impl Model {
    /// Unfinished and created strictly before `cutoff`
    pub fn is_stuck(&self, cutoff: DateTime) -> bool {
        self.status.is_unfinished() && self.created_at < cutoff
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(status: OrderStatus, created_at: DateTime) -> Model {
        Model {
            id: 1,
            external_order_id: "ORD-1".to_string(),
            status,
            created_at,
            updated_at: None,
            retry_count: 0,
            error_message: None,
        }
    }

    fn at(hour: u32) -> DateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn should_be_stuck_when_unfinished_and_older_than_cutoff() {
        assert!(order(OrderStatus::Pending, at(8)).is_stuck(at(9)));
        assert!(order(OrderStatus::Processing, at(8)).is_stuck(at(9)));
    }

    #[test]
    fn should_not_be_stuck_in_terminal_status() {
        assert!(!order(OrderStatus::Completed, at(8)).is_stuck(at(9)));
        assert!(!order(OrderStatus::Failed, at(8)).is_stuck(at(9)));
    }

    #[test]
    fn should_not_be_stuck_at_exact_cutoff() {
        assert!(!order(OrderStatus::Pending, at(9)).is_stuck(at(9)));
    }

    #[test]
    fn should_serialize_status_in_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();

        assert_eq!(json, "\"PROCESSING\"");
        assert_eq!(OrderStatus::Processing.to_string(), "PROCESSING");
    }
}
