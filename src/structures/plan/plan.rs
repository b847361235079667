use async_graphql::SimpleObject;

use crate::structures::plan::PlanItem;

/// Itinerary between two stops. `total_time` is in minutes.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct Plan {
    pub total_time: f64,
    pub items: Vec<PlanItem>,
}
