use async_graphql::{Interface, SimpleObject};

#[derive(Debug, Clone, PartialEq, Interface)]
#[graphql(field(name = "time", ty = "&f64"))]
pub enum PlanItem {
    Wait(PlanWaitItem),
    Bus(PlanBusItem),
}

#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct PlanWaitItem {
    pub stop_name: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct PlanBusItem {
    pub bus: String,
    pub from_stop: String,
    pub to_stop: String,
    pub span_count: usize,
    pub time: f64,
}

impl PlanItem {
    pub fn duration(&self) -> f64 {
        match self {
            PlanItem::Wait(item) => item.time,
            PlanItem::Bus(item) => item.time,
        }
    }
}
