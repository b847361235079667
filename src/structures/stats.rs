use async_graphql::SimpleObject;

/// Summary of one bus line as a rider would travel it.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct BusStat {
    pub name: String,
    /// Stops visited on a full run, a linear line counts its way back too.
    pub stop_count: usize,
    pub unique_stop_count: usize,
    /// Road length of a full run, in metres.
    pub route_length: f64,
    /// Road length divided by the great-circle length of the same run.
    pub curvature: f64,
}

#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct StopInfo {
    pub name: String,
    /// Names of the buses serving the stop, sorted.
    pub buses: Vec<String>,
}
