use jiff::civil::Date;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// What was worked on
    pub name: String,
    /// Day the work started
    pub start_date: Date,
    /// Billed hours
    pub duration: u32,
    /// Project the task was booked on
    pub project_id: u64,
}

/// Billable work performed under one contract during a billing period.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ActivityReport {
    /// Index of the contract in the store
    pub contract_id: usize,
    /// First day of the billing period
    pub start_date: Date,
    /// Technology theme the task names are built around
    pub flavor: String,
    pub project_id: u64,
    pub tasks: Vec<Task>,
}

impl ActivityReport {
    pub fn total_hours(&self) -> u32 {
        self.tasks.iter().map(|t| t.duration).sum()
    }
}
