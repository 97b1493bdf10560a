use jiff::civil::Date;
use rand::Rng;
use tracing::debug;

use crate::{
    generator::{GeneratorError, tasks::create_random_tasks},
    models::activity::ActivityReport,
};

/// Smallest and largest number of tasks a random activity report holds.
pub const MIN_TASKS: usize = 8;
pub const MAX_TASKS: usize = 12;

pub struct ActivityParameters {
    pub contract_id: usize,
    pub hours: u32,
    pub flavor: String,
    pub project_id: u64,
}

/// First day of the month before the one `today` falls in.
pub fn previous_month(today: Date) -> Result<Date, GeneratorError> {
    Ok(today.first_of_month().yesterday()?.first_of_month())
}

/// Builds an activity report for last month made of 8 to 12 random tasks
/// adding up to the requested hours.
pub fn create_random_activity<R: Rng + ?Sized>(
    rng: &mut R,
    today: Date,
    parameters: ActivityParameters,
) -> Result<ActivityReport, GeneratorError> {
    let start_date = previous_month(today)?;
    let how_many = rng.gen_range(MIN_TASKS..=MAX_TASKS);

    let tasks = create_random_tasks(
        rng,
        &parameters.flavor,
        parameters.project_id,
        start_date,
        how_many,
        parameters.hours,
    )?;

    debug!(
        contract_id = parameters.contract_id,
        hours = parameters.hours,
        tasks = tasks.len(),
        "Created random activity"
    );

    Ok(ActivityReport {
        contract_id: parameters.contract_id,
        start_date,
        flavor: parameters.flavor,
        project_id: parameters.project_id,
        tasks,
    })
}
