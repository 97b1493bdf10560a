use jiff::{Span, civil::Date};
use rand::{Rng, seq::SliceRandom};
use tracing::debug;

use crate::{generator::GeneratorError, models::activity::Task};

const FLAVOR_PLACEHOLDER: &str = "{flavor}";

/// Front-loading weight of the split curve: early tasks may take a bigger
/// share of what is left.
const SPLIT_WEIGHT: f64 = 0.618;

/// Preferred lower bound of a split, in hours.
const MIN_SPLIT_HOURS: u32 = 4;

const WORKDAY_HOURS: u32 = 8;

const TASK_TEMPLATES: [&str; 23] = [
    "sprint planning",
    "sprint review",
    "development tasks estimation",
    "defects investigation",
    "code reviews",
    "refactoring old-code",
    "SDK architecture updates",
    "release notes",
    "{flavor} generic mock setup",
    "{flavor} state manager",
    "{flavor} components architecture",
    "{flavor} android communication layer",
    "{flavor} android native implementation",
    "{flavor} iOs communication layer",
    "{flavor} iOs native implementation",
    "{flavor} core implementation",
    "{flavor} public interfaces update",
    "{flavor} sample application",
    "{flavor} component design",
    "{flavor} data modeling",
    "{flavor} defects verification",
    "{flavor} code coverage testing",
    "Low level {flavor} event handling",
];

/// Picks `count` distinct task names, filling the flavor into the templates
/// that mention it.
pub fn pick_task_names<R: Rng + ?Sized>(
    rng: &mut R,
    flavor: &str,
    count: usize,
) -> Result<Vec<String>, GeneratorError> {
    if count > TASK_TEMPLATES.len() {
        return Err(GeneratorError::InsufficientTemplates {
            requested: count,
            available: TASK_TEMPLATES.len(),
        });
    }

    Ok(TASK_TEMPLATES
        .choose_multiple(rng, count)
        .map(|template| template.replace(FLAVOR_PLACEHOLDER, flavor))
        .collect())
}

/// Splits `duration` hours into `count` positive whole-hour durations that
/// add up to `duration`.
pub fn split_duration<R: Rng + ?Sized>(
    rng: &mut R,
    duration: u32,
    count: usize,
) -> Result<Vec<u32>, GeneratorError> {
    let invariant_violation = || GeneratorError::ArithmeticInvariant { duration, count };
    if count == 0 || (duration as usize) < count {
        return Err(invariant_violation());
    }

    let mut left = duration;
    let mut splits = Vec::with_capacity(count);

    for step in 0..count - 1 {
        // Every task after this one still needs at least an hour.
        let reserved = (count - 1 - step) as u32;
        let max_split = split_curve(left, step, count).min(left - reserved);
        if max_split == 0 {
            return Err(invariant_violation());
        }

        let min_split = MIN_SPLIT_HOURS.min(max_split - 1).max(1);
        let split = if min_split < max_split {
            rng.gen_range(min_split..max_split)
        } else {
            max_split
        };

        splits.push(split);
        left -= split;
    }
    splits.push(left);

    debug!(duration, count, ?splits, "Split duration");
    Ok(splits)
}

/// Upper bound the curve allows for split `step` out of `count`, with `left`
/// hours still to hand out. Halves round to even.
fn split_curve(left: u32, step: usize, count: usize) -> u32 {
    (f64::from(left) * SPLIT_WEIGHT * (step + 2) as f64 / count as f64).round_ties_even() as u32
}

/// Whole days a task of `hours` keeps the calendar busy, rounding half to
/// even.
fn workdays(hours: u32) -> u32 {
    let days = hours / WORKDAY_HOURS;
    let rest = hours % WORKDAY_HOURS;
    let half = WORKDAY_HOURS / 2;

    if rest > half || (rest == half && days % 2 == 1) {
        days + 1
    } else {
        days
    }
}

/// Moves Saturdays and Sundays to the following Monday.
fn skip_weekend(date: Date) -> Result<Date, GeneratorError> {
    let offset = date.weekday().to_monday_zero_offset();
    if offset > 4 {
        Ok(date.checked_add(Span::new().try_days(i64::from(7 - offset))?)?)
    } else {
        Ok(date)
    }
}

/// Walks the calendar from `start_date`, advancing by each task's length in
/// workdays and never landing on a weekend.
pub fn compute_start_dates(
    start_date: Date,
    durations: &[u32],
) -> Result<Vec<Date>, GeneratorError> {
    let mut dates = Vec::with_capacity(durations.len());
    let mut trace_date = start_date;

    for duration in durations {
        let span = Span::new().try_days(i64::from(workdays(*duration)))?;
        trace_date = trace_date.checked_add(span)?;
        trace_date = skip_weekend(trace_date)?;
        dates.push(trace_date);
    }

    Ok(dates)
}

/// Produces `count` tasks on `flavor` adding up to `hours`, scheduled from
/// `start_date` on.
pub fn create_random_tasks<R: Rng + ?Sized>(
    rng: &mut R,
    flavor: &str,
    project_id: u64,
    start_date: Date,
    count: usize,
    hours: u32,
) -> Result<Vec<Task>, GeneratorError> {
    let names = pick_task_names(rng, flavor, count)?;
    let durations = split_duration(rng, hours, count)?;
    let dates = compute_start_dates(start_date, &durations)?;

    Ok(names
        .into_iter()
        .zip(dates)
        .zip(durations)
        .map(|((name, start_date), duration)| Task {
            name,
            start_date,
            duration,
            project_id,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use jiff::civil::{Weekday, date};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_split_duration_example() {
        let mut rng = StdRng::seed_from_u64(7);

        let splits = split_duration(&mut rng, 40, 3).unwrap();

        assert_eq!(splits.len(), 3);
        assert_eq!(splits.iter().sum::<u32>(), 40);
        assert!(splits.iter().all(|s| *s > 0));
    }

    #[test]
    fn test_split_duration_sums_and_stays_positive() {
        let mut rng = StdRng::seed_from_u64(42);

        for count in 1..=12 {
            for duration in [count as u32, 12, 40, 80, 160, 173] {
                if (duration as usize) < count {
                    continue;
                }
                let splits = split_duration(&mut rng, duration, count).unwrap();

                assert_eq!(splits.len(), count);
                assert_eq!(splits.iter().sum::<u32>(), duration);
                assert!(
                    splits.iter().all(|s| *s > 0),
                    "Non positive split in {splits:?} for {duration}h/{count}"
                );
            }
        }
    }

    #[test]
    fn test_split_duration_rejects_budget_below_count() {
        let mut rng = StdRng::seed_from_u64(1);

        match split_duration(&mut rng, 5, 8) {
            Err(GeneratorError::ArithmeticInvariant {
                duration: 5,
                count: 8,
            }) => {}
            other => panic!("Expected ArithmeticInvariant, got {other:?}"),
        }
        assert!(split_duration(&mut rng, 5, 0).is_err());
    }

    #[test]
    fn test_pick_task_names_are_distinct_and_flavored() {
        let mut rng = StdRng::seed_from_u64(3);

        let names = pick_task_names(&mut rng, "Flutter", TASK_TEMPLATES.len()).unwrap();
        let unique: HashSet<_> = names.iter().collect();

        assert_eq!(unique.len(), TASK_TEMPLATES.len());
        assert!(names.iter().all(|n| !n.contains(FLAVOR_PLACEHOLDER)));
        assert!(names.contains(&String::from("Flutter state manager")));
    }

    #[test]
    fn test_pick_task_names_pool_exhausted() {
        let mut rng = StdRng::seed_from_u64(3);

        match pick_task_names(&mut rng, "Rust", 24) {
            Err(GeneratorError::InsufficientTemplates {
                requested: 24,
                available: 23,
            }) => {}
            other => panic!("Expected InsufficientTemplates, got {other:?}"),
        }
    }

    #[test]
    fn test_split_curve_rounds_half_to_even() {
        // 250 * 0.618 * 2 / 2 = 154.5, 125 * 0.618 * 2 / 3 = 51.5
        assert_eq!(split_curve(250, 0, 2), 154);
        assert_eq!(split_curve(750, 0, 2), 464);
        assert_eq!(split_curve(125, 0, 3), 52);
        assert_eq!(split_curve(40, 0, 3), 16);
    }

    #[test]
    fn test_workdays_rounds_half_to_even() {
        assert_eq!(workdays(3), 0);
        assert_eq!(workdays(4), 0);
        assert_eq!(workdays(5), 1);
        assert_eq!(workdays(12), 2);
        assert_eq!(workdays(20), 2);
        assert_eq!(workdays(28), 4);
    }

    #[test]
    fn test_compute_start_dates_skips_weekends() {
        // 2026-09-04 is a Friday
        let friday = date(2026, 9, 4);

        let dates = compute_start_dates(friday, &[2, 8, 8, 16]).unwrap();

        assert_eq!(
            dates,
            vec![
                date(2026, 9, 4),
                date(2026, 9, 7),
                date(2026, 9, 8),
                date(2026, 9, 10),
            ]
        );
    }

    #[test]
    fn test_compute_start_dates_moves_weekend_start_to_monday() {
        // 2026-08-01 is a Saturday
        let dates = compute_start_dates(date(2026, 8, 1), &[3]).unwrap();

        assert_eq!(dates, vec![date(2026, 8, 3)]);
        assert_eq!(dates[0].weekday(), Weekday::Monday);
    }

    #[test]
    fn test_compute_start_dates_out_of_range() {
        match compute_start_dates(date(2026, 9, 1), &[60_000_000]) {
            Err(GeneratorError::DateOutOfRange(_)) => {}
            other => panic!("Expected DateOutOfRange, got {other:?}"),
        }
        assert!(matches!(
            compute_start_dates(date(9999, 12, 1), &[400]),
            Err(GeneratorError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn test_random_tasks_hold_their_invariants() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = date(2026, 9, 1);

        for count in 8..=12 {
            let tasks = create_random_tasks(&mut rng, "Rust", 9, start, count, 160).unwrap();

            assert_eq!(tasks.len(), count);
            assert_eq!(tasks.iter().map(|t| t.duration).sum::<u32>(), 160);
            assert!(tasks.iter().all(|t| t.project_id == 9));
            assert!(
                tasks
                    .iter()
                    .all(|t| t.start_date.weekday().to_monday_zero_offset() < 5)
            );
            assert!(tasks.windows(2).all(|w| w[0].start_date <= w[1].start_date));
            let names: HashSet<_> = tasks.iter().map(|t| &t.name).collect();
            assert_eq!(names.len(), count);
        }
    }

    #[test]
    fn test_same_seed_same_tasks() {
        let start = date(2026, 9, 1);
        let mut first_rng = StdRng::seed_from_u64(2024);
        let mut second_rng = StdRng::seed_from_u64(2024);

        let first = create_random_tasks(&mut first_rng, "Rust", 1, start, 10, 120).unwrap();
        let second = create_random_tasks(&mut second_rng, "Rust", 1, start, 10, 120).unwrap();

        assert_eq!(first, second);
    }
}
