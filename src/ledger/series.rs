use chrono::{Datelike, Months, NaiveDate};

//replaces each missing value with the most recent known value before it; leading gaps stay missing
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

//first difference against the last known value; missing when the current value is missing
//or when nothing is known before it, so the first row is always missing
pub fn gap_aware_diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut previous: Option<f64> = None;
    values
        .iter()
        .map(|v| match *v {
            Some(current) => {
                let change = previous.map(|p| current - p);
                previous = Some(current);
                change
            }
            None => None,
        })
        .collect()
}

//row-wise sum skipping missing cells; None when every cell is missing
pub fn sum_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

//mean of the known values in the trailing window (minimum of one observation)
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Option<f64> {
    let start = values.len().saturating_sub(window.max(1));
    let known: Vec<f64> = values[start..].iter().flatten().copied().collect();

    if known.is_empty() {
        None
    } else {
        Some(known.iter().sum::<f64>() / known.len() as f64)
    }
}

//index of the first maximum or minimum among the known values
pub fn first_extreme(values: &[Option<f64>], want_max: bool) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.iter().enumerate() {
        if let Some(v) = *value {
            let better = match best {
                None => true,
                Some((_, b)) if want_max => v > b,
                Some((_, b)) => v < b,
            };
            if better {
                best = Some((idx, v));
            }
        }
    }
    best
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

//calendar-month difference, ignoring the day of month
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

//first month start on or after the given date
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    if date.day() == 1 {
        date
    } else {
        add_months(month_start(date), 1)
    }
}

//`count` consecutive month starts beginning at the first month start on or after `start`
pub fn month_starts(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let first = next_month_start(start);
    (0..count).map(|i| add_months(first, i as u32)).collect()
}

//month starts from the first on or after `start` through `end` inclusive
pub fn month_starts_through(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let first = next_month_start(start);
    if first > end {
        return Vec::new();
    }
    let count = months_between(first, end) as usize + 1;
    month_starts(first, count)
}

//collapses a dated series into one bucket per calendar month from the first to the last
//month present; each bucket holds the last known value inside that month
pub fn monthly_last(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<(NaiveDate, Option<f64>)> {
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };

    let mut buckets: Vec<(NaiveDate, Option<f64>)> = month_starts_through(month_start(first), last)
        .into_iter()
        .map(|m| (m, None))
        .collect();

    let origin = month_start(first);
    for (date, value) in dates.iter().zip(values) {
        if let Some(v) = value {
            let idx = months_between(origin, *date) as usize;
            if let Some(bucket) = buckets.get_mut(idx) {
                bucket.1 = Some(*v);
            }
        }
    }

    buckets
}

//ordinary least squares line through (i, y_i); None for fewer than two points
pub fn linear_fit(y: &[f64]) -> Option<(f64, f64)> {
    let n = y.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (yi - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Some((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_forward_fill_keeps_leading_gap() {
        let filled = forward_fill(&[None, Some(1.0), None, Some(3.0), None]);
        assert_eq!(
            filled,
            vec![None, Some(1.0), Some(1.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_gap_aware_diff_spans_missing_rows() {
        let diff = gap_aware_diff(&[Some(50.0), None, Some(150.0)]);
        assert_eq!(diff, vec![None, None, Some(100.0)]);
    }

    #[test]
    fn test_sum_present_all_missing_is_none() {
        assert_eq!(sum_present(vec![None, None]), None);
        assert_eq!(sum_present(vec![Some(2.0), None, Some(-1.0)]), Some(1.0));
        assert_eq!(sum_present(Vec::new()), None);
    }

    #[test]
    fn test_trailing_mean_uses_available_rows() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(trailing_mean(&values, 12), Some(2.0));
        assert_eq!(trailing_mean(&values, 2), Some(2.5));
        assert_eq!(trailing_mean(&[None], 12), None);
    }

    #[test]
    fn test_first_extreme_prefers_first_occurrence() {
        let values = vec![None, Some(5.0), Some(-2.0), Some(5.0), Some(-2.0)];
        assert_eq!(first_extreme(&values, true), Some((1, 5.0)));
        assert_eq!(first_extreme(&values, false), Some((2, -2.0)));
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(next_month_start(d(2024, 1, 15)), d(2024, 2, 1));
        assert_eq!(next_month_start(d(2024, 1, 1)), d(2024, 1, 1));
        assert_eq!(months_between(d(2024, 11, 30), d(2025, 2, 1)), 3);
        assert_eq!(
            month_starts_through(d(2024, 11, 5), d(2025, 1, 1)),
            vec![d(2024, 12, 1), d(2025, 1, 1)]
        );
    }

    #[test]
    fn test_monthly_last_fills_empty_months_with_missing() {
        let dates = vec![d(2024, 1, 5), d(2024, 1, 20), d(2024, 3, 2)];
        let values = vec![Some(1.0), Some(2.0), Some(4.0)];
        let monthly = monthly_last(&dates, &values);

        assert_eq!(
            monthly,
            vec![
                (d(2024, 1, 1), Some(2.0)),
                (d(2024, 2, 1), None),
                (d(2024, 3, 1), Some(4.0)),
            ]
        );
    }

    #[test]
    fn test_linear_fit() {
        assert_eq!(linear_fit(&[10.0, 20.0, 30.0]), Some((10.0, 10.0)));
        assert_eq!(linear_fit(&[1.0]), None);
    }
}
