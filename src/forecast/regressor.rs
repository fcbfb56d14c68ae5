use crate::ledger::series::linear_fit;
use serde::{Deserialize, Serialize};

//how an auxiliary series is carried into the future
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectMethod {
    //repeat the last known value
    #[default]
    Last,
    //extrapolate a least-squares line fitted over position
    Linear,
}

impl ProjectMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "last" | "carry-last" => Some(ProjectMethod::Last),
            "linear" | "linear-fit" => Some(ProjectMethod::Linear),
            _ => None,
        }
    }
}

//numpy-style closeness with rtol 1e-5 and atol 1e-8
fn all_close(values: &[f64], reference: f64) -> bool {
    values
        .iter()
        .all(|v| (v - reference).abs() <= 1e-8 + 1e-5 * reference.abs())
}

//projects a gappy series `periods` steps ahead; an empty series projects zeros
pub fn project_regressor_series(
    series: &[Option<f64>],
    periods: usize,
    method: ProjectMethod,
) -> Vec<f64> {
    let known: Vec<f64> = series.iter().flatten().copied().collect();

    let Some(&last) = known.last() else {
        return vec![0.0; periods];
    };

    if method == ProjectMethod::Last || all_close(&known, known[0]) {
        return vec![last; periods];
    }

    match linear_fit(&known) {
        Some((slope, intercept)) => (known.len()..known.len() + periods)
            .map(|x| slope * x as f64 + intercept)
            .collect(),
        None => vec![last; periods],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_carry_last() {
        let out = project_regressor_series(&some(&[10.0, 20.0, 30.0]), 2, ProjectMethod::Last);
        assert_eq!(out, vec![30.0, 30.0]);
    }

    #[test]
    fn test_linear_fit_extrapolates() {
        let out = project_regressor_series(&some(&[10.0, 20.0, 30.0]), 2, ProjectMethod::Linear);
        assert_eq!(out, vec![40.0, 50.0]);
    }

    #[test]
    fn test_linear_drops_missing_before_fitting() {
        let series = vec![Some(10.0), None, Some(20.0), None, Some(30.0)];
        let out = project_regressor_series(&series, 1, ProjectMethod::Linear);
        assert_eq!(out, vec![40.0]);
    }

    #[test]
    fn test_all_missing_projects_zeros() {
        assert_eq!(
            project_regressor_series(&[None, None], 3, ProjectMethod::Linear),
            vec![0.0; 3]
        );
        assert_eq!(
            project_regressor_series(&[], 2, ProjectMethod::Last),
            vec![0.0; 2]
        );
    }

    #[test]
    fn test_constant_series_skips_fit() {
        let out = project_regressor_series(&some(&[5.0, 5.0, 5.000001]), 2, ProjectMethod::Linear);
        assert_eq!(out, vec![5.000001, 5.000001]);
    }

    #[test]
    fn test_zero_horizon() {
        assert!(project_regressor_series(&some(&[1.0, 2.0]), 0, ProjectMethod::Linear).is_empty());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(ProjectMethod::parse("LINEAR"), Some(ProjectMethod::Linear));
        assert_eq!(
            ProjectMethod::parse("carry-last"),
            Some(ProjectMethod::Last)
        );
        assert_eq!(ProjectMethod::parse("spline"), None);
    }
}
