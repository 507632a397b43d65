use super::types::{MonthlyDataPoint, ProjectionSeries, RateScenario, ScenarioResult};

/// Integer rates shown in the rate matrices.
pub const RATE_LADDER: std::ops::RangeInclusive<u32> = 1..=20;

/// Effective monthly rate equivalent to a nominal annual rate given in percent.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Rates at or below -100% have no positive growth factor.
pub(crate) fn is_supported_rate(annual_rate: f64) -> bool {
    annual_rate.is_finite() && annual_rate > -100.0
}

pub(crate) fn whole_months(years: f64) -> u32 {
    (years * 12.0).floor() as u32
}

/// One month of accumulation. The projection and every solver go through this so that
/// "years to reach the goal" and "value after N years" never disagree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Compounder {
    monthly_rate: f64,
    contribution: f64,
    fixed_cost: f64,
    variable_cost_fraction: f64,
    charges_costs: bool,
}

impl Compounder {
    pub(crate) fn new(monthly_contribution: f64, scenario: &RateScenario) -> Self {
        Self {
            monthly_rate: monthly_rate(scenario.annual_rate),
            contribution: monthly_contribution,
            fixed_cost: scenario.annual_fixed_cost,
            variable_cost_fraction: scenario.annual_variable_cost_percent / 100.0,
            charges_costs: scenario.has_costs(),
        }
    }

    /// Interest, then the contribution, then (every twelfth month) the annual costs.
    /// Returns the new balance and the interest earned.
    pub(crate) fn step(&self, balance: f64, month: u32) -> (f64, f64) {
        let interest = balance * self.monthly_rate;
        let mut next = balance + interest;
        next += self.contribution;
        if self.charges_costs && month % 12 == 0 {
            next = self.charge_annual_costs(next);
        }
        (next, interest)
    }

    fn charge_annual_costs(&self, balance: f64) -> f64 {
        // The variable charge is taken on the year-end balance before the fixed fee.
        let variable_cost = balance * self.variable_cost_fraction;
        balance - self.fixed_cost - variable_cost
    }

    pub(crate) fn final_balance(&self, initial_value: f64, months: u32) -> f64 {
        (1..=months).fold(initial_value, |balance, month| self.step(balance, month).0)
    }
}

pub fn project(
    initial_value: f64,
    monthly_contribution: f64,
    years: f64,
    scenario: &RateScenario,
) -> ProjectionSeries {
    if !is_supported_rate(scenario.annual_rate) || !years.is_finite() || years <= 0.0 {
        return Vec::new();
    }

    let months = whole_months(years);
    let compounder = Compounder::new(monthly_contribution, scenario);

    let mut series = Vec::with_capacity(months as usize + 1);
    series.push(MonthlyDataPoint::seed(initial_value));

    let mut balance = initial_value;
    let mut total_interest = 0.0;
    for month in 1..=months {
        let (next, interest) = compounder.step(balance, month);
        balance = next;
        total_interest += interest;
        series.push(MonthlyDataPoint {
            month,
            interest,
            total_invested: initial_value + monthly_contribution * month as f64,
            total_interest,
            total_accumulated: balance,
        });
    }
    series
}

/// Closed-form value of the initial capital plus an ordinary annuity of monthly
/// contributions. No costs.
pub fn future_value(
    initial_value: f64,
    monthly_contribution: f64,
    years: f64,
    annual_rate: f64,
) -> f64 {
    let months = years * 12.0;
    if annual_rate <= -100.0 {
        return initial_value + monthly_contribution * months;
    }

    let r = monthly_rate(annual_rate);
    if r == 0.0 {
        return initial_value + monthly_contribution * months;
    }

    let growth = (1.0 + r).powf(months);
    initial_value * growth + monthly_contribution * ((growth - 1.0) / r)
}

pub fn evaluate_scenarios<T, F>(scenarios: &[RateScenario], evaluate: F) -> Vec<ScenarioResult<T>>
where
    F: Fn(&RateScenario) -> T,
{
    scenarios
        .iter()
        .map(|scenario| ScenarioResult {
            scenario: *scenario,
            result: evaluate(scenario),
        })
        .collect()
}

pub fn project_scenarios(
    initial_value: f64,
    monthly_contribution: f64,
    years: f64,
    scenarios: &[RateScenario],
) -> Vec<ScenarioResult<ProjectionSeries>> {
    evaluate_scenarios(scenarios, |scenario| {
        project(initial_value, monthly_contribution, years, scenario)
    })
}

pub fn scenarios_for_rates(
    rates: &[f64],
    annual_fixed_cost: f64,
    annual_variable_cost_percent: f64,
) -> Vec<RateScenario> {
    rates
        .iter()
        .map(|&rate| RateScenario::with_costs(rate, annual_fixed_cost, annual_variable_cost_percent))
        .collect()
}

pub fn rate_ladder(annual_fixed_cost: f64, annual_variable_cost_percent: f64) -> Vec<RateScenario> {
    RATE_LADDER
        .map(|rate| {
            RateScenario::with_costs(rate as f64, annual_fixed_cost, annual_variable_cost_percent)
        })
        .collect()
}

pub fn final_value(series: &[MonthlyDataPoint]) -> f64 {
    series.last().map(|p| p.total_accumulated).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn monthly_rate_compounds_back_to_annual_rate() {
        for rate in [1.0, 7.0, 12.5, 20.0] {
            let r = monthly_rate(rate);
            assert_approx_tol((1.0 + r).powi(12), 1.0 + rate / 100.0, 1e-12);
        }
        assert_eq!(monthly_rate(0.0), 0.0);
    }

    #[test]
    fn project_seeds_month_zero_and_has_one_point_per_month() {
        let series = project(10_000.0, 500.0, 2.5, &RateScenario::new(6.0));
        assert_eq!(series.len(), 31);
        assert_eq!(series[0], MonthlyDataPoint::seed(10_000.0));
        for (idx, point) in series.iter().enumerate() {
            assert_eq!(point.month as usize, idx);
        }
    }

    #[test]
    fn project_rejects_degenerate_rate_and_horizon() {
        assert!(project(1_000.0, 100.0, 10.0, &RateScenario::new(-100.0)).is_empty());
        assert!(project(1_000.0, 100.0, 10.0, &RateScenario::new(-150.0)).is_empty());
        assert!(project(1_000.0, 100.0, 0.0, &RateScenario::new(7.0)).is_empty());
        assert!(project(1_000.0, 100.0, -3.0, &RateScenario::new(7.0)).is_empty());
        assert!(project(1_000.0, 100.0, f64::NAN, &RateScenario::new(7.0)).is_empty());
    }

    #[test]
    fn project_short_horizon_returns_only_the_seed() {
        let series = project(1_000.0, 100.0, 0.05, &RateScenario::new(7.0));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].total_accumulated, 1_000.0);
    }

    #[test]
    fn zero_rate_is_exact_linear_accumulation() {
        let series = project(1_000.0, 250.0, 10.0, &RateScenario::new(0.0));
        for point in &series {
            assert_eq!(point.interest, 0.0);
            assert_eq!(
                point.total_accumulated,
                1_000.0 + 250.0 * point.month as f64
            );
        }
        assert_eq!(final_value(&series), 31_000.0);
    }

    #[test]
    fn twenty_years_of_1000_at_7_percent_matches_annuity_formula() {
        let series = project(0.0, 1_000.0, 20.0, &RateScenario::new(7.0));
        let last = final_value(&series);
        let r = monthly_rate(7.0);
        let expected = 1_000.0 * ((1.07_f64).powi(20) - 1.0) / r;

        assert_approx_tol(last, expected, 1e-4);
        assert!((500_000.0..530_000.0).contains(&last), "got {last}");
        assert_approx_tol(future_value(0.0, 1_000.0, 20.0, 7.0), last, 1e-4);
    }

    #[test]
    fn oracle_first_year_with_costs_matches_hand_calculation() {
        // 0% growth, 100/month: 1000 + 1200 = 2200 at month 12,
        // variable 10% of 2200 = 220, fixed 50 -> 1930.
        let scenario = RateScenario::with_costs(0.0, 50.0, 10.0);
        let series = project(1_000.0, 100.0, 1.0, &scenario);
        assert_approx_tol(series[11].total_accumulated, 2_100.0, EPS);
        assert_approx_tol(final_value(&series), 1_930.0, EPS);
        assert_approx_tol(series[12].total_invested, 2_200.0, EPS);
    }

    #[test]
    fn costs_only_apply_on_year_boundaries() {
        let plain = project(5_000.0, 200.0, 3.0, &RateScenario::new(5.0));
        let costly = project(5_000.0, 200.0, 3.0, &RateScenario::with_costs(5.0, 300.0, 1.0));
        for month in 1..12 {
            assert_eq!(plain[month], costly[month]);
        }
        assert!(costly[12].total_accumulated < plain[12].total_accumulated);
    }

    #[test]
    fn balances_may_go_negative_under_heavy_costs() {
        let scenario = RateScenario::with_costs(1.0, 10_000.0, 0.0);
        let series = project(1_000.0, 0.0, 3.0, &scenario);
        assert!(final_value(&series) < 0.0);
    }

    #[test]
    fn project_is_bit_identical_across_calls() {
        let scenario = RateScenario::with_costs(8.3, 120.0, 0.7);
        let a = project(12_345.67, 891.0, 17.0, &scenario);
        let b = project(12_345.67, 891.0, 17.0, &scenario);
        assert_eq!(a, b);
    }

    #[test]
    fn future_value_falls_back_to_principal_for_unsupported_rates() {
        assert_approx_tol(future_value(1_000.0, 100.0, 2.0, -100.0), 3_400.0, EPS);
        assert_approx_tol(future_value(1_000.0, 100.0, 2.0, 0.0), 3_400.0, EPS);
    }

    #[test]
    fn batch_projection_preserves_order_and_matches_single_calls() {
        let scenarios = scenarios_for_rates(&[9.0, 1.0, 5.0], 10.0, 0.5);
        let batch = project_scenarios(2_000.0, 300.0, 5.0, &scenarios);
        assert_eq!(batch.len(), 3);
        for (entry, scenario) in batch.iter().zip(&scenarios) {
            assert_eq!(entry.scenario, *scenario);
            assert_eq!(entry.result, project(2_000.0, 300.0, 5.0, scenario));
        }
    }

    #[test]
    fn rate_ladder_covers_one_to_twenty_percent() {
        let ladder = rate_ladder(0.0, 0.0);
        assert_eq!(ladder.len(), 20);
        assert_eq!(ladder[0].annual_rate, 1.0);
        assert_eq!(ladder[19].annual_rate, 20.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_seed_and_invested_principal_are_exact(
            initial in 0u32..2_000_000,
            contribution in 0u32..20_000,
            months in 1u32..600,
            rate_bp in -5_000i32..3_000,
            fixed in 0u32..5_000,
            variable_bp in 0u32..300
        ) {
            let initial = initial as f64;
            let contribution = contribution as f64;
            let scenario = RateScenario::with_costs(
                rate_bp as f64 / 100.0,
                fixed as f64,
                variable_bp as f64 / 100.0,
            );
            let years = months as f64 / 12.0;
            let series = project(initial, contribution, years, &scenario);

            prop_assert_eq!(series.len() as u32, whole_months(years) + 1);
            prop_assert_eq!(series[0].total_accumulated, initial);
            prop_assert_eq!(series[0].interest, 0.0);
            for point in &series {
                prop_assert_eq!(point.total_invested, initial + contribution * point.month as f64);
            }
        }

        #[test]
        fn prop_no_cost_growth_is_non_decreasing(
            initial in 0u32..1_000_000,
            contribution in 0u32..10_000,
            years in 1u32..50,
            rate_bp in 0i32..2_500
        ) {
            let series = project(
                initial as f64,
                contribution as f64,
                years as f64,
                &RateScenario::new(rate_bp as f64 / 100.0),
            );
            for pair in series.windows(2) {
                prop_assert!(pair[1].total_accumulated >= pair[0].total_accumulated);
            }
        }

        #[test]
        fn prop_interest_sums_to_total_interest(
            initial in 0u32..500_000,
            contribution in 0u32..5_000,
            years in 1u32..40,
            rate_bp in 0i32..2_000
        ) {
            let series = project(
                initial as f64,
                contribution as f64,
                years as f64,
                &RateScenario::new(rate_bp as f64 / 100.0),
            );
            let summed: f64 = series.iter().map(|p| p.interest).sum();
            let last = series[series.len() - 1];
            prop_assert!((summed - last.total_interest).abs() <= 1e-6 * last.total_interest.max(1.0));
            let expected = last.total_invested + last.total_interest;
            prop_assert!((last.total_accumulated - expected).abs() <= 1e-6 * expected.max(1.0));
        }
    }
}
