use std::fmt;

use serde::Serialize;

use super::chart::{ChartDimensions, ChartLayout, DeviationSeries};
use super::engine::{
    evaluate_scenarios, final_value, future_value, project, rate_ladder, scenarios_for_rates,
};
use super::format::{format_currency, format_rate, format_years};
use super::solver::{goal_value, monthly_contribution_with_costs, years_to_goal_with_costs};
use super::types::{BENCHMARK_RATE, PlanInputs, ProjectionSeries, SAFE_WITHDRAWAL_RATE};

/// Withdrawal rates compared against the primary 4% goal.
pub const WITHDRAWAL_COMPARISON_RATES: [f64; 7] = [2.7, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5];

/// Rates drawn around the primary projection to show sensitivity.
pub const DEVIATION_RATES: [f64; 4] = [5.0, 6.0, 8.0, 9.0];

/// Shares of monthly family income tried as contributions.
pub const EFFORT_PERCENTAGES: [u32; 7] = [10, 20, 30, 40, 50, 75, 99];

/// Horizon used for the projection chart when no accumulation window is set.
pub const DEFAULT_CHART_YEARS: u32 = 20;

const HIGH_NET_WORTH_EXCHANGE_RATE: f64 = 5.5;
const HIGH_NET_WORTH_THRESHOLD: f64 = 400_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskProfile {
    UltraConservative,
    Recommended,
    Aggressive,
}

impl RiskProfile {
    pub fn for_withdrawal_rate(rate: f64) -> Self {
        if rate <= 3.0 {
            RiskProfile::UltraConservative
        } else if rate == SAFE_WITHDRAWAL_RATE {
            RiskProfile::Recommended
        } else {
            RiskProfile::Aggressive
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

impl Likelihood {
    /// How plausible a sustained real annual return is.
    pub fn for_rate(rate: f64) -> Self {
        if (5.0..=7.0).contains(&rate) {
            Likelihood::High
        } else if [3.0, 4.0, 8.0, 9.0].contains(&rate) {
            Likelihood::Medium
        } else {
            Likelihood::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Likelihood::High => "high",
            Likelihood::Medium => "medium",
            Likelihood::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalGoalRow {
    pub withdrawal_rate: f64,
    pub goal_value: f64,
    pub profile: RiskProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityRow {
    pub rate: f64,
    pub likelihood: Likelihood,
    pub final_value: f64,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOutcome {
    pub rate: f64,
    pub years_to_goal: f64,
    pub final_value_at_plan_end: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub benchmark_rate: f64,
    pub years_needed: f64,
    pub is_possible: bool,
    pub extra_years_needed: f64,
    pub final_value_at_plan_end: f64,
    pub possible_monthly_income: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffortRow {
    pub percent_of_income: u32,
    pub monthly_amount: f64,
    pub years_needed: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub initial_value: f64,
    pub monthly_contribution: f64,
    pub monthly_retirement_income: f64,
    pub horizon_years: u32,
    pub selected_rate: f64,
    pub goal_value: f64,
    pub withdrawal_goals: Vec<WithdrawalGoalRow>,
    pub profitability: Vec<ProfitabilityRow>,
    pub outcomes: Vec<RateOutcome>,
    pub verdict: Verdict,
    pub contribution_effort: Vec<EffortRow>,
    pub required_monthly_contribution: f64,
    pub projection: ProjectionSeries,
    pub deviations: Vec<DeviationSeries>,
    pub chart: ChartLayout,
    pub high_net_worth: bool,
}

pub fn monthly_income_from(balance: f64) -> f64 {
    balance * (SAFE_WITHDRAWAL_RATE / 100.0) / 12.0
}

pub fn build_report(inputs: &PlanInputs) -> PlanReport {
    let horizon = inputs.horizon_years() as f64;
    let goal = goal_value(inputs.monthly_retirement_income, SAFE_WITHDRAWAL_RATE);
    let chart_years = if inputs.horizon_years() > 0 {
        horizon
    } else {
        DEFAULT_CHART_YEARS as f64
    };

    let withdrawal_goals = WITHDRAWAL_COMPARISON_RATES
        .iter()
        .map(|&rate| WithdrawalGoalRow {
            withdrawal_rate: rate,
            goal_value: goal_value(inputs.monthly_retirement_income, rate),
            profile: RiskProfile::for_withdrawal_rate(rate),
        })
        .collect();

    let no_cost_ladder = rate_ladder(0.0, 0.0);
    let profitability = evaluate_scenarios(&no_cost_ladder, |scenario| {
        future_value(
            inputs.initial_value,
            inputs.monthly_contribution,
            horizon,
            scenario.annual_rate,
        )
    })
    .into_iter()
    .map(|entry| ProfitabilityRow {
        rate: entry.scenario.annual_rate,
        likelihood: Likelihood::for_rate(entry.scenario.annual_rate),
        final_value: entry.result,
        monthly_income: monthly_income_from(entry.result),
    })
    .collect();

    let ladder = rate_ladder(inputs.annual_fixed_cost, inputs.annual_variable_cost_percent);
    let outcomes: Vec<RateOutcome> = evaluate_scenarios(&ladder, |scenario| {
        let years = years_to_goal_with_costs(
            inputs.initial_value,
            inputs.monthly_contribution,
            goal,
            scenario,
        );
        let at_plan_end = project(
            inputs.initial_value,
            inputs.monthly_contribution,
            horizon,
            scenario,
        );
        (years, final_value(&at_plan_end))
    })
    .into_iter()
    .map(|entry| RateOutcome {
        rate: entry.scenario.annual_rate,
        years_to_goal: entry.result.0,
        final_value_at_plan_end: entry.result.1,
    })
    .collect();

    let verdict = build_verdict(&outcomes, horizon);

    let benchmark = inputs.scenario_at(BENCHMARK_RATE);
    let contribution_effort = match inputs.family_income {
        Some(income) if income > 0.0 => EFFORT_PERCENTAGES
            .iter()
            .map(|&percent| {
                let monthly_amount = income * (percent as f64 / 100.0);
                EffortRow {
                    percent_of_income: percent,
                    monthly_amount,
                    years_needed: years_to_goal_with_costs(
                        inputs.initial_value,
                        monthly_amount,
                        goal,
                        &benchmark,
                    ),
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let selected = inputs.scenario_at(inputs.selected_rate);
    let required_monthly_contribution =
        monthly_contribution_with_costs(inputs.initial_value, goal, horizon, &selected);

    let projection = project(
        inputs.initial_value,
        inputs.monthly_contribution,
        chart_years,
        &selected,
    );
    let deviation_scenarios = scenarios_for_rates(
        &DEVIATION_RATES,
        inputs.annual_fixed_cost,
        inputs.annual_variable_cost_percent,
    );
    let deviations: Vec<DeviationSeries> = evaluate_scenarios(&deviation_scenarios, |scenario| {
        project(
            inputs.initial_value,
            inputs.monthly_contribution,
            chart_years,
            scenario,
        )
    })
    .into_iter()
    .map(|entry| DeviationSeries {
        label: format_rate(entry.scenario.annual_rate),
        series: entry.result,
    })
    .collect();
    let chart = ChartLayout::build(
        &projection,
        Some(goal),
        &deviations,
        ChartDimensions::default(),
    );

    tracing::debug!(
        goal_value = goal,
        horizon_years = inputs.horizon_years(),
        years_needed = verdict.years_needed,
        "built plan report"
    );

    PlanReport {
        initial_value: inputs.initial_value,
        monthly_contribution: inputs.monthly_contribution,
        monthly_retirement_income: inputs.monthly_retirement_income,
        horizon_years: inputs.horizon_years(),
        selected_rate: inputs.selected_rate,
        goal_value: goal,
        withdrawal_goals,
        profitability,
        outcomes,
        verdict,
        contribution_effort,
        required_monthly_contribution,
        projection,
        deviations,
        chart,
        high_net_worth: inputs.initial_value / HIGH_NET_WORTH_EXCHANGE_RATE
            >= HIGH_NET_WORTH_THRESHOLD,
    }
}

fn build_verdict(outcomes: &[RateOutcome], horizon: f64) -> Verdict {
    let benchmark = outcomes.iter().find(|o| o.rate == BENCHMARK_RATE);
    let years_needed = benchmark
        .map(|o| o.years_to_goal)
        .unwrap_or(f64::INFINITY);
    let final_value_at_plan_end = benchmark
        .map(|o| o.final_value_at_plan_end)
        .unwrap_or(0.0);

    Verdict {
        benchmark_rate: BENCHMARK_RATE,
        years_needed,
        is_possible: years_needed <= horizon,
        extra_years_needed: (years_needed - horizon).max(0.0),
        final_value_at_plan_end,
        possible_monthly_income: monthly_income_from(final_value_at_plan_end),
    }
}

/// Plain-text rendering of the report, suitable for printing.
pub fn render_summary(report: &PlanReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, report)?;
    Ok(out)
}

fn write_summary<W: fmt::Write>(out: &mut W, report: &PlanReport) -> fmt::Result {
    let verdict = &report.verdict;

    writeln!(out, "RETIREMENT PLAN SUMMARY")?;
    writeln!(out)?;
    writeln!(
        out,
        "Target monthly income:   {}",
        format_currency(report.monthly_retirement_income)
    )?;
    writeln!(
        out,
        "Goal ({} rule):          {}",
        format_rate(SAFE_WITHDRAWAL_RATE),
        format_currency(report.goal_value)
    )?;
    writeln!(
        out,
        "Initial capital:         {}",
        format_currency(report.initial_value)
    )?;
    writeln!(
        out,
        "Monthly contribution:    {}",
        format_currency(report.monthly_contribution)
    )?;
    writeln!(out, "Accumulation window:     {} years", report.horizon_years)?;
    writeln!(out)?;

    let status = if verdict.is_possible {
        "on track"
    } else {
        "gap to close"
    };
    writeln!(
        out,
        "Verdict at {}: {status}",
        format_rate(verdict.benchmark_rate)
    )?;
    writeln!(
        out,
        "  Years to goal:         {}",
        format_years(verdict.years_needed)
    )?;
    if !verdict.is_possible {
        writeln!(
            out,
            "  Extra years needed:    +{}",
            format_years(verdict.extra_years_needed)
        )?;
        writeln!(
            out,
            "  Income at plan end:    {}",
            format_currency(verdict.possible_monthly_income)
        )?;
    }
    writeln!(
        out,
        "  Required contribution at {}: {}",
        format_rate(report.selected_rate),
        format_currency(report.required_monthly_contribution)
    )?;
    writeln!(out)?;

    writeln!(out, "Withdrawal rate   Goal")?;
    for row in &report.withdrawal_goals {
        writeln!(
            out,
            "  {:<15} {}",
            format_rate(row.withdrawal_rate),
            format_currency(row.goal_value)
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Rate   Likelihood   Value at plan end     Income (4%)        Years to goal"
    )?;
    for (row, outcome) in report.profitability.iter().zip(&report.outcomes) {
        writeln!(
            out,
            "  {:<5}{:<13}{:<22}{:<19}{}",
            format_rate(row.rate),
            row.likelihood.label(),
            format_currency(row.final_value),
            format_currency(row.monthly_income),
            format_years(outcome.years_to_goal)
        )?;
    }

    if !report.contribution_effort.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Share of family income   Contribution        Years to goal"
        )?;
        for row in &report.contribution_effort {
            writeln!(
                out,
                "  {:<23}{:<20}{}",
                format!("{}%", row.percent_of_income),
                format_currency(row.monthly_amount),
                format_years(row.years_needed)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> PlanInputs {
        PlanInputs {
            initial_value: 50_000.0,
            monthly_contribution: 3_000.0,
            monthly_retirement_income: 5_000.0,
            current_age: 35,
            retirement_age: 60,
            selected_rate: 7.0,
            annual_fixed_cost: 0.0,
            annual_variable_cost_percent: 0.0,
            family_income: Some(15_000.0),
        }
    }

    #[test]
    fn goal_uses_four_percent_rule() {
        let report = build_report(&sample_inputs());
        assert_close(report.goal_value, 1_500_000.0, 1e-6);
        assert_eq!(report.horizon_years, 25);
        assert_eq!(report.withdrawal_goals.len(), 7);
        let primary = &report.withdrawal_goals[3];
        assert_eq!(primary.profile, RiskProfile::Recommended);
        assert_close(primary.goal_value, report.goal_value, 1e-6);
        assert_eq!(report.withdrawal_goals[0].profile, RiskProfile::UltraConservative);
        assert_eq!(report.withdrawal_goals[6].profile, RiskProfile::Aggressive);
    }

    #[test]
    fn rate_matrices_cover_the_ladder() {
        let report = build_report(&sample_inputs());
        assert_eq!(report.profitability.len(), 20);
        assert_eq!(report.outcomes.len(), 20);
        for pair in report.outcomes.windows(2) {
            assert!(pair[1].years_to_goal <= pair[0].years_to_goal);
            assert!(pair[1].final_value_at_plan_end >= pair[0].final_value_at_plan_end);
        }
        for (row, outcome) in report.profitability.iter().zip(&report.outcomes) {
            assert_close(
                row.final_value,
                outcome.final_value_at_plan_end,
                1e-6 * row.final_value,
            );
        }
        assert_eq!(report.profitability[6].likelihood, Likelihood::High);
        assert_eq!(report.profitability[2].likelihood, Likelihood::Medium);
        assert_eq!(report.profitability[19].likelihood, Likelihood::Low);
    }

    #[test]
    fn verdict_reflects_the_benchmark_rate() {
        let report = build_report(&sample_inputs());
        let seven = &report.outcomes[6];
        assert_eq!(seven.rate, 7.0);
        assert_eq!(report.verdict.years_needed, seven.years_to_goal);
        assert!(report.verdict.is_possible);
        assert_eq!(report.verdict.extra_years_needed, 0.0);
        assert_close(
            report.verdict.possible_monthly_income,
            seven.final_value_at_plan_end * 0.04 / 12.0,
            1e-6,
        );
    }

    #[test]
    fn short_window_reports_the_gap() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = 45;
        let report = build_report(&inputs);
        assert!(!report.verdict.is_possible);
        assert_close(
            report.verdict.extra_years_needed,
            report.verdict.years_needed - 10.0,
            1e-9,
        );
        assert!(report.required_monthly_contribution > inputs.monthly_contribution);
    }

    #[test]
    fn effort_table_needs_family_income() {
        let report = build_report(&sample_inputs());
        assert_eq!(report.contribution_effort.len(), 7);
        assert_close(report.contribution_effort[0].monthly_amount, 1_500.0, 1e-9);
        for pair in report.contribution_effort.windows(2) {
            assert!(pair[1].years_needed <= pair[0].years_needed);
        }

        let mut inputs = sample_inputs();
        inputs.family_income = None;
        assert!(build_report(&inputs).contribution_effort.is_empty());
    }

    #[test]
    fn zero_window_charts_twenty_years() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = inputs.current_age;
        let report = build_report(&inputs);
        assert_eq!(report.horizon_years, 0);
        assert_eq!(report.projection.len(), 241);
        assert_eq!(report.chart.points.len(), 21);
        assert!(report.required_monthly_contribution.is_infinite());
        assert!(report.outcomes.iter().all(|o| o.final_value_at_plan_end == 0.0));
    }

    #[test]
    fn chart_carries_four_deviation_lines() {
        let report = build_report(&sample_inputs());
        let labels: Vec<&str> = report.deviations.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["5%", "6%", "8%", "9%"]);
        assert_eq!(report.chart.deviations.len(), 4);
        assert!(report.chart.goal_marker.is_some());
    }

    #[test]
    fn high_net_worth_threshold() {
        let mut inputs = sample_inputs();
        assert!(!build_report(&inputs).high_net_worth);
        inputs.initial_value = 2_200_000.0;
        assert!(build_report(&inputs).high_net_worth);
    }

    #[test]
    fn summary_mentions_goal_and_verdict() {
        let report = build_report(&sample_inputs());
        let text = render_summary(&report).expect("summary renders");
        assert!(text.contains("R$ 1.500.000,00"));
        assert!(text.contains("on track"));
        assert!(text.contains("Share of family income"));
        assert_eq!(text.lines().filter(|l| l.starts_with("  20%")).count(), 2);
    }

    struct RejectingSink;

    impl fmt::Write for RejectingSink {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn summary_write_failures_propagate() {
        let report = build_report(&sample_inputs());
        assert_eq!(write_summary(&mut RejectingSink, &report), Err(fmt::Error));
    }

    #[test]
    fn report_serializes_with_camel_case_and_null_for_unreachable() {
        let mut inputs = sample_inputs();
        inputs.monthly_contribution = 0.0;
        inputs.initial_value = 0.0;
        let report = build_report(&inputs);
        let json = serde_json::to_value(&report).expect("serializes");
        assert!(json.get("goalValue").is_some());
        assert!(json.get("contributionEffort").is_some());
        assert!(json["verdict"]["yearsNeeded"].is_null());
        assert_eq!(json["withdrawalGoals"][0]["profile"], "ultra-conservative");
    }
}
