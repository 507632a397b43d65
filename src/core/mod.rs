pub mod chart;
mod engine;
pub mod format;
pub mod report;
mod solver;
mod types;
pub mod wizard;

pub use chart::{ChartDimensions, ChartLayout, DeviationSeries, svg_path};
pub use engine::{
    RATE_LADDER, evaluate_scenarios, final_value, future_value, monthly_rate, project,
    project_scenarios, rate_ladder, scenarios_for_rates,
};
pub use format::{format_axis_value, format_currency, format_rate, format_years};
pub use report::{PlanReport, build_report, render_summary};
pub use solver::{
    ContributionSolveConfig, ContributionSolveIteration, ContributionSolveResult,
    MAX_SOLVE_ITERATIONS, goal_value, monthly_contribution, monthly_contribution_with_costs,
    solve_required_contribution, years_to_goal, years_to_goal_with_costs,
};
pub use types::{
    BENCHMARK_RATE, MAX_HORIZON_YEARS, MAX_SIMULATION_MONTHS, MonthlyDataPoint, PlanInputs,
    ProjectionSeries, RateScenario, SAFE_WITHDRAWAL_RATE, ScenarioResult,
};
pub use wizard::{WizardEvent, WizardForm, WizardStep, transition};
