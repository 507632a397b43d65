use serde::Serialize;

use super::engine::{Compounder, is_supported_rate, monthly_rate, whole_months};
use super::types::{MAX_SIMULATION_MONTHS, RateScenario};

/// Hard ceiling on bisection iterations, whatever the config asks for.
pub const MAX_SOLVE_ITERATIONS: u32 = 1000;

/// Portfolio needed to fund `monthly_income` forever at the given withdrawal rate.
pub fn goal_value(monthly_income: f64, withdrawal_rate: f64) -> f64 {
    if withdrawal_rate <= 0.0 {
        return f64::INFINITY;
    }
    (monthly_income * 12.0) / (withdrawal_rate / 100.0)
}

/// Closed-form years to reach `goal_value` without costs. `f64::INFINITY` means the goal
/// is unreachable under these dynamics.
pub fn years_to_goal(
    initial_value: f64,
    monthly_contribution: f64,
    goal_value: f64,
    annual_rate: f64,
) -> f64 {
    if initial_value >= goal_value {
        return 0.0;
    }
    if annual_rate <= -100.0 {
        return f64::INFINITY;
    }

    let r = monthly_rate(annual_rate);
    if r == 0.0 {
        if monthly_contribution <= 0.0 {
            return f64::INFINITY;
        }
        return (goal_value - initial_value) / (monthly_contribution * 12.0);
    }

    if monthly_contribution <= 0.0
        && initial_value * (1.0 + r).powi(MAX_SIMULATION_MONTHS as i32) < goal_value
    {
        return f64::INFINITY;
    }

    let numerator = goal_value * r + monthly_contribution;
    let denominator = initial_value * r + monthly_contribution;
    if numerator <= 0.0 || denominator <= 0.0 || numerator < denominator {
        return f64::INFINITY;
    }

    let months = (numerator / denominator).ln() / (1.0 + r).ln();
    if !months.is_finite() || months < 0.0 {
        return f64::INFINITY;
    }
    months / 12.0
}

/// Years to reach `goal_value` by simulating month by month with the scenario's annual
/// costs. Gives up after 100 years, or as soon as the balance is negative with nothing
/// being contributed.
///
/// Resolution is one month: the result is the first month whose balance meets the goal,
/// divided by 12, so it always lines up with a sample of [`project`](super::engine::project).
pub fn years_to_goal_with_costs(
    initial_value: f64,
    monthly_contribution: f64,
    goal_value: f64,
    scenario: &RateScenario,
) -> f64 {
    if initial_value >= goal_value {
        return 0.0;
    }
    if !is_supported_rate(scenario.annual_rate) {
        return f64::INFINITY;
    }

    let compounder = Compounder::new(monthly_contribution, scenario);
    let mut balance = initial_value;
    for month in 1..=MAX_SIMULATION_MONTHS {
        balance = compounder.step(balance, month).0;

        if balance < 0.0 && monthly_contribution <= 0.0 {
            return f64::INFINITY;
        }
        if balance >= goal_value {
            return month as f64 / 12.0;
        }
    }

    tracing::trace!(
        rate = scenario.annual_rate,
        goal_value,
        "goal not reached within simulation cap"
    );
    f64::INFINITY
}

/// Closed-form monthly contribution that reaches `goal_value` after `years`, no costs.
pub fn monthly_contribution(
    initial_value: f64,
    goal_value: f64,
    years: f64,
    annual_rate: f64,
) -> f64 {
    if annual_rate <= -100.0 {
        return f64::INFINITY;
    }
    let months = years * 12.0;
    if months <= 0.0 {
        return if initial_value >= goal_value {
            0.0
        } else {
            f64::INFINITY
        };
    }

    let r = monthly_rate(annual_rate);
    let growth = (1.0 + r).powf(months);
    let future_initial = initial_value * growth;
    if future_initial >= goal_value {
        return 0.0;
    }
    if r == 0.0 {
        return (goal_value - initial_value) / months;
    }

    let annuity_factor = (growth - 1.0) / r;
    if annuity_factor == 0.0 {
        return f64::INFINITY;
    }
    (goal_value - future_initial) / annuity_factor
}

#[derive(Debug, Clone, Copy)]
pub struct ContributionSolveConfig {
    /// Clamped to [`MAX_SOLVE_ITERATIONS`].
    pub max_iterations: u32,
    /// Stop once the bracket is at most this wide. Zero runs every iteration.
    pub tolerance: f64,
}

impl Default for ContributionSolveConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub final_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSolveResult {
    /// Smallest monthly contribution known to reach the goal; infinite when none does.
    pub solved_value: f64,
    pub feasible: bool,
    pub converged: bool,
    pub iterations: Vec<ContributionSolveIteration>,
    pub message: String,
}

impl ContributionSolveResult {
    fn settled(solved_value: f64, message: &str) -> Self {
        Self {
            solved_value,
            feasible: solved_value.is_finite(),
            converged: true,
            iterations: Vec::new(),
            message: message.to_string(),
        }
    }
}

/// Bisects over `[0, goal_value]` for the smallest monthly contribution whose simulated
/// balance after `years` meets the goal, applying the scenario's annual costs.
pub fn solve_required_contribution(
    initial_value: f64,
    goal_value: f64,
    years: f64,
    scenario: &RateScenario,
    config: ContributionSolveConfig,
) -> ContributionSolveResult {
    if !years.is_finite() || years <= 0.0 {
        return if initial_value >= goal_value {
            ContributionSolveResult::settled(0.0, "Goal already met with no time remaining.")
        } else {
            ContributionSolveResult::settled(f64::INFINITY, "No time remaining to reach the goal.")
        };
    }
    if !is_supported_rate(scenario.annual_rate) {
        return ContributionSolveResult::settled(f64::INFINITY, "Growth rate is not supported.");
    }

    let months = whole_months(years);
    let final_balance =
        |contribution: f64| Compounder::new(contribution, scenario).final_balance(initial_value, months);

    if final_balance(0.0) >= goal_value {
        return ContributionSolveResult::settled(0.0, "Goal is met without contributions.");
    }
    let ceiling = final_balance(goal_value);
    if ceiling.is_nan() || ceiling < goal_value {
        return ContributionSolveResult::settled(
            f64::INFINITY,
            "Goal is out of reach even contributing the full goal every month.",
        );
    }

    let mut lo = 0.0;
    let mut hi = goal_value;
    let budget = config.max_iterations.min(MAX_SOLVE_ITERATIONS);
    let mut iterations = Vec::with_capacity(budget as usize);
    let mut converged = false;
    for it in 1..=budget {
        let mid = (lo + hi) * 0.5;
        let balance = final_balance(mid);
        iterations.push(ContributionSolveIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_value: mid,
            final_balance: balance,
        });

        if balance < goal_value {
            lo = mid;
        } else {
            hi = mid;
        }

        if config.tolerance > 0.0 && (hi - lo).abs() <= config.tolerance {
            converged = true;
            break;
        }
    }
    if config.tolerance <= 0.0 {
        converged = true;
    }

    tracing::debug!(
        solved = hi,
        iterations = iterations.len(),
        "solved required monthly contribution"
    );

    ContributionSolveResult {
        solved_value: hi,
        feasible: true,
        converged,
        iterations,
        message: if converged {
            "Solved required contribution.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        },
    }
}

/// Required monthly contribution with annual costs, using the default search budget.
pub fn monthly_contribution_with_costs(
    initial_value: f64,
    goal_value: f64,
    years: f64,
    scenario: &RateScenario,
) -> f64 {
    solve_required_contribution(
        initial_value,
        goal_value,
        years,
        scenario,
        ContributionSolveConfig::default(),
    )
    .solved_value
}
