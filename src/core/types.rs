use serde::Serialize;

use crate::error::InputError;

/// Withdrawal rate, in percent, used to size the primary retirement goal.
pub const SAFE_WITHDRAWAL_RATE: f64 = 4.0;

/// Rate the verdict and the contribution-effort table are measured against.
pub const BENCHMARK_RATE: f64 = 7.0;

/// Simulation cap for cost-aware goal searches (100 years).
pub const MAX_SIMULATION_MONTHS: u32 = 1200;

/// Longest accumulation window accepted from user input, matching the simulation cap.
pub const MAX_HORIZON_YEARS: u32 = MAX_SIMULATION_MONTHS / 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDataPoint {
    pub month: u32,
    pub interest: f64,
    pub total_invested: f64,
    pub total_interest: f64,
    pub total_accumulated: f64,
}

impl MonthlyDataPoint {
    pub fn seed(initial_value: f64) -> Self {
        Self {
            month: 0,
            interest: 0.0,
            total_invested: initial_value,
            total_interest: 0.0,
            total_accumulated: initial_value,
        }
    }

    pub fn year(&self) -> f64 {
        self.month as f64 / 12.0
    }
}

/// Month-by-month accumulation, month 0 first.
pub type ProjectionSeries = Vec<MonthlyDataPoint>;

/// One growth assumption: a nominal annual rate plus the yearly costs charged against
/// the balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateScenario {
    pub annual_rate: f64,
    pub annual_fixed_cost: f64,
    pub annual_variable_cost_percent: f64,
}

impl RateScenario {
    pub fn new(annual_rate: f64) -> Self {
        Self {
            annual_rate,
            annual_fixed_cost: 0.0,
            annual_variable_cost_percent: 0.0,
        }
    }

    pub fn with_costs(
        annual_rate: f64,
        annual_fixed_cost: f64,
        annual_variable_cost_percent: f64,
    ) -> Self {
        Self {
            annual_rate,
            annual_fixed_cost,
            annual_variable_cost_percent,
        }
    }

    pub fn has_costs(&self) -> bool {
        self.annual_fixed_cost != 0.0 || self.annual_variable_cost_percent != 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult<T> {
    pub scenario: RateScenario,
    pub result: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub initial_value: f64,
    pub monthly_contribution: f64,
    pub monthly_retirement_income: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    pub selected_rate: f64,
    pub annual_fixed_cost: f64,
    pub annual_variable_cost_percent: f64,
    pub family_income: Option<f64>,
}

impl PlanInputs {
    pub fn horizon_years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn scenario_at(&self, annual_rate: f64) -> RateScenario {
        RateScenario::with_costs(
            annual_rate,
            self.annual_fixed_cost,
            self.annual_variable_cost_percent,
        )
    }

    /// Checks the answers the core cannot turn into a sensible plan.
    pub fn validate(&self) -> Result<(), InputError> {
        let amounts = [
            ("initial-value", self.initial_value),
            ("monthly-contribution", self.monthly_contribution),
            ("monthly-income", self.monthly_retirement_income),
            ("rate", self.selected_rate),
            ("annual-fixed-cost", self.annual_fixed_cost),
            ("annual-variable-cost", self.annual_variable_cost_percent),
        ];
        for (flag, value) in amounts {
            if !value.is_finite() {
                return Err(InputError::NotFinite { flag });
            }
        }

        if self.initial_value < 0.0 {
            return Err(InputError::Negative {
                flag: "initial-value",
            });
        }
        if self.monthly_contribution < 0.0 {
            return Err(InputError::Negative {
                flag: "monthly-contribution",
            });
        }
        if self.monthly_retirement_income <= 0.0 {
            return Err(InputError::NotPositive {
                flag: "monthly-income",
            });
        }
        if self.retirement_age < self.current_age {
            return Err(InputError::RetirementBeforeCurrentAge);
        }
        if self.horizon_years() > MAX_HORIZON_YEARS {
            return Err(InputError::OutOfRange {
                flag: "retirement-age",
                min: self.current_age as f64,
                max: self.current_age as f64 + MAX_HORIZON_YEARS as f64,
            });
        }
        if self.selected_rate <= -100.0 {
            return Err(InputError::UnsupportedRate);
        }
        if self.annual_fixed_cost < 0.0 {
            return Err(InputError::Negative {
                flag: "annual-fixed-cost",
            });
        }
        if !(0.0..=100.0).contains(&self.annual_variable_cost_percent) {
            return Err(InputError::OutOfRange {
                flag: "annual-variable-cost",
                min: 0.0,
                max: 100.0,
            });
        }
        if self
            .family_income
            .is_some_and(|income| !income.is_finite() || income < 0.0)
        {
            return Err(InputError::Negative {
                flag: "family-income",
            });
        }
        Ok(())
    }
}
