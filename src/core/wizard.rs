//! Six-step planning questionnaire.
//!
//! The wizard only tracks which step is showing and whether the answers collected so far
//! allow moving on. All numbers come from [`crate::core::report::build_report`] once the
//! form converts into [`PlanInputs`].

use std::fmt;

use super::types::{BENCHMARK_RATE, PlanInputs};
use crate::error::WizardError;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WizardStep {
    #[default]
    Profile,
    Goal,
    Contribution,
    RateMatrix,
    Verdict,
    Report,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Profile,
        WizardStep::Goal,
        WizardStep::Contribution,
        WizardStep::RateMatrix,
        WizardStep::Verdict,
        WizardStep::Report,
    ];

    /// One-based position, as shown in the progress indicator.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Profile => 1,
            WizardStep::Goal => 2,
            WizardStep::Contribution => 3,
            WizardStep::RateMatrix => 4,
            WizardStep::Verdict => 5,
            WizardStep::Report => 6,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            WizardStep::Profile => Some(WizardStep::Goal),
            WizardStep::Goal => Some(WizardStep::Contribution),
            WizardStep::Contribution => Some(WizardStep::RateMatrix),
            WizardStep::RateMatrix => Some(WizardStep::Verdict),
            WizardStep::Verdict => Some(WizardStep::Report),
            WizardStep::Report => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Goal => Some(WizardStep::Profile),
            WizardStep::Contribution => Some(WizardStep::Goal),
            WizardStep::RateMatrix => Some(WizardStep::Contribution),
            WizardStep::Verdict => Some(WizardStep::RateMatrix),
            WizardStep::Profile | WizardStep::Report => None,
        }
    }

    pub fn can_print(self) -> bool {
        self == WizardStep::Report
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Profile => "profile",
            WizardStep::Goal => "goal",
            WizardStep::Contribution => "contribution",
            WizardStep::RateMatrix => "rate matrix",
            WizardStep::Verdict => "verdict",
            WizardStep::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WizardEvent {
    Next,
    Back,
    Restart,
}

impl fmt::Display for WizardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardEvent::Next => "next",
            WizardEvent::Back => "back",
            WizardEvent::Restart => "restart",
        };
        f.write_str(name)
    }
}

/// Answers collected so far. Anything the user has not typed yet is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardForm {
    pub initial_value: Option<f64>,
    pub monthly_contribution: Option<f64>,
    pub monthly_retirement_income: Option<f64>,
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
    pub selected_rate: Option<f64>,
    pub annual_fixed_cost: Option<f64>,
    pub annual_variable_cost_percent: Option<f64>,
    pub family_income: Option<f64>,
}

impl WizardForm {
    /// Required answers still missing before `step` can be left with `Next`.
    pub fn missing_for(&self, step: WizardStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match step {
            WizardStep::Profile => {
                if !is_answered(self.monthly_retirement_income) {
                    missing.push("monthlyRetirementIncome");
                }
                if self.current_age.is_none() {
                    missing.push("currentAge");
                }
                if self.retirement_age.is_none() {
                    missing.push("retirementAge");
                }
            }
            WizardStep::Contribution => {
                if !is_answered(self.monthly_contribution) {
                    missing.push("monthlyContribution");
                }
                if !is_answered(self.family_income) {
                    missing.push("familyIncome");
                }
            }
            _ => {}
        }
        missing
    }

    pub fn to_inputs(&self) -> Result<PlanInputs, WizardError> {
        let missing: Vec<&'static str> = [WizardStep::Profile, WizardStep::Contribution]
            .into_iter()
            .flat_map(|step| self.missing_for(step))
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::Incomplete {
                step: WizardStep::Report,
                fields: missing,
            });
        }

        let inputs = PlanInputs {
            initial_value: self.initial_value.unwrap_or(0.0),
            monthly_contribution: self.monthly_contribution.unwrap_or(0.0),
            monthly_retirement_income: self.monthly_retirement_income.unwrap_or(0.0),
            current_age: self.current_age.unwrap_or(0),
            retirement_age: self.retirement_age.unwrap_or(0),
            selected_rate: self.selected_rate.unwrap_or(BENCHMARK_RATE),
            annual_fixed_cost: self.annual_fixed_cost.unwrap_or(0.0),
            annual_variable_cost_percent: self.annual_variable_cost_percent.unwrap_or(0.0),
            family_income: self.family_income,
        };
        inputs.validate()?;
        Ok(inputs)
    }
}

// An amount field counts as answered once it holds a positive number.
fn is_answered(value: Option<f64>) -> bool {
    value.is_some_and(|v| v.is_finite() && v > 0.0)
}

pub fn transition(
    step: WizardStep,
    event: WizardEvent,
    form: &WizardForm,
) -> Result<WizardStep, WizardError> {
    let target = match event {
        WizardEvent::Restart => Some(WizardStep::Profile),
        WizardEvent::Back => step.previous(),
        WizardEvent::Next => {
            let missing = form.missing_for(step);
            if !missing.is_empty() {
                return Err(WizardError::Incomplete {
                    step,
                    fields: missing,
                });
            }
            step.next()
        }
    };

    let target = target.ok_or(WizardError::InvalidTransition { step, event })?;
    tracing::debug!(from = %step, to = %target, %event, "wizard transition");
    Ok(target)
}
