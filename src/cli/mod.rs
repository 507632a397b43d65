use std::io::{BufRead, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::core::{
    BENCHMARK_RATE, ContributionSolveConfig, ContributionSolveResult, MAX_HORIZON_YEARS,
    MAX_SOLVE_ITERATIONS, MonthlyDataPoint, PlanInputs, RateScenario, build_report,
    final_value, format_currency, format_rate, format_years, project, render_summary,
    solve_required_contribution,
};
use crate::error::{CliError, InputError};

mod interactive;

pub use interactive::run_wizard;

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    version,
    about = "Retirement accumulation planner: compound growth, time to goal and required contribution"
)]
pub struct Cli {
    /// Log calculation details to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the full plan report
    Plan(PlanArgs),
    /// Print the month-by-month accumulation series
    Project(ProjectArgs),
    /// Solve for the monthly contribution that reaches a goal in time
    Solve(SolveArgs),
    /// Answer the planning questionnaire step by step on stdin
    Wizard,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct CostArgs {
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Fixed amount deducted from the balance every 12 months"
    )]
    pub annual_fixed_cost: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Percent of the balance deducted every 12 months"
    )]
    pub annual_variable_cost: f64,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, default_value_t = 0.0, help = "Capital already invested")]
    pub initial_value: f64,
    #[arg(long, default_value_t = 0.0)]
    pub monthly_contribution: f64,
    #[arg(long, help = "Desired monthly income in retirement")]
    pub monthly_income: f64,
    #[arg(long)]
    pub current_age: u32,
    #[arg(long)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = BENCHMARK_RATE, help = "Expected annual return in percent")]
    pub rate: f64,
    #[command(flatten)]
    pub costs: CostArgs,
    #[arg(long, help = "Monthly family income, enables the contribution-effort table")]
    pub family_income: Option<f64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 0.0)]
    pub initial_value: f64,
    #[arg(long, default_value_t = 0.0)]
    pub monthly_contribution: f64,
    #[arg(
        long,
        help = "Projection length in years, at most 100; fractions are cut to whole months"
    )]
    pub years: f64,
    #[arg(long, default_value_t = BENCHMARK_RATE)]
    pub rate: f64,
    #[command(flatten)]
    pub costs: CostArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[arg(long, default_value_t = 0.0)]
    pub initial_value: f64,
    #[arg(long, help = "Balance to reach")]
    pub goal: f64,
    #[arg(long)]
    pub years: f64,
    #[arg(long, default_value_t = BENCHMARK_RATE)]
    pub rate: f64,
    #[command(flatten)]
    pub costs: CostArgs,
    #[arg(long, default_value_t = 100, help = "Bisection iteration budget, at most 1000")]
    pub max_iterations: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Stop once the search bracket is this narrow; 0 uses the full budget"
    )]
    pub tolerance: f64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionOutput<'a> {
    scenario: RateScenario,
    years: f64,
    final_value: f64,
    series: &'a [MonthlyDataPoint],
}

pub fn run<R: BufRead, W: Write>(cli: Cli, input: &mut R, out: &mut W) -> Result<(), CliError> {
    match cli.command {
        Command::Plan(args) => run_plan(&args, out),
        Command::Project(args) => run_project(&args, out),
        Command::Solve(args) => run_solve(&args, out),
        Command::Wizard => run_wizard(input, out),
    }
}

pub fn build_inputs(args: &PlanArgs) -> Result<PlanInputs, InputError> {
    let inputs = PlanInputs {
        initial_value: args.initial_value,
        monthly_contribution: args.monthly_contribution,
        monthly_retirement_income: args.monthly_income,
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        selected_rate: args.rate,
        annual_fixed_cost: args.costs.annual_fixed_cost,
        annual_variable_cost_percent: args.costs.annual_variable_cost,
        family_income: args.family_income,
    };
    inputs.validate()?;
    Ok(inputs)
}

fn build_scenario(rate: f64, costs: CostArgs) -> Result<RateScenario, InputError> {
    if !rate.is_finite() {
        return Err(InputError::NotFinite { flag: "rate" });
    }
    if rate <= -100.0 {
        return Err(InputError::UnsupportedRate);
    }
    if !costs.annual_fixed_cost.is_finite() || costs.annual_fixed_cost < 0.0 {
        return Err(InputError::Negative {
            flag: "annual-fixed-cost",
        });
    }
    if !(0.0..=100.0).contains(&costs.annual_variable_cost) {
        return Err(InputError::OutOfRange {
            flag: "annual-variable-cost",
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(RateScenario::with_costs(
        rate,
        costs.annual_fixed_cost,
        costs.annual_variable_cost,
    ))
}

fn check_non_negative(flag: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { flag });
    }
    if value < 0.0 {
        return Err(InputError::Negative { flag });
    }
    Ok(())
}

fn check_positive(flag: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { flag });
    }
    if value <= 0.0 {
        return Err(InputError::NotPositive { flag });
    }
    Ok(())
}

fn check_years(value: f64) -> Result<(), InputError> {
    check_positive("years", value)?;
    if value > MAX_HORIZON_YEARS as f64 {
        return Err(InputError::OutOfRange {
            flag: "years",
            min: 0.0,
            max: MAX_HORIZON_YEARS as f64,
        });
    }
    Ok(())
}

fn run_plan<W: Write>(args: &PlanArgs, out: &mut W) -> Result<(), CliError> {
    let inputs = build_inputs(args)?;
    let report = build_report(&inputs);
    tracing::info!(
        horizon_years = report.horizon_years,
        goal_value = report.goal_value,
        "plan report ready"
    );

    match args.format {
        OutputFormat::Text => write!(out, "{}", render_summary(&report)?)?,
        OutputFormat::Json => write_json(out, &report)?,
    }
    Ok(())
}

fn run_project<W: Write>(args: &ProjectArgs, out: &mut W) -> Result<(), CliError> {
    check_non_negative("initial-value", args.initial_value)?;
    check_non_negative("monthly-contribution", args.monthly_contribution)?;
    check_years(args.years)?;
    let scenario = build_scenario(args.rate, args.costs)?;

    let series = project(
        args.initial_value,
        args.monthly_contribution,
        args.years,
        &scenario,
    );

    match args.format {
        OutputFormat::Text => {
            writeln!(
                out,
                "Projection at {} over {} years",
                format_rate(scenario.annual_rate),
                args.years
            )?;
            writeln!(
                out,
                "{:>5}  {:<22}{:<22}{}",
                "Year", "Invested", "Interest", "Balance"
            )?;
            let last_month = series.last().map(|p| p.month);
            for point in series
                .iter()
                .filter(|p| p.month % 12 == 0 || Some(p.month) == last_month)
            {
                writeln!(
                    out,
                    "{:>5}  {:<22}{:<22}{}",
                    format_years(point.year()),
                    format_currency(point.total_invested),
                    format_currency(point.total_interest),
                    format_currency(point.total_accumulated)
                )?;
            }
        }
        OutputFormat::Json => write_json(
            out,
            &ProjectionOutput {
                scenario,
                years: args.years,
                final_value: final_value(&series),
                series: &series,
            },
        )?,
    }
    Ok(())
}

fn run_solve<W: Write>(args: &SolveArgs, out: &mut W) -> Result<(), CliError> {
    check_non_negative("initial-value", args.initial_value)?;
    check_positive("goal", args.goal)?;
    check_years(args.years)?;
    check_non_negative("tolerance", args.tolerance)?;
    if args.max_iterations == 0 {
        return Err(InputError::NotPositive {
            flag: "max-iterations",
        }
        .into());
    }
    if args.max_iterations > MAX_SOLVE_ITERATIONS {
        return Err(InputError::OutOfRange {
            flag: "max-iterations",
            min: 1.0,
            max: MAX_SOLVE_ITERATIONS as f64,
        }
        .into());
    }
    let scenario = build_scenario(args.rate, args.costs)?;

    let result = solve_required_contribution(
        args.initial_value,
        args.goal,
        args.years,
        &scenario,
        ContributionSolveConfig {
            max_iterations: args.max_iterations,
            tolerance: args.tolerance,
        },
    );

    match args.format {
        OutputFormat::Text => {
            writeln!(
                out,
                "Goal {} in {} years at {}",
                format_currency(args.goal),
                args.years,
                format_rate(scenario.annual_rate)
            )?;
            writeln!(out, "{}", render_solve_outcome(&result))?;
        }
        OutputFormat::Json => write_json(out, &result)?,
    }
    Ok(())
}

fn render_solve_outcome(result: &ContributionSolveResult) -> String {
    let amount = if result.feasible {
        format_currency(result.solved_value)
    } else {
        "out of reach".to_string()
    };
    format!(
        "Required monthly contribution: {amount}\n{}\nSearch iterations: {}",
        result.message,
        result.iterations.len()
    )
}

fn write_json<W: Write, T: Serialize>(out: &mut W, body: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, body)?;
    writeln!(out)?;
    Ok(())
}
