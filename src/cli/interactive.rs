//! Terminal rendition of the planning questionnaire.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::core::report::WITHDRAWAL_COMPARISON_RATES;
use crate::core::{
    PlanReport, SAFE_WITHDRAWAL_RATE, WizardEvent, WizardForm, WizardStep, build_report,
    format_currency, format_rate, format_years, goal_value, render_summary, transition,
};
use crate::error::CliError;

const COMMAND_HINT: &str = "[enter] next, back, restart, print, quit";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum WizardCommand {
    Move(WizardEvent),
    Print,
    Quit,
}

fn parse_command(answer: &str) -> Option<WizardCommand> {
    match answer.to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Some(WizardCommand::Move(WizardEvent::Next)),
        "b" | "back" => Some(WizardCommand::Move(WizardEvent::Back)),
        "r" | "restart" => Some(WizardCommand::Move(WizardEvent::Restart)),
        "p" | "print" => Some(WizardCommand::Print),
        "q" | "quit" => Some(WizardCommand::Quit),
        _ => None,
    }
}

fn title(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Profile => "About you",
        WizardStep::Goal => "Your goal",
        WizardStep::Contribution => "Your monthly effort",
        WizardStep::RateMatrix => "Rates of return",
        WizardStep::Verdict => "Verdict",
        WizardStep::Report => "Your plan",
    }
}

/// Runs the questionnaire until the user quits or the input ends.
pub fn run_wizard<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<(), CliError> {
    let mut form = WizardForm::default();
    let mut step = WizardStep::default();
    let mut show_step = true;

    loop {
        if show_step {
            writeln!(out)?;
            writeln!(out, "[{}/6] {}", step.number(), title(step))?;
            present_step(step, &mut form, input, out)?;
        }
        show_step = true;

        write!(out, "{COMMAND_HINT}> ")?;
        out.flush()?;
        let Some(answer) = read_answer(input)? else {
            return Ok(());
        };

        let event = match parse_command(&answer) {
            Some(WizardCommand::Move(event)) => event,
            Some(WizardCommand::Print) => {
                if step.can_print() {
                    if let Some(report) = report_for(&form, out)? {
                        write!(out, "{}", render_summary(&report)?)?;
                    }
                } else {
                    writeln!(out, "Printing is only available at the report step.")?;
                }
                show_step = false;
                continue;
            }
            Some(WizardCommand::Quit) => return Ok(()),
            None => {
                writeln!(out, "Unknown command '{answer}'.")?;
                show_step = false;
                continue;
            }
        };

        match transition(step, event, &form) {
            Ok(next) => step = next,
            Err(err) => writeln!(out, "{err}")?,
        }
    }
}

fn present_step<R: BufRead, W: Write>(
    step: WizardStep,
    form: &mut WizardForm,
    input: &mut R,
    out: &mut W,
) -> Result<(), CliError> {
    match step {
        WizardStep::Profile => {
            form.initial_value = ask(
                input,
                out,
                "Capital already invested (R$)",
                form.initial_value,
            )?;
            form.monthly_retirement_income = ask(
                input,
                out,
                "Monthly income wanted in retirement (R$)",
                form.monthly_retirement_income,
            )?;
            form.current_age = ask(input, out, "Current age", form.current_age)?;
            form.retirement_age = ask(input, out, "Retirement age", form.retirement_age)?;
        }
        WizardStep::Goal => {
            let income = form.monthly_retirement_income.unwrap_or(0.0);
            writeln!(
                out,
                "To draw {} a month at the {} rule you need {}.",
                format_currency(income),
                format_rate(SAFE_WITHDRAWAL_RATE),
                format_currency(goal_value(income, SAFE_WITHDRAWAL_RATE))
            )?;
            for rate in WITHDRAWAL_COMPARISON_RATES {
                writeln!(
                    out,
                    "  {:<6}{}",
                    format_rate(rate),
                    format_currency(goal_value(income, rate))
                )?;
            }
            if let (Some(current), Some(retirement)) = (form.current_age, form.retirement_age) {
                writeln!(
                    out,
                    "You have {} years to get there.",
                    retirement.saturating_sub(current)
                )?;
            }
        }
        WizardStep::Contribution => {
            form.monthly_contribution = ask(
                input,
                out,
                "Monthly contribution (R$)",
                form.monthly_contribution,
            )?;
            form.family_income = ask(input, out, "Monthly family income (R$)", form.family_income)?;
        }
        WizardStep::RateMatrix => {
            if let Some(report) = report_for(form, out)? {
                writeln!(
                    out,
                    "{:<6}{:<8}{:<22}{}",
                    "Rate", "Odds", "Value at plan end", "Years to goal"
                )?;
                for (row, outcome) in report.profitability.iter().zip(&report.outcomes) {
                    writeln!(
                        out,
                        "{:<6}{:<8}{:<22}{}",
                        format_rate(row.rate),
                        row.likelihood.label(),
                        format_currency(outcome.final_value_at_plan_end),
                        format_years(outcome.years_to_goal)
                    )?;
                }
            }
        }
        WizardStep::Verdict => {
            if let Some(report) = report_for(form, out)? {
                let verdict = &report.verdict;
                if verdict.is_possible {
                    writeln!(
                        out,
                        "At {} you reach the goal in {} years.",
                        format_rate(verdict.benchmark_rate),
                        format_years(verdict.years_needed)
                    )?;
                } else {
                    writeln!(
                        out,
                        "At {} you need {} more years; by the planned date you could draw {} a month.",
                        format_rate(verdict.benchmark_rate),
                        format_years(verdict.extra_years_needed),
                        format_currency(verdict.possible_monthly_income)
                    )?;
                }
                writeln!(
                    out,
                    "Contribution needed to retire on time: {}",
                    format_currency(report.required_monthly_contribution)
                )?;
            }
        }
        WizardStep::Report => {
            if let Some(report) = report_for(form, out)? {
                write!(out, "{}", render_summary(&report)?)?;
            }
        }
    }
    Ok(())
}

fn report_for<W: Write>(form: &WizardForm, out: &mut W) -> Result<Option<PlanReport>, CliError> {
    match form.to_inputs() {
        Ok(inputs) => Ok(Some(build_report(&inputs))),
        Err(err) => {
            writeln!(out, "{err}")?;
            Ok(None)
        }
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>, CliError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

// A blank answer, or the end of input, keeps the current value.
fn ask<R, W, T>(
    input: &mut R,
    out: &mut W,
    question: &str,
    current: Option<T>,
) -> Result<Option<T>, CliError>
where
    R: BufRead,
    W: Write,
    T: FromStr + Display + Copy,
{
    match current {
        Some(value) => write!(out, "{question} [{value}]: ")?,
        None => write!(out, "{question}: ")?,
    }
    out.flush()?;

    let Some(answer) = read_answer(input)? else {
        return Ok(current);
    };
    if answer.is_empty() {
        return Ok(current);
    }
    match answer.parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            writeln!(out, "'{answer}' is not a number; keeping the previous answer.")?;
            Ok(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_wizard(&mut input, &mut out).expect("wizard runs");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(
            parse_command(""),
            Some(WizardCommand::Move(WizardEvent::Next))
        );
        assert_eq!(
            parse_command("BACK"),
            Some(WizardCommand::Move(WizardEvent::Back))
        );
        assert_eq!(parse_command("p"), Some(WizardCommand::Print));
        assert_eq!(parse_command("later"), None);
    }

    #[test]
    fn full_walkthrough_prints_the_plan() {
        let script = "50000\n5000\n35\n60\nnext\n\
                      next\n\
                      3000\n15000\nnext\n\
                      next\n\
                      print\n\
                      next\n\
                      print\n\
                      quit\n";
        let out = run_script(script);
        assert!(out.contains("[2/6] Your goal"));
        assert!(out.contains("you need R$ 1.500.000,00"));
        assert!(out.contains("You have 25 years to get there."));
        assert!(out.contains("[4/6] Rates of return"));
        assert!(out.contains("you reach the goal in"));
        assert!(out.contains("Printing is only available at the report step."));
        assert_eq!(out.matches("RETIREMENT PLAN SUMMARY").count(), 2);
    }

    #[test]
    fn incomplete_profile_blocks_the_next_step() {
        let out = run_script("\n\n\n\nnext\n");
        assert!(out.contains("profile step is incomplete"));
        assert!(!out.contains("[2/6]"));
    }

    #[test]
    fn back_keeps_previous_answers() {
        let out = run_script("50000\n5000\n35\n60\nnext\nback\n\n\n\n\nnext\n");
        assert_eq!(out.matches("[1/6]").count(), 2);
        assert_eq!(out.matches("[2/6]").count(), 2);
        assert!(out.contains("Current age [35]: "));
    }

    #[test]
    fn invalid_numbers_are_reported_and_ignored() {
        let out = run_script("abc\n");
        assert!(out.contains("'abc' is not a number"));
    }

    #[test]
    fn unknown_commands_are_reported() {
        let out = run_script("\n4000\n30\n50\njump\nquit\n");
        assert!(out.contains("Unknown command 'jump'."));
        assert!(!out.contains("[2/6]"));
    }
}
