use serde::Serialize;
use tracing::{debug, warn};

use super::engine::compute;
use super::types::{CalculatorInputs, InputField};

/// Upper bound on engine evaluations per edit.
pub const MAX_RECONCILE_ITERATIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStep {
    pub iteration: u32,
    pub candidate_value: f64,
    pub op_expenses_percent: f64,
    pub overflow: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub field: InputField,
    pub proposed_value: f64,
    pub inputs: CalculatorInputs,
    pub steps: Vec<ReconcileStep>,
    /// False when the iteration cap ran out before operating expenses
    /// became non-negative; `inputs` is then the best candidate found.
    pub converged: bool,
}

/// Applies an edit of `field` to `previous` and corrects the edited field
/// until operating expenses are no longer negative.
pub fn reconcile(
    previous: &CalculatorInputs,
    field: InputField,
    proposed_value: f64,
) -> CalculatorInputs {
    reconcile_traced(previous, field, proposed_value).inputs
}

/// Same as [`reconcile`], but also returns every correction step.
///
/// Only the edited field absorbs the overflow; the other inputs are carried
/// over from `previous` untouched.
pub fn reconcile_traced(
    previous: &CalculatorInputs,
    field: InputField,
    proposed_value: f64,
) -> Reconciliation {
    let mut candidate = previous.with(field, proposed_value);
    let mut steps = Vec::with_capacity(MAX_RECONCILE_ITERATIONS as usize);
    let mut converged = false;

    for iteration in 1..=MAX_RECONCILE_ITERATIONS {
        let op_expenses_percent = compute(&candidate).op_expenses_percent;
        let overflow = (-op_expenses_percent).max(0.0);
        steps.push(ReconcileStep {
            iteration,
            candidate_value: candidate.get(field),
            op_expenses_percent,
            overflow,
        });

        if op_expenses_percent >= 0.0 {
            converged = true;
            break;
        }

        debug!(
            field = field.name(),
            iteration,
            overflow,
            "allocations exceed 100%, reducing edited field"
        );
        candidate = candidate.with(field, candidate.get(field) - overflow);
    }

    if !converged {
        warn!(
            field = field.name(),
            proposed_value,
            "reconciliation hit iteration cap; keeping best candidate"
        );
    }

    let inputs = candidate.with(field, candidate.get(field).max(field.floor()));

    Reconciliation {
        field,
        proposed_value,
        inputs,
        steps,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEFAULT_INPUTS;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn accepts_edit_that_leaves_room_for_op_expenses() {
        let result = reconcile_traced(&DEFAULT_INPUTS, InputField::ProfitPercent, 10.0);

        assert!(result.converged);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.inputs.profit_percent, 10.0);
        assert_eq!(result.inputs.owners_pay_percent, DEFAULT_INPUTS.owners_pay_percent);
    }

    #[test]
    fn corrects_only_the_edited_profit_field() {
        let result = reconcile_traced(&DEFAULT_INPUTS, InputField::ProfitPercent, 90.0);

        assert!(result.converged);
        assert!(result.steps.len() as u32 <= MAX_RECONCILE_ITERATIONS);
        assert!(result.steps[0].overflow > 0.0);
        assert!(result.inputs.profit_percent < 90.0);
        assert!(result.inputs.profit_percent >= 0.0);
        assert_eq!(result.inputs.owners_pay_percent, DEFAULT_INPUTS.owners_pay_percent);
        assert_eq!(result.inputs.desired_take_home, DEFAULT_INPUTS.desired_take_home);
        assert_eq!(result.inputs.contractor_pay, DEFAULT_INPUTS.contractor_pay);
        assert!(compute(&result.inputs).op_expenses_percent >= -EPS);
    }

    #[test]
    fn profit_correction_lands_where_tax_drop_frees_room() {
        // 90% profit overflows by ~85.59 points; one correction to ~4.41%
        // lowers the tax share enough that op expenses are positive again.
        let result = reconcile_traced(&DEFAULT_INPUTS, InputField::ProfitPercent, 90.0);

        assert_eq!(result.steps.len(), 2);
        assert_approx_tol(result.inputs.profit_percent, 4.409, 1e-2);
    }

    #[test]
    fn owners_pay_edit_is_corrected_and_floored() {
        let result = reconcile(&DEFAULT_INPUTS, InputField::OwnersPayPercent, 100.0);

        assert!(result.owners_pay_percent < 100.0);
        assert!(result.owners_pay_percent >= 1.0);
        assert_eq!(result.profit_percent, DEFAULT_INPUTS.profit_percent);
        assert!(compute(&result).op_expenses_percent >= -EPS);
    }

    #[test]
    fn profit_overshooting_below_zero_is_floored() {
        let result = reconcile_traced(&DEFAULT_INPUTS, InputField::ProfitPercent, 100.0);

        // The first correction undershoots past zero before the floor applies.
        assert!(result.steps[1].candidate_value < 0.0);
        assert_eq!(result.inputs.profit_percent, 0.0);
        assert!(compute(&result.inputs).op_expenses_percent >= 0.0);
    }

    #[test]
    fn owners_pay_floor_is_one() {
        let result = reconcile(&DEFAULT_INPUTS, InputField::OwnersPayPercent, 0.25);
        assert_eq!(result.owners_pay_percent, 1.0);
    }

    #[test]
    fn take_home_edit_passes_through_when_allocations_fit() {
        let result = reconcile(&DEFAULT_INPUTS, InputField::DesiredTakeHome, 90_000.0);
        assert_eq!(result.desired_take_home, 90_000.0);
        assert_eq!(
            result,
            CalculatorInputs {
                desired_take_home: 90_000.0,
                ..DEFAULT_INPUTS
            }
        );
    }

    #[test]
    fn exhausted_iterations_return_best_effort_candidate() {
        // With profit at 30% and owner's pay at 45%, a large take-home pushes
        // the average tax rate past what is left. Reducing the take-home by a
        // few units cannot fix that within the cap.
        let previous = CalculatorInputs {
            profit_percent: 30.0,
            ..DEFAULT_INPUTS
        };
        let result = reconcile_traced(&previous, InputField::DesiredTakeHome, 500_000.0);

        assert!(!result.converged);
        assert_eq!(result.steps.len() as u32, MAX_RECONCILE_ITERATIONS);
        assert!(result.inputs.desired_take_home < 500_000.0);
        assert!(result.inputs.desired_take_home > 499_000.0);
        assert_eq!(result.inputs.profit_percent, 30.0);
    }

    #[test]
    fn contractor_pay_edit_against_overflowing_state_is_floored_at_zero() {
        // Contractor pay does not move operating expenses, so every pass
        // subtracts the same overflow until the cap is reached.
        let previous = CalculatorInputs {
            profit_percent: 90.0,
            ..DEFAULT_INPUTS
        };
        let result = reconcile_traced(&previous, InputField::ContractorPay, 100.0);

        assert!(!result.converged);
        assert_eq!(result.steps.len() as u32, MAX_RECONCILE_ITERATIONS);
        assert!(result.steps[1].candidate_value < 100.0);
        assert_eq!(result.inputs.contractor_pay, 0.0);
        assert_eq!(result.inputs.profit_percent, 90.0);
        assert_eq!(result.inputs.desired_take_home, DEFAULT_INPUTS.desired_take_home);
    }

    #[test]
    fn take_home_edit_against_overflowing_state_is_floored_at_zero() {
        let previous = CalculatorInputs {
            profit_percent: 90.0,
            ..DEFAULT_INPUTS
        };
        let result = reconcile_traced(&previous, InputField::DesiredTakeHome, 100.0);

        assert!(!result.converged);
        assert!(result.steps.iter().all(|s| s.overflow > 0.0));
        assert_eq!(result.inputs.desired_take_home, 0.0);
        assert_eq!(result.inputs.contractor_pay, DEFAULT_INPUTS.contractor_pay);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_profit_edits_from_defaults_never_leave_negative_op_expenses(
            profit_bp in 0u32..10_001
        ) {
            let proposed = profit_bp as f64 / 100.0;
            let result = reconcile_traced(&DEFAULT_INPUTS, InputField::ProfitPercent, proposed);

            prop_assert!(result.converged);
            prop_assert!(result.steps.len() as u32 <= MAX_RECONCILE_ITERATIONS);
            prop_assert!(result.inputs.profit_percent >= 0.0);
            prop_assert!(result.inputs.profit_percent <= proposed);
            prop_assert_eq!(result.inputs.owners_pay_percent, DEFAULT_INPUTS.owners_pay_percent);
            prop_assert!(compute(&result.inputs).op_expenses_percent >= -EPS);
        }

        #[test]
        fn prop_display_percentages_sum_to_hundred_after_reconcile(
            profit in 0u32..101,
            owners in 1u32..101,
            take_home in 0u32..501
        ) {
            let previous = CalculatorInputs {
                desired_take_home: (take_home * 1_000) as f64,
                ..DEFAULT_INPUTS
            };
            let after_profit = reconcile(&previous, InputField::ProfitPercent, profit as f64);
            let after_owners = reconcile(&after_profit, InputField::OwnersPayPercent, owners as f64);
            let r = compute(&after_owners);
            prop_assert_eq!(
                r.display_profit_percent
                    + r.display_owners_pay_percent
                    + r.display_tax_percent
                    + r.display_op_expenses_percent,
                100
            );
            prop_assert!(after_owners.owners_pay_percent >= 1.0);
            prop_assert!(after_owners.profit_percent >= 0.0);
        }
    }
}
