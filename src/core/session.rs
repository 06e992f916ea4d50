use serde::{Deserialize, Serialize};

use super::engine::compute;
use super::reconciler::{Reconciliation, reconcile_traced};
use super::types::{CalculatedResults, CalculatorInputs, DEFAULT_INPUTS, InputField};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevenueView {
    #[default]
    Monthly,
    Annual,
}

impl RevenueView {
    pub fn divisor(self) -> f64 {
        match self {
            RevenueView::Monthly => 12.0,
            RevenueView::Annual => 1.0,
        }
    }

    pub fn other(self) -> Self {
        match self {
            RevenueView::Monthly => RevenueView::Annual,
            RevenueView::Annual => RevenueView::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakdownKind {
    Figure,
    Obligation,
    Earning,
    OperatingExpenses,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub label: &'static str,
    pub amount: f64,
    pub percent: Option<i32>,
    pub kind: BreakdownKind,
    pub emphasized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueHeadline {
    pub view: RevenueView,
    pub gross_revenue_target: f64,
    pub other_view: RevenueView,
    pub other_gross_revenue_target: f64,
}

/// Calculator state for one user: the current inputs, the results derived
/// from them and the monthly/annual toggle. Results are rebuilt from scratch
/// whenever the inputs change.
#[derive(Debug, Clone)]
pub struct Session {
    inputs: CalculatorInputs,
    results: CalculatedResults,
    view: RevenueView,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_inputs(DEFAULT_INPUTS)
    }

    /// Starts from an arbitrary input set. Callers outside the crate only
    /// reach other states through [`Session::apply`].
    pub(crate) fn with_inputs(inputs: CalculatorInputs) -> Self {
        Self {
            inputs,
            results: compute(&inputs),
            view: RevenueView::default(),
        }
    }

    pub fn inputs(&self) -> &CalculatorInputs {
        &self.inputs
    }

    pub fn results(&self) -> &CalculatedResults {
        &self.results
    }

    pub fn view(&self) -> RevenueView {
        self.view
    }

    pub fn set_view(&mut self, view: RevenueView) {
        self.view = view;
    }

    /// Reconciles an edit against the current inputs, then recomputes.
    pub fn apply(&mut self, field: InputField, value: f64) -> Reconciliation {
        let reconciliation = reconcile_traced(&self.inputs, field, value);
        self.inputs = reconciliation.inputs;
        self.results = compute(&self.inputs);
        reconciliation
    }

    /// Restores the default inputs. The view toggle is kept.
    pub fn reset(&mut self) {
        self.inputs = DEFAULT_INPUTS;
        self.results = compute(&self.inputs);
    }

    pub fn headline(&self) -> RevenueHeadline {
        let r = &self.results;
        let target = |view: RevenueView| match view {
            RevenueView::Monthly => r.monthly_gross_revenue,
            RevenueView::Annual => r.annual_gross_revenue,
        };
        RevenueHeadline {
            view: self.view,
            gross_revenue_target: target(self.view),
            other_view: self.view.other(),
            other_gross_revenue_target: target(self.view.other()),
        }
    }

    pub fn breakdown(&self) -> Vec<BreakdownLine> {
        let r = &self.results;
        let divisor = self.view.divisor();
        let line = |label: &'static str,
                    amount: f64,
                    percent: Option<i32>,
                    kind: BreakdownKind,
                    emphasized: bool| BreakdownLine {
            label,
            amount: amount / divisor,
            percent,
            kind,
            emphasized,
        };

        let mut lines = Vec::with_capacity(9);
        lines.push(line(
            "Gross revenue",
            r.annual_gross_revenue,
            None,
            BreakdownKind::Figure,
            true,
        ));
        if r.is_gst_registered {
            lines.push(line("GST", r.gst_amount, None, BreakdownKind::Obligation, false));
        }
        if self.inputs.contractor_pay > 0.0 {
            lines.push(line(
                "Contractor pay",
                self.inputs.contractor_pay,
                None,
                BreakdownKind::Obligation,
                false,
            ));
        }
        lines.push(line(
            "Real revenue",
            r.real_revenue,
            None,
            BreakdownKind::Figure,
            true,
        ));
        lines.push(line(
            "Profit",
            r.profit_amount,
            Some(r.display_profit_percent),
            BreakdownKind::Earning,
            false,
        ));
        lines.push(line(
            "Owner's pay",
            r.owners_pay_amount,
            Some(r.display_owners_pay_percent),
            BreakdownKind::Earning,
            false,
        ));
        lines.push(line(
            "Taxable income",
            r.taxable_income,
            None,
            BreakdownKind::Figure,
            false,
        ));
        lines.push(line(
            "Tax",
            r.tax_amount,
            Some(r.display_tax_percent),
            BreakdownKind::Obligation,
            false,
        ));
        lines.push(line(
            "Operating expenses",
            r.op_expenses_amount,
            Some(r.display_op_expenses_percent),
            BreakdownKind::OperatingExpenses,
            false,
        ));
        lines
    }
}
