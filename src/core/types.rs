use serde::{Deserialize, Serialize};

/// Pre-GST revenue at or above which GST registration is required.
pub const GST_THRESHOLD: f64 = 75_000.0;
pub const GST_RATE: f64 = 0.10;

pub const DEFAULT_INPUTS: CalculatorInputs = CalculatorInputs {
    desired_take_home: 150_000.0,
    profit_percent: 5.0,
    owners_pay_percent: 45.0,
    contractor_pay: 15_000.0,
};

/// The four values a user can edit. Amounts are annual; percentages are of
/// real revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    pub desired_take_home: f64,
    pub profit_percent: f64,
    pub owners_pay_percent: f64,
    pub contractor_pay: f64,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        DEFAULT_INPUTS
    }
}

impl CalculatorInputs {
    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::DesiredTakeHome => self.desired_take_home,
            InputField::ProfitPercent => self.profit_percent,
            InputField::OwnersPayPercent => self.owners_pay_percent,
            InputField::ContractorPay => self.contractor_pay,
        }
    }

    /// Returns a copy with `field` replaced by `value`.
    pub fn with(self, field: InputField, value: f64) -> Self {
        let mut next = self;
        match field {
            InputField::DesiredTakeHome => next.desired_take_home = value,
            InputField::ProfitPercent => next.profit_percent = value,
            InputField::OwnersPayPercent => next.owners_pay_percent = value,
            InputField::ContractorPay => next.contractor_pay = value,
        }
        next
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputField {
    DesiredTakeHome,
    ProfitPercent,
    OwnersPayPercent,
    ContractorPay,
}

impl InputField {
    pub fn name(self) -> &'static str {
        match self {
            InputField::DesiredTakeHome => "desiredTakeHome",
            InputField::ProfitPercent => "profitPercent",
            InputField::OwnersPayPercent => "ownersPayPercent",
            InputField::ContractorPay => "contractorPay",
        }
    }

    /// Inclusive range accepted from a user for this field.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            InputField::DesiredTakeHome => (0.0, 500_000.0),
            InputField::ProfitPercent => (0.0, 100.0),
            InputField::OwnersPayPercent => (1.0, 100.0),
            InputField::ContractorPay => (0.0, 200_000.0),
        }
    }

    /// Lowest value the reconciler may leave in this field.
    pub(crate) fn floor(self) -> f64 {
        self.bounds().0
    }
}

/// Everything derived from one set of inputs. Monetary amounts are rounded to
/// whole units; continuous percentages are not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedResults {
    pub take_home: f64,
    pub real_revenue: f64,
    pub pre_gst_amount: f64,
    pub annual_gross_revenue: f64,
    pub monthly_gross_revenue: f64,
    pub contractor_pay: f64,

    pub is_gst_registered: bool,
    pub gst_amount: f64,

    pub profit_amount: f64,
    pub owners_pay_amount: f64,
    pub op_expenses_amount: f64,
    pub tax_amount: f64,
    pub taxable_income: f64,

    pub profit_percent: f64,
    pub owners_pay_percent: f64,
    pub tax_percent: f64,
    pub op_expenses_percent: f64,

    pub display_profit_percent: i32,
    pub display_owners_pay_percent: i32,
    pub display_tax_percent: i32,
    pub display_op_expenses_percent: i32,
}
