use super::types::{CalculatedResults, CalculatorInputs, GST_RATE, GST_THRESHOLD};

/// One slice of the progressive income tax schedule. Income above
/// `threshold` is taxed at `rate` on top of `base`, the cumulative tax owed
/// on everything below the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
    pub base: f64,
}

pub const TAX_BRACKETS: [TaxBracket; 5] = [
    TaxBracket {
        threshold: 0.0,
        rate: 0.0,
        base: 0.0,
    },
    TaxBracket {
        threshold: 18_200.0,
        rate: 0.16,
        base: 0.0,
    },
    TaxBracket {
        threshold: 45_000.0,
        rate: 0.30,
        base: 4_288.0,
    },
    TaxBracket {
        threshold: 135_000.0,
        rate: 0.37,
        base: 31_288.0,
    },
    TaxBracket {
        threshold: 190_000.0,
        rate: 0.45,
        base: 51_638.0,
    },
];

/// Tax owed on `taxable_income`. A bracket applies only once income is
/// strictly above its threshold, so the boundary value itself is taxed by
/// the bracket below.
pub fn income_tax(taxable_income: f64) -> f64 {
    TAX_BRACKETS
        .iter()
        .rev()
        .find(|bracket| taxable_income > bracket.threshold)
        .map(|bracket| bracket.base + (taxable_income - bracket.threshold) * bracket.rate)
        .unwrap_or(0.0)
}

/// Derives every revenue figure and allocation from `inputs` in one pass.
///
/// Operating expenses take whatever percentage is left after profit, owner's
/// pay and tax, and are not clamped: a negative `op_expenses_percent` is how
/// the reconciler learns that the allocations overflow.
pub fn compute(inputs: &CalculatorInputs) -> CalculatedResults {
    let CalculatorInputs {
        desired_take_home,
        profit_percent,
        owners_pay_percent,
        contractor_pay,
    } = *inputs;

    let real_revenue = if owners_pay_percent > 0.0 {
        desired_take_home / (owners_pay_percent / 100.0)
    } else {
        0.0
    };

    let profit_amount = real_revenue * (profit_percent / 100.0);
    let owners_pay_amount = real_revenue * (owners_pay_percent / 100.0);

    let taxable_income = profit_amount + owners_pay_amount;
    let tax_amount = income_tax(taxable_income);
    let tax_percent = if real_revenue > 0.0 {
        tax_amount / real_revenue * 100.0
    } else {
        0.0
    };

    let op_expenses_percent = 100.0 - profit_percent - owners_pay_percent - tax_percent;
    let op_expenses_amount = real_revenue * (op_expenses_percent / 100.0);

    let pre_gst_amount = real_revenue + contractor_pay;
    let is_gst_registered = pre_gst_amount >= GST_THRESHOLD;
    let gst_amount = if is_gst_registered {
        pre_gst_amount * GST_RATE
    } else {
        0.0
    };
    let annual_gross_revenue = pre_gst_amount + gst_amount;
    let monthly_gross_revenue = annual_gross_revenue / 12.0;

    let display_profit_percent = display_percent(profit_percent);
    let display_owners_pay_percent = display_percent(owners_pay_percent);
    let display_tax_percent = display_percent(tax_percent);
    let display_op_expenses_percent =
        100 - display_profit_percent - display_owners_pay_percent - display_tax_percent;

    CalculatedResults {
        take_home: round_currency(desired_take_home),
        real_revenue: round_currency(real_revenue),
        pre_gst_amount: round_currency(pre_gst_amount),
        annual_gross_revenue: round_currency(annual_gross_revenue),
        monthly_gross_revenue: round_currency(monthly_gross_revenue),
        contractor_pay: round_currency(contractor_pay),
        is_gst_registered,
        gst_amount: round_currency(gst_amount),
        profit_amount: round_currency(profit_amount),
        owners_pay_amount: round_currency(owners_pay_amount),
        op_expenses_amount: round_currency(op_expenses_amount),
        tax_amount: round_currency(tax_amount),
        taxable_income: round_currency(taxable_income),
        profit_percent,
        owners_pay_percent,
        tax_percent,
        op_expenses_percent,
        display_profit_percent,
        display_owners_pay_percent,
        display_tax_percent,
        display_op_expenses_percent,
    }
}

fn display_percent(percent: f64) -> i32 {
    percent.ceil() as i32
}

// Halves round towards positive infinity, so -2.5 becomes -2.
fn round_currency(amount: f64) -> f64 {
    (amount + 0.5).floor()
}
