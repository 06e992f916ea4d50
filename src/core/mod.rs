mod engine;
mod reconciler;
mod session;
mod types;

pub use engine::{TAX_BRACKETS, TaxBracket, compute, income_tax};
pub use reconciler::{
    MAX_RECONCILE_ITERATIONS, ReconcileStep, Reconciliation, reconcile, reconcile_traced,
};
pub use session::{BreakdownKind, BreakdownLine, RevenueHeadline, RevenueView, Session};
pub use types::{
    CalculatedResults, CalculatorInputs, DEFAULT_INPUTS, GST_RATE, GST_THRESHOLD, InputField,
};
