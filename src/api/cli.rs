use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};

use super::{
    ApiInputField, AppError, CalculatePayload, InputsPayload, ReconcilePayload,
    calculate_from_payload, reconcile_from_payload, run_http_server,
};
use crate::core::{DEFAULT_INPUTS, RevenueView};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliInputField {
    TakeHome,
    Profit,
    OwnersPay,
    ContractorPay,
}

impl From<CliInputField> for ApiInputField {
    fn from(value: CliInputField) -> Self {
        match value {
            CliInputField::TakeHome => ApiInputField::DesiredTakeHome,
            CliInputField::Profit => ApiInputField::ProfitPercent,
            CliInputField::OwnersPay => ApiInputField::OwnersPayPercent,
            CliInputField::ContractorPay => ApiInputField::ContractorPay,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRevenueView {
    Monthly,
    Annual,
}

impl From<CliRevenueView> for RevenueView {
    fn from(value: CliRevenueView) -> Self {
        match value {
            CliRevenueView::Monthly => RevenueView::Monthly,
            CliRevenueView::Annual => RevenueView::Annual,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "profit-first",
    version,
    about = "Work backwards from a take-home pay goal to the gross revenue a sole trader needs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API over HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the revenue target and allocations for a set of inputs
    Calculate(InputArgs),
    /// Apply one edit, correcting it so allocations stay within 100%
    Reconcile {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, value_enum, help = "Field being edited")]
        field: CliInputField,
        #[arg(long, help = "Proposed new value for the edited field")]
        value: f64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_INPUTS.desired_take_home,
        help = "Target annual take-home pay"
    )]
    take_home: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INPUTS.profit_percent,
        help = "Profit allocation in percent of real revenue"
    )]
    profit: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INPUTS.owners_pay_percent,
        help = "Owner's pay allocation in percent of real revenue"
    )]
    owners_pay: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INPUTS.contractor_pay,
        help = "Annual contractor pay, added before GST"
    )]
    contractor_pay: f64,
    #[arg(long, value_enum, default_value_t = CliRevenueView::Monthly)]
    view: CliRevenueView,
}

impl InputArgs {
    fn inputs(&self) -> InputsPayload {
        InputsPayload {
            desired_take_home: Some(self.take_home),
            profit_percent: Some(self.profit),
            owners_pay_percent: Some(self.owners_pay),
            contractor_pay: Some(self.contractor_pay),
        }
    }

    fn payload(&self) -> CalculatePayload {
        CalculatePayload {
            desired_take_home: Some(self.take_home),
            profit_percent: Some(self.profit),
            owners_pay_percent: Some(self.owners_pay),
            contractor_pay: Some(self.contractor_pay),
            view: Some(self.view.into()),
        }
    }
}

pub async fn run_cli(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve { bind, port } => {
            let ip: IpAddr = bind.parse()?;
            run_http_server(SocketAddr::new(ip, port)).await?;
        }
        Command::Calculate(args) => {
            let response = calculate_from_payload(&args.payload())?;
            print_json(&response)?;
        }
        Command::Reconcile {
            inputs,
            field,
            value,
        } => {
            let payload = ReconcilePayload {
                inputs: inputs.inputs(),
                field: field.into(),
                value,
                view: Some(inputs.view.into()),
            };
            let response = reconcile_from_payload(&payload)?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
