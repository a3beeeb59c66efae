use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use whmcs_iyzipay::application::callback::{CallbackForm, CallbackOutcome};
use whmcs_iyzipay::application::gateway::GatewayAdapter;
use whmcs_iyzipay::application::params::{PaymentParams, RefundParams, StoreCardParams};
use whmcs_iyzipay::domain::context::RequestContext;
use whmcs_iyzipay::interfaces::host::{HostCall, HostSession, config_fields, module_metadata};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the module metadata
    Metadata,
    /// Print the administrator settings form
    ConfigFields,
    /// Charge an invoice with a card or a stored card
    Capture(CallArgs),
    /// Start a 3-D Secure payment and print the page to show the client
    Threeds(CallArgs),
    /// Refund a payment in full
    Refund(CallArgs),
    /// Create, update or delete the card stored at Iyzipay
    StoreCard(CallArgs),
    /// Complete a 3-D Secure payment from the form Iyzipay posted back
    Callback {
        #[command(flatten)]
        call: CallArgs,
        /// The urlencoded POST body
        #[arg(long)]
        form: String,
    },
}

#[derive(Args)]
struct CallArgs {
    /// JSON file with config, context, invoices and params
    #[arg(long)]
    input: PathBuf,

    /// Iyzipay endpoint to use instead of the one the config selects
    #[arg(long)]
    base_url: Option<String>,
}

impl CallArgs {
    fn read<P: DeserializeOwned>(&self) -> Result<(GatewayAdapter, RequestContext, P)> {
        let input = std::fs::read_to_string(&self.input).into_diagnostic()?;
        let call: HostCall<P> = HostCall::from_json(&input).into_diagnostic()?;
        let (adapter, context) = call
            .session
            .into_adapter(self.base_url.as_deref())
            .into_diagnostic()?;
        Ok((adapter, context, call.params))
    }

    fn read_session(&self) -> Result<(GatewayAdapter, RequestContext)> {
        let input = std::fs::read_to_string(&self.input).into_diagnostic()?;
        let session: HostSession = serde_json::from_str(&input).into_diagnostic()?;
        session
            .into_adapter(self.base_url.as_deref())
            .into_diagnostic()
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the result for the host, so diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Metadata => print_json(&module_metadata())?,
        Command::ConfigFields => print_json(&config_fields())?,
        Command::Capture(args) => {
            let (adapter, context, params) = args.read::<PaymentParams>()?;
            let result = adapter.capture(&params, &context).await.into_diagnostic()?;
            print_json(&result)?;
        }
        Command::Threeds(args) => {
            let (adapter, context, params) = args.read::<PaymentParams>()?;
            let page = adapter
                .initialize_threeds(&params, &context)
                .await
                .into_diagnostic()?;
            println!("{}", page.into_html());
        }
        Command::Refund(args) => {
            let (adapter, _, params) = args.read::<RefundParams>()?;
            let result = adapter.refund(&params).await.into_diagnostic()?;
            print_json(&result)?;
        }
        Command::StoreCard(args) => {
            let (adapter, _, params) = args.read::<StoreCardParams>()?;
            let result = adapter.store_remote(&params).await.into_diagnostic()?;
            print_json(&result)?;
        }
        Command::Callback { call, form } => {
            let (adapter, context) = call.read_session()?;
            let form = CallbackForm::from_urlencoded(&form).into_diagnostic()?;
            let outcome = adapter.handle_threeds_callback(form).await;

            let mut value = serde_json::to_value(&outcome).into_diagnostic()?;
            if let CallbackOutcome::Redirect(redirect) = &outcome {
                let location = redirect
                    .location(&context.system_url)
                    .into_diagnostic()?;
                value["location"] = serde_json::Value::String(location);
            }
            print_json(&value)?;
        }
    }

    Ok(())
}
