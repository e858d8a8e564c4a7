use std::time::Duration;

use anyhow::{bail, Context, Result};
use cb_order::{
    constants::{DRINK_TYPES, MAX_QUANTITY, MIN_QUANTITY},
    default_http_client, Client, Endpoint, FormEvent, OrderForm,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "coffeebucks", about = "Order coffee for delivery")]
struct CliArgs {
    #[command(subcommand)]
    pub subcommand: Command,

    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    #[arg(
        short = 'e',
        long,
        global = true,
        help = "Endpoint to post orders to. Defaults to the Coffee Bucks order API."
    )]
    pub endpoint: Option<String>,

    #[arg(
        short = 'l',
        long,
        global = true,
        default_value = "warn",
        help = "Log level used when RUST_LOG is not set"
    )]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(name = "catalog", about = "List the drinks that can be ordered")]
    Catalog,

    #[clap(name = "order", about = "Place an order")]
    Order {
        #[command(flatten)]
        order_opts: OrderOpts,
    },
}

#[derive(Args, Debug)]
struct OrderOpts {
    #[arg(
        short = 'd',
        long,
        default_value = "0",
        value_parser = parse_drink,
        help = "Drink name or catalog index"
    )]
    pub drink: usize,

    #[arg(
        short = 'q',
        long,
        default_value_t = MIN_QUANTITY,
        value_parser = clap::value_parser!(u32).range((MIN_QUANTITY as i64)..=(MAX_QUANTITY as i64)),
        help = "Number of coffees"
    )]
    pub quantity: u32,

    #[arg(short = 's', long, help = "Enable special requests")]
    pub special_requests: bool,

    #[arg(long, requires = "special_requests")]
    pub extra_sugar: bool,

    #[arg(long, requires = "special_requests")]
    pub extra_milk: bool,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub phone_number: String,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub city: String,

    #[arg(long, default_value = "")]
    pub post_code: String,
}

fn parse_drink(value: &str) -> Result<usize, String> {
    if let Ok(index) = value.parse::<usize>() {
        if index < DRINK_TYPES.len() {
            return Ok(index);
        }
        return Err(format!(
            "index {index} is out of range (0-{})",
            DRINK_TYPES.len() - 1
        ));
    }
    DRINK_TYPES
        .iter()
        .position(|drink| drink.eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| format!("unknown drink `{value}`, see `coffeebucks catalog`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.global_opts.log_level));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match args.subcommand {
        Command::Catalog => {
            for (index, drink) in DRINK_TYPES.iter().enumerate() {
                println!("{index}: {drink}");
            }
        }
        Command::Order { order_opts } => {
            place_order(&args.global_opts, order_opts).await?;
        }
    }

    Ok(())
}

async fn place_order(global_opts: &GlobalOpts, opts: OrderOpts) -> Result<()> {
    let endpoint = global_opts
        .endpoint
        .as_deref()
        .map(Endpoint::try_new)
        .transpose()?;
    let client = Client::new(default_http_client()?, endpoint)?;

    let mut form = OrderForm::default();
    form.subscribe(|event| match event {
        FormEvent::OrderChanged(order) => tracing::trace!(?order, "order changed"),
        FormEvent::StateChanged(state) => tracing::debug!(?state, "submission state"),
    });
    form.update(|order| {
        order.drink_type = opts.drink;
        order.quantity = opts.quantity;
        order.special_request_enabled = opts.special_requests;
        order.extra_sugar = opts.extra_sugar;
        order.extra_milk = opts.extra_milk;
        order.name = opts.name;
        order.phone_number = opts.phone_number;
        order.address = opts.address;
        order.city = opts.city;
        order.post_code = opts.post_code;
    });

    if !form.can_submit() {
        bail!(
            "cannot place order, these fields are required: {}",
            form.order().missing_fields().join(", ")
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Placing order...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = form.submit(&client).await;
    spinner.finish_and_clear();

    let confirmation = result.context("your order could not be placed")?;
    println!("Thank you!");
    println!("{}", confirmation.message);
    Ok(())
}
