//! Interactive console storefront.
//!
//! A minimal menu loop over the checkout engine: list products, add to the
//! cart, review it, and check out. Malformed numeric input re-prompts
//! without touching the cart.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::Parser;
use tabled::{Table, Tabled, settings::Style};

use storefront::prelude::{
    Cart, Catalog, CheckoutOutcome, CheckoutWarning, ConsoleGateway, FileSink, InvoiceSink,
    PaymentGateway, Session, TaxSchedule,
};

type BoxError = Box<dyn std::error::Error>;

/// Arguments for the console storefront.
#[derive(Debug, Parser)]
struct Args {
    /// YAML catalog file; the built-in sample catalog is used when omitted.
    #[clap(short, long)]
    catalog: Option<PathBuf>,

    /// Directory that invoice records are written into.
    #[clap(short, long, default_value = ".")]
    invoice_dir: PathBuf,
}

/// One row of the product listing.
#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Category")]
    category: String,
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_yaml_file(path, &TaxSchedule::default())?,
        None => Catalog::sample()?,
    };

    let mut session = Session::new(&catalog, ConsoleGateway, FileSink::new(&args.invoice_dir));

    println!("Welcome to the Storefront");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        println!("1. View Products");
        println!("2. Add to Cart");
        println!("3. View Cart");
        println!("4. Checkout");
        println!("5. Exit");
        print!("Select Option: ");
        io::stdout().flush()?;

        let Some(choice) = lines.next().transpose()? else {
            break;
        };

        match choice.trim() {
            "1" => list_products(&catalog),
            "2" => add_to_cart(&mut session, &mut lines)?,
            "3" => view_cart(session.cart()),
            "4" => run_checkout(&mut session, &mut lines)?,
            "5" => {
                println!("Exiting...");
                break;
            }
            _ => println!("Invalid option."),
        }
    }

    Ok(())
}

fn list_products(catalog: &Catalog) {
    let rows: Vec<ProductRow> = catalog
        .list_all()
        .into_iter()
        .map(|product| ProductRow {
            id: product.id().to_owned(),
            name: product.name().to_owned(),
            price: product.unit_price().to_string(),
            category: product.category().to_owned(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
}

fn add_to_cart<G, S>(
    session: &mut Session<'_, G, S>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(), BoxError>
where
    G: PaymentGateway,
    S: InvoiceSink,
{
    let Some(id) = prompt(lines, "Enter Product ID: ")? else {
        return Ok(());
    };

    let Some(quantity) = prompt(lines, "Enter Quantity: ")? else {
        return Ok(());
    };

    let Ok(quantity) = quantity.trim().parse::<i64>() else {
        println!("Error: quantity must be a whole number.");
        return Ok(());
    };

    match session.add_item(id.trim(), quantity) {
        Ok(()) => println!("Added to cart!"),
        Err(err) => println!("Error: {err}"),
    }

    Ok(())
}

fn view_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }

    println!();
    println!("--- Your Cart ---");

    for line in cart.lines() {
        let subtotal = match line.subtotal() {
            Ok(amount) => amount.to_string(),
            Err(err) => err.to_string(),
        };

        println!(
            "{} x{} = {subtotal}",
            line.product().name(),
            line.quantity()
        );
    }
}

fn run_checkout<G, S>(
    session: &mut Session<'_, G, S>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(), BoxError>
where
    G: PaymentGateway,
    S: InvoiceSink,
{
    if session.cart().is_empty() {
        println!("Cart is empty.");
        return Ok(());
    }

    let coupon = prompt(lines, "Enter Coupon Code (or press enter to skip): ")?.unwrap_or_default();
    let method = prompt(lines, "Payment Method (CARD/UPI): ")?.unwrap_or_default();

    match session.checkout(&coupon, &method)? {
        CheckoutOutcome::EmptyCart => println!("Cart is empty."),
        CheckoutOutcome::Completed(order) => {
            println!();
            println!("--- Checkout ---");
            println!("Gross Total: {}", order.breakdown.gross());
            println!("Tax (GST):   {}", order.breakdown.tax());
            println!("Subtotal:    {}", order.breakdown.with_tax());

            for warning in &order.warnings {
                match warning {
                    CheckoutWarning::InvalidCoupon { code } => {
                        println!("Warning: coupon code invalid: {code}");
                    }
                    CheckoutWarning::InvoiceWrite { reason } => {
                        println!("Warning: invoice not written: {reason}");
                    }
                }
            }

            println!("Promo Applied: {}", order.promotion);
            println!("FINAL PAYABLE: {}", order.total);
            println!("Invoice order id: {}", order.order_id);
        }
    }

    Ok(())
}

/// Prints a prompt and reads one line, returning `None` on end of input.
fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    message: &str,
) -> io::Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    lines.next().transpose()
}
