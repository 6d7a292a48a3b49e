mod cell;
mod dates;
mod error;
mod layout;
mod products;
mod prompts;
mod reader;
mod writer;

use chrono::NaiveDate;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "invoicefill")]
#[command(version, about = "Fill an invoice spreadsheet template with products, numbering and dates")]
pub struct Args {
    /// Product table (codigo, Descripcion, Cantidad, PrecioUnitario, PrecioTotal)
    #[arg(short, long, default_value = "data/processed/inputTable.csv")]
    pub products: PathBuf,

    /// Invoice template (.xlsx)
    #[arg(short, long, default_value = "data/template/template.xlsx")]
    pub template: PathBuf,

    /// Directory for finished invoices
    #[arg(short, long, default_value = "data/invoice")]
    pub output_dir: PathBuf,

    /// Template sheet by name or index (default: first sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// First invoice number (prompted when absent)
    #[arg(long)]
    pub invoice_start: Option<u32>,

    /// First control number, up to 6 digits (prompted when absent)
    #[arg(long)]
    pub control_start: Option<u32>,

    /// First possible invoice date, DD/MM/YYYY (prompted when absent)
    #[arg(long, value_parser = parse_date_arg, requires = "end_date")]
    pub start_date: Option<NaiveDate>,

    /// Last possible invoice date, DD/MM/YYYY
    #[arg(long, value_parser = parse_date_arg, requires = "start_date")]
    pub end_date: Option<NaiveDate>,

    /// Seed for reproducible control numbers and dates
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum pages that get numbers and dates
    #[arg(long, default_value_t = 50, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_pages: usize,

    /// Maximum invoices sharing one date
    #[arg(long, default_value_t = 3, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_repeats: usize,

    /// Days from invoice date to expiration date
    #[arg(long, default_value_t = 30)]
    pub expiration_days: u32,

    /// Print detailed progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    prompts::parse_ddmmyyyy(raw).ok_or_else(|| format!("expected DD/MM/YYYY, got {:?}", raw))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "invoicefill=debug"
    } else {
        "invoicefill=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> error::Result<()> {
    let mut layout = layout::TemplateLayout::standard()?;
    layout.max_pages = args.max_pages;
    layout.max_repeats_per_date = args.max_repeats;
    layout.expiration_days = args.expiration_days;

    debug!(path = ?args.products, "reading products");
    let products = products::load_products(&args.products)?;
    if products.is_empty() {
        return Err(error::Error::NoProducts(args.products));
    }
    info!(
        items = products.len(),
        pages = layout.pages_for(products.len()),
        "loaded products"
    );

    // Collect every input before touching the template
    let stdin = io::stdin();
    let mut prompter = prompts::Prompter::new(stdin.lock(), io::stdout());
    let inputs = collect_inputs(&args, &mut prompter)?;
    info!(
        start = %inputs.date_range.start(),
        end = %inputs.date_range.end(),
        weekdays = inputs.date_range.weekdays().len(),
        "invoice date range"
    );

    debug!(
        path = ?args.template,
        page_stride = layout.invoice_number.stride(),
        "reading template"
    );
    let mut workbook = reader::open_template(&args.template)?;
    let selector = args
        .sheet
        .as_deref()
        .map(reader::parse_sheet_selector)
        .unwrap_or(reader::SheetSelector::Index(0));
    let sheet_idx = reader::resolve_sheet_index(&workbook, &selector)?;
    let sheet_names = reader::sheet_names(&workbook);
    debug!(sheets = %sheet_names.join(", "), sheet_idx, "template sheets");

    let sheet = workbook
        .get_sheet_mut(&sheet_idx)
        .ok_or(error::Error::SheetIndexOutOfRange {
            index: sheet_idx,
            count: sheet_names.len(),
        })?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let summary = writer::fill_invoice(sheet, &products, &inputs, &layout, &mut rng)?;
    debug!(
        controls = ?summary.control_numbers,
        dates = ?summary.invoice_dates,
        invoices = ?summary.invoice_numbers,
        "generated page numbering"
    );

    for page in writer::preview(sheet, &layout, summary.pages)? {
        debug!(
            page = page.page,
            invoice = %page.invoice_number,
            control = %page.control_number,
            date = %page.invoice_date,
            expires = %page.expiration_date,
            "page header"
        );
    }

    let path = writer::save_invoice(&workbook, &args.output_dir, "invoice")?;
    println!(
        "Finished invoice created: {} ({} item(s), {} page(s))",
        path.display(),
        summary.items,
        summary.pages
    );
    Ok(())
}

/// Take values from the command line, prompting for whatever is missing.
fn collect_inputs<R: BufRead, W: Write>(
    args: &Args,
    prompter: &mut prompts::Prompter<R, W>,
) -> error::Result<writer::InvoiceInputs> {
    let invoice_start = match args.invoice_start {
        Some(n) if n > 0 => n,
        Some(_) => {
            return Err(error::Error::InvalidInput(
                "--invoice-start must be a positive integer".into(),
            ))
        }
        None => prompter.invoice_start()?,
    };

    let control_start = match args.control_start {
        Some(n) if n <= prompts::MAX_CONTROL_NUMBER => n,
        Some(n) => {
            return Err(error::Error::InvalidInput(format!(
                "--control-start {} does not fit in 6 digits",
                n
            )))
        }
        None => prompter.control_start()?,
    };

    let date_range = match (args.start_date, args.end_date) {
        (Some(start), Some(end)) => dates::DateRange::new(start, end)?,
        _ => prompter.date_range()?,
    };

    Ok(writer::InvoiceInputs {
        invoice_start,
        control_start,
        date_range,
    })
}
