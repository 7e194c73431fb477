//! CLI binary for factory-order.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ToolConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use factory_order::catalog::{self, Catalog};
use factory_order::drawing::{staged_drawings, PdfiumTextReader};
use factory_order::{
    bind_pdfium, check_order_drawings, convert_to_file, parse_order, CatalogSchema, CheckStatus,
    DrawingReport, PurchaseOrder, QuantityPolicy, ToolConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert an order; the workbook lands next to the PDF as 工厂订单_<采购单号>.xlsx
  factory-order convert PO2024031501.pdf

  # Explicit output path and a catalog elsewhere
  factory-order --catalog /srv/mapping_table.xlsx convert po.pdf -o import.xlsx

  # Show what was extracted, as JSON
  factory-order --json parse po.pdf

  # Check drawing revisions and stage matching drawings for printing
  factory-order check-drawings po.pdf --drawings /srv/drawings

  # Summarise the catalog
  factory-order catalog

ENVIRONMENT VARIABLES:
  FACTORY_ORDER_CATALOG        Catalog workbook (default: mapping_table.xlsx beside the executable)
  FACTORY_ORDER_SCHEMA         auto | single-sheet | multi-sheet
  FACTORY_ORDER_SAFETY_MARGIN  Added to every parseable quantity
  FACTORY_ORDER_PREFIX         Drawing-bearing code prefix (default: YY)
  FACTORY_ORDER_PASSWORD       PDF user password
  FACTORY_ORDER_DRAWINGS       Drawing library for check-drawings
  PDFIUM_LIB_PATH              Path to libpdfium (file or directory)
  RUST_LOG                     Override log filter (e.g. factory_order=debug)
"#;

/// Convert purchase-order PDFs into factory import spreadsheets.
#[derive(Parser, Debug)]
#[command(
    name = "factory-order",
    version,
    about = "Convert purchase-order PDFs into factory import spreadsheets",
    long_about = "Extract line items from a customer purchase-order PDF, map customer part codes \
through the product catalog, write the factory system's 19-column import workbook, and check \
local drawings against the revisions the order asks for.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Catalog workbook.
    #[arg(long, global = true, env = "FACTORY_ORDER_CATALOG")]
    catalog: Option<PathBuf>,

    /// Catalog layout.
    #[arg(long, global = true, env = "FACTORY_ORDER_SCHEMA", value_enum, default_value = "auto")]
    schema: SchemaArg,

    /// Add this margin to every parseable quantity.
    #[arg(long, global = true, env = "FACTORY_ORDER_SAFETY_MARGIN")]
    safety_margin: Option<f64>,

    /// Customer codes with this prefix carry drawings.
    #[arg(long, global = true, env = "FACTORY_ORDER_PREFIX")]
    prefix: Option<String>,

    /// PDF user password for encrypted orders.
    #[arg(long, global = true, env = "FACTORY_ORDER_PASSWORD")]
    password: Option<String>,

    /// Print results as JSON on stdout.
    #[arg(long, global = true, env = "FACTORY_ORDER_JSON")]
    json: bool,

    /// Disable spinners.
    #[arg(long, global = true, env = "FACTORY_ORDER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FACTORY_ORDER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "FACTORY_ORDER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, reconcile and write the import workbook.
    Convert {
        /// Purchase-order PDF.
        pdf: PathBuf,
        /// Output workbook. Default: 工厂订单_<采购单号>.xlsx next to the PDF.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the header fields and line items found in an order.
    Parse {
        /// Purchase-order PDF.
        pdf: PathBuf,
    },
    /// Compare drawing revisions and stage matching drawings for printing.
    CheckDrawings {
        /// Purchase-order PDF.
        pdf: PathBuf,
        /// Drawing library directory.
        #[arg(long, env = "FACTORY_ORDER_DRAWINGS")]
        drawings: PathBuf,
    },
    /// Load the catalog and summarise it.
    Catalog,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SchemaArg {
    Auto,
    SingleSheet,
    MultiSheet,
}

impl From<SchemaArg> for CatalogSchema {
    fn from(v: SchemaArg) -> Self {
        match v {
            SchemaArg::Auto => CatalogSchema::Auto,
            SchemaArg::SingleSheet => CatalogSchema::SingleSheet,
            SchemaArg::MultiSheet => CatalogSchema::MultiSheet,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match &cli.command {
        Command::Convert { pdf, output } => {
            let catalog = load_catalog(&cli, &config)?;
            let spinner = spinner(show_progress, "Converting", &pdf.display().to_string());
            let summary = convert_to_file(pdf, output.as_deref(), &catalog, &config)
                .context("Conversion failed");
            spinner.finish_and_clear();
            let summary = summary?;

            if cli.json {
                print_json(&summary)?;
            } else if !cli.quiet {
                eprintln!(
                    "{}  {} items  {} mapped / {} unmapped  {}ms  →  {}",
                    if summary.mapping.unmapped == 0 {
                        green("✔")
                    } else {
                        yellow("⚠")
                    },
                    summary.item_count,
                    summary.mapping.mapped,
                    summary.mapping.unmapped,
                    summary.duration_ms,
                    bold(&summary.output_path.display().to_string()),
                );
                if !summary.unmapped.is_empty() {
                    eprintln!("   {} not in catalog:", yellow("⚠"));
                    for code in &summary.unmapped {
                        eprintln!("     {}", code);
                    }
                }
            }
        }

        Command::Parse { pdf } => {
            let spinner = spinner(show_progress, "Parsing", &pdf.display().to_string());
            let order = parse_order(pdf, &config).context("Failed to parse order");
            spinner.finish_and_clear();
            let order = order?;

            if cli.json {
                print_json(&order)?;
            } else {
                print_order(&order);
            }
        }

        Command::CheckDrawings { pdf, drawings } => {
            let catalog = load_catalog(&cli, &config)?;
            let pdfium = bind_pdfium().context("Failed to bind pdfium")?;
            let reader = PdfiumTextReader::new(&pdfium);
            let spinner = spinner(show_progress, "Checking", &drawings.display().to_string());
            let outcome = check_order_drawings(&pdfium, pdf, drawings, &catalog, &reader, &config)
                .context("Drawing check failed");
            spinner.finish_and_clear();
            let (_, report) = outcome?;

            if cli.json {
                print_json(&report)?;
            } else {
                print_report(&report, cli.quiet);
            }
        }

        Command::Catalog => {
            let load = catalog::load_configured(&config).with_context(|| {
                format!("Failed to read catalog {}", config.catalog_path.display())
            })?;
            if let Some(reason) = load.absent_reason() {
                anyhow::bail!("No catalog: {}", reason);
            }
            let catalog = load.into_catalog();

            if cli.json {
                let entries: Vec<_> = catalog.sorted_entries();
                print_json(&entries)?;
            } else {
                println!("{} {}", bold("Catalog:"), config.catalog_path.display());
                println!("{} {}", bold("Entries:"), catalog.len());
                for (code, entry) in catalog.sorted_entries() {
                    println!(
                        "  {:<16} {:<14} {}  {}",
                        code,
                        entry.factory_code,
                        entry.name,
                        dim(entry.route.as_deref().unwrap_or(""))
                    );
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ToolConfig`.
fn build_config(cli: &Cli) -> Result<ToolConfig> {
    let mut builder = ToolConfig::builder().catalog_schema(cli.schema.into());

    if let Some(ref path) = cli.catalog {
        builder = builder.catalog_path(path);
    }
    if let Some(margin) = cli.safety_margin {
        builder = builder.quantity_policy(QuantityPolicy::SafetyMargin(margin));
    }
    if let Some(ref prefix) = cli.prefix {
        builder = builder.drawing_prefix(prefix);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }

    builder.build().context("Invalid configuration")
}

/// Load the catalog, degrading to an empty one when it is absent.
fn load_catalog(cli: &Cli, config: &ToolConfig) -> Result<Catalog> {
    let load = catalog::load_configured(config)
        .with_context(|| format!("Failed to read catalog {}", config.catalog_path.display()))?;
    if let Some(reason) = load.absent_reason() {
        if !cli.quiet {
            eprintln!(
                "{} {}; every code will be reported unmapped",
                yellow("⚠"),
                reason
            );
        }
    }
    Ok(load.into_catalog())
}

fn spinner(enabled: bool, prefix: &str, msg: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(prefix.to_string());
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}

fn print_order(order: &PurchaseOrder) {
    for (label, value) in &order.header.fields {
        println!("{} {}", bold(&format!("{label}:")), value);
    }
    if !order.header.is_empty() {
        println!();
    }

    if order.is_empty() {
        println!("{}", yellow("No line items found."));
    }
    for item in &order.items {
        println!(
            "{:>3}  {:<14} {:>10} {:<4} {:>10}  {}  {}",
            item.seq,
            bold(&item.customer_code),
            item.quantity,
            item.unit,
            item.unit_price,
            item.ship_date,
            item.description
        );
        if !item.remark.is_empty() {
            println!("     {}", dim(&item.remark));
        }
    }

    let s = &order.stats;
    eprintln!(
        "{}",
        dim(&format!(
            "{} pages ({} unreadable), {} tables, {} items",
            s.page_count,
            s.unreadable_pages,
            s.tables_found,
            order.items.len()
        ))
    );
}

fn print_report(report: &DrawingReport, quiet: bool) {
    for r in &report.results {
        let mark = match r.status {
            CheckStatus::Match => green("✓"),
            CheckStatus::Mismatch => red("✗"),
            CheckStatus::Skipped => dim("·"),
            _ => yellow("?"),
        };
        let status = format!("{:<14}", r.status.as_str());
        let status = match r.status {
            CheckStatus::Mismatch => red(&status),
            CheckStatus::Match => green(&status),
            _ => status,
        };
        println!("  {} {:<14} {} {}", mark, r.code, status, r.message);
    }

    for outcome in report.cleanup.iter().chain(report.results.iter().map(|r| &r.staged)) {
        if let factory_order::SideEffect::Failed { path, reason } = outcome {
            eprintln!("  {} {}: {}", yellow("⚠"), path.display(), reason);
        }
    }

    if quiet {
        return;
    }
    let s = &report.stats;
    eprintln!(
        "{} match  {} mismatch  {} no_version  {} no_drawing  {} no_pdf_version  {} skipped",
        s.matched, s.mismatched, s.no_version, s.no_drawing, s.no_pdf_version, s.skipped
    );
    if report.print_enabled() {
        let staged = staged_drawings(&report.staging_dir);
        eprintln!(
            "{} Printing enabled: {} drawing(s) staged in {}",
            green("✔"),
            staged.len(),
            bold(&report.staging_dir.display().to_string())
        );
    } else if s.mismatched > 0 {
        eprintln!(
            "{} Printing blocked: {} drawing(s) out of date",
            red("✘"),
            s.mismatched
        );
    } else {
        eprintln!("{} Printing disabled: no matching drawing", cyan("◆"));
    }
}
