use anyhow::Context;
use clap::{Parser, Subcommand};
use compute::{add_transaction, build_dashboard_data, query_interval};
use data::{format_date, DateInterval, Summary, Transaction};
use env_logger::Env;
use log::info;
use render::{render_dashboard, render_summary, render_transactions};
use store::Store;

mod compute;
mod data;
mod read;
mod render;
mod store;
mod write;

#[derive(Parser)]
#[clap(author, version, about = "Track income and expenses in a CSV file", long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Transaction store (CSV)
    #[clap(long, env = "FINTRACK_FILE", default_value = "finance_data.csv")]
    file: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new transaction
    Add {
        /// Date of the transaction (dd-mm-yyyy), today if omitted
        #[clap(long)]
        date: Option<String>,
        #[clap(long, allow_hyphen_values = true)]
        amount: String,
        /// Income or Expense ('I' or 'E' also work)
        #[clap(long)]
        category: String,
        #[clap(long, default_value = "")]
        description: String,
    },
    /// Show the transactions and their summary within a date range
    View {
        /// Start date (dd-mm-yyyy)
        start: String,
        /// End date (dd-mm-yyyy)
        end: String,
    },
    /// Same as `view`, followed by the dashboard
    Plot {
        /// Start date (dd-mm-yyyy)
        start: String,
        /// End date (dd-mm-yyyy)
        end: String,
        /// Also save the dashboard to <SAVE>.txt
        #[clap(long)]
        save: Option<String>,
    },
}

/// Validates the dates before anything is created on disk, then runs the query on a
/// store that is guaranteed to exist.
fn load_range(
    store: &Store,
    start: &str,
    end: &str,
) -> Result<(DateInterval, Vec<Transaction>, Summary), anyhow::Error> {
    let interval = DateInterval::parse(start, end)?;
    let in_store = || format!("transaction store {}", store.path().display());
    store.initialize().with_context(in_store)?;
    let (filtered, summary) = query_interval(store, &interval).with_context(in_store)?;
    Ok((interval, filtered, summary))
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let store = Store::new(&cli.file);
    let in_store = || format!("transaction store {}", store.path().display());

    match cli.command {
        Command::Add {
            date,
            amount,
            category,
            description,
        } => {
            let today = chrono::Local::now().date_naive();
            let tx = add_transaction(
                &store,
                date.as_deref(),
                &amount,
                &category,
                &description,
                today,
            )
            .with_context(in_store)?;
            info!("Recorded {} of {} on {}", tx.category, tx.amount, format_date(tx.date));
            println!("Entry added successfully");
        }
        Command::View { start, end } => {
            let (interval, filtered, summary) = load_range(&store, &start, &end)?;
            print!("{}", render_transactions(&interval, &filtered));
            if !filtered.is_empty() {
                print!("\n{}", render_summary(&summary));
            }
        }
        Command::Plot { start, end, save } => {
            let (interval, filtered, summary) = load_range(&store, &start, &end)?;
            print!("{}", render_transactions(&interval, &filtered));
            if filtered.is_empty() {
                return Ok(());
            }
            print!("\n{}", render_summary(&summary));
            let data = build_dashboard_data(&filtered)?;
            let dashboard = render_dashboard(&data);
            print!("\n{dashboard}");
            if let Some(name) = save {
                let file_name = format!("{name}.txt");
                std::fs::write(&file_name, &dashboard)
                    .with_context(|| format!("can't save dashboard to {file_name}"))?;
                println!("Dashboard saved as {file_name}");
            }
        }
    }
    Ok(())
}
