use anyhow::Result;
use clap::{Parser, Subcommand};
use orderdesk_core::{build_corpus, demo_orders, load_orders, OrderRecord, OrderSearch, VectorizerConfig, DEFAULT_TOP_K};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(about = "Query and inspect the order retrieval index offline", long_about = None)]
struct Cli {
    /// Orders file (.json/.jsonl) or directory; built-in demo orders if omitted
    #[arg(long, global = true)]
    orders: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank orders for a free-text query and print the result as JSON
    Query {
        text: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// Use ln(N/df) instead of the smoothed IDF
        #[arg(long, default_value_t = false)]
        raw_idf: bool,
        /// Use 1 + ln(tf) instead of raw term counts
        #[arg(long, default_value_t = false)]
        sublinear_tf: bool,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Print the indexed text of every order, one per line
    Corpus,
    /// Show which query terms are in the vocabulary, with their IDF
    Terms { text: String },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let orders = read_orders(cli.orders.as_ref())?;

    match cli.command {
        Commands::Query { text, top_k, raw_idf, sublinear_tf, pretty } => {
            let config = VectorizerConfig { smooth_idf: !raw_idf, sublinear_tf, ..Default::default() };
            let result = OrderSearch::new(orders, config).retrieve(&text, top_k);
            let out = if pretty { serde_json::to_string_pretty(&result)? } else { serde_json::to_string(&result)? };
            println!("{out}");
        }
        Commands::Corpus => {
            for line in build_corpus(&orders) {
                println!("{line}");
            }
        }
        Commands::Terms { text } => {
            let search = OrderSearch::new(orders, VectorizerConfig::default());
            let terms = search.index().known_terms(&text);
            if terms.is_empty() {
                tracing::info!("no query terms are in the vocabulary");
            }
            for (term, idf) in terms {
                println!("{term}\t{idf:.4}");
            }
        }
    }
    Ok(())
}

fn read_orders(path: Option<&PathBuf>) -> Result<Vec<OrderRecord>> {
    match path {
        Some(p) => {
            let orders = load_orders(p)?;
            tracing::info!(count = orders.len(), path = %p.display(), "loaded orders");
            Ok(orders)
        }
        None => Ok(demo_orders()),
    }
}
