use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single order as served by the query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_name: String,
    pub items: Vec<String>,
    pub status: String,
    pub description: String,
}

impl OrderRecord {
    /// Flatten every field into the text blob that gets indexed.
    pub fn corpus_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.order_id,
            self.customer_name,
            self.items.join(" "),
            self.status,
            self.description
        )
    }

    /// Factual context handed to the answer generator.
    pub fn grounding_text(&self) -> String {
        format!(
            "Order ID: {}\nCustomer: {}\nItems: {}\nStatus: {}\nDetails: {}",
            self.order_id,
            self.customer_name,
            self.items.join(", "),
            self.status,
            self.description
        )
    }
}

/// One text blob per order, positionally aligned with `orders`.
pub fn build_corpus(orders: &[OrderRecord]) -> Vec<String> {
    orders.iter().map(OrderRecord::corpus_text).collect()
}

fn order(id: &str, customer: &str, items: &[&str], status: &str, description: &str) -> OrderRecord {
    OrderRecord {
        order_id: id.to_string(),
        customer_name: customer.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
        status: status.to_string(),
        description: description.to_string(),
    }
}

/// The built-in five-order demo set.
pub fn demo_orders() -> Vec<OrderRecord> {
    vec![
        order(
            "ORD-1001",
            "Alice Johnson",
            &["iPhone 15 Pro", "USB-C Cable"],
            "Shipped",
            "Order 1001 for Alice, containing an iPhone 15 Pro and USB-C cable. \
             The order has been shipped and is in transit to the destination.",
        ),
        order(
            "ORD-1002",
            "Bob Smith",
            &["MacBook Air M3"],
            "Processing",
            "Order 1002 for Bob with a MacBook Air M3. Payment confirmed, order is being prepared for shipment.",
        ),
        order(
            "ORD-1003",
            "Charlie Davis",
            &["Noise Cancelling Headphones"],
            "Delivered",
            "Order 1003 for Charlie, noise cancelling headphones delivered successfully yesterday.",
        ),
        order(
            "ORD-1004",
            "Diana Prince",
            &["Android Phone", "Screen Protector"],
            "Cancelled",
            "Order 1004 for Diana was cancelled by the customer before shipping.",
        ),
        order(
            "ORD-1005",
            "Ethan Hunt",
            &["Gaming Laptop", "Wireless Mouse"],
            "Pending Payment",
            "Order 1005 for Ethan is waiting for payment confirmation before processing.",
        ),
    ]
}

/// Load orders from a `.json` file (array or single object), a `.jsonl` file,
/// or a directory containing such files.
pub fn load_orders<P: AsRef<Path>>(path: P) -> Result<Vec<OrderRecord>> {
    let input_path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("order source {} does not exist", input_path.display());
    }

    let mut orders = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut orders)?;
        } else {
            read_json(&file, &mut orders)?;
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    for o in &orders {
        if !seen.insert(o.order_id.to_uppercase()) {
            bail!("duplicate order id {}", o.order_id);
        }
    }
    tracing::debug!(count = orders.len(), path = %input_path.display(), "loaded orders");
    Ok(orders)
}

fn read_jsonl(file: &Path, out: &mut Vec<OrderRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        out.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<OrderRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => out.push(serde_json::from_value(json)?),
        _ => bail!("{} must contain an order object or an array of orders", file.display()),
    }
    Ok(())
}
