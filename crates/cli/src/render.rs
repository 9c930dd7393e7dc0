use outlay_core::Transaction;
use std::io::{self, Write};

use crate::config::OutputFormat;

const COLUMNS: [&str; 7] = ["DATE", "FITID", "TYPE", "AMOUNT", "ACCOUNT", "NAME", "MEMO"];

pub fn write_transactions<W: Write>(
    out: &mut W,
    transactions: &[Transaction],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, transactions)?;
            writeln!(out)?;
        }
        OutputFormat::Table => write_table(out, transactions)?,
    }
    Ok(())
}

fn row(tx: &Transaction) -> [String; 7] {
    [
        tx.date.format("%Y-%m-%d %H:%M:%S").to_string(),
        tx.id.clone(),
        tx.transaction_type.to_string(),
        tx.amount.as_decimal().to_string(),
        format!("{} {} {}", tx.account.account_type, tx.account.account_id, tx.account.currency)
            .trim_end()
            .to_string(),
        tx.name.clone(),
        tx.memo.clone(),
    ]
}

fn write_table<W: Write>(out: &mut W, transactions: &[Transaction]) -> io::Result<()> {
    let rows: Vec<[String; 7]> = transactions.iter().map(row).collect();

    let mut widths = COLUMNS.map(str::len);
    for r in &rows {
        for (width, cell) in widths.iter_mut().zip(r) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = COLUMNS.map(str::to_string);
    write_row(out, &header, &widths)?;
    for r in &rows {
        write_row(out, r, &widths)?;
    }
    writeln!(out, "{} transaction(s)", rows.len())
}

fn write_row<W: Write>(out: &mut W, cells: &[String; 7], widths: &[usize; 7]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            // amounts right-aligned
            if i == 3 {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
