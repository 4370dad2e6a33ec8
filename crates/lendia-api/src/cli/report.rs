//! Admin report command: list stored applications as a table or JSON.

use anyhow::Context;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use lendia_types::loan::LoanType;

use crate::state::AppState;

/// Render the applications report to stdout.
pub async fn run(state: &AppState, loan_type: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filter = match loan_type {
        Some(raw) => Some(
            raw.parse::<LoanType>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("unrecognized --loan-type")?,
        ),
        None => None,
    };

    let applications = state
        .desk
        .list_applications(filter)
        .await
        .context("listing applications")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&applications)?);
        return Ok(());
    }

    if applications.is_empty() {
        println!("No applications found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Application",
        "Loan type",
        "Decision",
        "Amount (INR)",
        "Rate %",
        "EMI (INR)",
        "Persisted at",
    ]);

    for application in &applications {
        table.add_row(vec![
            Cell::new(application.record.id),
            Cell::new(application.record.loan_type),
            Cell::new(application.result.decision),
            Cell::new(format!("{:.0}", application.result.approved_amount)),
            Cell::new(format!("{:.2}", application.result.annual_rate_percent)),
            Cell::new(format!("{:.0}", application.result.emi)),
            Cell::new(application.persisted_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }

    println!("{table}");
    println!("{} application(s)", applications.len());
    Ok(())
}
