//! The `log` command: view the local emergency log.

use clap::Subcommand;
use lifeline_core::LogDb;

#[derive(Subcommand)]
pub enum LogAction {
    /// Show the most recent emergency records
    Recent {
        /// Maximum number of records
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = LogDb::open()?;

    match action {
        LogAction::Recent { limit, json } => {
            let records = db.recent(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if records.is_empty() {
                println!("No emergency records.");
                return Ok(());
            }
            for record in records {
                println!(
                    "{}  {:<18} sev {:>2}  {:<12} contacts {}  email {}  push {}  errors {}",
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.emergency_type.as_str(),
                    record.severity,
                    record.status.as_str(),
                    record.total_contacts,
                    record.emails_sent,
                    record.push_sent,
                    record.errors.len(),
                );
            }
        }
    }
    Ok(())
}
