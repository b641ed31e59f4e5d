//! The `contacts` command: manage the emergency contact book.

use clap::Subcommand;
use lifeline_core::{Config, Contact};

#[derive(Subcommand)]
pub enum ContactsAction {
    /// List contacts in priority order
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a contact
    Add {
        /// Contact name
        name: String,
        /// Relationship to the user (e.g. daughter, neighbor)
        #[arg(long)]
        relationship: String,
        /// Phone number
        #[arg(long)]
        phone: String,
        /// Email address (optional; contact still gets push without one)
        #[arg(long)]
        email: Option<String>,
        /// Mark as the primary contact
        #[arg(long)]
        primary: bool,
        /// Priority order (lower = contacted first; defaults to last)
        #[arg(long)]
        priority: Option<u32>,
    },
    /// Remove a contact by name
    Remove {
        /// Contact name
        name: String,
    },
}

pub fn run(action: ContactsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        ContactsAction::List { json } => {
            let mut contacts = config.contacts.clone();
            contacts.sort_by_key(|c| c.priority_order);
            if json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
                return Ok(());
            }
            if contacts.is_empty() {
                println!("No contacts configured. Add one with `contacts add`.");
                return Ok(());
            }
            for contact in contacts {
                println!(
                    "{:>3}. {:<20} {:<12} {:<16} {}{}",
                    contact.priority_order,
                    contact.name,
                    contact.relationship,
                    contact.phone,
                    contact.email.as_deref().unwrap_or("(no email)"),
                    if contact.is_primary { "  [primary]" } else { "" },
                );
            }
        }
        ContactsAction::Add {
            name,
            relationship,
            phone,
            email,
            primary,
            priority,
        } => {
            let priority_order = priority.unwrap_or_else(|| {
                config
                    .contacts
                    .iter()
                    .map(|c| c.priority_order)
                    .max()
                    .map(|p| p + 1)
                    .unwrap_or(1)
            });
            config.contacts.push(Contact {
                name: name.clone(),
                relationship,
                phone,
                email,
                is_primary: primary,
                priority_order,
            });
            config.save()?;
            println!("Contact added: {name} (priority {priority_order})");
        }
        ContactsAction::Remove { name } => {
            let before = config.contacts.len();
            config.contacts.retain(|c| c.name != name);
            if config.contacts.len() == before {
                return Err(format!("No contact named '{name}'").into());
            }
            config.save()?;
            println!("Contact removed: {name}");
        }
    }
    Ok(())
}
