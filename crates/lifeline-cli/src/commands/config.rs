//! The `config` command: show and edit collaborator configuration.

use clap::Subcommand;
use lifeline_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration as TOML (secrets redacted)
    Show,
    /// Set Storyblok CMS credentials
    SetCms {
        #[arg(long)]
        token: String,
        #[arg(long)]
        space_id: String,
    },
    /// Set email gateway credentials
    SetEmail {
        #[arg(long)]
        gateway_url: String,
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        from_address: Option<String>,
    },
    /// Set alert workflow defaults
    SetAlert {
        /// Confirmation window in seconds (must be > 0)
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Maximum contacts to notify
        #[arg(long)]
        max_contacts: Option<usize>,
    },
}

fn redact(value: &str) -> String {
    if value.is_empty() {
        "(unset)".to_string()
    } else {
        let head: String = value.chars().take(4).collect();
        format!("{head}...")
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => {
            println!("cms.token        = {}", redact(&config.cms.token));
            println!("cms.space_id     = {}", config.cms.space_id);
            println!("email.gateway    = {}", config.email.gateway_url);
            println!("email.api_key    = {}", redact(&config.email.api_key));
            println!("email.from       = {}", config.email.from_address);
            println!("alert.timeout    = {}s", config.alert.confirmation_timeout_secs);
            println!("alert.max_contacts = {}", config.alert.max_contacts);
            println!("contacts         = {}", config.contacts.len());
        }
        ConfigAction::SetCms { token, space_id } => {
            config.cms.token = token;
            config.cms.space_id = space_id;
            config.save()?;
            println!("CMS credentials updated");
        }
        ConfigAction::SetEmail {
            gateway_url,
            api_key,
            from_address,
        } => {
            config.email.gateway_url = gateway_url;
            config.email.api_key = api_key;
            if let Some(from_address) = from_address {
                config.email.from_address = from_address;
            }
            config.save()?;
            println!("Email gateway updated");
        }
        ConfigAction::SetAlert {
            timeout_secs,
            max_contacts,
        } => {
            if let Some(timeout_secs) = timeout_secs {
                if timeout_secs == 0 {
                    return Err("timeout_secs must be greater than zero".into());
                }
                config.alert.confirmation_timeout_secs = timeout_secs;
            }
            if let Some(max_contacts) = max_contacts {
                config.alert.max_contacts = max_contacts;
            }
            config.save()?;
            println!("Alert defaults updated");
        }
    }
    Ok(())
}
