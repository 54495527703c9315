use colored::Colorize;
use sharpe_rank::{api, config::ConfigKey};
use strum::IntoEnumIterator;
use tabled::settings::{Color, object::Columns};

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Change one setting and save it, e.g. config set risk_free_rate 0.1")]
    Set {
        #[arg(help = "One of risk_free_rate (or rate), period, yahoo_api, fetch_timeout_secs, max_retries, cache_expire_hours, concurrency, adjusted_close")]
        key: String,
        value: String,
    },

    #[command(about = "Show all settings and where they are stored")]
    Show,
}

impl ConfigCommand {
    pub async fn exec(&self) {
        match self {
            ConfigCommand::Set { key, value } => match api::set_config(key, value).await {
                Ok(config) => {
                    // Shows the stored form, e.g. a period is saved lowercased
                    if let Ok(key) = key.parse::<ConfigKey>() {
                        print_settings(vec![vec![key.to_string(), config.get(key)]]);
                    }
                }
                Err(err) => {
                    println!("[!] {}", err.to_string().red());
                }
            },
            ConfigCommand::Show => {
                let config = api::get_config().await;

                print_settings(
                    ConfigKey::iter()
                        .map(|key| vec![key.to_string(), config.get(key)])
                        .collect(),
                );

                if let Some(path) = api::get_config_path() {
                    let note = if path.exists() { "" } else { " (not saved yet)" };
                    println!("{}{}", path.to_string_lossy().bright_black(), note.bright_black());
                }
            }
        }
    }
}

fn print_settings(table_data: Vec<Vec<String>>) {
    let mut table = tabled::builder::Builder::from_iter(&table_data).build();
    table.modify(Columns::first(), Color::FG_CYAN);
    println!("{table}");
}
