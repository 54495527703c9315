use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sharpe_rank::api;
use tabled::settings::{
    Color,
    object::{Cell, Columns},
};
use tokio::time::Duration;

#[derive(clap::Args)]
pub struct CheckCommand;

impl CheckCommand {
    pub async fn exec(&self) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("[{elapsed}] {msg} {spinner:.cyan}") {
            spinner.set_style(style);
        }
        spinner.set_message("Checking");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let status = match api::check().await {
            Ok(status) => status,
            Err(err) => {
                spinner.finish_with_message(format!("{}", err.to_string().red()));
                return;
            }
        };
        spinner.finish_and_clear();

        let table_data: Vec<Vec<String>> = status
            .iter()
            .map(|(title, optional_error)| {
                vec![
                    title.to_string(),
                    optional_error
                        .as_ref()
                        .map(|err| err.to_string())
                        .unwrap_or("✔".to_string()),
                ]
            })
            .collect();

        let mut table = tabled::builder::Builder::from_iter(&table_data).build();
        table.modify(Columns::first(), Color::FG_CYAN);
        for (i, (_, optional_error)) in status.iter().enumerate() {
            let color = if optional_error.is_some() {
                Color::FG_RED
            } else {
                Color::FG_GREEN
            };
            table.modify(Cell::new(i, 1), color);
        }
        println!("{table}");

        let failed = status.iter().filter(|(_, e)| e.is_some()).count();
        if failed > 0 {
            println!("{}", format!("[!] {failed} of {} checks failed", status.len()).yellow());
        }
    }
}
