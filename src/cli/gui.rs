use colored::Colorize;
use eframe::egui;
use sharpe_rank::{VERSION, api, gui::analysis_form::AnalysisForm};

#[derive(clap::Args)]
pub struct GuiCommand;

impl GuiCommand {
    pub async fn exec(&self) {
        let config = api::get_config().await;

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([960.0, 680.0])
                .with_min_inner_size([640.0, 420.0]),
            ..Default::default()
        };

        if let Err(err) = eframe::run_native(
            &format!("Sharpe Rank {VERSION}"),
            options,
            Box::new(move |cc| Ok(Box::new(AnalysisForm::new(cc, &config)))),
        ) {
            println!("[!] {}", err.to_string().red());
        }
    }
}
