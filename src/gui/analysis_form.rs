use eframe::egui;
use egui_plot::{Bar, BarChart, Legend, Plot};
use tokio::sync::mpsc;

use crate::{
    CHANNEL_BUFFER_DEFAULT,
    analysis::{Assessment, Rating},
    api,
    batch::{AnalysisResult, BatchEvent},
    config::{Config, ConfigKey},
    error::SrResult,
    gui::str_to_color,
    report,
    ticker::parse_tickers,
};

const TICKERS_STORAGE_KEY: &str = "tickers";

pub struct AnalysisForm {
    tickers_text: String,
    risk_free_rate_text: String,
    period_text: String,

    form_event_sender: mpsc::Sender<FormEvent>,
    form_event_receiver: mpsc::Receiver<FormEvent>,
    batch_event_sender: mpsc::Sender<BatchEvent>,
    batch_event_receiver: mpsc::Receiver<BatchEvent>,

    running: bool,
    progress: (usize, usize),
    results: Vec<AnalysisResult>,

    info_message: Option<String>,
    warning_message: Option<String>,
}

enum FormEvent {
    Finished(SrResult<Vec<AnalysisResult>>),
    Saved(ConfigKey, SrResult<Config>),
}

impl AnalysisForm {
    pub fn new(cc: &eframe::CreationContext, config: &Config) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let tickers_text = cc
            .storage
            .and_then(|storage| eframe::get_value::<String>(storage, TICKERS_STORAGE_KEY))
            .unwrap_or_default();

        let (form_event_sender, form_event_receiver) =
            mpsc::channel::<FormEvent>(CHANNEL_BUFFER_DEFAULT);
        let (batch_event_sender, batch_event_receiver) =
            mpsc::channel::<BatchEvent>(CHANNEL_BUFFER_DEFAULT);

        Self {
            tickers_text,
            risk_free_rate_text: config.risk_free_rate.to_string(),
            period_text: config.period.to_string(),

            form_event_sender,
            form_event_receiver,
            batch_event_sender,
            batch_event_receiver,

            running: false,
            progress: (0, 0),
            results: vec![],

            info_message: None,
            warning_message: None,
        }
    }

    fn start_analysis(&mut self, ctx: &egui::Context) {
        self.info_message = None;
        self.warning_message = None;

        let tickers = parse_tickers(&self.tickers_text);
        if tickers.is_empty() {
            self.warning_message = Some("Please enter at least one ticker".to_string());
            return;
        }

        self.running = true;
        self.progress = (0, tickers.len());

        let form_event_sender = self.form_event_sender.clone();
        let batch_event_sender = self.batch_event_sender.clone();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let outcome = api::analyze(
                &tickers,
                &api::AnalyzeOverrides::default(),
                Some(batch_event_sender),
            )
            .await;

            let _ = form_event_sender.send(FormEvent::Finished(outcome)).await;
            ctx.request_repaint();
        });
    }

    fn save_setting(&mut self, ctx: &egui::Context, key: ConfigKey) {
        self.info_message = None;
        self.warning_message = None;

        let value = match key {
            ConfigKey::RiskFreeRate => self.risk_free_rate_text.clone(),
            _ => self.period_text.clone(),
        };

        let form_event_sender = self.form_event_sender.clone();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let outcome = api::set_config(&key.to_string(), &value).await;

            let _ = form_event_sender.send(FormEvent::Saved(key, outcome)).await;
            ctx.request_repaint();
        });
    }

    fn on_form_event(&mut self, event: FormEvent) {
        match event {
            FormEvent::Finished(Ok(results)) => {
                self.running = false;
                self.results = results;
                self.info_message = Some(
                    "Analysis completed, check the table for the results".to_string(),
                );
            }
            FormEvent::Finished(Err(err)) => {
                self.running = false;
                self.warning_message = Some(err.to_string());
            }
            FormEvent::Saved(key, Ok(config)) => {
                self.info_message = Some(match key {
                    ConfigKey::RiskFreeRate => {
                        self.risk_free_rate_text = config.risk_free_rate.to_string();
                        format!(
                            "Risk-free rate changed to {:.2}% and saved",
                            config.risk_free_rate * 100.0
                        )
                    }
                    _ => {
                        self.period_text = config.period.to_string();
                        format!("Period changed to {} and saved", config.period)
                    }
                });
            }
            FormEvent::Saved(_, Err(err)) => {
                self.warning_message = Some(err.to_string());
            }
        }
    }

    fn on_batch_event(&mut self, event: BatchEvent) {
        if let BatchEvent::Finished { .. } = event {
            self.progress.0 += 1;
        }
    }

    fn show_results_grid(&self, ui: &mut egui::Ui) {
        egui::Grid::new("results_grid")
            .striped(true)
            .num_columns(report::COLUMNS.len())
            .show(ui, |ui| {
                for column in report::COLUMNS {
                    ui.label(egui::RichText::new(column).strong());
                }
                ui.end_row();

                for result in &self.results {
                    let row = report::row(result);
                    for cell in &row[..row.len() - 1] {
                        ui.label(cell);
                    }
                    ui.colored_label(rating_color(&result.rating), &row[row.len() - 1]);
                    ui.end_row();
                }
            });
    }

    fn show_chart(&self, ui: &mut egui::Ui) {
        let bars: Vec<Bar> = self
            .results
            .iter()
            .filter_map(|result| {
                result
                    .sharpe_no_dividends
                    .filter(|v| v.is_finite())
                    .map(|v| (result.ticker.as_str(), v))
            })
            .enumerate()
            .map(|(i, (ticker, v))| {
                Bar::new(i as f64, v)
                    .name(ticker)
                    .width(0.6)
                    .fill(str_to_color(ticker))
            })
            .collect();

        Plot::new("sharpe_plot")
            .legend(Legend::default())
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new("Sharpe (No Dividends)", bars));
            });
    }
}

impl eframe::App for AnalysisForm {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        while let Ok(event) = self.form_event_receiver.try_recv() {
            self.on_form_event(event);
        }
        while let Ok(event) = self.batch_event_receiver.try_recv() {
            self.on_batch_event(event);
        }

        if self.running {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }

        egui::TopBottomPanel::top("input_panel")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label("Tickers separated by commas (e.g. PETR4.SA, ITUB4.SA):");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.tickers_text).desired_width(480.0),
                    );
                    if ui
                        .add_enabled(!self.running, egui::Button::new("▶ Analyze"))
                        .clicked()
                    {
                        self.start_analysis(ctx);
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Risk-free rate (decimal, 0.105 = 10.5%)");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.risk_free_rate_text)
                            .desired_width(80.0),
                    );
                    if ui.button("Save").clicked() {
                        self.save_setting(ctx, ConfigKey::RiskFreeRate);
                    }

                    ui.separator();

                    ui.label("Period (1mo, 3mo, 6mo, 1y)");
                    ui.add(egui::TextEdit::singleline(&mut self.period_text).desired_width(60.0));
                    if ui.button("Save").clicked() {
                        self.save_setting(ctx, ConfigKey::Period);
                    }
                });
                ui.add_space(8.0);
            });

        egui::TopBottomPanel::bottom("status_panel")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let status = if self.running {
                        format!("⏳ {}/{}", self.progress.0, self.progress.1)
                    } else {
                        self.info_message.clone().unwrap_or_default()
                    };
                    ui.label(
                        egui::RichText::new(status)
                            .color(egui::Color32::DARK_GRAY)
                            .size(12.0),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(
                                self.warning_message
                                    .as_ref()
                                    .map(|t| format!("⚠ {t}"))
                                    .unwrap_or_default(),
                            )
                            .color(egui::Color32::DARK_GRAY)
                            .size(12.0),
                        );
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::TopBottomPanel::bottom("chart_panel")
                .resizable(true)
                .default_height(220.0)
                .show_inside(ui, |ui| {
                    self.show_chart(ui);
                });

            egui::CentralPanel::default().show_inside(ui, |ui| {
                egui::ScrollArea::both().show(ui, |ui| {
                    self.show_results_grid(ui);
                });
            });
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, TICKERS_STORAGE_KEY, &self.tickers_text);
    }
}

fn rating_color(assessment: &Assessment) -> egui::Color32 {
    match assessment {
        Assessment::Rated(Rating::VeryGood) => egui::Color32::from_rgb(80, 200, 120),
        Assessment::Rated(Rating::Good) => egui::Color32::from_rgb(160, 210, 90),
        Assessment::Rated(Rating::Mediocre) => egui::Color32::from_rgb(230, 190, 80),
        Assessment::Rated(Rating::Bad) => egui::Color32::from_rgb(230, 100, 80),
        Assessment::NotEvaluated => egui::Color32::GRAY,
        Assessment::Failed(_) => egui::Color32::DARK_GRAY,
    }
}
