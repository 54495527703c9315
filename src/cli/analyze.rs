use std::path::PathBuf;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sharpe_rank::{
    CHANNEL_BUFFER_DEFAULT,
    analysis::{Assessment, Rating},
    api::{self, AnalyzeOverrides},
    batch::{AnalysisResult, BatchEvent},
    error::SrError,
    period::Period,
    report,
    ticker::parse_ticker_args,
};
use tabled::settings::{
    Alignment, Color, Width,
    measurement::Percent,
    object::{Cell, Columns, Object, Rows},
    peaker::Priority,
};
use tokio::{sync::mpsc, time::Duration};

#[derive(clap::Args)]
pub struct AnalyzeCommand {
    #[arg(
        required = true,
        help = "Tickers to rank, separated by spaces or commas, e.g. PETR4.SA,ITUB4.SA VALE3.SA"
    )]
    tickers: Vec<String>,

    #[arg(
        short = 'r',
        long = "risk-free",
        help = "The annual risk-free rate as a decimal, the stored setting is used if omitted"
    )]
    risk_free_rate: Option<f64>,

    #[arg(
        short = 'p',
        long = "period",
        help = "The lookback period, e.g. 1mo, 3mo, 6mo, 1y, the stored setting is used if omitted"
    )]
    period: Option<Period>,

    #[arg(
        short = 'c',
        long = "concurrency",
        help = "How many tickers are fetched at the same time"
    )]
    concurrency: Option<usize>,

    #[arg(short = 'o', long = "output", help = "Also write the ranking to a CSV file")]
    output: Option<PathBuf>,

    #[arg(long = "json", help = "Print the ranking as JSON instead of a table")]
    json: bool,
}

impl AnalyzeCommand {
    pub async fn exec(&self) {
        let tickers = parse_ticker_args(&self.tickers);
        let overrides = AnalyzeOverrides {
            risk_free_rate: self.risk_free_rate,
            period: self.period.clone(),
            concurrency: self.concurrency,
        };

        let progress = ProgressBar::new(tickers.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed}] {bar:30.cyan} {pos}/{len} {msg}")
        {
            progress.set_style(style);
        }
        progress.enable_steady_tick(Duration::from_millis(100));

        let (sender, mut receiver) = mpsc::channel::<BatchEvent>(CHANNEL_BUFFER_DEFAULT);
        let progress_listener = {
            let progress = progress.clone();
            tokio::spawn(async move {
                while let Some(event) = receiver.recv().await {
                    match event {
                        BatchEvent::Started { ticker, .. } => {
                            progress.set_message(ticker);
                        }
                        BatchEvent::Finished { result, .. } => {
                            if let Assessment::Failed(message) = &result.rating {
                                progress.println(format!(
                                    "[{}][!] {}",
                                    result.ticker,
                                    message.red()
                                ));
                            }
                            progress.inc(1);
                        }
                    }
                }
            })
        };

        let outcome = api::analyze(&tickers, &overrides, Some(sender)).await;
        let _ = progress_listener.await;

        match outcome {
            Ok(results) => {
                progress.finish_and_clear();

                if self.json {
                    match serde_json::to_string_pretty(&results) {
                        Ok(json) => println!("{json}"),
                        Err(err) => println!("[!] {}", err.to_string().red()),
                    }
                } else {
                    print_table(&results);
                }

                if let Some(path) = &self.output {
                    match report::write_csv(path, &results) {
                        Ok(_) => println!("[i] Ranking saved to '{}'", path.to_string_lossy()),
                        Err(err) => println!("[!] {}", err.to_string().red()),
                    }
                }

                let failed = results.iter().filter(|r| r.is_failed()).count();
                if failed > 0 {
                    println!(
                        "{}",
                        format!("[!] Analysis completed, {failed} of {} tickers failed", results.len())
                            .yellow()
                    );
                } else {
                    println!("{}", "[✔] Analysis completed".green());
                }
            }
            Err(err @ SrError::EmptyInput(_)) => {
                progress.finish_and_clear();
                println!("[!] {}", err.to_string().yellow());
            }
            Err(err) => {
                progress.finish_and_clear();
                println!("[!] {}", err.to_string().red());
            }
        }
    }
}

fn print_table(results: &[AnalysisResult]) {
    let table_data = report::table_data(results);

    let mut table = tabled::builder::Builder::from_iter(&table_data).build();
    table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
    table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
    table.modify(Columns::new(1..4), Alignment::right());

    let rating_column = report::COLUMNS.len() - 1;
    for (i, result) in results.iter().enumerate() {
        let color = match &result.rating {
            Assessment::Rated(Rating::VeryGood) | Assessment::Rated(Rating::Good) => {
                Color::FG_GREEN
            }
            Assessment::Rated(Rating::Mediocre) => Color::FG_YELLOW,
            Assessment::Rated(Rating::Bad) | Assessment::Failed(_) => Color::FG_RED,
            Assessment::NotEvaluated => Color::FG_BRIGHT_BLACK,
        };
        table.modify(Cell::new(i + 1, rating_column), color);
    }

    table.with(Width::wrap(Percent(100)).priority(Priority::max(true)));
    println!("{table}");
}
