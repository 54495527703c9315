use clap::Subcommand;

mod analyze;
mod check;
mod config;
mod gui;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Rank tickers by Sharpe ratio")]
    #[clap(visible_aliases = &["rank"])]
    Analyze(Box<analyze::AnalyzeCommand>),

    #[command(about = "Check the market data source, cache and settings")]
    Check(Box<check::CheckCommand>),

    #[command(subcommand, about = "Show or change the stored settings")]
    Config(config::ConfigCommand),

    #[command(about = "Open the analysis window")]
    Gui(Box<gui::GuiCommand>),
}
