pub const TRADE_DAYS_PER_YEAR: f64 = 252.0;

/// Simple (non-compounded) annualization of a mean daily return.
pub fn calc_annualized_mean_return(mean_daily_return: f64) -> f64 {
    mean_daily_return * TRADE_DAYS_PER_YEAR
}

pub fn calc_annualized_volatility(std_daily_return: f64) -> f64 {
    std_daily_return * TRADE_DAYS_PER_YEAR.sqrt()
}

/// Excess annual return over annualized volatility. `extra_return` is added to
/// the numerator as is. A zero volatility yields a non-finite value instead of
/// an error.
pub fn calc_sharpe_ratio(
    mean_daily_return: f64,
    std_daily_return: f64,
    risk_free_rate: f64,
    extra_return: f64,
) -> f64 {
    (calc_annualized_mean_return(mean_daily_return) + extra_return - risk_free_rate)
        / calc_annualized_volatility(std_daily_return)
}
