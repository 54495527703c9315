use std::sync::LazyLock;

use regex::Regex;

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9^=.\-]+$").expect("Invalid symbol pattern"));

/// Splits a comma separated ticker list, trimming every entry. Blank entries
/// (e.g. from a trailing comma) are dropped.
pub fn parse_tickers(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses several command-line arguments, each of which may itself be a comma
/// separated list.
pub fn parse_ticker_args(args: &[String]) -> Vec<String> {
    args.iter().flat_map(|arg| parse_tickers(arg)).collect()
}

/// Whether the symbol can be requested from the provider, e.g. `PETR4.SA`,
/// `^BVSP`, `BRL=X` or `BRK-B`.
pub fn is_valid_symbol(symbol: &str) -> bool {
    SYMBOL_PATTERN.is_match(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tickers() {
        assert_eq!(
            parse_tickers(" PETR4.SA, ITUB4.SA ,VALE3.SA"),
            ["PETR4.SA", "ITUB4.SA", "VALE3.SA"]
        );
        assert_eq!(parse_tickers("AAPL,"), ["AAPL"]);
        assert!(parse_tickers("").is_empty());
        assert!(parse_tickers(" , ,").is_empty());
    }

    #[test]
    fn test_parse_tickers_keeps_duplicates_and_order() {
        assert_eq!(parse_tickers("b,a,b"), ["b", "a", "b"]);
    }

    #[test]
    fn test_parse_ticker_args() {
        let args = vec!["AAPL,MSFT".to_string(), "PETR4.SA".to_string()];
        assert_eq!(parse_ticker_args(&args), ["AAPL", "MSFT", "PETR4.SA"]);
    }

    #[test]
    fn test_is_valid_symbol() {
        for symbol in ["PETR4.SA", "^BVSP", "BRL=X", "BRK-B", "aapl"] {
            assert!(is_valid_symbol(symbol), "{symbol}");
        }

        for symbol in ["", "A B", "../x", "AAPL/MSFT", "AAPL?x=1"] {
            assert!(!is_valid_symbol(symbol), "{symbol}");
        }
    }
}
