use crate::domain::analysis::{AnalysisResult, RiskLevel};
use crate::domain::portfolio::Portfolio;
use crate::reference::ReferenceTable;

pub const DIVERSIFIED_MESSAGE: &str =
    "Your portfolio is well-diversified. Keep holding your stocks.";
pub const CONCENTRATION_MESSAGE: &str = "Your portfolio is highly concentrated in one stock. \
     Consider reducing your position or diversifying.";
pub const IT_SECTOR_GAP_MESSAGE: &str =
    "Your portfolio lacks representation in the IT sector. Consider adding INFOSYS.";

pub const IT_SECTOR_TICKERS: [&str; 2] = ["TCS", "INFY"];
pub const IT_SECTOR_SUGGESTION: &str = "INFOSYS";

/// Strictly above this P/E a holding is flagged.
pub const HIGH_PE_THRESHOLD: f64 = 40.0;

/// Applies the concentration, IT-sector and P/E rules in that order. Each rule
/// overwrites the risk level set by the previous ones; the P/E rule appends to
/// the message instead of replacing it.
pub fn analyze_portfolio(portfolio: &Portfolio, reference: &ReferenceTable) -> AnalysisResult {
    let mut message = DIVERSIFIED_MESSAGE.to_string();
    let mut risk_level = RiskLevel::Low;
    let mut suggested_stocks = Vec::new();

    if is_over_concentrated(portfolio) {
        message = CONCENTRATION_MESSAGE.to_string();
        risk_level = RiskLevel::High;
    }

    // Replaces a concentration "high" with "medium" as well.
    if !IT_SECTOR_TICKERS.iter().any(|t| portfolio.contains(t)) {
        message = IT_SECTOR_GAP_MESSAGE.to_string();
        suggested_stocks.push(IT_SECTOR_SUGGESTION.to_string());
        risk_level = RiskLevel::Medium;
    }

    for row in reference.rows() {
        let high_pe = row.pe_ratio.is_some_and(|pe| pe > HIGH_PE_THRESHOLD);
        if high_pe && portfolio.contains(&row.symbol) {
            message.push_str(&format!(
                " The P/E ratio for {} is high. Consider reducing your position.",
                row.symbol
            ));
            risk_level = RiskLevel::High;
        }
    }

    AnalysisResult {
        message,
        risk_level,
        suggested_stocks,
    }
}

fn is_over_concentrated(portfolio: &Portfolio) -> bool {
    let total = portfolio.total_shares();
    if total == 0 {
        return false;
    }
    // quantity / total > 0.5, without floating point.
    portfolio.iter().any(|(_, q)| u128::from(q) * 2 > total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::parse_portfolio;
    use crate::reference::types::StockRow;

    fn row(symbol: &str, pe_ratio: Option<f64>) -> StockRow {
        StockRow {
            symbol: symbol.to_string(),
            name: None,
            sector: None,
            pe_ratio,
        }
    }

    fn reference() -> ReferenceTable {
        ReferenceTable::from_rows(vec![
            row("TCS", Some(30.0)),
            row("INFY", Some(28.5)),
            row("ZOMATO", Some(120.0)),
            row("RELI", Some(45.0)),
            row("HDFC", Some(40.0)),
            row("NYKAA", None),
        ])
        .unwrap()
    }

    #[test]
    fn balanced_it_portfolio_is_low_risk() {
        let result = analyze_portfolio(&parse_portfolio("TCS: 10, INFY: 10"), &reference());
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.message, DIVERSIFIED_MESSAGE);
        assert!(result.suggested_stocks.is_empty());
    }

    #[test]
    fn concentration_is_high_when_it_sector_present() {
        let result = analyze_portfolio(&parse_portfolio("TCS: 60, HDFC: 40"), &reference());
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.message, CONCENTRATION_MESSAGE);
        assert!(result.suggested_stocks.is_empty());
    }

    #[test]
    fn exactly_half_is_not_concentrated() {
        let result = analyze_portfolio(&parse_portfolio("TCS: 50, HDFC: 50"), &reference());
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn sector_gap_downgrades_concentration_to_medium() {
        let result = analyze_portfolio(&parse_portfolio("A: 60, B: 40"), &reference());
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.message, IT_SECTOR_GAP_MESSAGE);
        assert_eq!(result.suggested_stocks, vec!["INFOSYS".to_string()]);
    }

    #[test]
    fn empty_portfolio_hits_sector_gap() {
        let result = analyze_portfolio(&Portfolio::new(), &reference());
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.suggested_stocks, vec!["INFOSYS".to_string()]);
    }

    #[test]
    fn empty_portfolio_with_empty_reference_still_checks_sector() {
        let result = analyze_portfolio(&Portfolio::new(), &ReferenceTable::default());
        assert_eq!(result.message, IT_SECTOR_GAP_MESSAGE);
    }

    #[test]
    fn high_pe_forces_high_and_appends_in_reference_order() {
        let result = analyze_portfolio(&parse_portfolio("RELI: 1, ZOMATO: 1"), &reference());
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(
            result.message,
            format!(
                "{IT_SECTOR_GAP_MESSAGE} \
                 The P/E ratio for ZOMATO is high. Consider reducing your position. \
                 The P/E ratio for RELI is high. Consider reducing your position."
            )
        );
        assert_eq!(result.suggested_stocks, vec!["INFOSYS".to_string()]);
    }

    #[test]
    fn pe_threshold_is_strict_and_unknown_pe_is_ignored() {
        let result = analyze_portfolio(&parse_portfolio("TCS: 1, HDFC: 1, NYKAA: 1"), &reference());
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.message, DIVERSIFIED_MESSAGE);
    }

    #[test]
    fn tickers_missing_from_reference_are_ignored_by_pe_screen() {
        let result = analyze_portfolio(&parse_portfolio("TCS: 1, INFY: 1, XYZ: 1"), &reference());
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn analysis_is_idempotent() {
        let portfolio = parse_portfolio("RELI: 90, INFY: 10");
        let table = reference();
        let first = analyze_portfolio(&portfolio, &table);
        let second = analyze_portfolio(&portfolio, &table);
        assert_eq!(first, second);
        assert_eq!(first.risk_level, RiskLevel::High);
        assert!(first.message.starts_with(CONCENTRATION_MESSAGE));
    }
}
