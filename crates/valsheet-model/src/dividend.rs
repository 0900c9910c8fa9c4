//! Dividend yield, growth and safety metrics
//!
//! Plain-data ratio battery over the statement pack. Unlike the DCF
//! model these produce a report struct, not a workbook: each metric is
//! straightforward arithmetic over line items, with [`Figure`] carrying
//! the holes (years with no dividend, line items a filing omits).

use tracing::warn;

use crate::error::ModelResult;
use crate::figures::{self, Figure};
use crate::statements::StatementPack;

/// Computed dividend metrics for one security
#[derive(Debug, Clone, PartialEq)]
pub struct DividendReport {
    pub dividend_yield_ttm: Figure,
    pub dividend_yield_fwd: Figure,
    pub dividend_yield_4y: Figure,
    pub earnings_yield_ttm: Figure,
    pub earnings_yield_fwd: Figure,
    pub yield_on_cost_1y: Figure,
    pub yield_on_cost_3y: Figure,
    pub yield_on_cost_5y: Figure,
    pub dps_growth_fwd: Figure,
    pub dps_growth_ltm: Figure,
    /// CAGR over the estimate years, with the span in periods
    pub dps_growth_next_years: Option<(f64, usize)>,
    pub dps_growth_past_3y: Option<f64>,
    pub dps_growth_past_5y: Option<f64>,
    pub cash_payout_ratio_ltm: Figure,
    pub payout_ratio_ltm: Figure,
    pub cash_flow_payout_ratio: Figure,
    pub price_over_nav: Figure,
    pub liability_to_asset: Figure,
    pub debt_to_equity: Figure,
    pub cash_to_short_term_debt: Figure,
}

/// Computes dividend metrics from a statement pack
pub struct DividendAnalysis<'a> {
    pack: &'a StatementPack,
    market_cap: f64,
    shares_out: Vec<Figure>,
    div_paid: Vec<Figure>,
}

fn last(figures: &[Figure]) -> Figure {
    figures.last().copied().unwrap_or_default()
}

/// The slice Python would call `v[-n..-1]`: `n - 1` elements ending just
/// before the final (LTM) entry
fn tail_window(figures: &[Figure], n: usize) -> &[Figure] {
    if figures.is_empty() || n < 2 {
        return &[];
    }
    let end = figures.len() - 1;
    &figures[end.saturating_sub(n - 1)..end]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl<'a> DividendAnalysis<'a> {
    /// Prepare an analysis; market cap is in millions, like the tables
    pub fn new(pack: &'a StatementPack, market_cap: f64) -> ModelResult<Self> {
        let shares_out = pack
            .income
            .match_title("Weighted Average Diluted Shares Outstanding")?
            .figures
            .clone();
        let div_paid = pack
            .cashflow
            .match_title("Common Dividends Paid")?
            .figures
            .clone();
        Ok(Self {
            pack,
            market_cap,
            shares_out,
            div_paid,
        })
    }

    /// Compute the full report
    pub fn compute(&self) -> ModelResult<DividendReport> {
        Ok(DividendReport {
            dividend_yield_ttm: self.dividend_yield_ttm(),
            dividend_yield_fwd: self.dividend_yield_fwd()?,
            dividend_yield_4y: self.dividend_yield_past_years()?,
            earnings_yield_ttm: self.earnings_yield_ttm()?,
            earnings_yield_fwd: self.earnings_yield_fwd()?,
            yield_on_cost_1y: self.yield_on_cost(2)?,
            yield_on_cost_3y: self.yield_on_cost(4)?,
            yield_on_cost_5y: self.yield_on_cost(6)?,
            dps_growth_fwd: self.dps_growth_chunked("NTM Dividend / Share")?,
            dps_growth_ltm: self.dps_growth_chunked("LTM Dividend Per Share")?,
            dps_growth_next_years: self.dps_growth_next_years()?,
            dps_growth_past_3y: self.dps_growth_past_years(3)?,
            dps_growth_past_5y: self.dps_growth_past_years(5)?,
            cash_payout_ratio_ltm: self.cash_payout_ratio_ltm()?,
            payout_ratio_ltm: self.payout_ratio_ltm()?,
            cash_flow_payout_ratio: self.cash_flow_payout_ratio()?,
            price_over_nav: self.price_over_nav()?,
            liability_to_asset: self.liability_to_asset()?,
            debt_to_equity: self.debt_to_equity()?,
            cash_to_short_term_debt: self.cash_to_short_term_debt()?,
        })
    }

    /// Trailing dividend yield: the LTM column is already annualized
    fn dividend_yield_ttm(&self) -> Figure {
        let dps = last(&self.div_paid).abs() / last(&self.shares_out);
        dps * last(&self.shares_out) / Figure::Known(self.market_cap)
    }

    fn dividend_yield_fwd(&self) -> ModelResult<Figure> {
        let row = self.pack.values.match_title("NTM Dividend Yield")?;
        Ok(last(&row.figures))
    }

    /// Average yield over the past four years; market cap arrives
    /// quarterly, so it collapses to yearly averages first
    fn dividend_yield_past_years(&self) -> ModelResult<Figure> {
        let market_cap = &self.pack.values.match_title("Market Cap")?.figures;
        let yearly_mc = figures::chunk_averages(market_cap, 4);

        let mut yields = Vec::new();
        for i in 1..=4usize {
            let Some(&paid) = self.div_paid.len().checked_sub(i).map(|k| &self.div_paid[k])
            else {
                break;
            };
            if !paid.is_known() {
                warn!(years_back = i, "no dividend was paid that year");
                yields.push(Figure::Known(0.0));
                continue;
            }
            let Some(&shares) = self.shares_out.len().checked_sub(i).map(|k| &self.shares_out[k])
            else {
                break;
            };
            let Some(&mc) = yearly_mc.len().checked_sub(i).map(|k| &yearly_mc[k]) else {
                break;
            };
            let dps = paid.abs() / shares;
            yields.push(dps * shares / Figure::Known(mc));
        }
        Ok(Figure::Known(figures::average(&yields)))
    }

    fn earnings_yield_ttm(&self) -> ModelResult<Figure> {
        let earnings = &self.pack.income.match_title("Net Income")?.figures;
        let writedown = self
            .pack
            .income
            .match_title_optional("Asset Writedown")?
            .map(|row| last(&row.figures))
            .unwrap_or_default();
        let eps = (last(earnings) - writedown) / last(&self.shares_out);
        Ok(eps * last(&self.shares_out) / Figure::Known(self.market_cap))
    }

    fn earnings_yield_fwd(&self) -> ModelResult<Figure> {
        let eps = self
            .pack
            .values
            .match_title("NTM Normalized Earnings Per Share")?;
        Ok(last(&eps.figures) * last(&self.shares_out) / Figure::Known(self.market_cap))
    }

    /// Yield on cost: current payout against the average purchase price
    /// `n - 1` years back
    fn yield_on_cost(&self, n: usize) -> ModelResult<Figure> {
        let price = &self.pack.values.match_title("Price$")?.figures;
        let yearly_price: Vec<Figure> = figures::chunk_averages(price, 4)
            .into_iter()
            .map(Figure::Known)
            .collect();

        let dps = Figure::Known(figures::average(tail_window(&self.div_paid, n))).abs()
            / Figure::Known(figures::average(tail_window(&self.shares_out, n)));
        Ok(dps / Figure::Known(figures::average(tail_window(&yearly_price, n))))
    }

    /// DPS growth from quarterly columns: latest year's average over the
    /// year before
    fn dps_growth_chunked(&self, title: &str) -> ModelResult<Figure> {
        let dps = &self.pack.values.match_title(title)?.figures;
        if dps.len() < 8 {
            return Ok(Figure::Unknown);
        }
        let recent = figures::average(&dps[dps.len() - 4..]);
        let prior = figures::average(&dps[dps.len() - 8..dps.len() - 4]);
        Ok(match Figure::Known(recent) / Figure::Known(prior) {
            Figure::Known(ratio) => Figure::Known(ratio - 1.0),
            Figure::Unknown => Figure::Unknown,
        })
    }

    fn dps_growth_next_years(&self) -> ModelResult<Option<(f64, usize)>> {
        let Some(pairs) = self.pack.trim_estimates_dated("Dividend Per Share")? else {
            return Ok(None);
        };
        let values: Vec<f64> = pairs.iter().map(|(v, _)| *v).collect();
        Ok(figures::cagr(&values).map(|growth| (growth, values.len())))
    }

    fn dps_growth_past_years(&self, n_years: usize) -> ModelResult<Option<f64>> {
        let dps = &self.pack.income.match_title("Dividends per share")?.figures;
        if dps.len() < n_years {
            return Ok(None);
        }
        let window = &dps[dps.len() - n_years..];
        // Years before the dividend started count as missing, not zero.
        let trimmed: Vec<f64> = window
            .iter()
            .skip_while(|f| !f.is_known())
            .filter_map(|f| f.known())
            .collect();
        if trimmed.len() < window.len() {
            warn!(
                short = window.len() - trimmed.len(),
                "dividend history shorter than requested"
            );
        }
        Ok(figures::cagr(&trimmed))
    }

    fn cash_payout_ratio_ltm(&self) -> ModelResult<Figure> {
        let net_income = &self.pack.income.match_title("Net Income$")?.figures;
        let writedown = self
            .pack
            .income
            .match_title_optional("Asset Writedown")?
            .map(|row| last(&row.figures))
            .unwrap_or_default();
        let paid = Figure::Known(0.0) - last(&self.div_paid);
        Ok(paid / (last(net_income) - writedown))
    }

    fn payout_ratio_ltm(&self) -> ModelResult<Figure> {
        let dps = &self.pack.income.match_title("Dividends per share")?.figures;
        let eps = &self.pack.income.match_title("Diluted EPS")?.figures;
        Ok(last(dps) / last(eps))
    }

    /// Cash-flow payout; REIT acquisition outflows fold into the
    /// denominator when the line exists
    fn cash_flow_payout_ratio(&self) -> ModelResult<Figure> {
        let cfo = &self.pack.cashflow.match_title("Cash from Operations")?.figures;
        let acquisitions = self
            .pack
            .cashflow
            .match_title_optional("Acquisition of Real Estate Assets")?
            .map(|row| last(&row.figures))
            .unwrap_or_default();
        let paid = Figure::Known(0.0) - last(&self.div_paid);
        Ok(paid / (last(cfo) - acquisitions))
    }

    fn price_over_nav(&self) -> ModelResult<Figure> {
        let book = &self.pack.balance.match_title("Tangible Book Value")?.figures;
        Ok(Figure::Known(self.market_cap) / last(book))
    }

    fn liability_to_asset(&self) -> ModelResult<Figure> {
        let liabilities = &self.pack.balance.match_title("Total Liabilities")?.figures;
        let assets = &self.pack.balance.match_title("Total Assets")?.figures;
        Ok(last(liabilities) / last(assets))
    }

    fn debt_to_equity(&self) -> ModelResult<Figure> {
        let debt = &self.pack.balance.match_title("Total Debt")?.figures;
        let equity = &self.pack.balance.match_title("Total Equity")?.figures;
        Ok(last(debt) / last(equity))
    }

    fn cash_to_short_term_debt(&self) -> ModelResult<Figure> {
        let cash = &self.pack.balance.match_title("Cash And Equivalents")?.figures;
        let current_debt = self
            .pack
            .balance
            .match_title_optional("Current Portion of Long-Term Debt")?
            .map(|row| last(&row.figures))
            .unwrap_or_default();
        Ok(last(cash) / current_debt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::Table;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    fn pack() -> StatementPack {
        StatementPack {
            company: Some("Test REIT".into()),
            income: table(
                "Income,12/20,12/21,12/22,LTM\n\
                 Net Income,80,90,100,100\n\
                 Weighted Average Diluted Shares Outstanding,50,50,50,50\n\
                 Dividends per share,1.0,1.1,1.21,1.21\n\
                 Diluted EPS,1.6,1.8,2.0,2.0\n",
            ),
            balance: table(
                "Balance,12/20,12/21,12/22,LTM\n\
                 Total Liabilities,400,420,440,440\n\
                 Total Assets,1000,1050,1100,1100\n\
                 Total Debt,300,310,320,320\n\
                 Total Equity,500,520,540,540\n\
                 Tangible Book Value,450,470,490,490\n\
                 Cash And Equivalents,60,70,80,80\n",
            ),
            cashflow: table(
                "Cashflow,12/20,12/21,12/22,LTM\n\
                 Cash from Operations,120,130,140,140\n\
                 Common Dividends Paid,-50,-55,-60,-60\n",
            ),
            values: table(
                "Values,q1,q2,q3,q4,q5,q6,q7,q8\n\
                 Market Cap,900,950,1000,1050,1100,1150,1200,1250\n\
                 Price,18,19,20,21,22,23,24,25\n\
                 NTM Dividend Yield,0.05,0.05,0.05,0.05,0.05,0.05,0.05,0.05\n\
                 NTM Normalized Earnings Per Share,2,2,2,2,2,2,2.1,2.1\n\
                 NTM Dividend / Share,1.0,1.0,1.0,1.0,1.1,1.1,1.1,1.1\n\
                 LTM Dividend Per Share,0.9,0.9,0.9,0.9,1.0,1.0,1.0,1.0\n",
            ),
            estimates: table(
                "Estimates,12/22 A,12/23 E,12/24 E\n\
                 Dividend Per Share,1.21,1.3,1.4\n",
            ),
        }
    }

    #[test]
    fn test_dividend_yield_ttm() {
        let pack = pack();
        let analysis = DividendAnalysis::new(&pack, 1200.0).unwrap();
        let report = analysis.compute().unwrap();

        // |−60| / 1200 market cap
        assert_eq!(report.dividend_yield_ttm, Figure::Known(0.05));
    }

    #[test]
    fn test_payout_ratios() {
        let pack = pack();
        let analysis = DividendAnalysis::new(&pack, 1200.0).unwrap();
        let report = analysis.compute().unwrap();

        assert_eq!(report.payout_ratio_ltm, Figure::Known(1.21 / 2.0));
        assert_eq!(report.cash_payout_ratio_ltm, Figure::Known(0.6));
        // 60 / 140 with no REIT acquisition line
        assert_eq!(report.cash_flow_payout_ratio, Figure::Known(60.0 / 140.0));
    }

    #[test]
    fn test_dps_growth_chunked() {
        let pack = pack();
        let analysis = DividendAnalysis::new(&pack, 1200.0).unwrap();
        let report = analysis.compute().unwrap();

        // 1.1 average over 1.0 average
        let expected = 1.1 / 1.0 - 1.0;
        match report.dps_growth_fwd {
            Figure::Known(v) => assert!((v - expected).abs() < 1e-12),
            Figure::Unknown => panic!("expected a known growth figure"),
        }
    }

    #[test]
    fn test_dps_growth_next_years() {
        let pack = pack();
        let analysis = DividendAnalysis::new(&pack, 1200.0).unwrap();
        let report = analysis.compute().unwrap();

        let (growth, years) = report.dps_growth_next_years.unwrap();
        assert_eq!(years, 2);
        assert!(growth > 0.0);
    }

    #[test]
    fn test_balance_sheet_safety() {
        let pack = pack();
        let analysis = DividendAnalysis::new(&pack, 1200.0).unwrap();
        let report = analysis.compute().unwrap();

        assert_eq!(report.liability_to_asset, Figure::Known(0.4));
        assert_eq!(report.debt_to_equity, Figure::Known(320.0 / 540.0));
        // Missing short-term debt line propagates Unknown, not a crash.
        assert_eq!(report.cash_to_short_term_debt, Figure::Unknown);
    }

    #[test]
    fn test_missing_dividend_line_is_a_fault() {
        let mut pack = pack();
        pack.cashflow = table("Cashflow,12/20\nCash from Operations,120\n");
        assert!(DividendAnalysis::new(&pack, 1200.0).is_err());
    }
}
