//! DCF model builder
//!
//! Builds a live discounted-cash-flow workbook for one security: twelve
//! regular period columns plus a terminal-year column, every derived
//! cell a formula referencing its inputs by coordinate, so the saved
//! artifact recomputes when an assumption cell is edited.
//!
//! The overall shape: revenue grows at the estimate-era rate, then
//! glides down to the risk-free rate by the terminal year; margins hold;
//! the tax rate converges to the country marginal rate; reinvestment
//! follows sales growth through the sales-to-capital ratio; FCFF
//! discounts through a cumulated factor built from a WACC that glides to
//! riskfree + mature-market ERP; and a scalar block folds the pieces
//! into an estimated value per share.

use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};
use crate::figures::{self, Figure};
use crate::inputs::MarketInputs;
use crate::series::{ModelSheet, SeriesEntry};
use crate::statements::StatementPack;
use valsheet_core::{CellAddress, SheetLayout, Style};
use valsheet_formula::Expr;

/// Fixed row positions of the model sheet
mod row {
    pub const YEAR: u32 = 1;
    pub const SALES_GROWTH: u32 = 2;
    pub const SALES: u32 = 3;
    pub const EBIT_MARGIN: u32 = 4;
    pub const EBIT: u32 = 5;
    pub const TAX_RATE: u32 = 6;
    pub const NOPAT: u32 = 7;
    pub const REINVESTMENT: u32 = 8;
    pub const FCFF: u32 = 9;
    // 10: spacing
    pub const COST_OF_CAPITAL: u32 = 11;
    pub const CUMULATED_DF: u32 = 12;
    pub const PV_FCFF: u32 = 13;
    /// Scalars roll downward from the row after this one
    pub const SCALAR_BLOCK: u32 = 14;

    pub const RETURNS: u32 = 32;
    pub const INVESTED_CAPITAL: u32 = 33;
    pub const ROIC: u32 = 34;

    pub const TRADE_YEAR: u32 = 36;
    pub const TRADE_SALES_GROWTH: u32 = 37;
    pub const TRADE_SALES: u32 = 38;
    pub const TRADE_EBIT: u32 = 39;
    pub const TRADE_INTEREST_EXPENSE: u32 = 40;
    pub const TRADE_EPS_PROJECTION: u32 = 41;
    pub const TRADE_ADR_RATIO: u32 = 42;
    pub const TRADE_ADR_CONVERT: u32 = 43;
    pub const TRADE_PE_RATIO: u32 = 44;
    pub const TRADE_PRICE_TARGET: u32 = 45;
}

fn at(col: u32, row: u32) -> Expr {
    Expr::cell(CellAddress::new(row, col))
}

fn num(v: f64) -> Expr {
    Expr::num(v)
}

/// Builds the DCF model sheet for one security
#[derive(Debug)]
pub struct DcfBuilder {
    ticker: String,
    layout: SheetLayout,
    inputs: MarketInputs,

    sales: Vec<Figure>,
    forward_sales: Vec<f64>,
    forward_ebit: Vec<f64>,
    forward_interest: Vec<f64>,
    interest_expense: Vec<Figure>,
    book_value_equity: Vec<Figure>,
    book_value_debt: Vec<Figure>,
    cash: Vec<Figure>,
    investments: Option<Vec<Figure>>,
    shares: Vec<Figure>,
    forward_etr: Option<Vec<f64>>,
}

impl DcfBuilder {
    /// Extract everything the model needs from the statement pack
    pub fn new(
        ticker: &str,
        pack: &StatementPack,
        inputs: MarketInputs,
    ) -> ModelResult<Self> {
        let layout = SheetLayout::default();

        let sales = pack.income.match_title("Total Revenues")?.figures.clone();
        let forward_sales = pack
            .trim_estimates("Revenue")?
            .ok_or_else(|| ModelError::Invalid("no forward revenue estimates".into()))?;
        let forward_ebit = pack
            .trim_estimates("EBIT$")?
            .ok_or_else(|| ModelError::Invalid("no forward EBIT estimates".into()))?;
        let forward_interest = pack.trim_estimates("Interest Expense")?.unwrap_or_default();

        // The revenue roll assumes the estimate era plus the stable and
        // glide years fill the regular columns exactly.
        let expected = layout.total_columns as usize - 8;
        if forward_sales.len() != expected {
            return Err(ModelError::Invalid(format!(
                "expected {} forward revenue figures (base year included), got {}",
                expected,
                forward_sales.len()
            )));
        }
        if forward_ebit.is_empty() || forward_ebit.len() as u32 >= layout.total_columns {
            return Err(ModelError::Invalid(format!(
                "forward EBIT estimates must cover 1..{} periods, got {}",
                layout.total_columns,
                forward_ebit.len()
            )));
        }

        let interest_expense = pack.income.match_title("Interest Expense")?.figures.clone();
        let book_value_equity = pack.balance.match_title("Total Equity")?.figures.clone();
        let book_value_debt = pack.balance.match_title("Total Debt")?.figures.clone();

        let cash = match pack.balance.match_title_optional("Total Cash")? {
            Some(cash) => cash.figures.clone(),
            None => pack
                .balance
                .match_title("Cash And Equivalents")?
                .figures
                .clone(),
        };

        let investments = pack
            .balance
            .match_title_optional("Long-term Investments")?
            .map(|row| row.figures.clone());

        let shares = pack
            .income
            .match_title("Weighted Average Diluted Shares Outstanding")?
            .figures
            .clone();

        let forward_etr = pack
            .trim_estimates("Effective Tax Rate")?
            .filter(|v| !v.is_empty());

        Ok(Self {
            ticker: ticker.to_string(),
            layout,
            inputs,
            sales,
            forward_sales,
            forward_ebit,
            forward_interest,
            interest_expense,
            book_value_equity,
            book_value_debt,
            cash,
            investments,
            shares,
            forward_etr,
        })
    }

    /// Build the model sheet
    pub fn build(&self) -> ModelResult<ModelSheet> {
        let mut sheet = ModelSheet::new(&self.ticker, self.layout);
        self.compute_revenue(&mut sheet)?;
        self.compute_ebit(&mut sheet)?;
        self.compute_tax(&mut sheet)?;
        self.compute_nopat(&mut sheet)?;
        self.compute_reinvestment(&mut sheet)?;
        self.compute_fcff(&mut sheet)?;
        self.compute_cost_of_capital(&mut sheet)?;
        self.compute_cumulated_df(&mut sheet)?;
        self.compute_terminals(&mut sheet)?;
        self.compute_invested_capital(&mut sheet)?;
        self.compute_trade(&mut sheet)?;
        Ok(sheet)
    }

    fn compute_revenue(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;
        let half_col = self.layout.half_columns();
        let half_elem = self.layout.window_len() / 2;
        let half_base = half_elem + 2;
        let last_col = self.layout.last_regular_column();
        let term_col = self.layout.terminal_column();

        let mut growth =
            sheet.create_series("Revenue growth rate", row::SALES_GROWTH, Style::Percent)?;
        let mut sales = sheet.create_series("Revenue", row::SALES, Style::Comma)?;

        // Estimate era: growth from consecutive revenue cells, base year
        // pinned at zero.
        let n_fwd = self.forward_sales.len() as u32;
        for i in 0..n_fwd {
            if i != 0 {
                let cur = at(i + start, row::SALES);
                let prev = at(i + start - 1, row::SALES);
                sheet.append(&mut growth, (cur - prev.clone()) / prev)?;
            } else {
                sheet.append(&mut growth, 0.0)?;
            }
            sheet.append(&mut sales, self.forward_sales[i as usize])?;
        }

        // Two stable years carrying the last estimated rate forward.
        let forward_end = n_fwd + 1;
        let mut current_sales =
            at(forward_end, row::SALES) * (num(1.0) + at(n_fwd + start, row::SALES_GROWTH));
        for i in (n_fwd - 1)..forward_end {
            sheet.append(&mut growth, at(forward_end, row::SALES_GROWTH))?;
            sheet.append(&mut sales, current_sales)?;
            current_sales =
                at(n_fwd + i - 1, row::SALES) * (num(1.0) + at(n_fwd + i, row::SALES_GROWTH));
        }

        // Back half: the rate glides from stable growth down to the
        // risk-free terminal rate, one fifth per year.
        let term_rate = self.inputs.riskfree_rate;
        for n in 1..half_col {
            let anchor = at(half_col + n, row::SALES_GROWTH);
            sheet.append(
                &mut growth,
                anchor.clone()
                    - (anchor - num(term_rate)) / num(half_elem as f64) * num(n as f64),
            )?;
            sheet.append(
                &mut sales,
                at(half_col + n, row::SALES) * (num(1.0) + at(half_base + n, row::SALES_GROWTH)),
            )?;
        }

        // Terminal period: fully glided, stagnated growth.
        let anchor = at(last_col, row::SALES_GROWTH);
        sheet.append(
            &mut growth,
            anchor.clone()
                - (anchor - num(term_rate)) / num(half_elem as f64) * num(half_elem as f64),
        )?;
        sheet.append(
            &mut sales,
            at(last_col, row::SALES) * (num(1.0) + at(term_col, row::SALES_GROWTH)),
        )?;

        Ok(())
    }

    fn compute_ebit(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;
        let half_col = self.layout.half_columns();
        let term_col = self.layout.terminal_column();

        let mut margin = sheet.create_series("EBIT margin", row::EBIT_MARGIN, Style::Percent)?;
        let mut ebit = sheet.create_series("EBIT", row::EBIT, Style::Comma)?;

        for (i, &e) in self.forward_ebit.iter().enumerate() {
            let col = i as u32 + start;
            sheet.append(&mut margin, at(col, row::EBIT) / at(col, row::SALES))?;
            sheet.append(&mut ebit, e)?;
        }

        // Margin holds at its last estimated level from here out.
        let fixed_margin = at(half_col - 1, row::EBIT_MARGIN);
        let remaining = self.layout.total_columns - self.forward_ebit.len() as u32;
        for i in 1..remaining {
            sheet.append(&mut margin, fixed_margin.clone())?;
            let col = i + half_col - 1;
            sheet.append(&mut ebit, at(col, row::EBIT_MARGIN) * at(col, row::SALES))?;
        }
        sheet.append(&mut margin, fixed_margin)?;
        sheet.append(
            &mut ebit,
            at(term_col, row::EBIT_MARGIN) * at(term_col, row::SALES),
        )?;

        Ok(())
    }

    fn compute_tax(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;
        let half_col = self.layout.half_columns();
        let half_elem = self.layout.window_len() / 2;
        let half_base = half_elem + 2;

        let mut etr = sheet.create_series("Tax rate", row::TAX_RATE, Style::Percent)?;

        let Some(forward_etr) = &self.forward_etr else {
            warn!(
                ticker = %self.ticker,
                "no effective tax rate estimates; is this a REIT? distributions \
                 are taxed at the unit holder, so the tax series stays empty"
            );
            return Ok(());
        };

        // Estimate era, percent-scaled.
        for &e in forward_etr {
            sheet.append(&mut etr, e / 100.0)?;
        }

        // Hold the last estimated rate through the front half.
        let n = forward_etr.len() as u32;
        let anchor = at(n - 1 + start, row::TAX_RATE);
        for _ in n..half_col {
            sheet.append(&mut etr, anchor.clone())?;
        }

        // Back half: converge toward the country marginal rate.
        let tax_anchor = at(half_base, row::TAX_RATE);
        for i in 1..half_col {
            let prev = at(i + half_col, row::TAX_RATE);
            sheet.append(
                &mut etr,
                prev + (num(self.inputs.marginal_tax_rate) - tax_anchor.clone())
                    / num(half_elem as f64),
            )?;
        }
        sheet.append(&mut etr, at(half_elem + half_base, row::TAX_RATE))?;

        Ok(())
    }

    fn compute_nopat(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;
        let mut nopat = sheet.create_series("NOPAT", row::NOPAT, Style::Comma)?;
        for i in 0..self.layout.total_columns {
            let col = i + start;
            sheet.append(
                &mut nopat,
                at(col, row::EBIT) * (num(1.0) - at(col, row::TAX_RATE)),
            )?;
        }
        Ok(())
    }

    fn compute_reinvestment(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;
        let term_col = self.layout.terminal_column();

        let source_ratio = figures::latest(&self.sales) / figures::latest(&self.book_value_equity);
        debug!(
            computed = source_ratio.or_zero(),
            applied = self.inputs.sales_to_capital,
            "sales-to-capital ratio"
        );
        let ratio = self.inputs.sales_to_capital;

        let mut reinvestment =
            sheet.create_series("- Reinvestment", row::REINVESTMENT, Style::Comma)?;
        // No reinvestment figure for the base year.
        sheet.append(&mut reinvestment, SeriesEntry::Blank)?;
        for i in 1..=self.layout.window_len() {
            sheet.append(
                &mut reinvestment,
                (at(i + start + 1, row::SALES) - at(i + start, row::SALES)) / num(ratio),
            )?;
        }

        // Terminal reinvestment: terminal growth over terminal ROIC,
        // applied to terminal NOPAT.
        let growth = sheet.get("Revenue growth rate")?;
        sheet.append(
            &mut reinvestment,
            Expr::cell(growth.last_ref()) / num(self.inputs.terminal_roic)
                * at(term_col, row::NOPAT),
        )?;

        Ok(())
    }

    fn compute_fcff(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let mut fcff = sheet.create_series("FCFF", row::FCFF, Style::Comma)?;
        sheet.append(&mut fcff, SeriesEntry::Blank)?;
        for i in 2..=self.layout.total_columns {
            let col = i + 1;
            sheet.append(
                &mut fcff,
                at(col, row::NOPAT) - at(col, row::REINVESTMENT),
            )?;
        }
        Ok(())
    }

    fn compute_cost_of_capital(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;
        let half_col = self.layout.half_columns();
        let half_elem = self.layout.window_len() / 2;
        let half_base = half_elem + 2;

        // Cost of debt from the latest reported interest burden. The tax
        // shield only applies when the company pays tax at all.
        let interest = self
            .interest_expense
            .last()
            .copied()
            .unwrap_or_default()
            .or_zero();
        let debt = self
            .book_value_debt
            .last()
            .copied()
            .unwrap_or_default()
            .or_zero();
        let pretax_cost_of_debt = if debt > 0.0 {
            (interest / debt).abs()
        } else {
            0.0
        };
        let cost_of_debt = match &self.forward_etr {
            None => num(pretax_cost_of_debt),
            Some(etr) => {
                let avg_etr = etr.iter().sum::<f64>() / etr.len() as f64;
                num(pretax_cost_of_debt) * (num(1.0) - num(avg_etr) / num(100.0))
            }
        };

        // CAPM cost of equity.
        let beta = self.inputs.beta.unwrap_or_else(|| {
            warn!(ticker = %self.ticker, "beta unavailable; defaulting to 1.0");
            1.0
        });
        let rf = self.inputs.riskfree_rate;
        let cost_of_equity = num(rf) + num(beta) * num(self.inputs.equity_risk_premium);

        // Weight by market value of equity and book debt.
        let mcap = self.inputs.market_cap;
        let total_cap = num(mcap) + num(debt);
        let initial_coc = num(mcap) / total_cap.clone() * cost_of_equity
            + num(debt) / total_cap * cost_of_debt;

        let mut coc =
            sheet.create_series("Cost of capital", row::COST_OF_CAPITAL, Style::Percent)?;
        sheet.append(&mut coc, SeriesEntry::Blank)?;
        sheet.append(&mut coc, initial_coc.clone())?;
        for j in 1..half_elem {
            sheet.append(&mut coc, at(j + start, row::COST_OF_CAPITAL))?;
        }

        // Glide toward riskfree + mature-market ERP (+ country risk).
        let prev_coc = at(half_base, row::COST_OF_CAPITAL);
        let total_erp = self.inputs.country_risk_premium + self.inputs.mature_market_erp;
        for _ in 1..half_col {
            sheet.append(
                &mut coc,
                prev_coc.clone()
                    - (initial_coc.clone() - (num(rf) + num(total_erp)))
                        / num(half_elem as f64),
            )?;
        }
        sheet.append(&mut coc, num(rf) + num(self.inputs.mature_market_erp))?;

        Ok(())
    }

    fn compute_cumulated_df(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;

        let mut cdf =
            sheet.create_series("Cumulated discount factor", row::CUMULATED_DF, Style::Comma)?;
        sheet.append(&mut cdf, 1.0)?;
        let mut pv = sheet.create_series("PV (FCFF)", row::PV_FCFF, Style::Comma)?;
        sheet.append(&mut pv, SeriesEntry::Blank)?;

        for i in 0..self.layout.total_columns - 2 {
            sheet.append(
                &mut cdf,
                at(i + start, row::CUMULATED_DF) * num(1.0)
                    / (num(1.0) + at(i + start + 1, row::COST_OF_CAPITAL)),
            )?;
            sheet.append(
                &mut pv,
                at(i + start + 1, row::FCFF) * at(i + start + 1, row::CUMULATED_DF),
            )?;
        }

        Ok(())
    }

    fn compute_terminals(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let mut roll = row::SCALAR_BLOCK;
        let mut next_row = move || {
            roll += 1;
            roll
        };

        let fcff = sheet.get("FCFF")?;
        let coc = sheet.get("Cost of capital")?;
        let growth = sheet.get("Revenue growth rate")?;
        let cdf = sheet.get("Cumulated discount factor")?;

        sheet.set(
            "Terminal cash flow",
            Expr::cell(fcff.last_ref()),
            next_row(),
            Style::Comma,
        )?;
        sheet.set(
            "Terminal cost of capital",
            Expr::cell(coc.last_ref()),
            next_row(),
            Style::Percent,
        )?;

        let tcf = sheet.get("Terminal cash flow")?;
        let tcoc = sheet.get("Terminal cost of capital")?;
        sheet.set(
            "Terminal value",
            Expr::cell(tcf.value_ref())
                / (Expr::cell(tcoc.value_ref()) - Expr::cell(growth.last_ref())),
            next_row(),
            Style::Comma,
        )?;

        let tv = sheet.get("Terminal value")?;
        sheet.set(
            "PV (Terminal value)",
            Expr::cell(tv.value_ref()) * Expr::cell(cdf.second_last_ref()),
            next_row(),
            Style::Comma,
        )?;

        let pv_fcff = sheet.get("PV (FCFF)")?;
        sheet.set(
            "PV (Cash flow over next 10 years)",
            Expr::sum(pv_fcff.window()),
            next_row(),
            Style::Comma,
        )?;

        let pv_tv = sheet.get("PV (Terminal value)")?;
        let pv_10y = sheet.get("PV (Cash flow over next 10 years)")?;
        sheet.set(
            "Sum of PV",
            Expr::cell(pv_tv.value_ref()) + Expr::cell(pv_10y.value_ref()),
            next_row(),
            Style::Comma,
        )?;

        let sum_pv = sheet.get("Sum of PV")?;
        sheet.set(
            "Value of operating assets",
            Expr::cell(sum_pv.value_ref()),
            next_row(),
            Style::Comma,
        )?;

        let debt = self
            .book_value_debt
            .last()
            .copied()
            .unwrap_or_default()
            .or_zero();
        sheet.set("- Debt", debt, next_row(), Style::Comma)?;
        sheet.set("- Minority interest", 0.0, next_row(), Style::Comma)?;
        sheet.set(
            "+ Cash",
            self.cash.last().copied().unwrap_or_default().or_zero(),
            next_row(),
            Style::Comma,
        )?;

        let non_op = match &self.investments {
            Some(inv) => {
                let last = inv.last().copied().unwrap_or_default();
                if last.is_known() {
                    last.or_zero()
                } else if inv.len() >= 2 && inv[inv.len() - 2].is_known() {
                    warn!(
                        ticker = %self.ticker,
                        "latest long-term investments not reported; falling back to the prior year"
                    );
                    inv[inv.len() - 2].or_zero()
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        sheet.set("+ Non-operating assets", non_op, next_row(), Style::Comma)?;

        let voa = sheet.get("Value of operating assets")?;
        let debt_entry = sheet.get("- Debt")?;
        let minority = sheet.get("- Minority interest")?;
        let cash_entry = sheet.get("+ Cash")?;
        let non_op_entry = sheet.get("+ Non-operating assets")?;
        sheet.set(
            "Value of equity",
            Expr::cell(voa.value_ref()) - Expr::cell(debt_entry.value_ref())
                - Expr::cell(minority.value_ref())
                + Expr::cell(cash_entry.value_ref())
                + Expr::cell(non_op_entry.value_ref()),
            next_row(),
            Style::Comma,
        )?;

        sheet.set(
            "Number of shares",
            self.shares.last().copied().unwrap_or_default().or_zero(),
            next_row(),
            Style::Comma,
        )?;

        let voe = sheet.get("Value of equity")?;
        let shares = sheet.get("Number of shares")?;
        sheet.set(
            "Estimated value / share",
            Expr::cell(voe.value_ref()) / Expr::cell(shares.value_ref()),
            next_row(),
            Style::Comma,
        )?;

        sheet.set("Price", self.inputs.price, next_row(), Style::Comma)?;

        let price = sheet.get("Price")?;
        let value_per_share = sheet.get("Estimated value / share")?;
        sheet.set(
            "Price as % of value",
            Expr::cell(price.value_ref()) / Expr::cell(value_per_share.value_ref()),
            next_row(),
            Style::Percent,
        )?;

        Ok(())
    }

    fn compute_invested_capital(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;

        sheet.add_label("Return", row::RETURNS)?;
        let mut ic =
            sheet.create_series("Invested Capital", row::INVESTED_CAPITAL, Style::Comma)?;

        let book_value_debt = self
            .book_value_debt
            .last()
            .copied()
            .unwrap_or_default()
            .or_zero();
        let current_ic = self
            .book_value_equity
            .last()
            .copied()
            .unwrap_or_default()
            .or_zero()
            + book_value_debt
            - self.cash.last().copied().unwrap_or_default().or_zero();
        sheet.append(&mut ic, current_ic)?;
        for i in 0..self.layout.total_columns - 1 {
            sheet.append(
                &mut ic,
                at(i + start, row::INVESTED_CAPITAL) + at(i + start + 1, row::REINVESTMENT),
            )?;
        }

        let mut roic = sheet.create_series("ROIC", row::ROIC, Style::Percent)?;
        sheet.append(&mut roic, SeriesEntry::Blank)?;
        for i in 1..self.layout.total_columns {
            sheet.append(
                &mut roic,
                at(i + start, row::NOPAT) / at(i + start - 1, row::INVESTED_CAPITAL),
            )?;
        }

        Ok(())
    }

    fn compute_trade(&self, sheet: &mut ModelSheet) -> ModelResult<()> {
        let start = self.layout.start_column;

        // The block titles itself with the ticker cell.
        let mut year = sheet.create_series("=A1", row::TRADE_YEAR, Style::Plain)?;
        let mut growth =
            sheet.create_series("Revenue growth rate", row::TRADE_SALES_GROWTH, Style::Percent)?;
        let mut sales = sheet.create_series("Revenue", row::TRADE_SALES, Style::Comma)?;
        let mut ebit = sheet.create_series("EBIT", row::TRADE_EBIT, Style::Comma)?;
        let mut interest =
            sheet.create_series("Interest expense", row::TRADE_INTEREST_EXPENSE, Style::Comma)?;
        let mut eps =
            sheet.create_series("EPS projection", row::TRADE_EPS_PROJECTION, Style::Comma)?;
        sheet.set(
            "ADR ratio",
            self.inputs.adr_ratio,
            row::TRADE_ADR_RATIO,
            Style::Comma,
        )?;
        let mut adr = sheet.create_series(
            "EPS proj. after conversion to ADR",
            row::TRADE_ADR_CONVERT,
            Style::Comma,
        )?;
        let mut pe = sheet.create_series("Forward P/E ratio", row::TRADE_PE_RATIO, Style::Comma)?;
        let mut target =
            sheet.create_series("Price target", row::TRADE_PRICE_TARGET, Style::Comma)?;

        let shares = sheet.get("Number of shares")?;
        let adr_ratio = sheet.get("ADR ratio")?;

        for i in 0..self.layout.total_columns {
            let col = i + start;
            sheet.append(&mut year, at(col, row::YEAR))?;
            sheet.append(&mut growth, at(col, row::SALES_GROWTH))?;
            sheet.append(&mut sales, at(col, row::SALES))?;
            sheet.append(&mut ebit, at(col, row::EBIT))?;
            if (i as usize) < self.forward_interest.len() {
                sheet.append(&mut interest, num(self.forward_interest[i as usize]))?;
            }
            sheet.append(
                &mut eps,
                (at(col, row::EBIT) + at(col, row::TRADE_INTEREST_EXPENSE))
                    * (num(1.0) - at(col, row::TAX_RATE))
                    / Expr::cell(shares.value_ref()),
            )?;
            sheet.append(
                &mut adr,
                at(col, row::TRADE_EPS_PROJECTION) / Expr::cell(adr_ratio.value_ref()),
            )?;
            sheet.append(&mut pe, num(self.inputs.forward_pe))?;
            sheet.append(
                &mut target,
                at(col, row::TRADE_ADR_CONVERT) * at(col, row::TRADE_PE_RATIO),
            )?;
        }

        Ok(())
    }
}
