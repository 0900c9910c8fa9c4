//! Financial statement tables
//!
//! Statement data arrives as CSV exports from the data terminal, one
//! file per statement: a period header row, then one row per line item.
//! Rows are looked up by title pattern, never by position, because the
//! terminal reorders and omits line items between companies.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use lazy_regex::regex;
use regex::Regex;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::figures::Figure;

/// One statement line item
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Line item title
    pub label: String,
    /// Per-period figures, aligned with the table's periods
    pub figures: Vec<Figure>,
}

/// A parsed statement table
#[derive(Debug, Clone)]
pub struct Table {
    /// Period labels from the header row
    pub periods: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Read a table from a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            rows = table.rows.len(),
            periods = table.periods.len(),
            "loaded statement table"
        );
        Ok(table)
    }

    /// Read a table from any reader producing CSV
    pub fn from_reader<R: Read>(reader: R) -> ModelResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();

        let header = records
            .next()
            .transpose()?
            .ok_or_else(|| ModelError::Invalid("statement table is empty".into()))?;

        let mut periods: Vec<String> =
            header.iter().skip(1).map(|s| s.trim().to_string()).collect();

        // An LTM column closes the usable range; anything the terminal
        // appends after it is noise.
        if let Some(pos) = periods.iter().position(|p| p == "LTM") {
            periods.truncate(pos + 1);
        }
        let col_limit = periods.len();

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            let mut fields = record.iter();
            let label = fields.next().unwrap_or("").trim().to_string();
            if label.is_empty() {
                continue;
            }
            let mut figures: Vec<Figure> = fields.take(col_limit).map(parse_field).collect();
            figures.resize(col_limit, Figure::Unknown);
            rows.push(TableRow { label, figures });
        }

        Ok(Self { periods, rows })
    }

    /// Find the first row whose title matches `pattern` (anchored at the
    /// start of the title). Missing titles are a hard fault.
    pub fn match_title(&self, pattern: &str) -> ModelResult<&TableRow> {
        self.match_title_optional(pattern)?
            .ok_or_else(|| ModelError::MissingTitle(pattern.to_string()))
    }

    /// Like [`match_title`](Self::match_title), but a missing title is `None`
    pub fn match_title_optional(&self, pattern: &str) -> ModelResult<Option<&TableRow>> {
        let re = Regex::new(pattern)?;
        Ok(self
            .rows
            .iter()
            .find(|row| matches_at_start(&re, &row.label)))
    }

    /// Drop the last `n` data columns (terminal exports append summary
    /// columns like CAGR to estimate tables)
    pub fn drop_trailing(&mut self, n: usize) {
        let keep = self.periods.len().saturating_sub(n);
        self.periods.truncate(keep);
        for row in &mut self.rows {
            row.figures.truncate(keep);
        }
    }

    /// Number of line items
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn matches_at_start(re: &Regex, text: &str) -> bool {
    re.find(text.trim()).is_some_and(|m| m.start() == 0)
}

/// Parse one CSV field into a figure
///
/// Handles the terminal's habits: thousands separators, `12.3x`
/// multiples, and dashes for not-reported periods.
fn parse_field(field: &str) -> Figure {
    let field = field.trim();
    if field.is_empty() || field == "-" || field == "\u{2013}" {
        return Figure::Unknown;
    }

    let cleaned = field.replace(',', "");
    let cleaned = if regex!(r"^\d+(?:\.\d+)?x$").is_match(&cleaned) {
        cleaned.trim_end_matches('x').to_string()
    } else {
        cleaned
    };

    cleaned
        .parse::<f64>()
        .map(Figure::Known)
        .unwrap_or(Figure::Unknown)
}

/// The full set of statement tables for one security
#[derive(Debug, Clone)]
pub struct StatementPack {
    /// Company name from the export header, when present
    pub company: Option<String>,
    pub income: Table,
    pub balance: Table,
    pub cashflow: Table,
    pub values: Table,
    pub estimates: Table,
}

impl StatementPack {
    /// Load a pack from a directory of CSV exports
    ///
    /// Expects `income.csv`, `balance.csv`, `cashflow.csv`, `values.csv`
    /// and `estimates.csv`; `header.txt` with the company name is
    /// optional.
    pub fn load<P: AsRef<Path>>(dir: P) -> ModelResult<Self> {
        let dir = dir.as_ref();

        let company = std::fs::read_to_string(dir.join("header.txt"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut estimates = Table::from_csv_path(dir.join("estimates.csv"))?;
        // Expected-entry and CAGR summary columns are not periods.
        estimates.drop_trailing(3);

        Ok(Self {
            company,
            income: Table::from_csv_path(dir.join("income.csv"))?,
            balance: Table::from_csv_path(dir.join("balance.csv"))?,
            cashflow: Table::from_csv_path(dir.join("cashflow.csv"))?,
            values: Table::from_csv_path(dir.join("values.csv"))?,
            estimates,
        })
    }

    /// Forward estimates for `title`, starting one period before the
    /// first estimate column so the final actual year serves as the base
    /// year. Unreported periods are pruned. `None` when the table has no
    /// estimate periods or no matching row.
    pub fn trim_estimates(&self, title: &str) -> ModelResult<Option<Vec<f64>>> {
        let Some(first_estimate) = self.first_estimate_index()? else {
            return Ok(None);
        };
        let Some(row) = self.estimates.match_title_optional(title)? else {
            return Ok(None);
        };

        let start = first_estimate.saturating_sub(1);
        let values: Vec<f64> = row.figures[start.min(row.figures.len())..]
            .iter()
            .filter_map(|f| f.known())
            .collect();
        Ok(Some(values))
    }

    /// Forward estimates paired with their period labels, estimate
    /// periods only
    pub fn trim_estimates_dated(&self, title: &str) -> ModelResult<Option<Vec<(f64, String)>>> {
        let Some(first_estimate) = self.first_estimate_index()? else {
            return Ok(None);
        };
        let Some(row) = self.estimates.match_title_optional(title)? else {
            return Ok(None);
        };

        let pairs = row.figures[first_estimate.min(row.figures.len())..]
            .iter()
            .zip(&self.estimates.periods[first_estimate..])
            .filter_map(|(f, period)| f.known().map(|v| (v, period.clone())))
            .collect();
        Ok(Some(pairs))
    }

    /// Index of the first estimate period (`…E`); actual periods are
    /// `…A`, anything else is a malformed export.
    fn first_estimate_index(&self) -> ModelResult<Option<usize>> {
        for (i, period) in self.estimates.periods.iter().enumerate() {
            if regex!(r".*\bE$").is_match(period) {
                return Ok(Some(i));
            }
            if !regex!(r".*\bA$").is_match(period) {
                return Err(ModelError::Invalid(format!(
                    "estimate period '{}' is neither actual nor estimate",
                    period
                )));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_basic_table() {
        let t = table(
            "Income,12/19,12/20,12/21,LTM\n\
             Total Revenues,\"1,000\",1100,1210,1300\n\
             EBIT,200,230,260,280\n",
        );
        assert_eq!(t.periods, vec!["12/19", "12/20", "12/21", "LTM"]);
        let revenue = t.match_title("Total Revenues").unwrap();
        assert_eq!(revenue.figures[0], Figure::Known(1000.0));
        assert_eq!(revenue.figures[3], Figure::Known(1300.0));
    }

    #[test]
    fn test_ltm_closes_the_column_range() {
        let t = table(
            "Income,12/20,LTM,CAGR,Junk\n\
             Total Revenues,100,110,5%,x\n",
        );
        assert_eq!(t.periods, vec!["12/20", "LTM"]);
        assert_eq!(t.match_title("Total Revenues").unwrap().figures.len(), 2);
    }

    #[test]
    fn test_multiple_suffix_and_dashes() {
        let t = table(
            "Values,12/20,12/21\n\
             NTM Forward P/E,14.2x,15.1x\n\
             NTM Dividend Yield,-,0.04\n",
        );
        let pe = t.match_title("NTM Forward P/E").unwrap();
        assert_eq!(pe.figures[0], Figure::Known(14.2));
        let dy = t.match_title("NTM Dividend Yield").unwrap();
        assert_eq!(dy.figures[0], Figure::Unknown);
        assert_eq!(dy.figures[1], Figure::Known(0.04));
    }

    #[test]
    fn test_match_title_anchors_at_start() {
        let t = table(
            "Income,12/20\n\
             Net Income,10\n\
             Some Net Income Note,99\n",
        );
        // Anchored matching returns the row that starts with the pattern,
        // not the row that merely contains it.
        let row = t.match_title("Net Income").unwrap();
        assert_eq!(row.figures[0], Figure::Known(10.0));
    }

    #[test]
    fn test_match_title_missing_is_a_fault() {
        let t = table("Income,12/20\nRevenue,1\n");
        assert!(matches!(
            t.match_title("No Such Line"),
            Err(ModelError::MissingTitle(_))
        ));
        assert_eq!(t.match_title_optional("No Such Line").unwrap(), None);
    }

    #[test]
    fn test_short_rows_pad_with_unknown() {
        let t = table(
            "Income,12/19,12/20,12/21\n\
             Dividends per share,1.5\n",
        );
        let row = t.match_title("Dividends per share").unwrap();
        assert_eq!(row.figures.len(), 3);
        assert_eq!(row.figures[1], Figure::Unknown);
    }

    fn pack_with_estimates(estimates: &str) -> StatementPack {
        let empty = table("T,12/20\nStub,1\n");
        StatementPack {
            company: None,
            income: empty.clone(),
            balance: empty.clone(),
            cashflow: empty.clone(),
            values: empty.clone(),
            estimates: table(estimates),
        }
    }

    #[test]
    fn test_trim_estimates_includes_base_year() {
        let pack = pack_with_estimates(
            "Estimates,12/21 A,12/22 A,12/23 E,12/24 E\n\
             Revenue,90,100,110,121\n",
        );
        // The last actual year rides along as the base year.
        assert_eq!(
            pack.trim_estimates("Revenue").unwrap().unwrap(),
            vec![100.0, 110.0, 121.0]
        );
    }

    #[test]
    fn test_trim_estimates_prunes_unknowns() {
        let pack = pack_with_estimates(
            "Estimates,12/22 A,12/23 E,12/24 E,12/25 E\n\
             EBIT,50,55,-,66\n",
        );
        assert_eq!(
            pack.trim_estimates("EBIT$").unwrap().unwrap(),
            vec![50.0, 55.0, 66.0]
        );
    }

    #[test]
    fn test_trim_estimates_no_estimate_periods() {
        let pack = pack_with_estimates("Estimates,12/21 A,12/22 A\nRevenue,90,100\n");
        assert_eq!(pack.trim_estimates("Revenue").unwrap(), None);
    }

    #[test]
    fn test_trim_estimates_dated() {
        let pack = pack_with_estimates(
            "Estimates,12/22 A,12/23 E,12/24 E\n\
             Dividend Per Share,1.0,1.1,1.21\n",
        );
        assert_eq!(
            pack.trim_estimates_dated("Dividend Per Share")
                .unwrap()
                .unwrap(),
            vec![(1.1, "12/23 E".to_string()), (1.21, "12/24 E".to_string())]
        );
    }

    #[test]
    fn test_malformed_period_label_is_a_fault() {
        let pack = pack_with_estimates("Estimates,12/21 A,12/22,12/23 E\nRevenue,1,2,3\n");
        assert!(pack.trim_estimates("Revenue").is_err());
    }

    #[test]
    fn test_load_pack_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            std::fs::write(dir.path().join(name), body).unwrap();
        };

        write("income.csv", "Income,12/21,LTM\nTotal Revenues,100,110\n");
        write("balance.csv", "Balance,12/21,LTM\nTotal Equity,50,55\n");
        write("cashflow.csv", "Cashflow,12/21,LTM\nCash from Operations,20,22\n");
        write("values.csv", "Values,q1,q2\nMarket Cap,900,950\n");
        write(
            "estimates.csv",
            "Estimates,12/21 A,12/22 E,12/23 E,x,y,z\nRevenue,100,110,121,1,2,3\n",
        );
        write("header.txt", "Test Corp\n");

        let pack = StatementPack::load(dir.path()).unwrap();
        assert_eq!(pack.company.as_deref(), Some("Test Corp"));
        assert_eq!(pack.income.row_count(), 1);
        // The three trailing summary columns are dropped on load.
        assert_eq!(pack.estimates.periods.len(), 3);
        assert_eq!(
            pack.trim_estimates("Revenue").unwrap().unwrap(),
            vec![100.0, 110.0, 121.0]
        );
    }

    #[test]
    fn test_load_pack_missing_file_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StatementPack::load(dir.path()).is_err());
    }
}
