use crate::models::Month;

pub(crate) const SR: &str = "SR";
pub(crate) const FLAT: &str = "Flat No";
pub(crate) const NAME: &str = "Name";
pub(crate) const DUES: &str = "Kitti Amount";
pub(crate) const TOTAL: &str = "Total";

pub(crate) const SUMMARY_NAME: &str = "Name";
pub(crate) const SUMMARY_MONTH: &str = "Month";
pub(crate) const SUMMARY_AMOUNT: &str = "Amount";

/// Full ledger header as written: identity, dues, one column per month, total.
pub(crate) fn ledger_header() -> Vec<String> {
    let mut header: Vec<String> = [SR, FLAT, NAME, DUES].iter().map(|s| s.to_string()).collect();
    header.extend(Month::labels().iter().cloned());
    header.push(TOTAL.to_string());
    header
}

pub(crate) fn summary_header() -> [&'static str; 3] {
    [SUMMARY_NAME, SUMMARY_MONTH, SUMMARY_AMOUNT]
}

/// Column positions of a persisted ledger. Dues and total are derived, so
/// only identity and month columns are required.
#[derive(Debug)]
pub(crate) struct LedgerColumns {
    pub(crate) sr: usize,
    pub(crate) flat: usize,
    pub(crate) name: usize,
    pub(crate) months: Vec<usize>,
}

impl LedgerColumns {
    /// Returns the names of the missing columns when the header does not fit.
    pub(crate) fn locate(headers: &csv::StringRecord) -> Result<Self, Vec<String>> {
        let mut missing = Vec::new();
        let mut find = |name: &str| {
            let idx = col_index(headers, name);
            if idx.is_none() {
                missing.push(name.to_string());
            }
            idx.unwrap_or(0)
        };

        let sr = find(SR);
        let flat = find(FLAT);
        let name = find(NAME);
        let months = Month::labels().iter().map(|l| find(l.as_str())).collect();

        if missing.is_empty() {
            Ok(Self {
                sr,
                flat,
                name,
                months,
            })
        } else {
            Err(missing)
        }
    }
}

#[derive(Debug)]
pub(crate) struct SummaryColumns {
    pub(crate) name: usize,
    pub(crate) month: usize,
}

impl SummaryColumns {
    pub(crate) fn locate(headers: &csv::StringRecord) -> Result<Self, Vec<String>> {
        match (
            col_index(headers, SUMMARY_NAME),
            col_index(headers, SUMMARY_MONTH),
        ) {
            (Some(name), Some(month)) => Ok(Self { name, month }),
            (name, month) => Err([(SUMMARY_NAME, name), (SUMMARY_MONTH, month)]
                .iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(col, _)| col.to_string())
                .collect()),
        }
    }
}

fn col_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}
