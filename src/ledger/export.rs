use crate::error::Result;
use crate::ledger::merge::MergedLedger;
use csv::Writer;
use std::io::Write;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

//writes the ledger as a flat table: date, balances, net worth, then the change columns
pub fn write_ledger_csv<W: Write>(ledger: &MergedLedger, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["Date".to_string()];
    header.extend(ledger.accounts.iter().map(|c| c.name.clone()));
    header.push("NetWorth".to_string());
    header.extend(
        ledger
            .changes
            .accounts
            .iter()
            .map(|c| format!("{}_Change", c.name)),
    );
    header.push("NetWorth_Change".to_string());
    wtr.write_record(&header)?;

    for row in 0..ledger.len() {
        let mut record = vec![ledger.dates[row].format("%Y-%m-%d").to_string()];
        record.extend(ledger.accounts.iter().map(|c| cell(c.values[row])));
        record.push(cell(ledger.net_worth[row]));
        record.extend(ledger.changes.accounts.iter().map(|c| cell(c.values[row])));
        record.push(cell(ledger.changes.net_worth[row]));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AccountSeries;
    use chrono::NaiveDate;

    #[test]
    fn test_export_writes_empty_cells_for_missing() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let a = AccountSeries::from_pairs("Cash", &[(jan, Some(10.0)), (feb, None)]);
        let ledger = MergedLedger::merge(&[a]).unwrap();

        let mut out = Vec::new();
        write_ledger_csv(&ledger, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Date,Cash,NetWorth,Cash_Change,NetWorth_Change\n2024-01-01,10,10,,\n2024-02-01,,,,\n"
        );
    }
}
