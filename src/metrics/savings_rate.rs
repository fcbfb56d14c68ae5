use crate::ledger::MergedLedger;
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};

//percentage change of each account over its latest step, keyed in ledger column order
pub fn account_saving_rates(ledger: &MergedLedger) -> IndexMap<String, Option<f64>> {
    let filled = ledger.forward_filled();
    let len = ledger.len();

    filled
        .accounts
        .iter()
        .map(|column| {
            let prev = if len >= 2 {
                column.values[len - 2]
            } else {
                None
            };
            let change = filled
                .account_change(&column.name)
                .and_then(|c| c.values.last().copied().flatten());

            let rate = match (prev, change) {
                (Some(prev), Some(change)) if prev != 0.0 => Some(change / prev * 100.0),
                _ => None,
            };

            (column.name.clone(), rate)
        })
        .collect()
}

//prints the per-account rates in a formatted table
pub fn saving_rates_table(rates: &IndexMap<String, Option<f64>>) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Account"), Cell::new("Savings Rate")]));

    for (account, rate) in rates {
        let value = match rate {
            Some(r) => format!("{:.2}%", r),
            None => "n/a".to_string(),
        };
        table.add_row(Row::new(vec![Cell::new(account), Cell::new(&value)]));
    }

    table
}
