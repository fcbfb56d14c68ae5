use crate::data::loader::{parse_workbook, read_workbook, SheetBytes};
use crate::error::Result;
use crate::ledger::MergedLedger;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

//content fingerprint of in-memory sheets: account names and bytes, in sheet order
pub fn fingerprint_sheets(sheets: &[SheetBytes]) -> String {
    let mut hasher = Sha256::new();

    for sheet in sheets {
        hasher.update((sheet.account.len() as u64).to_be_bytes());
        hasher.update(sheet.account.as_bytes());
        hasher.update((sheet.bytes.len() as u64).to_be_bytes());
        hasher.update(&sheet.bytes);
    }

    hex::encode(hasher.finalize())
}

//content fingerprint of a workbook directory
pub fn workbook_fingerprint<P: AsRef<Path>>(dir: P) -> Result<String> {
    Ok(fingerprint_sheets(&read_workbook(dir)?))
}

//session cache for the merged ledger; rebuilt only when the workbook content changes
#[derive(Debug, Default)]
pub struct LedgerCache {
    fingerprint: Option<String>,
    ledger: Option<Arc<MergedLedger>>,
}

impl LedgerCache {
    pub fn new() -> Self {
        Self::default()
    }

    //returns the cached ledger if the workbook is unchanged, else merges the sheets just read
    pub fn get_or_load<P: AsRef<Path>>(&mut self, dir: P) -> Result<Arc<MergedLedger>> {
        let sheets = read_workbook(dir)?;
        let fingerprint = fingerprint_sheets(&sheets);

        if let (Some(cached), Some(ledger)) = (&self.fingerprint, &self.ledger) {
            if *cached == fingerprint {
                debug!(fingerprint = %fingerprint, "ledger cache hit");
                return Ok(Arc::clone(ledger));
            }
        }

        let accounts = parse_workbook(&sheets)?;
        let ledger = Arc::new(MergedLedger::merge(&accounts)?);
        info!(fingerprint = %fingerprint, rows = ledger.len(), "ledger cache refreshed");

        self.fingerprint = Some(fingerprint);
        self.ledger = Some(Arc::clone(&ledger));
        Ok(ledger)
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.ledger = None;
    }
}
