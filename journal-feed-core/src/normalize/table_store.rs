use serde::{Deserialize, Serialize};

use super::{collect_records, required, NormalizeOptions, Normalizer};
use crate::error::JournalError;
use crate::record::{JournalRecord, SourceKind};
use crate::timeparse::parse_lenient;
use crate::window::DayWindow;

/// Result of a table scan, already filtered to the target day by the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableScan {
    #[serde(rename = "Items", default)]
    pub items: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableStoreNormalizer {
    options: NormalizeOptions,
}

impl TableStoreNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }
}

impl Normalizer for TableStoreNormalizer {
    type Payload = TableScan;
    const SOURCE: SourceKind = SourceKind::TableStore;

    fn normalize(&self, payload: Option<&TableScan>, window: &DayWindow) -> Vec<JournalRecord> {
        let Some(scan) = payload else {
            return Vec::new();
        };
        collect_records(Self::SOURCE, &scan.items, |row| {
            let raw_date = required(Self::SOURCE, row.date.as_ref(), "date")?;
            let text = required(Self::SOURCE, row.text.as_ref(), "text")?;
            let timestamp = parse_lenient(raw_date)
                .ok_or_else(|| {
                    JournalError::malformed(Self::SOURCE, format!("unparseable date {raw_date:?}"))
                })?
                .resolve(self.options.offset_policy, window.reference());

            Ok(Some(
                JournalRecord::new(Self::SOURCE, timestamp, text).with_author(row.name.as_deref()),
            ))
        })
    }
}
