use serde::{Deserialize, Serialize};

use super::{collect_records, required, NormalizeOptions, Normalizer};
use crate::error::JournalError;
use crate::record::{JournalRecord, SourceKind};
use crate::timeparse::parse_lenient;
use crate::window::DayWindow;

/// One entry of a commit listing; only the nested `commit` object is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitItem {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub commit: Option<CommitDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    /// ISO-8601 with a zone offset.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommitLogNormalizer {
    options: NormalizeOptions,
}

impl CommitLogNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }
}

impl Normalizer for CommitLogNormalizer {
    type Payload = Vec<CommitItem>;
    const SOURCE: SourceKind = SourceKind::CommitLog;

    fn normalize(&self, payload: Option<&Vec<CommitItem>>, window: &DayWindow) -> Vec<JournalRecord> {
        let Some(items) = payload else {
            return Vec::new();
        };
        collect_records(Self::SOURCE, items, |item| {
            let commit = item
                .commit
                .as_ref()
                .ok_or_else(|| JournalError::malformed(Self::SOURCE, "missing `commit`"))?;
            let message = required(Self::SOURCE, commit.message.as_ref(), "commit.message")?;
            let author = commit.author.as_ref();
            let raw_date = required(
                Self::SOURCE,
                author.and_then(|a| a.date.as_ref()),
                "commit.author.date",
            )?;
            let timestamp = parse_lenient(raw_date)
                .ok_or_else(|| {
                    JournalError::malformed(Self::SOURCE, format!("unparseable date {raw_date:?}"))
                })?
                .resolve(self.options.offset_policy, window.reference());

            Ok(Some(
                JournalRecord::new(Self::SOURCE, timestamp, message)
                    .with_author(author.and_then(|a| a.name.as_deref())),
            ))
        })
    }
}
