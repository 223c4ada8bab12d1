use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use journal_feed_core::config::JournalConfig;
use journal_feed_core::contract::{
    AnnotatedEntryClient, FetchError, MockAnnotatedEntryClient, MockChannelClient,
    MockCommitLogClient, MockTableStoreClient, Sources,
};
use journal_feed_core::date::validate_target_date;
use journal_feed_core::normalize::{
    AnnotatedEntry, AnnotatedFeed, ChannelHistory, ChannelMessage, ChannelTs, CommitAuthor,
    CommitDetail, CommitItem, TableRow, TableScan,
};
use journal_feed_core::{assemble, fetch_journal, JournalError, SourceKind};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn at(d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn table_client() -> MockTableStoreClient {
    let mut client = MockTableStoreClient::new();
    client.expect_scan_day().times(1).returning(|key| {
        assert_eq!(key, "03/01/2024", "Table scan must filter on the day key");
        Ok(TableScan {
            items: vec![TableRow {
                date: Some("03/01/2024 09:00:00".into()),
                name: Some("alice".into()),
                text: Some("deployed v2".into()),
            }],
        })
    });
    client
}

fn channel_client() -> MockChannelClient {
    let mut client = MockChannelClient::new();
    client.expect_history().times(1).returning(|oldest, latest| {
        assert_eq!(oldest, 1_709_251_200, "Channel oldest bound is day start");
        assert_eq!(latest, 1_709_337_599, "Channel latest bound is 23:59:59");
        Ok(ChannelHistory {
            ok: Some(true),
            error: None,
            messages: vec![ChannelMessage {
                text: Some("standup".into()),
                user: Some("U42".into()),
                // 08:30:00 UTC
                ts: Some(ChannelTs::Text("1709281800.000100".into())),
                subtype: None,
            }],
        })
    });
    client
}

fn commit_client() -> MockCommitLogClient {
    let mut client = MockCommitLogClient::new();
    client.expect_commits().times(1).returning(|since, until| {
        assert_eq!(since, at(1, 0, 0, 0));
        assert_eq!(until, at(1, 23, 59, 59));
        Ok(vec![CommitItem {
            sha: Some("abc123".into()),
            commit: Some(CommitDetail {
                message: Some("fix login".into()),
                author: Some(CommitAuthor {
                    name: Some("dana".into()),
                    date: Some("2024-03-01T10:15:00+02:00".into()),
                }),
            }),
        }])
    });
    client
}

fn annotated_client() -> MockAnnotatedEntryClient {
    let mut client = MockAnnotatedEntryClient::new();
    client.expect_entries().times(1).returning(|| {
        Ok(AnnotatedFeed {
            entries: vec![
                AnnotatedEntry {
                    time: Some("March 01 2024 at 7:45am".into()),
                    text: Some("went running".into()),
                    sentiment: Some("happy".into()),
                },
                AnnotatedEntry {
                    time: Some("March 02 2024 at 7:45am".into()),
                    text: Some("tomorrow".into()),
                    sentiment: Some("n/a".into()),
                },
            ],
        })
    });
    client
}

#[tokio::test]
async fn assembles_all_four_sources_in_time_order() {
    let table = table_client();
    let channel = channel_client();
    let commits = commit_client();
    let annotated = annotated_client();
    let sources = Sources {
        table_store: Some(&table),
        channel: Some(&channel),
        commit_log: Some(&commits),
        annotated: Some(&annotated),
    };

    let report = fetch_journal("01/03/2024", today(), &sources, &JournalConfig::default())
        .await
        .expect("Valid date should assemble a report");

    assert!(report.is_complete(), "No source should fail: {:?}", report.failures);
    assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert!(!report.is_future);
    let summary: Vec<(SourceKind, &str)> = report
        .records
        .iter()
        .map(|r| (r.source, r.message.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (SourceKind::AnnotatedEntry, "went running , sentiment: happy"),
            (SourceKind::Channel, "standup"),
            (SourceKind::TableStore, "deployed v2"),
            (SourceKind::CommitLog, "fix login"),
        ]
    );
}

#[tokio::test]
async fn invalid_date_fetches_nothing() {
    let mut table = MockTableStoreClient::new();
    table.expect_scan_day().never();
    let mut channel = MockChannelClient::new();
    channel.expect_history().never();
    let sources = Sources {
        table_store: Some(&table),
        channel: Some(&channel),
        ..Sources::default()
    };

    let err = fetch_journal("2024-03-01", today(), &sources, &JournalConfig::default())
        .await
        .expect_err("ISO dates are not accepted");

    assert!(matches!(err, JournalError::InvalidDateFormat { .. }), "got {err:?}");
}

#[tokio::test]
async fn two_digit_year_fetches_nothing() {
    let mut annotated = MockAnnotatedEntryClient::new();
    annotated.expect_entries().never();
    let sources = Sources {
        annotated: Some(&annotated),
        ..Sources::default()
    };

    let err = fetch_journal("01/03/24", today(), &sources, &JournalConfig::default())
        .await
        .expect_err("Two digit years are not DD/MM/YYYY");

    assert!(matches!(err, JournalError::InvalidDateFormat { .. }), "got {err:?}");
}

#[tokio::test]
async fn failing_source_is_reported_and_others_still_arrive() {
    let table = table_client();
    let commits = commit_client();
    let mut channel = MockChannelClient::new();
    channel
        .expect_history()
        .times(1)
        .returning(|_, _| Err("channel_not_found".into()));
    let sources = Sources {
        table_store: Some(&table),
        channel: Some(&channel),
        commit_log: Some(&commits),
        annotated: None,
    };

    let report = fetch_journal("01/03/2024", today(), &sources, &JournalConfig::default())
        .await
        .expect("Source failures are not fatal");

    assert_eq!(report.records.len(), 2, "Table and commit records survive");
    assert_eq!(report.failures.len(), 1, "Only the channel failed");
    let failure = &report.failures[0];
    assert_eq!(failure.source, SourceKind::Channel);
    match &failure.error {
        JournalError::SourceFetch { kind, message } => {
            assert_eq!(*kind, SourceKind::Channel);
            assert!(message.contains("channel_not_found"), "got {message}");
        }
        other => panic!("Expected SourceFetch, got {other:?}"),
    }
}

#[tokio::test]
async fn no_configured_sources_gives_an_empty_complete_report() {
    let target = validate_target_date("01/03/2024", today()).unwrap();

    let report = assemble(&target, &Sources::default(), &JournalConfig::default()).await;

    assert!(report.records.is_empty());
    assert!(report.is_complete(), "Unconfigured sources are not failures");
}

struct SlowAnnotatedClient;

#[async_trait]
impl AnnotatedEntryClient for SlowAnnotatedClient {
    async fn entries(&self) -> Result<AnnotatedFeed, FetchError> {
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
        Ok(AnnotatedFeed::default())
    }
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out_without_blocking_siblings() {
    let table = table_client();
    let slow = SlowAnnotatedClient;
    let sources = Sources {
        table_store: Some(&table),
        annotated: Some(&slow),
        ..Sources::default()
    };
    let config = JournalConfig {
        source_timeout_secs: 5,
        ..JournalConfig::default()
    };

    let report = fetch_journal("01/03/2024", today(), &sources, &config)
        .await
        .expect("Timeouts are not fatal");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].source, SourceKind::TableStore);
    assert_eq!(report.failures.len(), 1);
    assert!(
        matches!(
            report.failures[0].error,
            JournalError::SourceTimeout {
                kind: SourceKind::AnnotatedEntry,
                seconds: 5
            }
        ),
        "got {:?}",
        report.failures[0].error
    );
}

#[tokio::test]
async fn future_date_still_assembles() {
    let mut annotated = MockAnnotatedEntryClient::new();
    annotated
        .expect_entries()
        .times(1)
        .returning(|| Ok(AnnotatedFeed::default()));
    let sources = Sources {
        annotated: Some(&annotated),
        ..Sources::default()
    };

    let report = fetch_journal("25/12/2030", today(), &sources, &JournalConfig::default())
        .await
        .expect("Future dates only warn");

    assert!(report.is_future, "Report should carry the future-date flag");
    assert!(report.records.is_empty());
    assert!(report.is_complete());
}
