use std::path::PathBuf;

use market::{
    BarSource, JsonBarArchive, MarketError, PriceBoard, PriceFeed, ReferenceRecord, pump_ticks,
};
use tokio::sync::watch;
use tracing_test::traced_test;
use uuid::Uuid;

/// Unique scratch directory so parallel tests never collide.
fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stasis-market-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[tokio::test]
async fn archive_reads_and_windows_bars() {
    let dir = scratch_dir();
    // 2026-01-01, 2026-01-08, 2026-01-09 (ms)
    std::fs::write(
        dir.join("AAPL.json"),
        r#"[
            {"t": 1767830400000, "c": 101.0},
            {"t": 1767225600000, "c": 99.0},
            {"t": 1767916800000, "c": 102.5}
        ]"#,
    )
    .unwrap();

    let archive = JsonBarArchive::new(&dir);
    let bars = archive.fetch_bars("AAPL", 5).await.unwrap();

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    assert_eq!(closes, vec![101.0, 102.5]);
    assert!(bars[0].timestamp < bars[1].timestamp);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn archive_missing_symbol_is_empty_not_error() {
    let dir = scratch_dir();
    let archive = JsonBarArchive::new(&dir);

    let bars = archive.fetch_bars("NOPE", 5).await.unwrap();
    assert!(bars.is_empty());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn archive_corrupt_file_is_an_error() {
    let dir = scratch_dir();
    std::fs::write(dir.join("BAD.json"), "{ nope").unwrap();

    let archive = JsonBarArchive::new(&dir);
    let err = archive.fetch_bars("BAD", 5).await.unwrap_err();
    assert!(matches!(err, MarketError::Json(_)));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
#[traced_test]
async fn tick_pump_feeds_board_and_skips_bad_lines() {
    let board = PriceBoard::new(["AAPL", "MSFT"]);
    let (_tx, rx) = watch::channel(false);

    let input = b"{\"symbol\":\"AAPL\",\"price\":187.2}\n\
                  garbage\n\
                  \n\
                  {\"symbol\":\"msft\",\"price\":410.0}\n\
                  {\"symbol\":\"AAPL\",\"price\":188.4}\n\
                  {\"symbol\":\"ZZZ\",\"price\":1.0}\n";

    let accepted = pump_ticks(&input[..], &board, rx).await.unwrap();

    assert_eq!(accepted, 3);
    assert_eq!(board.get("AAPL"), Some(188.4));
    assert_eq!(board.get("MSFT"), Some(410.0));
    assert_eq!(board.get_status().message_count, 4);
    assert!(logs_contain("malformed tick line"));
}

#[tokio::test]
async fn tick_pump_stops_on_shutdown() {
    let board = PriceBoard::new(["AAPL"]);
    let (tx, rx) = watch::channel(false);

    // A reader that never yields a line.
    let (_keep_open, reader) = tokio::io::duplex(64);
    let reader = tokio::io::BufReader::new(reader);

    let handle = tokio::spawn(async move { pump_ticks(reader, &board, rx).await });
    tx.send(true).unwrap();

    let accepted = handle.await.unwrap().unwrap();
    assert_eq!(accepted, 0);
}

#[tokio::test]
async fn reference_file_loads_with_upper_case_keys() {
    let dir = scratch_dir();
    let path = dir.join("reference.json");
    std::fs::write(
        &path,
        r#"{"aapl": {"daily": [{"high": 200.0, "low": 150.0, "close": 180.0, "volume": 5.5e7}]}}"#,
    )
    .unwrap();

    let records = ReferenceRecord::load_all(&path).await.unwrap();
    assert_eq!(records["AAPL"].daily.len(), 1);
    assert!(records["AAPL"].statements.is_empty());

    let missing = ReferenceRecord::load_all(&dir.join("absent.json")).await.unwrap();
    assert!(missing.is_empty());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
#[traced_test]
async fn malformed_reference_record_is_skipped() {
    let dir = scratch_dir();
    let path = dir.join("reference.json");
    std::fs::write(
        &path,
        r#"{
            "AAPL": {"daily": [{"high": 200.0, "low": 150.0, "close": 180.0}]},
            "MSFT": {"daily": [{"high": 420.0, "low": 380.0}]}
        }"#,
    )
    .unwrap();

    let records = ReferenceRecord::load_all(&path).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records["AAPL"].daily.len(), 1);
    assert!(!records.contains_key("MSFT"));
    assert!(logs_contain("reference record skipped"));

    std::fs::remove_dir_all(dir).ok();
}
