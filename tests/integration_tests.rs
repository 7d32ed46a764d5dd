use clap::Parser;
use httpmock::prelude::*;
use sales_etl::{CliConfig, EtlEngine, EtlError, LocalStorage, SalesPipeline};
use std::path::Path;
use tempfile::TempDir;

const SALES_DATA: &str = "\
TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
T001|2024-12-01|P1|iPhone 9|2|549|C001|North
T002|2024-13-45|P2|Galaxy|1|899|C002|South
T003|2024-12-02|P150|Perfume Oil|3|13|C003|east
T004|2024-12-03|P7|Samsung Universe 9|1|1249|C001|North
";

fn catalog_body() -> serde_json::Value {
    serde_json::json!({
        "products": [
            {"id": 1, "title": "iPhone 9", "category": "smartphones", "brand": "Apple", "rating": 4.69},
            {"id": 50, "title": "Perfume Oil", "category": "fragrances", "brand": "Impression of Acqua Di Gio", "rating": 4.26}
        ],
        "total": 2,
        "skip": 0,
        "limit": 100
    })
}

fn write_input(dir: &TempDir) {
    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("sales_data.txt"), SALES_DATA).unwrap();
}

fn cli_config(endpoint: &str, extra: &[&str]) -> CliConfig {
    let mut args = vec![
        "sales-etl",
        "--catalog-endpoint",
        endpoint,
        "--retry-attempts",
        "1",
        "--timeout-seconds",
        "5",
    ];
    args.extend_from_slice(extra);
    CliConfig::parse_from(args)
}

fn read(dir: &TempDir, path: &str) -> String {
    std::fs::read_to_string(dir.path().join(path)).unwrap()
}

#[tokio::test]
async fn test_end_to_end_with_catalog() {
    let temp_dir = TempDir::new().unwrap();
    write_input(&temp_dir);

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(catalog_body());
    });

    let config = cli_config(&server.url("/products"), &[]);
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = SalesPipeline::new(storage, config).unwrap();
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let summary = engine.run().await.unwrap();
    api_mock.assert();

    assert!(!summary.has_failures());
    assert!(summary.warnings.is_empty());
    assert_eq!(summary.enriched, 2);
    assert_eq!(summary.attempted, 3);

    let enriched = read(&temp_dir, "data/enriched_sales_data.txt");
    let lines: Vec<&str> = enriched.lines().collect();
    assert_eq!(
        lines[0],
        "TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region|APICategory|APIBrand|APIRating|APIMatch"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("T001|2024-12-01|P1|iPhone 9|2|"));
    assert!(lines[1].ends_with("|smartphones|Apple|4.69|true"));
    assert!(lines[2].starts_with("T003|2024-12-02|P150|"));
    assert!(lines[2].ends_with("|fragrances|Impression of Acqua Di Gio|4.26|true"));
    assert!(lines[3].starts_with("T004|"));
    assert!(lines[3].ends_with("||||false"));

    let report = read(&temp_dir, "output/sales_report.txt");
    assert!(report.contains("invalid date"));
    assert!(report.contains("Total Products Enriched: 2/3"));
    assert!(report.contains("Unmatched ProductIDs:"));
    assert!(report.contains("  - P7"));
    assert!(!report.contains("  - P150"));
}

#[tokio::test]
async fn test_catalog_outage_still_writes_outputs() {
    let temp_dir = TempDir::new().unwrap();
    write_input(&temp_dir);

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(500);
    });

    let config = cli_config(&server.url("/products"), &[]);
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = SalesPipeline::new(storage, config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let summary = engine.run().await.unwrap();
    api_mock.assert_hits(1);

    assert!(!summary.has_failures());
    assert_eq!(summary.enriched, 0);
    assert_eq!(summary.warnings.len(), 1);

    let enriched = read(&temp_dir, "data/enriched_sales_data.txt");
    assert!(enriched.lines().skip(1).all(|line| line.ends_with("||||false")));

    let report = read(&temp_dir, "output/sales_report.txt");
    assert!(report.contains("Total Products Enriched: 0/3"));
    assert!(report.contains("  - P1\n"));
    assert!(report.contains("  - P150\n"));
    assert!(report.contains("  - P7\n"));
    assert!(report.contains("Product catalog unavailable"));
}

#[tokio::test]
async fn test_missing_input_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let config = cli_config(&server.url("/products"), &["--input", "data/absent.txt"]);
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = SalesPipeline::new(storage, config).unwrap();
    let engine = EtlEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EtlError::InputUnavailable { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(!temp_dir.path().join("output/sales_report.txt").exists());
}

#[tokio::test]
async fn test_unwritable_enriched_path_keeps_report() {
    let temp_dir = TempDir::new().unwrap();
    write_input(&temp_dir);
    // A directory where the enriched file should go makes that write fail
    std::fs::create_dir_all(temp_dir.path().join("blocked/enriched.txt")).unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200).json_body(catalog_body());
    });

    let config = cli_config(
        &server.url("/products"),
        &["--enriched-output", "blocked/enriched.txt"],
    );
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = SalesPipeline::new(storage, config).unwrap();
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(summary.has_failures());
    let failed: Vec<_> = summary.load.failed_artifacts().map(|a| a.path.clone()).collect();
    assert_eq!(failed, vec!["blocked/enriched.txt".to_string()]);

    let report = read(&temp_dir, "output/sales_report.txt");
    assert!(report.contains("Enriched data file was not written"));
}

#[tokio::test]
async fn test_unwritable_report_path_keeps_enriched_data() {
    let temp_dir = TempDir::new().unwrap();
    write_input(&temp_dir);
    std::fs::create_dir_all(temp_dir.path().join("blocked/report.txt")).unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200).json_body(catalog_body());
    });

    let config = cli_config(
        &server.url("/products"),
        &["--report-output", "blocked/report.txt", "--archive", "output/bundle.zip"],
    );
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = SalesPipeline::new(storage, config).unwrap();
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(summary.has_failures());
    let failed: Vec<_> = summary.load.failed_artifacts().map(|a| a.path.clone()).collect();
    assert_eq!(failed, vec!["blocked/report.txt".to_string()]);

    let enriched = read(&temp_dir, "data/enriched_sales_data.txt");
    assert_eq!(enriched.lines().count(), 4);
    assert!(temp_dir.path().join("output/bundle.zip").exists());
}

#[tokio::test]
async fn test_region_filter_and_archive() {
    let temp_dir = TempDir::new().unwrap();
    write_input(&temp_dir);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200).json_body(catalog_body());
    });

    let config = cli_config(
        &server.url("/products"),
        &["--region", "north", "--archive", "output/bundle.zip"],
    );
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = SalesPipeline::new(storage, config).unwrap();
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(!summary.has_failures());
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.enriched, 1);

    let bundle_path = temp_dir.path().join("output/bundle.zip");
    assert!(Path::new(&bundle_path).exists());
    let zip_data = std::fs::read(&bundle_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut report = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("sales_report.txt").unwrap(), &mut report)
        .unwrap();
    assert!(report.contains("Total Products Enriched: 1/2"));
}
