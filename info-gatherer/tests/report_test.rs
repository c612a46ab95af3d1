use info_gatherer::report::stats;
use info_gatherer::{Document, Report, ReportWriter, SourceKind, SourceResults};
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

fn sample_results() -> SourceResults {
    let xilinx_search = "https://docs.amd.com/search/all?query=Versal";
    let altera_search = "https://www.intel.com/content/www/us/en/search.html?q=DSP&s=Relevancy";

    let mut results = SourceResults::new();
    results.insert(
        "xilinx".to_string(),
        vec![
            Document::builder("Versal DSP Engine Architecture Manual", "https://docs.amd.com/r/en-US/am004-versal-dsp-engine", "xilinx", SourceKind::WebScraping)
                .search_url(xilinx_search)
                .category("User Guide")
                .series_tag(Some("Versal".to_string()))
                .file_kind("html")
                .build(),
            Document::builder("FIR Compiler Product Guide", "https://docs.amd.com/r/en-US/pg149-fir-compiler", "xilinx", SourceKind::WebScraping)
                .search_url(xilinx_search)
                .category("IP Core")
                .file_kind("html")
                .build(),
        ],
    );
    results.insert(
        "altera".to_string(),
        vec![Document::builder("Stratix 10 Variable Precision DSP Blocks User Guide", "https://www.intel.com/content/www/us/en/docs/programmable/683832/stratix-dsp.pdf", "altera", SourceKind::WebScraping)
            .search_url(altera_search)
            .category("User Guide")
            .series_tag(Some("Stratix".to_string()))
            .file_kind("pdf")
            .content(Some("Title: Stratix 10 Variable Precision DSP Blocks User Guide".to_string()))
            .build()],
    );
    results.insert("arxiv".to_string(), Vec::new());
    results
}

#[test]
fn test_report_round_trip_preserves_sources_and_counts() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("fpga_documents.json");
    let writer = ReportWriter::new(&path, true);
    let results = sample_results();

    let saved = writer.save(&results).unwrap();
    assert_eq!(saved.total_sources, 3);
    assert_eq!(saved.total_documents, 3);

    let loaded = Report::load(&path).unwrap();
    assert_eq!(loaded.run_id, saved.run_id);
    assert_eq!(loaded.total_documents, 3);
    assert_eq!(loaded.sources.keys().collect::<Vec<_>>(), vec!["xilinx", "altera", "arxiv"]);
    assert_eq!(loaded.sources["xilinx"].document_count, 2);
    assert_eq!(loaded.sources["arxiv"].search_url, None);

    let restored = loaded.into_results();
    assert_eq!(restored, results);
}

#[test]
fn test_document_records_omit_search_url() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fpga_documents.json");
    ReportWriter::new(&path, false).save(&sample_results()).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let xilinx = &raw["sources"]["xilinx"];
    assert_eq!(xilinx["search_url"], "https://docs.amd.com/search/all?query=Versal");

    let record = xilinx["documents"][0].as_object().unwrap();
    assert!(!record.contains_key("search_url"));
    assert_eq!(record["name"], "Versal DSP Engine Architecture Manual");
    assert_eq!(record["source_kind"], "web_scraping");
    assert_eq!(record["series_tag"], "Versal");
    assert!(record.contains_key("identity_hash"));
}

#[test]
fn test_existing_report_is_backed_up() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fpga_documents.json");
    let writer = ReportWriter::new(&path, true);

    writer.save(&sample_results()).unwrap();
    writer.save(&SourceResults::new()).unwrap();

    let backups = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("fpga_documents.json.backup_"))
        .count();
    assert_eq!(backups, 1);

    let current = Report::load(&path).unwrap();
    assert_eq!(current.total_documents, 0);
}

#[test]
fn test_stats_group_by_field() {
    let summary = stats(&sample_results());

    assert_eq!(summary.total_documents, 3);
    assert_eq!(summary.by_source["xilinx"], 2);
    assert_eq!(summary.by_source["arxiv"], 0);
    assert_eq!(summary.by_category["User Guide"], 2);
    assert_eq!(summary.by_series["Unknown"], 1);
    assert_eq!(summary.by_file_kind["pdf"], 1);
}
