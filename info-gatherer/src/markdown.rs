use crate::report::Report;
use crate::types::{Document, Result};
use crate::utils::{truncate_chars, write_text_atomic};
use std::path::Path;

const ABSTRACT_PREVIEW_CHARS: usize = 300;

pub fn render_report(report: &Report) -> String {
    let mut out = String::from("# FPGA Document Scan Report\n\n");
    out.push_str(&format!(
        "- Generated: {}\n- Run: {}\n- Sources: {}\n- Documents: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.run_id,
        report.total_sources,
        report.total_documents
    ));

    for (name, source) in &report.sources {
        out.push_str(&format!("\n## {} ({})\n\n", name, source.document_count));
        if let Some(search_url) = &source.search_url {
            out.push_str(&format!("Search: <{}>\n\n", search_url));
        }
        if source.documents.is_empty() {
            out.push_str("_No documents found._\n");
            continue;
        }
        for doc in &source.documents {
            render_document(&mut out, doc);
        }
    }

    out
}

fn render_document(out: &mut String, doc: &Document) {
    out.push_str(&format!("- [{}]({})", escape(&doc.name), doc.url));

    let tags = [doc.category.as_deref(), doc.series_tag.as_deref(), doc.file_kind.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    if !tags.is_empty() {
        out.push_str(&format!(" `{}`", tags.join(" / ")));
    }
    out.push('\n');

    if let Some(text) = &doc.abstract_text {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        out.push_str(&format!("  > {}\n", truncate_chars(&flat, ABSTRACT_PREVIEW_CHARS)));
    }
}

fn escape(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    write_text_atomic(path, &render_report(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SourceResults;
    use crate::types::SourceKind;

    #[test]
    fn test_render_lists_sources_in_order() {
        let mut results = SourceResults::new();
        results.insert(
            "xilinx".to_string(),
            vec![Document::builder("FIR Compiler [PG149]", "https://docs.amd.com/r/en-US/pg149", "xilinx", SourceKind::WebScraping)
                .search_url("https://docs.amd.com/search/all?query=Versal")
                .category("IP Core")
                .file_kind("html")
                .build()],
        );
        results.insert("altera".to_string(), Vec::new());

        let markdown = render_report(&Report::from_results(&results));
        let xilinx = markdown.find("## xilinx (1)").unwrap();
        let altera = markdown.find("## altera (0)").unwrap();
        assert!(xilinx < altera);
        assert!(markdown.contains("- [FIR Compiler \\[PG149\\]](https://docs.amd.com/r/en-US/pg149) `IP Core / html`"));
        assert!(markdown.contains("Search: <https://docs.amd.com/search/all?query=Versal>"));
        assert!(markdown.contains("_No documents found._"));
    }
}
