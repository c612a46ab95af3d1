use crate::types::{Document, Language, Result, Summarizer, SummarizerConfig, SummaryResult};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use interfaces::BaselineSummarizer;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::Ollama;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const MAX_PROMPT_DOCUMENTS: usize = 30;
const MAX_ABSTRACT_CHARS: usize = 400;

pub fn build_summarizer(config: &SummarizerConfig) -> Result<Box<dyn Summarizer>> {
    match config {
        SummarizerConfig::Template => Ok(Box::new(BaselineSummarizer)),
        SummarizerConfig::LocalModel {
            endpoint,
            model,
            timeout_seconds,
        } => Ok(Box::new(LocalModelSummarizer::new(
            endpoint,
            model.clone(),
            Duration::from_secs(*timeout_seconds),
        )?)),
    }
}

/// Summaries from a model served by a local Ollama instance.
pub struct LocalModelSummarizer {
    client: Ollama,
    model: String,
    timeout: Duration,
}

impl LocalModelSummarizer {
    pub fn new(endpoint: &str, model: String, timeout: Duration) -> Result<Self> {
        let url = Url::parse(endpoint)?;
        let host = format!("{}://{}", url.scheme(), url.host_str().unwrap_or("localhost"));
        let port = url.port_or_known_default().unwrap_or(11434);

        Ok(Self {
            client: Ollama::new(host, port),
            model,
            timeout,
        })
    }
}

pub fn build_prompt(documents: &[Document], language: Language) -> String {
    let instruction = match language {
        Language::En => "Summarize the following newly collected FPGA documents and research papers for an engineering team. Group related items and highlight notable releases. Answer in English.",
        Language::Ja => "以下の新着FPGAドキュメントと研究論文を技術チーム向けに要約してください。関連する項目をまとめ、注目すべき更新を強調してください。日本語で回答してください。",
    };

    let mut prompt = format!("{}\n\n", instruction);
    for (index, doc) in documents.iter().take(MAX_PROMPT_DOCUMENTS).enumerate() {
        prompt.push_str(&format!("{}. {} ({})\n", index + 1, doc.name, doc.source));
        if let Some(text) = doc.abstract_text.as_deref().or(doc.content.as_deref()) {
            prompt.push_str(&format!("   {}\n", truncate_chars(text.trim(), MAX_ABSTRACT_CHARS)));
        }
    }
    if documents.len() > MAX_PROMPT_DOCUMENTS {
        prompt.push_str(&format!("({} more items omitted)\n", documents.len() - MAX_PROMPT_DOCUMENTS));
    }
    prompt
}

#[async_trait]
impl Summarizer for LocalModelSummarizer {
    fn backend_name(&self) -> String {
        format!("local_model ({})", self.model)
    }

    async fn summarize(&self, documents: &[Document], language: Language) -> SummaryResult {
        if documents.is_empty() {
            return SummaryResult::failed("no documents to summarize");
        }

        let prompt = build_prompt(documents, language);
        debug!("Sending {} char prompt to {}", prompt.len(), self.model);
        let request = GenerationRequest::new(self.model.clone(), prompt);

        match tokio::time::timeout(self.timeout, self.client.generate(request)).await {
            Ok(Ok(response)) => {
                let text = response.response.trim().to_string();
                if text.is_empty() {
                    warn!("{} returned an empty summary", self.model);
                    SummaryResult::failed("empty model response")
                } else {
                    info!("{} produced a {} char summary", self.model, text.len());
                    SummaryResult::success(text).with_metadata("model", self.model.clone())
                }
            }
            Ok(Err(e)) => {
                warn!("Summary request to {} failed: {}", self.model, e);
                SummaryResult::failed(e.to_string())
            }
            Err(_) => {
                warn!("Summary request to {} timed out after {:?}", self.model, self.timeout);
                SummaryResult::failed(format!("timed out after {:?}", self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    #[test]
    fn test_prompt_lists_documents() {
        let docs = vec![
            Document::builder("FIR Compiler", "https://docs.amd.com/r/en-US/pg149", "xilinx", SourceKind::WebScraping)
                .build(),
            Document::builder("Sparse Attention on FPGAs", "http://arxiv.org/abs/2501.00001v1", "arxiv", SourceKind::RestApi)
                .abstract_text("We map sparse attention onto DSP slices.")
                .build(),
        ];
        let prompt = build_prompt(&docs, Language::En);
        assert!(prompt.contains("1. FIR Compiler (xilinx)"));
        assert!(prompt.contains("2. Sparse Attention on FPGAs (arxiv)"));
        assert!(prompt.contains("We map sparse attention onto DSP slices."));
        assert!(build_prompt(&docs, Language::Ja).contains("日本語"));
    }

    #[tokio::test]
    async fn test_template_backend_is_not_sendable() {
        let summarizer = build_summarizer(&SummarizerConfig::Template).unwrap();
        let docs = vec![Document::builder("FIR Compiler", "https://docs.amd.com/r/en-US/pg149", "xilinx", SourceKind::WebScraping)
            .build()];
        let result = summarizer.summarize(&docs, Language::En).await;
        assert!(!result.text.is_empty());
        assert!(!result.is_safe_to_send());
    }

    #[test]
    fn test_local_model_rejects_bad_endpoint() {
        assert!(LocalModelSummarizer::new("not a url", "llama3".to_string(), Duration::from_secs(1)).is_err());
    }
}
