use crate::types::{Candidate, Document, Result, SourceKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What `is_topically_relevant` answers when neither an exclusion nor a
/// domain keyword matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevancePolicy {
    IncludeByDefault,
    ExcludeByDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    DataSheet,
    UserGuide,
    IpCore,
    Reference,
    Dsp,
    Tutorial,
    ApplicationNote,
    WhitePaper,
    Specification,
    Document,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DataSheet => "Data Sheet",
            Category::UserGuide => "User Guide",
            Category::IpCore => "IP Core",
            Category::Reference => "Reference",
            Category::Dsp => "DSP",
            Category::Tutorial => "Tutorial",
            Category::ApplicationNote => "Application Note",
            Category::WhitePaper => "White Paper",
            Category::Specification => "Specification",
            Category::Document => "Document",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const GLOSSARY_TITLES: &[&str] = &["包括的な用語", "comprehensive terms", "glossary", "用語集"];

const EXCLUDED_URL_FRAGMENTS: &[&str] = &[
    // legal and corporate
    "/modern-slavery",
    "/forced-labor",
    "/tax-strategy",
    "/uk-tax",
    "/compliance",
    "/governance",
    "/investor",
    "/annual-report",
    "/sustainability",
    "/social-responsibility",
    "/csr",
    "/ethics",
    "/code-of-conduct",
    "/supplier-code",
    "/human-rights",
    "/diversity",
    "/environmental",
    "/carbon",
    // site features
    "/contact",
    "/about",
    "/careers",
    "/jobs",
    "/news",
    "/press",
    "/events",
    "/training",
    "/support",
    "/help",
    "/feedback",
    "/search",
    "/login",
    "/register",
    "/profile",
    "/account",
    "/settings",
    "/language",
    "/locale",
    // navigation
    "/sitemap",
    "/navigation",
    "/menu",
    "/breadcrumb",
    // privacy
    "/privacy",
    "/terms",
    "/legal",
    "/cookie",
    "/disclaimer",
    "/copyright",
];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".zip", ".tar", ".gz", ".xml",
    ".json", ".csv", ".txt",
];

const MIN_URL_LEN: usize = 20;
const MIN_TITLE_CHARS: usize = 3;

const XILINX_TITLES: &[&str] = &[
    "包括的な用語",
    "comprehensive terms",
    "glossary",
    "用語集",
    "terms and conditions",
    "privacy policy",
    "legal notice",
    "cookie policy",
    "accessibility",
    "site map",
    "sitemap",
    "search",
    "search results",
    "navigation",
    "home",
    "homepage",
    "about",
    "about us",
    "contact",
    "support",
    "help",
    "documentation home",
    "doc home",
    "言語",
    "language",
    "language selection",
    "select language",
    "日本語",
    "english",
    "deutsch",
    "français",
    "italiano",
    "español",
    "中文",
    "한국어",
];

const XILINX_EXCLUSION_KEYWORDS: &[&str] = &[
    "privacy policy",
    "terms and conditions",
    "legal notice",
    "cookie policy",
    "disclaimer",
    "copyright",
    "login",
    "register",
    "sign in",
    "sign up",
    "language selection",
    "select language",
    "言語選択",
    "modern slavery",
    "forced labor",
    "強制労働",
    "英国税務",
    "tax strategy",
    "corporate governance",
    "investor relations",
    "annual report",
    "financial report",
    "sustainability report",
    "compliance statement",
    "code of conduct",
    "ethics policy",
    "supplier code",
    "human rights policy",
    "diversity statement",
    "environmental policy",
    "carbon footprint",
    "social responsibility",
    "csr report",
    "site map",
    "sitemap",
    "contact us",
    "about us",
    "careers",
    "jobs",
    "news",
    "press release",
    "events",
    "webinar",
    "training",
    "support",
    "help",
    "feedback",
    "search",
    "home",
    "back to top",
    "breadcrumb",
    "navigation",
    "menu",
];

const XILINX_DOMAIN_KEYWORDS: &[&str] = &[
    "fpga",
    "ip core",
    "dsp",
    "versal",
    "zynq",
    "artix",
    "kintex",
    "virtex",
    "spartan",
    "adaptive soc",
    "acap",
    "vivado",
    "vitis",
    "hls",
    "xilinx",
    "programmable logic",
    "reconfigurable",
    "hardware acceleration",
    "ai engine",
    "noc",
    "processing system",
    "clock",
    "memory",
    "interface",
    "protocol",
    "ethernet",
    "pcie",
    "ddr",
    "axi",
    "avalon",
    "hdl",
    "verilog",
    "vhdl",
    "system generator",
    "fir compiler",
    "filter",
    "signal processing",
    "compiler",
    "generator",
    "user guide",
    "manual",
    "data sheet",
    "pdf",
    "documentation",
    "guide",
    "document",
];

const XILINX_SERIES: &[(&str, &str)] = &[
    ("Versal", r"versal"),
    ("Zynq", r"zynq"),
    ("Artix", r"artix"),
    ("Kintex", r"kintex"),
    ("Virtex", r"virtex"),
    ("Spartan", r"spartan"),
];

const ALTERA_TITLES: &[&str] = &[
    "search results",
    "documentation home",
    "documentation",
    "home",
    "back",
    "next",
    "previous",
    "more",
    "load more",
    "show more",
    "view all",
    "see all",
    "all results",
    "search",
    "filter",
    "sort",
    "page",
    "results",
    "found",
    "matches",
    "items",
    "検索結果",
    "glossary",
    "用語集",
    "modern slavery statement",
    "forced labor statement",
    "強制労働に関する声明",
    "uk tax strategy",
    "英国税務戦略",
    "tax strategy",
    "corporate governance",
    "investor relations",
    "privacy policy",
    "terms and conditions",
    "legal notice",
    "cookie policy",
];

const ALTERA_EXCLUSION_KEYWORDS: &[&str] = &[
    "privacy",
    "legal",
    "terms",
    "conditions",
    "policy",
    "statement",
    "corporate",
    "investor",
    "financial",
    "annual report",
    "press release",
    "news",
    "career",
    "job",
    "marketing",
    "sales",
    "contact",
    "support",
    "modern slavery",
    "forced labor",
    "強制労働",
    "uk tax strategy",
    "英国税務戦略",
    "tax strategy",
    "corporate governance",
    "sustainability",
    "social responsibility",
    "csr report",
    "compliance",
    "ethics",
    "code of conduct",
    "supplier code",
    "human rights",
    "diversity",
    "environmental",
    "carbon footprint",
    "language selection",
    "sign in",
    "register",
    "login",
    "sitemap",
    "breadcrumb",
    "navigation",
    "menu",
    "search results",
    "home page",
    "back to top",
    "contact us",
    "about us",
    "help",
    "feedback",
];

const ALTERA_DOMAIN_KEYWORDS: &[&str] = &[
    "fpga",
    "ip core",
    "dsp",
    "stratix",
    "arria",
    "cyclone",
    "max",
    "agilex",
    "altera",
    "intel",
    "quartus",
    "platform designer",
    "qsys",
    "nios",
    "programmable logic",
    "reconfigurable",
    "hardware acceleration",
    "pcie",
    "ddr",
    "ethernet",
    "axi",
    "avalon",
    "hdl",
    "verilog",
    "vhdl",
    "opencl",
    "oneapi",
    "soc",
    "hps",
    "arm",
    "processor",
];

const ALTERA_PATH_PATTERNS: &[&str] = &[
    "/docs/programmable/",
    "/content/www/us/en/docs/",
    ".pdf",
    "user-guide",
    "handbook",
    "reference-manual",
];

const ALTERA_SERIES: &[(&str, &str)] = &[
    ("Stratix", r"stratix"),
    ("Arria", r"arria"),
    ("Cyclone", r"cyclone"),
    ("Max", r"max\s*10"),
    ("Agilex", r"agilex"),
];

/// Keyword lists and defaults for one documentation vendor.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    pub vendor: &'static str,
    pub excluded_titles: &'static [&'static str],
    pub exclusion_keywords: &'static [&'static str],
    pub domain_keywords: &'static [&'static str],
    pub path_patterns: &'static [&'static str],
    pub series_patterns: &'static [(&'static str, &'static str)],
    pub default_policy: RelevancePolicy,
}

impl VendorProfile {
    pub fn xilinx() -> Self {
        Self {
            vendor: "xilinx",
            excluded_titles: XILINX_TITLES,
            exclusion_keywords: XILINX_EXCLUSION_KEYWORDS,
            domain_keywords: XILINX_DOMAIN_KEYWORDS,
            path_patterns: &[],
            series_patterns: XILINX_SERIES,
            default_policy: RelevancePolicy::IncludeByDefault,
        }
    }

    pub fn altera() -> Self {
        Self {
            vendor: "altera",
            excluded_titles: ALTERA_TITLES,
            exclusion_keywords: ALTERA_EXCLUSION_KEYWORDS,
            domain_keywords: ALTERA_DOMAIN_KEYWORDS,
            path_patterns: ALTERA_PATH_PATTERNS,
            series_patterns: ALTERA_SERIES,
            default_policy: RelevancePolicy::ExcludeByDefault,
        }
    }
}

/// Decides which scraped links are kept and how kept ones are classified.
#[derive(Debug)]
pub struct DocumentFilter {
    profile: VendorProfile,
    series: Vec<(&'static str, Regex)>,
    excluded_patterns: Vec<String>,
}

impl DocumentFilter {
    pub fn new(profile: VendorProfile, excluded_patterns: &[String]) -> Result<Self> {
        let mut series = Vec::with_capacity(profile.series_patterns.len());
        for (label, pattern) in profile.series_patterns {
            series.push((*label, Regex::new(pattern)?));
        }

        let excluded_patterns = excluded_patterns
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Self {
            profile,
            series,
            excluded_patterns,
        })
    }

    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    pub fn is_excluded_title(&self, title: &str) -> bool {
        let title = title.trim().to_lowercase();

        if title.chars().count() < MIN_TITLE_CHARS {
            return true;
        }
        if title.starts_with("http://") || title.starts_with("https://") || title.starts_with("www.") {
            return true;
        }
        if title == "comprehensive terms" || title == "包括的な用語" {
            return true;
        }

        self.profile.excluded_titles.iter().any(|t| *t == title)
    }

    pub fn is_excluded_url(&self, url: &str) -> bool {
        if url.len() < MIN_URL_LEN {
            return true;
        }

        let url = url.to_lowercase();
        if EXCLUDED_URL_FRAGMENTS.iter().any(|f| url.contains(f)) {
            return true;
        }

        EXCLUDED_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
    }

    pub fn is_topically_relevant(&self, text: &str) -> bool {
        self.is_topically_relevant_with(text, self.profile.default_policy)
    }

    pub fn is_topically_relevant_with(&self, text: &str, policy: RelevancePolicy) -> bool {
        let text = text.to_lowercase();

        if GLOSSARY_TITLES.contains(&text.trim()) {
            return false;
        }
        if self.profile.exclusion_keywords.iter().any(|k| text.contains(k)) {
            return false;
        }
        if self.profile.domain_keywords.iter().any(|k| text.contains(k))
            || self.profile.path_patterns.iter().any(|p| text.contains(p))
        {
            return true;
        }

        policy == RelevancePolicy::IncludeByDefault
    }

    /// User-configured substrings that drop a candidate by title or URL.
    pub fn matches_excluded_pattern(&self, candidate: &Candidate) -> bool {
        if self.excluded_patterns.is_empty() {
            return false;
        }
        let title = candidate.title.to_lowercase();
        let url = candidate.url.to_lowercase();
        self.excluded_patterns
            .iter()
            .any(|p| title.contains(p.as_str()) || url.contains(p.as_str()))
    }

    pub fn extract_series_tag(&self, text: &str) -> Option<String> {
        let text = text.to_lowercase();
        self.series
            .iter()
            .find(|(_, re)| re.is_match(&text))
            .map(|(label, _)| label.to_string())
    }

    pub fn accepts(&self, candidate: &Candidate) -> bool {
        !self.is_excluded_title(&candidate.title)
            && !self.is_excluded_url(&candidate.url)
            && !self.matches_excluded_pattern(candidate)
            && self.is_topically_relevant(&format!("{} {}", candidate.title, candidate.url))
    }

    /// Build a classified document from an accepted candidate.
    pub fn to_document(&self, candidate: &Candidate, source: &str, search_url: &str) -> Document {
        let title = candidate.title.trim();
        let series_tag = self.extract_series_tag(&format!("{} {}", title, candidate.url));
        Document::builder(title, candidate.url.as_str(), source, SourceKind::WebScraping)
            .search_url(search_url)
            .category(classify_category(title).as_str())
            .series_tag(series_tag)
            .file_kind(extract_file_kind(&candidate.url))
            .build()
    }
}

pub fn classify_category(title: &str) -> Category {
    let title = title.to_lowercase();
    let has = |needle: &str| title.contains(needle);

    if has("data sheet") || has("datasheet") {
        Category::DataSheet
    } else if has("user guide") || has("manual") {
        Category::UserGuide
    } else if (has("ip") && has("core")) || has("ip core") {
        Category::IpCore
    } else if has("reference") {
        Category::Reference
    } else if has("dsp") {
        Category::Dsp
    } else if has("tutorial") {
        Category::Tutorial
    } else if has("application note") || has("app note") {
        Category::ApplicationNote
    } else if has("white paper") {
        Category::WhitePaper
    } else if has("specification") || has("spec") {
        Category::Specification
    } else {
        Category::Document
    }
}

pub fn extract_file_kind(url: &str) -> &'static str {
    let url = url.to_lowercase();
    if url.ends_with(".pdf") {
        "pdf"
    } else if url.ends_with(".html") || url.ends_with(".htm") {
        "html"
    } else if url.contains("pdf") {
        "pdf"
    } else {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xilinx() -> DocumentFilter {
        DocumentFilter::new(VendorProfile::xilinx(), &[]).unwrap()
    }

    fn altera() -> DocumentFilter {
        DocumentFilter::new(VendorProfile::altera(), &[]).unwrap()
    }

    #[test]
    fn test_vendor_default_policies() {
        assert_eq!(xilinx().profile().vendor, "xilinx");
        assert_eq!(xilinx().profile().default_policy, RelevancePolicy::IncludeByDefault);
        assert_eq!(altera().profile().default_policy, RelevancePolicy::ExcludeByDefault);
    }

    #[test]
    fn test_boilerplate_titles_excluded_in_any_case() {
        let filter = xilinx();
        for title in ["Privacy Policy", "  PRIVACY POLICY ", "Site Map", "日本語", "Comprehensive Terms", "包括的な用語"] {
            assert!(filter.is_excluded_title(title), "{title:?} should be excluded");
        }
        assert!(filter.is_excluded_title(""));
        assert!(filter.is_excluded_title("ab"));
        assert!(filter.is_excluded_title("https://docs.amd.com/r/en-US/pg149"));
        assert!(filter.is_excluded_title("www.xilinx.com"));
    }

    #[test]
    fn test_altera_navigation_titles_excluded() {
        let filter = altera();
        for title in ["Load More", "View All", "検索結果", "Modern Slavery Statement"] {
            assert!(filter.is_excluded_title(title), "{title:?} should be excluded");
        }
        assert!(!filter.is_excluded_title("Stratix 10 DSP Blocks User Guide"));
    }

    #[test]
    fn test_on_topic_titles_pass() {
        let filter = xilinx();
        let candidate = Candidate::new(
            "Versal ACAP DSP Engine Architecture Manual",
            "https://docs.amd.com/r/en-US/am004-versal-dsp-engine",
        );
        assert!(filter.accepts(&candidate));
    }

    #[test]
    fn test_corporate_urls_excluded() {
        let filter = xilinx();
        for url in [
            "https://docs.amd.com/modern-slavery-statement",
            "https://docs.amd.com/uk-tax-strategy",
            "https://docs.amd.com/privacy-policy",
            "https://docs.amd.com/contact-us",
            "https://docs.amd.com/assets/site/main.js",
            "https://a.io/x",
        ] {
            assert!(filter.is_excluded_url(url), "{url} should be excluded");
        }
        assert!(!filter.is_excluded_url(
            "https://docs.amd.com/r/en-US/pg149-fir-compiler/System-Generator-for-DSP"
        ));
        assert!(!filter.is_excluded_url(
            "https://docs.amd.com/v/u/en-US/ug949-vivado-design-methodology"
        ));
    }

    #[test]
    fn test_relevance_default_differs_per_vendor() {
        let neutral = "Quarterly Overview Slides";
        assert!(xilinx().is_topically_relevant(neutral));
        assert!(!altera().is_topically_relevant(neutral));
        assert!(altera().is_topically_relevant_with(neutral, RelevancePolicy::IncludeByDefault));
    }

    #[test]
    fn test_relevance_exclusion_wins_over_domain_keyword() {
        assert!(!xilinx().is_topically_relevant("FPGA Modern Slavery Statement"));
        assert!(!altera().is_topically_relevant("Intel FPGA privacy notice"));
        assert!(!xilinx().is_topically_relevant("  Glossary "));
    }

    #[test]
    fn test_altera_path_patterns_whitelisted() {
        let filter = altera();
        assert!(filter.is_topically_relevant(
            "Overview https://docs.example.org/content/www/us/en/docs/programmable/683832/current.html"
        ));
    }

    #[test]
    fn test_category_precedence() {
        assert_eq!(classify_category("Zynq Data Sheet User Guide"), Category::DataSheet);
        assert_eq!(classify_category("FIR Compiler User Guide"), Category::UserGuide);
        assert_eq!(classify_category("FFT IP Core Reference"), Category::IpCore);
        assert_eq!(classify_category("DSP Builder Reference"), Category::Reference);
        assert_eq!(classify_category("Variable Precision DSP Blocks"), Category::Dsp);
        assert_eq!(classify_category("HLS Tutorial"), Category::Tutorial);
        assert_eq!(classify_category("Timing App Note"), Category::ApplicationNote);
        assert_eq!(classify_category("AI Engine White Paper"), Category::WhitePaper);
        assert_eq!(classify_category("AXI4 Specification"), Category::Specification);
        assert_eq!(classify_category("Release Notes"), Category::Document);
    }

    #[test]
    fn test_series_tags() {
        assert_eq!(xilinx().extract_series_tag("Kintex UltraScale+ FPGAs").as_deref(), Some("Kintex"));
        assert_eq!(altera().extract_series_tag("MAX 10 FPGA Device Overview").as_deref(), Some("Max"));
        assert_eq!(altera().extract_series_tag("Agilex 7 Power Guide").as_deref(), Some("Agilex"));
        assert_eq!(altera().extract_series_tag("Generic FPGA Guide"), None);
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(extract_file_kind("https://docs.amd.com/x/ug1.pdf"), "pdf");
        assert_eq!(extract_file_kind("https://docs.amd.com/x/ug1.html"), "html");
        assert_eq!(extract_file_kind("https://docs.amd.com/api/pdf?id=3"), "pdf");
        assert_eq!(extract_file_kind("https://docs.amd.com/r/en-US/ug1"), "html");
    }

    #[test]
    fn test_configured_patterns_drop_candidates() {
        let filter = DocumentFilter::new(VendorProfile::xilinx(), &["Errata".to_string()]).unwrap();
        let errata = Candidate::new(
            "Versal Errata Sheet",
            "https://docs.amd.com/r/en-US/versal-errata",
        );
        assert!(!filter.accepts(&errata));
    }

    #[test]
    fn test_document_is_classified() {
        let filter = altera();
        let candidate = Candidate::new(
            " Cyclone V Device Handbook ",
            "https://www.intel.com/content/www/us/en/docs/programmable/683375/cyclone-v.pdf",
        );
        let doc = filter.to_document(&candidate, "altera", "https://www.intel.com/s?q=DSP");
        assert_eq!(doc.name, "Cyclone V Device Handbook");
        assert_eq!(doc.series_tag.as_deref(), Some("Cyclone"));
        assert_eq!(doc.file_kind.as_deref(), Some("pdf"));
        assert_eq!(doc.category.as_deref(), Some("Document"));
        assert_eq!(doc.source_kind, SourceKind::WebScraping);
    }
}
