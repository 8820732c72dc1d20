//! Session Orchestrator: index page → fragments → finished records. The
//! bill and resolution pathways are the same pipeline instantiated with a
//! different URL template, boundary pattern, and block parser; only the
//! resolution pathway is wired to the default CLI entry point.

use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::details;
use crate::model::{LegislativeRecord, RecordKind};
use crate::parser::{bill, resolution, segment};
use crate::pdf::{self, DocumentConverter};

const INDEX_BASE: &str = "https://guamlegislature.com";

pub fn bill_index_url(session: &str) -> String {
    format!("{INDEX_BASE}/{session}_Guam_Legislature/{session}_bills_intro_content.htm")
}

pub fn resolution_index_url(session: &str) -> String {
    format!("{INDEX_BASE}/{session}_Guam_Legislature/{session}_res_content.htm")
}

/// The two I/O points of the pipeline. Retry and timeout policy live with
/// the implementor, not here.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl Fetch for reqwest::Client {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let res = self
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;
        Ok(res
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?
            .text()
            .await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let res = self
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;
        Ok(res
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?
            .bytes()
            .await?
            .to_vec())
    }
}

pub struct SessionScraper<'a> {
    pub fetcher: &'a dyn Fetch,
    pub converter: &'a dyn DocumentConverter,
}

impl SessionScraper<'_> {
    /// Extract every record of one kind for a session, in index order.
    /// Structural failures abort the whole run; a shape mismatch means the
    /// page template changed and silent continuation would corrupt records.
    pub async fn scrape(&self, session: &str, kind: RecordKind) -> Result<Vec<LegislativeRecord>> {
        let url = match kind {
            RecordKind::Bill => bill_index_url(session),
            RecordKind::Resolution => resolution_index_url(session),
        };
        info!("Fetching {} index: {}", kind.as_str(), url);
        let page = self.fetcher.fetch_text(&url).await?;

        let content = segment::content_block(&page, kind).with_context(|| url.clone())?;
        let frags: Vec<&str> = segment::fragments(content, kind).collect();
        info!("Found {} {} fragments", frags.len(), kind.as_str());

        let pb = progress_bar(frags.len());
        let mut records = Vec::with_capacity(frags.len());
        for (i, frag) in frags.iter().enumerate() {
            let record = self
                .finish(session, kind, frag, &url)
                .await
                .with_context(|| format!("{} fragment {i} of {url}", kind.as_str()))?;
            records.push(record);
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!("Extracted {} {} records", records.len(), kind.as_str());
        Ok(records)
    }

    async fn finish(
        &self,
        session: &str,
        kind: RecordKind,
        fragment: &str,
        root_url: &str,
    ) -> Result<LegislativeRecord> {
        match kind {
            RecordKind::Bill => {
                let parsed = bill::parse(fragment, session, root_url)?;
                let text = self.document_text(&parsed.detail_url).await?;
                let details = details::bill_details(&text);
                if details.is_empty() {
                    warn!("No dates recovered from {}", parsed.detail_url);
                }
                let mut record = parsed.record;
                bill::apply_details(&mut record, &details);
                Ok(record)
            }
            RecordKind::Resolution => {
                let parsed = resolution::parse(fragment, session, root_url)?;
                let text = self.document_text(&parsed.detail_url).await?;
                let details = details::resolution_details(&text);
                if details.is_empty() {
                    warn!("No dates recovered from {}", parsed.detail_url);
                }
                let mut record = parsed.record;
                resolution::apply_details(&mut record, &details);
                Ok(record)
            }
        }
    }

    async fn document_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetcher.fetch_bytes(url).await?;
        let nodes = self
            .converter
            .positioned_text(&bytes)
            .await
            .with_context(|| format!("converting document {url}"))?;
        Ok(pdf::normalize(&nodes))
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::model::ActionDate;
    use crate::pdf::TextNode;

    use super::*;

    /// Serves canned pages; document bytes are just the URL itself so the
    /// stub converter can key its replies off them.
    struct StubFetch {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetch for StubFetch {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .with_context(|| format!("no stub page for {url}"))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            Ok(url.as_bytes().to_vec())
        }
    }

    struct StubConverter {
        texts: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl DocumentConverter for StubConverter {
        async fn positioned_text(&self, pdf: &[u8]) -> Result<Vec<TextNode>> {
            let url = String::from_utf8_lossy(pdf).to_string();
            let lines = self
                .texts
                .get(&url)
                .with_context(|| format!("no stub document for {url}"))?;
            Ok(lines
                .iter()
                .enumerate()
                .map(|(i, line)| TextNode {
                    top: Some(i as u32 * 20),
                    left: Some(108),
                    text: Some(line.clone()),
                })
                .collect())
        }
    }

    fn res_index_page() -> String {
        let frag_one = concat!(
            r#"<p align="left">RELATIVE TO RECOGNIZING THE GUAM YOUTH CONGRESS"#,
            r#"<a href="37_res/1-37.pdf">Res. No. 1-37 (COR)</a>"#,
            "Sponsor(s) -/ T. Ada\n/ J. Doe - ADOPTED 01/02/20\n<p>\n<br>",
        );
        let frag_two = concat!(
            r#"<p align="left">RELATIVE TO NAMING A BRIDGE"#,
            r#"<a href="37_res/2-37.pdf">Res. No. 2-37 (COR)</a>"#,
            "Sponsor(s) -/ V. Borja\n<p>\n<br>",
        );
        format!("<html>boilerplate<!-- nav -->{frag_one}{frag_two}<!-- footer -->tail")
    }

    fn res_pdf_lines() -> Vec<String> {
        vec![
            "BILL HISTORY".into(), // boilerplate, dropped by the normalizer
            "Filed 1/5/22 10:05 a.m.".into(),
            "Introduced 1/19/22 9:30 a.m.".into(),
            "Presented 1/25/22 2:00 p.m.".into(),
            "Adopted 1/25/22 4:15 p.m.".into(),
        ]
    }

    fn scraper_fixtures() -> (StubFetch, StubConverter) {
        let index_url = resolution_index_url("37");
        let fetch = StubFetch {
            pages: HashMap::from([(index_url, res_index_page())]),
        };
        let base = "https://guamlegislature.com/37_Guam_Legislature/37_res";
        let converter = StubConverter {
            texts: HashMap::from([
                (format!("{base}/1-37.pdf"), res_pdf_lines()),
                (format!("{base}/2-37.pdf"), vec!["no dates in here".into()]),
            ]),
        };
        (fetch, converter)
    }

    #[tokio::test]
    async fn resolution_pipeline_end_to_end() {
        let (fetch, converter) = scraper_fixtures();
        let scraper = SessionScraper {
            fetcher: &fetch,
            converter: &converter,
        };

        let records = scraper.scrape("37", RecordKind::Resolution).await.unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.identifier, "1-37");
        assert_eq!(first.title, "Relative To Recognizing The Guam Youth Congress");
        assert_eq!(first.sponsorships[1].name, "J. Doe");

        // literal result-tail action first, then the three dated actions
        let labels: Vec<&str> = first.actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["ADOPTED", "Introduced", "Presented", "Adopted"]);
        assert_eq!(first.actions[0].date, ActionDate::Text("01/02/20".into()));

        // second record's document had no recognizable dates: no dated actions
        let second = &records[1];
        assert_eq!(second.identifier, "2-37");
        assert!(second.actions.is_empty());
        assert_eq!(second.sponsorships.len(), 1);
    }

    #[tokio::test]
    async fn records_preserve_index_order() {
        let (fetch, converter) = scraper_fixtures();
        let scraper = SessionScraper {
            fetcher: &fetch,
            converter: &converter,
        };
        let records = scraper.scrape("37", RecordKind::Resolution).await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["1-37", "2-37"]);
    }

    #[tokio::test]
    async fn bill_pipeline_is_invocable_independently() {
        let frag = concat!(
            r#"<p><strong>Bill No. 163-37 (LS)</strong> <a href="37_bills/163-37.pdf">163-37</a>"#,
            "<p>AN ACT TO AMEND SECTION 3107\n",
            r#"<li><a href="status/163-37.pdf">Bill Status</a></li>"#,
            "Sponsor(s) -/ T. Ada\n<p>\n<br>",
        );
        let index_url = bill_index_url("37");
        let fetch = StubFetch {
            pages: HashMap::from([(index_url, format!("<html>junk<!-- header -->{frag}"))]),
        };
        let converter = StubConverter {
            texts: HashMap::from([(
                "https://guamlegislature.com/37_Guam_Legislature/status/163-37.pdf".to_string(),
                vec![
                    "Filed 1/5/22 10:05 a.m.".into(),
                    "Introduced 1/19/22 9:30 a.m.".into(),
                    "Referred 1/20/22".into(),
                    "Committee on Appropriations\nand Finance".into(),
                ],
            )]),
        };
        let scraper = SessionScraper {
            fetcher: &fetch,
            converter: &converter,
        };

        let records = scraper.scrape("37", RecordKind::Bill).await.unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.identifier, "163-37");
        assert_eq!(rec.actions.len(), 2);
        assert_eq!(
            rec.actions[1].organization.as_deref(),
            Some("Committee on Appropriations and Finance")
        );
    }

    #[tokio::test]
    async fn shape_change_fails_loudly_with_url_context() {
        let index_url = resolution_index_url("37");
        let fetch = StubFetch {
            pages: HashMap::from([(index_url.clone(), "<html>no comment markers".to_string())]),
        };
        let converter = StubConverter { texts: HashMap::new() };
        let scraper = SessionScraper {
            fetcher: &fetch,
            converter: &converter,
        };

        let err = scraper
            .scrape("37", RecordKind::Resolution)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains(&index_url));
    }
}
