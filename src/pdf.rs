//! The status documents arrive as PDFs; an external converter renders them
//! as positional-text XML (`<text top=".." left="..">…</text>` per line).
//! This module owns the converter seam and the normalization that strips the
//! visual layout (letterhead, page markers) down to one flat string the
//! detail extractor can pattern-match.

use std::io::Write;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use tokio::process::Command;

use crate::parser::patterns::BOILERPLATE_LINES;

/// One positioned text node from the converter output. Positions are kept
/// for diagnostics; extraction relies on document order alone.
#[derive(Debug, Clone)]
pub struct TextNode {
    pub top: Option<u32>,
    pub left: Option<u32>,
    pub text: Option<String>,
}

#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Render a PDF as its positioned text nodes, in document order.
    async fn positioned_text(&self, pdf: &[u8]) -> Result<Vec<TextNode>>;
}

/// Production converter: poppler's `pdftohtml -xml` over a scratch file.
pub struct PdftohtmlConverter;

#[async_trait]
impl DocumentConverter for PdftohtmlConverter {
    async fn positioned_text(&self, pdf: &[u8]) -> Result<Vec<TextNode>> {
        let mut file =
            tempfile::NamedTempFile::new().context("creating scratch file for pdftohtml")?;
        file.write_all(pdf)
            .context("writing PDF to scratch file")?;

        let output = Command::new("pdftohtml")
            .args(["-xml", "-stdout", "-i", "-q"])
            .arg(file.path())
            .output()
            .await
            .context("spawning pdftohtml (is poppler installed?)")?;
        if !output.status.success() {
            bail!(
                "pdftohtml exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_positioned_text(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Pull the `<text>` nodes out of the converter XML. Inline markup inside a
/// node (`<b>`, `<i>`) contributes its text and nothing else.
pub fn parse_positioned_text(xml: &str) -> Result<Vec<TextNode>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut nodes = Vec::new();
    let mut current: Option<TextNode> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => {
                let mut node = TextNode {
                    top: None,
                    left: None,
                    text: None,
                };
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"top" => node.top = value.parse().ok(),
                        b"left" => node.left = value.parse().ok(),
                        _ => {}
                    }
                }
                current = Some(node);
            }
            Ok(Event::Text(e)) => {
                if let Some(node) = current.as_mut() {
                    let piece = e.unescape()?;
                    match &mut node.text {
                        Some(text) => text.push_str(&piece),
                        None => node.text = Some(piece.into_owned()),
                    }
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"text" => {
                if let Some(node) = current.take() {
                    nodes.push(node);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(nodes)
}

/// Drop empty and boilerplate nodes; join the rest with newlines in original
/// order. Headers and page markers would corrupt the ordinal date lookups
/// downstream if left in.
pub fn normalize(nodes: &[TextNode]) -> String {
    nodes
        .iter()
        .filter_map(|n| n.text.as_deref())
        .filter(|t| {
            let trimmed = t.trim();
            !trimmed.is_empty() && !BOILERPLATE_LINES.contains(&trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pdf2xml producer="poppler" version="22.02.0">
<page number="1" position="absolute" top="0" left="0" height="1188" width="918">
<text top="81" left="108" width="180" height="17" font="0"><b>BILL HISTORY</b></text>
<text top="120" left="108" width="300" height="17" font="1">Filed: 1/5/22 10:05 a.m.</text>
<text top="140" left="108" width="60" height="17" font="1">   </text>
<text top="160" left="108" width="300" height="17" font="1">Introduced: 1/19/22 9:30 a.m.</text>
<text top="1100" left="400" width="60" height="17" font="1">Page 1</text>
</page>
</pdf2xml>"#;

    #[test]
    fn parses_text_nodes_with_positions() {
        let nodes = parse_positioned_text(SAMPLE_XML).unwrap();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0].text.as_deref(), Some("BILL HISTORY"));
        assert_eq!(nodes[1].top, Some(120));
        assert_eq!(nodes[1].left, Some(108));
    }

    #[test]
    fn normalize_drops_boilerplate_and_blank_nodes() {
        let nodes = parse_positioned_text(SAMPLE_XML).unwrap();
        let text = normalize(&nodes);
        assert_eq!(
            text,
            "Filed: 1/5/22 10:05 a.m.\nIntroduced: 1/19/22 9:30 a.m."
        );
    }

    #[test]
    fn normalize_keeps_original_order() {
        let nodes = vec![
            TextNode { top: Some(2), left: None, text: Some("second".into()) },
            TextNode { top: Some(1), left: None, text: Some("first".into()) },
            TextNode { top: None, left: None, text: None },
        ];
        assert_eq!(normalize(&nodes), "second\nfirst");
    }
}
