pub mod bill;
pub mod patterns;
pub mod resolution;
pub mod segment;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::LegislativeRecord;

/// One record fragment parsed as markup, with hrefs resolved against the
/// index page URL. The fragments are nowhere near well-formed documents;
/// html5ever's error recovery is what makes node queries possible at all.
pub(crate) struct Fragment {
    doc: Html,
    base: Url,
}

impl Fragment {
    pub fn parse(html: &str, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid index URL: {base_url}"))?;
        Ok(Fragment {
            doc: Html::parse_fragment(html),
            base,
        })
    }

    fn first(&self, css: &str) -> Option<ElementRef<'_>> {
        let sel = Selector::parse(css).unwrap();
        self.doc.select(&sel).next()
    }

    pub fn first_strong_text(&self) -> Option<String> {
        self.first("strong").map(|el| el.text().collect())
    }

    pub fn first_link_text(&self) -> Option<String> {
        self.first("a").map(|el| el.text().collect())
    }

    /// First href in the fragment, made absolute.
    pub fn first_href(&self) -> Option<String> {
        self.resolve(self.first("a")?.value().attr("href")?)
    }

    /// (url, link text) for the first anchor of every list item, in order.
    pub fn list_item_links(&self) -> Vec<(String, String)> {
        let li = Selector::parse("li").unwrap();
        let a = Selector::parse("a").unwrap();
        self.doc
            .select(&li)
            .filter_map(|item| {
                let link = item.select(&a).next()?;
                let url = self.resolve(link.value().attr("href")?)?;
                let text = link.text().collect::<String>().trim().to_string();
                Some((url, text))
            })
            .collect()
    }

    fn resolve(&self, href: &str) -> Option<String> {
        self.base.join(href.trim()).ok().map(|u| u.to_string())
    }
}

/// Sponsor entries are delimited by `/` and newlines; strip both plus
/// surrounding whitespace and drop empty lines.
pub(crate) fn split_sponsor_block(block: &str) -> Vec<String> {
    block
        .lines()
        .map(|l| l.trim().trim_start_matches('/').trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// First sponsor in document order is the primary; the rest cosponsor.
pub(crate) fn apply_sponsors(record: &mut LegislativeRecord, sponsors: &[String]) {
    if let Some((first, rest)) = sponsors.split_first() {
        record.add_sponsorship(first, "person", "primary", true);
        for name in rest {
            record.add_sponsorship(name, "person", "cosponsor", false);
        }
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
/// The index pages shout their descriptions in all caps.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start_of_word = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if start_of_word {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(c);
            start_of_word = true;
        }
    }
    out
}
