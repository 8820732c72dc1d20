//! Bill Block Parser: one index fragment → a bill record shell plus the URL
//! of the document whose PDF carries the action dates.

use anyhow::{Context, Result};

use crate::details::BillDetails;
use crate::model::{ActionDate, LegislativeRecord, RecordKind};

use super::patterns::{DESC_RE, SPONSORS_RE};
use super::{apply_sponsors, split_sponsor_block, title_case, Fragment};

/// Parsed fragment, waiting on the detail fetch. For withdrawn bills the
/// detail URL is the introduced link; otherwise the status document.
pub struct ParsedBill {
    pub record: LegislativeRecord,
    pub detail_url: String,
}

pub fn parse(fragment: &str, session: &str, root_url: &str) -> Result<ParsedBill> {
    let doc = Fragment::parse(fragment, root_url)?;

    // "Bill No. 163-37 (LS)" or "Bill No. 160-37 (LS) - WITHDRAWN"
    let heading = doc
        .first_strong_text()
        .context("bill fragment has no bold identifier line")?;
    let heading = heading.trim().to_string();
    let name_line = heading.strip_prefix("Bill No. ").unwrap_or(&heading);
    let identifier = name_line
        .split_whitespace()
        .next()
        .context("bill identifier line is empty")?;

    let intro_link = doc
        .first_href()
        .context("bill fragment has no introduced link")?;

    let mut record = LegislativeRecord::new(identifier, session, RecordKind::Bill);
    record.add_source(root_url, "Bill Index");
    record.add_source(&intro_link, "Bill Introduced");

    if heading.contains("WITHDRAWN") {
        // Abbreviated path: no sponsors, no description, no further links.
        // The introduced PDF is the only document that still exists.
        record.withdrawn = true;
        return Ok(ParsedBill {
            record,
            detail_url: intro_link,
        });
    }

    let items = doc.list_item_links();
    let status_url = items
        .first()
        .map(|(url, _)| url.clone())
        .context("bill fragment has no status list item")?;
    record.add_document_link(&status_url, "Bill Status");

    if let Some(caps) = DESC_RE.captures(fragment) {
        // The leading paragraph can nest further <p> markers; the
        // description proper is the text after the last one.
        let body = caps[1].trim().to_string();
        let description = body.rsplit("<p>").next().unwrap_or(&body);
        record.title = title_case(description.trim());
    }

    let sponsor_caps = SPONSORS_RE
        .captures(fragment)
        .context("bill fragment has no sponsor block")?;
    apply_sponsors(&mut record, &split_sponsor_block(&sponsor_caps[1]));

    for (url, text) in items.iter().skip(1) {
        record.add_document_link(url, text);
    }

    Ok(ParsedBill {
        record,
        detail_url: status_url,
    })
}

/// Turn the extracted status-PDF fields into actions, most recent last.
pub fn apply_details(record: &mut LegislativeRecord, details: &BillDetails) {
    if let Some(introduced) = details.introduced {
        record.add_action("Introduced", ActionDate::When(introduced), None);
    }
    if let Some(referred) = details.referred {
        record.add_action(
            "Referred To Committee",
            ActionDate::When(referred),
            details.committee.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const ROOT: &str = "https://guamlegislature.com/37_Guam_Legislature/37_bills_intro_content.htm";

    fn normal_fragment() -> String {
        concat!(
            r#"<p><strong>Bill No. 163-37 (LS)</strong> <a href="37_bills/163-37.pdf">163-37</a>"#,
            "<p>AN ACT TO AMEND SECTION 3107 OF TITLE 16\n",
            r#"<li><a href="status/163-37.pdf">Bill Status</a></li>"#,
            r#"<li><a href="fiscal/163-37.pdf">Fiscal Note</a></li>"#,
            "Sponsor(s) -/ T. Ada\n/ J. Cruz\n<p>\n<br>",
        )
        .to_string()
    }

    #[test]
    fn normal_branch_full_record() {
        let parsed = parse(&normal_fragment(), "37", ROOT).unwrap();
        let rec = &parsed.record;

        assert_eq!(rec.identifier, "163-37");
        assert_eq!(rec.kind, RecordKind::Bill);
        assert!(!rec.withdrawn);
        assert_eq!(rec.title, "An Act To Amend Section 3107 Of Title 16");

        assert_eq!(rec.sources.len(), 2);
        assert_eq!(rec.sources[0].note, "Bill Index");
        assert_eq!(
            rec.sources[1].url,
            "https://guamlegislature.com/37_Guam_Legislature/37_bills/163-37.pdf"
        );

        // first list item is the status document, the rest extra links
        assert_eq!(rec.document_links.len(), 2);
        assert_eq!(rec.document_links[0].note, "Bill Status");
        assert_eq!(rec.document_links[1].note, "Fiscal Note");
        assert_eq!(
            parsed.detail_url,
            "https://guamlegislature.com/37_Guam_Legislature/status/163-37.pdf"
        );
    }

    #[test]
    fn primary_sponsor_is_first_and_unique() {
        let parsed = parse(&normal_fragment(), "37", ROOT).unwrap();
        let sponsors = &parsed.record.sponsorships;
        assert_eq!(sponsors.len(), 2);
        assert_eq!(sponsors[0].name, "T. Ada");
        assert_eq!(sponsors[0].classification, "primary");
        assert!(sponsors[0].primary);
        assert_eq!(sponsors[1].classification, "cosponsor");
        assert_eq!(sponsors.iter().filter(|s| s.primary).count(), 1);
    }

    #[test]
    fn withdrawn_branch_skips_sponsors_and_links() {
        let fragment = concat!(
            r#"<p><strong>Bill No. 160-37 (LS) - WITHDRAWN</strong>"#,
            r#" <a href="37_bills/160-37.pdf">160-37</a>"#,
            "\n<br>",
        );
        let parsed = parse(fragment, "37", ROOT).unwrap();
        let rec = &parsed.record;

        assert_eq!(rec.identifier, "160-37");
        assert!(rec.withdrawn);
        assert!(rec.sponsorships.is_empty());
        assert!(rec.document_links.is_empty());
        assert_eq!(rec.title, crate::model::PLACEHOLDER_TITLE);
        // details come from the introduced link, the only surviving document
        assert_eq!(
            parsed.detail_url,
            "https://guamlegislature.com/37_Guam_Legislature/37_bills/160-37.pdf"
        );
    }

    #[test]
    fn missing_strong_is_a_structural_failure() {
        let fragment = r#"<p><a href="x.pdf">163-37</a>\n<br>"#;
        assert!(parse(fragment, "37", ROOT).is_err());
    }

    #[test]
    fn missing_sponsor_block_is_a_structural_failure() {
        let fragment = concat!(
            r#"<p><strong>Bill No. 163-37 (LS)</strong> <a href="a.pdf">163</a>"#,
            r#"<p>AN ACT<li><a href="s.pdf">Bill Status</a></li><br>"#,
        );
        assert!(parse(fragment, "37", ROOT).is_err());
    }

    #[test]
    fn details_become_actions_with_committee_organization() {
        let mut rec = LegislativeRecord::new("163-37", "37", RecordKind::Bill);
        let details = BillDetails {
            introduced: Some(crate::model::GUAM_TZ.with_ymd_and_hms(2022, 1, 19, 9, 30, 0).unwrap()),
            referred: Some(crate::model::GUAM_TZ.with_ymd_and_hms(2022, 1, 20, 0, 0, 0).unwrap()),
            committee: Some("Committee on Appropriations and Finance".into()),
        };
        apply_details(&mut rec, &details);
        assert_eq!(rec.actions.len(), 2);
        assert_eq!(rec.actions[0].label, "Introduced");
        assert_eq!(rec.actions[1].label, "Referred To Committee");
        assert_eq!(
            rec.actions[1].organization.as_deref(),
            Some("Committee on Appropriations and Finance")
        );
    }

    #[test]
    fn empty_details_emit_no_actions() {
        let mut rec = LegislativeRecord::new("163-37", "37", RecordKind::Bill);
        apply_details(&mut rec, &BillDetails::default());
        assert!(rec.actions.is_empty());
    }
}
