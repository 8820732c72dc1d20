//! Resolution Block Parser. Resolutions have no separate status document;
//! the introduced PDF doubles as the detail source.

use anyhow::{Context, Result};

use crate::details::ResolutionDetails;
use crate::model::{ActionDate, LegislativeRecord, RecordKind};

use super::patterns::{RES_DESC_RE, SPONSORS_RE};
use super::{apply_sponsors, split_sponsor_block, title_case, Fragment};

pub struct ParsedResolution {
    pub record: LegislativeRecord,
    pub detail_url: String,
}

pub fn parse(fragment: &str, session: &str, root_url: &str) -> Result<ParsedResolution> {
    let doc = Fragment::parse(fragment, root_url)?;

    // "Res. No. 12-37 (COR)"
    let link_text = doc
        .first_link_text()
        .context("resolution fragment has no identifier link")?;
    let link_text = link_text.trim();
    let name_line = link_text.strip_prefix("Res. No. ").unwrap_or(link_text);
    let identifier = name_line
        .split_whitespace()
        .next()
        .context("resolution identifier line is empty")?;

    let intro_link = doc
        .first_href()
        .context("resolution fragment has no introduced link")?;

    let mut record = LegislativeRecord::new(identifier, session, RecordKind::Resolution);
    record.add_source(root_url, "Bill Index");
    record.add_source(&intro_link, "Bill Introduced");

    if let Some(caps) = RES_DESC_RE.captures(fragment) {
        record.title = title_case(caps[1].trim());
    }

    let sponsor_caps = SPONSORS_RE
        .captures(fragment)
        .context("resolution fragment has no sponsor block")?;
    let mut sponsors = split_sponsor_block(&sponsor_caps[1]);

    // Result tail: the last sponsor line sometimes carries the floor outcome,
    // "J. Doe - ADOPTED 01/02/20". The date exists only as display text in
    // the source, so it is stored literally rather than re-parsed.
    let mut outcome: Option<(String, String)> = None;
    if let Some(last) = sponsors.last_mut() {
        if let Some((name, result_datum)) = last.split_once('-') {
            let mut parts = result_datum.split_whitespace();
            if let (Some(label), Some(date)) = (parts.next(), parts.next()) {
                outcome = Some((label.to_string(), date.to_string()));
            }
            *last = name.trim().to_string();
        }
    }
    if let Some((label, date)) = outcome {
        record.add_action(&label, ActionDate::Text(date), None);
    }

    apply_sponsors(&mut record, &sponsors);

    Ok(ParsedResolution {
        record,
        detail_url: intro_link,
    })
}

/// Turn the extracted PDF dates into actions.
pub fn apply_details(record: &mut LegislativeRecord, details: &ResolutionDetails) {
    if let Some(introduced) = details.introduced {
        record.add_action("Introduced", ActionDate::When(introduced), None);
    }
    if let Some(presented) = details.presented {
        record.add_action("Presented", ActionDate::When(presented), None);
    }
    if let Some(adopted) = details.adopted {
        record.add_action("Adopted", ActionDate::When(adopted), None);
    }
}
