use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Pacific/Guam is UTC+10 year-round with no DST, so a fixed offset is exact.
pub static GUAM_TZ: LazyLock<FixedOffset> =
    LazyLock::new(|| FixedOffset::east_opt(10 * 3600).unwrap());

/// Title until a description is parsed. Withdrawn records keep it.
pub const PLACEHOLDER_TITLE: &str = "See Introduced Link";

/// The Guam Legislature is unicameral; every record carries the same chamber.
pub const CHAMBER: &str = "unicameral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Bill,
    Resolution,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Bill => "bill",
            RecordKind::Resolution => "resolution",
        }
    }
}

/// Action dates are structured and Guam-local, except the resolution result
/// tail, where the source yields only a raw date string (see resolution.rs).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionDate {
    When(DateTime<FixedOffset>),
    Text(String),
}

impl ActionDate {
    /// Stored form: RFC 3339 for structured dates, the raw text otherwise.
    pub fn to_db_string(&self) -> String {
        match self {
            ActionDate::When(dt) => dt.to_rfc3339(),
            ActionDate::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub label: String,
    pub date: ActionDate,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sponsorship {
    pub name: String,
    pub entity_type: String,
    pub classification: String,
    pub primary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentLink {
    pub url: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub url: String,
    pub note: String,
}

/// One bill or resolution, owning its actions, sponsorships, links, and
/// sources outright. Identifier and kind never change after construction.
#[derive(Debug, Clone, Serialize)]
pub struct LegislativeRecord {
    pub identifier: String,
    pub session: String,
    pub chamber: String,
    pub kind: RecordKind,
    pub title: String,
    pub withdrawn: bool,
    pub sources: Vec<Source>,
    pub actions: Vec<Action>,
    pub sponsorships: Vec<Sponsorship>,
    pub document_links: Vec<DocumentLink>,
}

impl LegislativeRecord {
    pub fn new(identifier: &str, session: &str, kind: RecordKind) -> Self {
        LegislativeRecord {
            identifier: identifier.to_string(),
            session: session.to_string(),
            chamber: CHAMBER.to_string(),
            kind,
            title: PLACEHOLDER_TITLE.to_string(),
            withdrawn: false,
            sources: Vec::new(),
            actions: Vec::new(),
            sponsorships: Vec::new(),
            document_links: Vec::new(),
        }
    }

    pub fn add_source(&mut self, url: &str, note: &str) {
        self.sources.push(Source {
            url: url.to_string(),
            note: note.to_string(),
        });
    }

    pub fn add_action(&mut self, label: &str, date: ActionDate, organization: Option<String>) {
        self.actions.push(Action {
            label: label.to_string(),
            date,
            organization,
        });
    }

    pub fn add_sponsorship(&mut self, name: &str, entity_type: &str, classification: &str, primary: bool) {
        self.sponsorships.push(Sponsorship {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            classification: classification.to_string(),
            primary,
        });
    }

    pub fn add_document_link(&mut self, url: &str, note: &str) {
        self.document_links.push(DocumentLink {
            url: url.to_string(),
            note: note.to_string(),
        });
    }
}
