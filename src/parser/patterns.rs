//! The fixed textual shapes of the Guam Legislature index pages and status
//! PDFs. The index pages are not well-formed markup; records are delimited
//! by ad hoc `<p ...>.*<br>` runs, so segmentation treats them as flat text.
//! Every pattern here is total: "no match" is an expected outcome for
//! optional fields and never an error by itself.

use std::sync::LazyLock;

use regex::Regex;

/// One bill record on the index page, up to and including its trailing <br>.
pub static BILL_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<p>.*?<br>)").unwrap());

/// One resolution record; the resolution index uses left-aligned paragraphs.
pub static RES_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)(<p align="left">.*?<br>)"#).unwrap());

/// Everything between the literal sponsor marker and the next paragraph.
pub static SPONSORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Sponsor\(s\) -(.*?)<p>").unwrap());

/// Bill description: body of the leading paragraph up to the first list item.
pub static DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s?<p>(.*?)<li>").unwrap());

/// Resolution description: the run of non-tag text after the opening tag.
pub static RES_DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<p align="left">([^<>]+)"#).unwrap());

/// m/d/yy or mm/dd/yyyy.
pub static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4})").unwrap());

/// Date plus a 12-hour clock time; the PDF layout sometimes breaks the line
/// between date and time, and writes the meridiem as "am"/"a.m."/"AM".
pub static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4}\s?\n?[0-9]{1,2}:[0-9]{2} [apAP]\.?[mM]\.?)")
        .unwrap()
});

/// "Committee on …", possibly wrapped across lines in the PDF text.
pub static COMMITTEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([cC]ommittee on [a-zA-Z, \n]+)").unwrap());

/// Letterhead and page-marker lines in the status PDFs with no semantic
/// value; they would corrupt the ordinal date lookups if left in.
pub const BOILERPLATE_LINES: &[&str] = &["BILL HISTORY", "Bill HISTORY", "CLERKS OFFICE", "Page 1"];
