//! Splits a raw index page into per-record fragments. The pages open with a
//! boilerplate block closed by an HTML comment terminator; everything of
//! interest sits relative to those `-->` markers.

use anyhow::{bail, Result};

use crate::model::RecordKind;

use super::patterns::{BILL_BLOCK_RE, RES_BLOCK_RE};

/// Slice off the record listing that follows the boilerplate header.
///
/// The bill index carries one `-->` marker and the listing follows the last
/// one. The resolution index closes two comment blocks and the listing sits
/// between the second-to-last marker and the last. A missing marker means
/// the page template changed and nothing downstream can be trusted.
pub fn content_block(page: &str, kind: RecordKind) -> Result<&str> {
    let parts: Vec<&str> = page.split("-->").collect();
    match kind {
        RecordKind::Bill => {
            if parts.len() < 2 {
                bail!("bill index has no `-->` boundary marker; page shape changed");
            }
            Ok(parts[parts.len() - 1])
        }
        RecordKind::Resolution => {
            if parts.len() < 3 {
                bail!("resolution index has fewer than two `-->` boundary markers; page shape changed");
            }
            Ok(parts[parts.len() - 2])
        }
    }
}

/// Lazily yield the record fragments of a content block, in document order.
pub fn fragments(content: &str, kind: RecordKind) -> impl Iterator<Item = &str> {
    let re = match kind {
        RecordKind::Bill => &*BILL_BLOCK_RE,
        RecordKind::Resolution => &*RES_BLOCK_RE,
    };
    re.find_iter(content).map(|m| m.as_str())
}
