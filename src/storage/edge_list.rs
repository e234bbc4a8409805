//! Per-(vertex, label, direction) edge lists.
//!
//! An edge list is a concatenation of records
//! `neighbor (16 bytes) | props_len (u16 BE) | props`, newest first: adding
//! an edge prepends a record and never rewrites existing ones. Identical
//! records may repeat; the list is a multigraph.

use crate::primitives::bytes::{buf::Cursor, ord};
use crate::types::{Result, VertexId};

/// One decoded edge-list record borrowing its property blob.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EdgeRecord<'a> {
    /// The vertex at the other end of the edge.
    pub neighbor: VertexId,
    /// Serialized edge properties.
    pub props: &'a [u8],
}

/// Returns a new list with `(neighbor, props)` in front of `existing`.
pub fn append(existing: Option<&[u8]>, neighbor: VertexId, props: &[u8]) -> Result<Vec<u8>> {
    let tail = existing.unwrap_or(&[]);
    let mut out = Vec::with_capacity(VertexId::LEN + 2 + props.len() + tail.len());
    out.extend_from_slice(&neighbor.to_bytes());
    ord::put_bytes_u16(&mut out, props, "edge property blob")?;
    out.extend_from_slice(tail);
    Ok(out)
}

/// Lazily decodes records newest-first.
pub struct Records<'a> {
    cur: Cursor<'a>,
    failed: bool,
}

impl<'a> Records<'a> {
    /// Starts decoding `blob`.
    pub fn new(blob: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(blob),
            failed: false,
        }
    }

    fn decode_one(&mut self) -> Result<EdgeRecord<'a>> {
        let neighbor = VertexId::decode(self.cur.take(VertexId::LEN, "edge record truncated")?)?;
        let props = self.cur.bytes_u16("edge record properties truncated")?;
        Ok(EdgeRecord { neighbor, props })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<EdgeRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cur.is_empty() {
            return None;
        }
        let item = self.decode_one();
        self.failed = item.is_err();
        Some(item)
    }
}

/// Decodes every record, newest first.
pub fn parse_records(blob: &[u8]) -> Result<Vec<EdgeRecord<'_>>> {
    Records::new(blob).collect()
}

/// Decodes only the neighbor ids, newest first.
pub fn neighbor_ids(blob: &[u8]) -> Result<Vec<VertexId>> {
    Records::new(blob).map(|r| r.map(|rec| rec.neighbor)).collect()
}

/// Whether any record points at `neighbor`.
pub fn contains(blob: &[u8], neighbor: VertexId) -> Result<bool> {
    for record in Records::new(blob) {
        if record?.neighbor == neighbor {
            return Ok(true);
        }
    }
    Ok(false)
}
