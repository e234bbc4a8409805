//! Per-vertex list of edge labels with at least one edge-list entry.
//!
//! Encoded as a sequence of `len (u16 BE) | label`, in first-use order.

use crate::primitives::bytes::{buf::Cursor, ord};
use crate::types::Result;

/// Serializes a label list.
pub fn serialize(labels: &[String]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(labels.iter().map(|l| 2 + l.len()).sum());
    for label in labels {
        ord::put_str_u16(&mut out, label, "edge label")?;
    }
    Ok(out)
}

/// Deserializes a blob produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    let mut cur = Cursor::new(bytes);
    while !cur.is_empty() {
        labels.push(cur.str_u16("edge label list truncated")?.to_owned());
    }
    Ok(labels)
}

/// Appends `label` if absent. Returns the new blob, or `None` when unchanged.
pub fn insert(existing: Option<&[u8]>, label: &str) -> Result<Option<Vec<u8>>> {
    let mut labels = match existing {
        Some(bytes) => deserialize(bytes)?,
        None => Vec::new(),
    };
    if labels.iter().any(|l| l == label) {
        return Ok(None);
    }
    labels.push(label.to_owned());
    serialize(&labels).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_into_absent_list() {
        let blob = insert(None, "knows").unwrap().unwrap();
        assert_eq!(deserialize(&blob).unwrap(), vec!["knows".to_string()]);
    }

    #[test]
    fn insert_is_append_if_absent() {
        let blob = insert(None, "knows").unwrap().unwrap();
        let blob = insert(Some(&blob), "likes").unwrap().unwrap();
        assert!(insert(Some(&blob), "knows").unwrap().is_none());
        assert_eq!(
            deserialize(&blob).unwrap(),
            vec!["knows".to_string(), "likes".to_string()]
        );
    }

    #[test]
    fn empty_blob_is_empty_list() {
        assert!(deserialize(&[]).unwrap().is_empty());
        assert!(deserialize(&[0, 4, b'a']).is_err());
    }
}
