//! Property map serialization.
//!
//! A property blob is a sequence of records, each
//! `key_len (u16 BE) | key | value_len (u16 BE) | value`. The empty map
//! encodes as the empty blob. Records are written in key order, but readers
//! must not rely on it.

use crate::primitives::bytes::{buf::Cursor, ord};
use crate::types::{GraphError, Result};

use super::types::PropertyMap;

/// Serializes a property map.
pub fn serialize(props: &PropertyMap) -> Result<Vec<u8>> {
    let encoded_len: usize = props.iter().map(|(k, v)| 4 + k.len() + v.len()).sum();
    let mut out = Vec::with_capacity(encoded_len);
    for (key, value) in props {
        ord::put_str_u16(&mut out, key, "property key")?;
        ord::put_str_u16(&mut out, value, "property value")?;
    }
    Ok(out)
}

/// Deserializes a blob produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<PropertyMap> {
    let mut props = PropertyMap::new();
    let mut cur = Cursor::new(bytes);
    while !cur.is_empty() {
        let key = cur.str_u16("property key truncated")?;
        let value = cur.str_u16("property value truncated")?;
        if props.insert(key.to_owned(), value.to_owned()).is_some() {
            return Err(GraphError::Corruption("duplicate property key"));
        }
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_map_is_empty_blob() {
        let blob = serialize(&PropertyMap::new()).unwrap();
        assert!(blob.is_empty());
        assert!(deserialize(&blob).unwrap().is_empty());
    }

    #[test]
    fn roundtrip_preserves_entries() {
        let props = map(&[("name", "boots"), ("species", "british shorthair"), ("", "")]);
        let blob = serialize(&props).unwrap();
        assert_eq!(deserialize(&blob).unwrap(), props);
    }

    #[test]
    fn layout_is_length_prefixed() {
        let blob = serialize(&map(&[("a", "bc")])).unwrap();
        assert_eq!(blob, vec![0, 1, b'a', 0, 2, b'b', b'c']);
    }

    #[test]
    fn record_order_does_not_matter() {
        let mut blob = Vec::new();
        for (k, v) in [("z", "1"), ("a", "2")] {
            ord::put_str_u16(&mut blob, k, "k").unwrap();
            ord::put_str_u16(&mut blob, v, "v").unwrap();
        }
        assert_eq!(deserialize(&blob).unwrap(), map(&[("a", "2"), ("z", "1")]));
    }

    #[test]
    fn truncated_blob_is_corruption() {
        let blob = serialize(&map(&[("name", "bob")])).unwrap();
        let err = deserialize(&blob[..blob.len() - 1]).unwrap_err();
        assert!(matches!(err, GraphError::Corruption(_)));
    }

    #[test]
    fn duplicate_keys_are_corruption() {
        let one = serialize(&map(&[("k", "v")])).unwrap();
        let doubled = [one.clone(), one].concat();
        assert!(matches!(
            deserialize(&doubled),
            Err(GraphError::Corruption("duplicate property key"))
        ));
    }

    #[test]
    fn oversized_value_is_invalid() {
        let big = "v".repeat(70_000);
        let props = map(&[("k", big.as_str())]);
        assert!(matches!(
            serialize(&props),
            Err(GraphError::InvalidArgument(_))
        ));
    }
}
