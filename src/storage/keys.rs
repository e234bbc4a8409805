//! Key layout inside the vertex and id tables.
//!
//! Every vertex-table key starts with the 16-byte vertex id followed by a
//! kind byte. Edge-list keys append the direction tag and the raw label.
//! Id-table keys are the decimal shard number.

use crate::types::{EdgeDirection, VertexId};

const KIND_LABEL: u8 = 1;
const KIND_PROPS: u8 = 2;
const KIND_EDGE_LABELS: u8 = 3;
const KIND_EDGE_LIST: u8 = 4;

fn vertex_key(id: VertexId, kind: u8, extra: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(VertexId::LEN + 1 + extra);
    key.extend_from_slice(&id.to_bytes());
    key.push(kind);
    key
}

/// Key of the vertex label entry; its presence defines vertex existence.
pub fn vertex_label(id: VertexId) -> Vec<u8> {
    vertex_key(id, KIND_LABEL, 0)
}

/// Key of the vertex property blob.
pub fn vertex_props(id: VertexId) -> Vec<u8> {
    vertex_key(id, KIND_PROPS, 0)
}

/// Key of the vertex's edge-label index.
pub fn edge_labels(id: VertexId) -> Vec<u8> {
    vertex_key(id, KIND_EDGE_LABELS, 0)
}

/// Key of the edge list for one (vertex, label, direction).
pub fn edge_list(id: VertexId, label: &str, dir: EdgeDirection) -> Vec<u8> {
    let mut key = vertex_key(id, KIND_EDGE_LIST, 1 + label.len());
    key.push(dir.tag());
    key.extend_from_slice(label.as_bytes());
    key
}

/// Key of a shard counter in the id table.
pub fn id_counter(shard: u32) -> Vec<u8> {
    shard.to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_keys_share_the_id_prefix() {
        let id = VertexId::from_parts(1, 2);
        for key in [vertex_label(id), vertex_props(id), edge_labels(id)] {
            assert_eq!(&key[..16], &id.to_bytes());
            assert_eq!(key.len(), 17);
        }
    }

    #[test]
    fn edge_list_keys_are_distinct_per_direction() {
        let id = VertexId::from(3u64);
        let keys: Vec<_> = EdgeDirection::ALL
            .iter()
            .map(|d| edge_list(id, "knows", *d))
            .collect();
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert!(keys[0].ends_with(b"knows"));
    }

    #[test]
    fn counter_keys_are_decimal() {
        assert_eq!(id_counter(15), b"15".to_vec());
    }
}
