use proptest::prelude::*;

use kvgraph::storage::{edge_list, props, PropertyMap};
use kvgraph::types::{Directionality, EdgeId, VertexId};

fn arb_property_map() -> impl Strategy<Value = PropertyMap> {
    prop::collection::btree_map("[a-z]{1,12}", ".{0,40}", 0..16)
}

fn arb_vertex_id() -> impl Strategy<Value = VertexId> {
    any::<u128>().prop_map(VertexId)
}

fn arb_directionality() -> impl Strategy<Value = Directionality> {
    prop_oneof![Just(Directionality::Directed), Just(Directionality::Undirected)]
}

proptest! {
    #[test]
    fn property_maps_survive_serialization(map in arb_property_map()) {
        let blob = props::serialize(&map).unwrap();
        prop_assert_eq!(props::deserialize(&blob).unwrap(), map);
    }

    #[test]
    fn system_ids_keep_shard_and_counter(shard in 0u64..(1 << 31), counter in any::<u64>()) {
        let id = VertexId::system(shard, counter).unwrap();
        prop_assert!(id.is_system());
        prop_assert_eq!(id.system_parts(), Some((shard, counter)));
        prop_assert_eq!(VertexId::decode(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn vertex_id_text_form_parses_back(id in arb_vertex_id()) {
        prop_assert_eq!(id.to_string().parse::<VertexId>().unwrap(), id);
    }

    #[test]
    fn vertex_id_byte_order_matches_numeric_order(a in arb_vertex_id(), b in arb_vertex_id()) {
        prop_assert_eq!(a.cmp(&b), a.to_bytes().cmp(&b.to_bytes()));
    }

    #[test]
    fn edge_ids_decode_to_their_parts(
        out in arb_vertex_id(),
        inn in arb_vertex_id(),
        label in "[A-Za-z_]{1,24}",
        dir in arb_directionality(),
    ) {
        let edge = EdgeId::new(out, inn, label.clone(), dir);
        let decoded = EdgeId::decode(&edge.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded.out_vertex(), out);
        prop_assert_eq!(decoded.in_vertex(), inn);
        prop_assert_eq!(decoded.label(), label.as_str());
        prop_assert_eq!(decoded.directionality(), dir);
    }

    #[test]
    fn distinct_edges_encode_differently(
        a in arb_vertex_id(),
        b in arb_vertex_id(),
        l1 in "[a-z]{1,6}",
        l2 in "[a-z]{1,6}",
        d1 in arb_directionality(),
        d2 in arb_directionality(),
    ) {
        let e1 = EdgeId::new(a, b, l1, d1);
        let e2 = EdgeId::new(b, a, l2, d2);
        prop_assert_eq!(e1 == e2, e1.encode().unwrap() == e2.encode().unwrap());
    }

    #[test]
    fn edge_lists_are_newest_first(
        neighbors in prop::collection::vec((arb_vertex_id(), prop::collection::vec(any::<u8>(), 0..32)), 1..20),
    ) {
        let mut blob: Option<Vec<u8>> = None;
        for (neighbor, payload) in &neighbors {
            blob = Some(edge_list::append(blob.as_deref(), *neighbor, payload).unwrap());
        }
        let blob = blob.unwrap();
        let records = edge_list::parse_records(&blob).unwrap();
        prop_assert_eq!(records.len(), neighbors.len());
        for (record, (neighbor, payload)) in records.iter().zip(neighbors.iter().rev()) {
            prop_assert_eq!(record.neighbor, *neighbor);
            prop_assert_eq!(record.props, payload.as_slice());
        }
    }
}
