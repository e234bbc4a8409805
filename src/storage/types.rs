use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::types::{GraphError, Result, VertexId};

/// String-keyed, string-valued vertex or edge properties.
pub type PropertyMap = BTreeMap<String, String>;

/// Label given to vertices created without one.
pub const DEFAULT_VERTEX_LABEL: &str = "vertex";

/// One slot of a flat key/value argument list.
///
/// Keys sit on even indices and must be [`ElementArg::Str`] or one of the
/// [`ElementArg::Label`] / [`ElementArg::Id`] tokens; values follow their key.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementArg {
    /// Token selecting the element label.
    Label,
    /// Token selecting a caller-supplied id.
    Id,
    /// String key or value.
    Str(String),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl ElementArg {
    fn type_name(&self) -> &'static str {
        match self {
            ElementArg::Label => "label token",
            ElementArg::Id => "id token",
            ElementArg::Str(_) => "string",
            ElementArg::Int(_) => "int",
            ElementArg::Float(_) => "float",
            ElementArg::Bool(_) => "bool",
            ElementArg::Bytes(_) => "bytes",
        }
    }
}

impl From<&str> for ElementArg {
    fn from(value: &str) -> Self {
        ElementArg::Str(value.to_owned())
    }
}

impl From<String> for ElementArg {
    fn from(value: String) -> Self {
        ElementArg::Str(value)
    }
}

impl From<i64> for ElementArg {
    fn from(value: i64) -> Self {
        ElementArg::Int(value)
    }
}

impl From<f64> for ElementArg {
    fn from(value: f64) -> Self {
        ElementArg::Float(value)
    }
}

impl From<bool> for ElementArg {
    fn from(value: bool) -> Self {
        ElementArg::Bool(value)
    }
}

impl From<Vec<u8>> for ElementArg {
    fn from(value: Vec<u8>) -> Self {
        ElementArg::Bytes(value)
    }
}

/// A vertex handle: id plus its immutable label.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Vertex {
    /// Vertex id.
    pub id: VertexId,
    /// Vertex label.
    pub label: String,
}

/// A single vertex property.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexProperty {
    /// Owning vertex.
    pub vertex: VertexId,
    /// Property key.
    pub key: String,
    /// Property value.
    pub value: String,
}

/// Property cardinality requested by a write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    /// One value per key; the only supported cardinality.
    Single,
    /// Multiple ordered values per key.
    List,
    /// Multiple distinct values per key.
    Set,
}

/// Endpoint selector for [`crate::storage::Graph::edge_vertices`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// The out vertex.
    Out,
    /// The in vertex.
    In,
    /// Out vertex, then in vertex.
    Both,
}

impl Direction {
    pub(crate) fn includes_out(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }

    pub(crate) fn includes_in(self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }
}

/// Neighbor labels a traversal expects to keep after a neighbor step.
#[derive(Clone, Debug, Default)]
pub struct NeighborHint {
    labels: SmallVec<[String; 2]>,
}

impl NeighborHint {
    /// Creates an empty hint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an expected neighbor label.
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// Builder form of [`NeighborHint::add_label`].
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Whether `label` is expected.
    pub fn accepts(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Expected labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[derive(Debug)]
pub(crate) struct VertexArgs {
    pub label: String,
    pub id: Option<VertexId>,
    pub props: PropertyMap,
}

fn check_even(args: &[ElementArg]) -> Result<()> {
    if args.len() % 2 != 0 {
        return Err(GraphError::invalid(
            "the provided key/value array length must be a multiple of two",
        ));
    }
    Ok(())
}

fn string_value(key: &str, value: &ElementArg) -> Result<String> {
    match value {
        ElementArg::Str(s) => Ok(s.clone()),
        other => Err(GraphError::invalid(format!(
            "property value of type {} is not supported for key {key:?}",
            other.type_name()
        ))),
    }
}

fn property_key(key: &str) -> Result<&str> {
    if key.is_empty() {
        return Err(GraphError::invalid("property key can not be empty"));
    }
    Ok(key)
}

fn user_vertex_id(value: &ElementArg) -> Result<VertexId> {
    let id = match value {
        ElementArg::Int(v) => VertexId::from_parts(0, *v as u64),
        ElementArg::Str(s) => s.parse::<VertexId>()?,
        ElementArg::Bytes(b) => VertexId::from_be_slice(b),
        other => {
            return Err(GraphError::invalid(format!(
                "user supplied vertex ids of type {} are not supported",
                other.type_name()
            )))
        }
    };
    if id.is_system() {
        return Err(GraphError::invalid(format!(
            "user supplied vertex id {id} lies in the system-assigned id space"
        )));
    }
    Ok(id)
}

pub(crate) fn parse_vertex_args(args: &[ElementArg]) -> Result<VertexArgs> {
    check_even(args)?;
    let mut label = None;
    let mut id = None;
    let mut props = PropertyMap::new();
    for pair in args.chunks_exact(2) {
        let (key, value) = (&pair[0], &pair[1]);
        match key {
            ElementArg::Label => {
                let l = string_value("label", value)?;
                if l.is_empty() {
                    return Err(GraphError::invalid("label can not be empty"));
                }
                label = Some(l);
            }
            ElementArg::Id => id = Some(user_vertex_id(value)?),
            ElementArg::Str(k) => {
                let k = property_key(k)?;
                props.insert(k.to_owned(), string_value(k, value)?);
            }
            other => {
                return Err(GraphError::invalid(format!(
                    "keys must be strings or element tokens, found {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(VertexArgs {
        label: label.unwrap_or_else(|| DEFAULT_VERTEX_LABEL.to_owned()),
        id,
        props,
    })
}

pub(crate) fn parse_edge_args(args: &[ElementArg]) -> Result<PropertyMap> {
    check_even(args)?;
    let mut props = PropertyMap::new();
    for pair in args.chunks_exact(2) {
        let (key, value) = (&pair[0], &pair[1]);
        match key {
            ElementArg::Id => {
                return Err(GraphError::invalid(
                    "edge ids are derived from their endpoints; user supplied ids are not supported",
                ))
            }
            ElementArg::Label => {
                return Err(GraphError::Unsupported("label token in edge properties"))
            }
            ElementArg::Str(k) => {
                let k = property_key(k)?;
                props.insert(k.to_owned(), string_value(k, value)?);
            }
            other => {
                return Err(GraphError::invalid(format!(
                    "keys must be strings, found {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: Vec<ElementArg>) -> Vec<ElementArg> {
        items
    }

    #[test]
    fn vertex_args_collect_label_and_props() {
        let parsed = parse_vertex_args(&args(vec![
            ElementArg::Label,
            "Person".into(),
            "name".into(),
            "bob".into(),
        ]))
        .unwrap();
        assert_eq!(parsed.label, "Person");
        assert_eq!(parsed.id, None);
        assert_eq!(parsed.props.get("name").map(String::as_str), Some("bob"));
    }

    #[test]
    fn missing_label_defaults() {
        let parsed = parse_vertex_args(&[]).unwrap();
        assert_eq!(parsed.label, DEFAULT_VERTEX_LABEL);
    }

    #[test]
    fn odd_length_is_invalid() {
        let err = parse_vertex_args(&args(vec!["name".into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
        let err = parse_edge_args(&args(vec!["name".into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn non_string_values_are_invalid() {
        let err = parse_vertex_args(&args(vec!["age".into(), 42i64.into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn non_string_keys_are_invalid() {
        let err = parse_vertex_args(&args(vec![7i64.into(), "x".into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn user_ids_parse_from_several_types() {
        let parsed = parse_vertex_args(&args(vec![ElementArg::Id, 7i64.into()])).unwrap();
        assert_eq!(parsed.id, Some(VertexId::from(7u64)));
        let parsed = parse_vertex_args(&args(vec![ElementArg::Id, "0x2A".into()])).unwrap();
        assert_eq!(parsed.id, Some(VertexId(42)));
        let parsed =
            parse_vertex_args(&args(vec![ElementArg::Id, vec![0x01u8, 0x00].into()])).unwrap();
        assert_eq!(parsed.id, Some(VertexId(256)));
    }

    #[test]
    fn system_space_user_ids_are_invalid() {
        let system = VertexId::system(0, 1).unwrap();
        let err = parse_vertex_args(&args(vec![
            ElementArg::Id,
            system.to_bytes().to_vec().into(),
        ]))
        .unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
        let err =
            parse_vertex_args(&args(vec![ElementArg::Id, true.into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn edge_args_reject_tokens() {
        let err = parse_edge_args(&args(vec![ElementArg::Id, 1i64.into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
        let err = parse_edge_args(&args(vec![ElementArg::Label, "x".into()])).unwrap_err();
        assert!(matches!(err, GraphError::Unsupported(_)));
    }

    #[test]
    fn empty_property_keys_are_invalid() {
        let err = parse_edge_args(&args(vec!["".into(), "x".into()])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn hint_deduplicates_labels() {
        let hint = NeighborHint::new().with_label("Person").with_label("Person");
        assert_eq!(hint.labels().len(), 1);
        assert!(hint.accepts("Person"));
        assert!(!hint.accepts("Animal"));
    }
}
