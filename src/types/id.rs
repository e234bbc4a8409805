//! Vertex and edge identifiers and their byte encodings.
//!
//! A [`VertexId`] is an unsigned 128-bit value persisted as 16 big-endian
//! bytes. Ids with [`SYSTEM_ID_BIT`] set in the upper word were issued by the
//! shard allocator: the rest of the upper word names the shard and the lower
//! word is that shard's counter. Ids with the bit clear belong to callers.
//!
//! An [`EdgeId`] is never stored. It is derived from the endpoint ids, the
//! label and the directionality, and encodes as
//! `out (16) | in (16) | label_len (u16 BE) | label | tag (1)`.

use std::fmt;
use std::str::FromStr;

use super::{GraphError, Result};
use crate::primitives::bytes::{buf::Cursor, ord};

/// High-order bit of the upper word marking system-assigned vertex ids.
pub const SYSTEM_ID_BIT: u64 = 1 << 63;

/// 128-bit vertex identifier, ordered as an unsigned integer.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VertexId(pub u128);

impl VertexId {
    /// Encoded width in bytes.
    pub const LEN: usize = 16;

    /// Packs two 64-bit words into an id.
    pub const fn from_parts(upper: u64, lower: u64) -> Self {
        VertexId(((upper as u128) << 64) | lower as u128)
    }

    /// Builds a system-assigned id for `counter` on `shard`.
    pub fn system(shard: u64, counter: u64) -> Result<Self> {
        if shard & SYSTEM_ID_BIT != 0 {
            return Err(GraphError::invalid(format!(
                "shard {shard} overlaps the system id bit"
            )));
        }
        Ok(Self::from_parts(SYSTEM_ID_BIT | shard, counter))
    }

    /// Upper 64 bits.
    pub const fn upper(self) -> u64 {
        (self.0 >> 64) as u64
    }

    /// Lower 64 bits.
    pub const fn lower(self) -> u64 {
        self.0 as u64
    }

    /// Whether the id lies in the allocator-owned half of the id space.
    pub const fn is_system(self) -> bool {
        self.upper() & SYSTEM_ID_BIT != 0
    }

    /// Splits a system-assigned id into `(shard, counter)`.
    pub fn system_parts(self) -> Option<(u64, u64)> {
        self.is_system()
            .then(|| (self.upper() & !SYSTEM_ID_BIT, self.lower()))
    }

    /// Big-endian encoding.
    pub fn to_bytes(self) -> [u8; Self::LEN] {
        self.0.to_be_bytes()
    }

    /// Decodes a stored id; anything other than exactly 16 bytes is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| GraphError::Corruption("vertex id is not 16 bytes"))?;
        Ok(VertexId(u128::from_be_bytes(arr)))
    }

    /// Interprets a caller-supplied big-endian byte string as an id.
    ///
    /// Shorter input is zero-extended; longer input keeps the low 16 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> Self {
        let tail = &bytes[bytes.len().saturating_sub(Self::LEN)..];
        let mut arr = [0u8; Self::LEN];
        arr[Self::LEN - tail.len()..].copy_from_slice(tail);
        VertexId(u128::from_be_bytes(arr))
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl FromStr for VertexId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u128::from_str_radix(hex, 16),
            None => trimmed.parse::<u128>(),
        };
        parsed
            .map(VertexId)
            .map_err(|_| GraphError::invalid(format!("malformed vertex id {s:?}")))
    }
}

impl From<u64> for VertexId {
    fn from(value: u64) -> Self {
        VertexId::from_parts(0, value)
    }
}

impl From<u128> for VertexId {
    fn from(value: u128) -> Self {
        VertexId(value)
    }
}

impl From<VertexId> for u128 {
    fn from(value: VertexId) -> Self {
        value.0
    }
}

/// Whether an edge distinguishes its endpoints.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Directionality {
    /// Distinct out and in endpoints.
    Directed,
    /// Symmetric; stored identically at both endpoints.
    Undirected,
}

impl Directionality {
    const TAG_DIRECTED: u8 = 0;
    const TAG_UNDIRECTED: u8 = 1;

    pub(crate) fn tag(self) -> u8 {
        match self {
            Directionality::Directed => Self::TAG_DIRECTED,
            Directionality::Undirected => Self::TAG_UNDIRECTED,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            Self::TAG_DIRECTED => Some(Directionality::Directed),
            Self::TAG_UNDIRECTED => Some(Directionality::Undirected),
            _ => None,
        }
    }
}

/// Which of a vertex's edge lists to consult.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EdgeDirection {
    /// Directed edges leaving the vertex.
    Out,
    /// Directed edges arriving at the vertex.
    In,
    /// Undirected edges touching the vertex.
    Undirected,
}

impl EdgeDirection {
    /// Every direction, in scan order.
    pub const ALL: [EdgeDirection; 3] = [
        EdgeDirection::Out,
        EdgeDirection::In,
        EdgeDirection::Undirected,
    ];

    /// Both directed lists, the usual meaning of "both" for directed traversals.
    pub const DIRECTED: [EdgeDirection; 2] = [EdgeDirection::Out, EdgeDirection::In];

    pub(crate) fn tag(self) -> u8 {
        match self {
            EdgeDirection::Out => 1,
            EdgeDirection::In => 2,
            EdgeDirection::Undirected => 3,
        }
    }
}

/// Derived edge identifier; never persisted.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct EdgeId {
    out_vertex: VertexId,
    in_vertex: VertexId,
    label: String,
    directionality: Directionality,
}

impl EdgeId {
    /// Creates an edge id. No canonical endpoint order is imposed on undirected edges.
    pub fn new(
        out_vertex: VertexId,
        in_vertex: VertexId,
        label: impl Into<String>,
        directionality: Directionality,
    ) -> Self {
        Self {
            out_vertex,
            in_vertex,
            label: label.into(),
            directionality,
        }
    }

    /// The vertex that holds this edge in its OUT (or UNDIRECTED) list.
    pub fn out_vertex(&self) -> VertexId {
        self.out_vertex
    }

    /// The vertex that holds this edge in its IN (or UNDIRECTED) list.
    pub fn in_vertex(&self) -> VertexId {
        self.in_vertex
    }

    /// Edge label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Directed or undirected.
    pub fn directionality(&self) -> Directionality {
        self.directionality
    }

    /// Serializes the id into its transient byte form.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(VertexId::LEN * 2 + 2 + self.label.len() + 1);
        out.extend_from_slice(&self.out_vertex.to_bytes());
        out.extend_from_slice(&self.in_vertex.to_bytes());
        ord::put_str_u16(&mut out, &self.label, "edge label")?;
        out.push(self.directionality.tag());
        Ok(out)
    }

    /// Parses bytes produced by [`EdgeId::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cur = Cursor::new(bytes);
        let out_vertex = VertexId::decode(cur.take(VertexId::LEN, "edge id truncated")?)?;
        let in_vertex = VertexId::decode(cur.take(VertexId::LEN, "edge id truncated")?)?;
        let label = cur.str_u16("edge id label truncated")?.to_owned();
        let directionality = Directionality::from_tag(cur.u8("edge id tag missing")?)
            .ok_or(GraphError::Corruption("unknown edge directionality tag"))?;
        if !cur.is_empty() {
            return Err(GraphError::Corruption("trailing bytes after edge id"));
        }
        Ok(Self {
            out_vertex,
            in_vertex,
            label,
            directionality,
        })
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.directionality {
            Directionality::Directed => "->",
            Directionality::Undirected => "--",
        };
        write!(
            f,
            "e[{}-{}{}{}]",
            self.out_vertex, self.label, arrow, self.in_vertex
        )
    }
}
