//! Static capability descriptor.

/// Graph-wide capabilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GraphFeatures {
    /// OLAP graph computers.
    pub computer: bool,
    /// Durable across restarts of the embedding process.
    pub persistence: bool,
    /// Several graph instances over the same tables.
    pub concurrent_access: bool,
    /// Transactions exposed through a thread-bound API.
    pub transactions: bool,
    /// Several threads sharing one transaction.
    pub threaded_transactions: bool,
}

/// Vertex capabilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexFeatures {
    /// Vertices can be added.
    pub add: bool,
    /// Vertices can be removed.
    pub remove: bool,
    /// Several values per property key.
    pub multi_properties: bool,
    /// Properties on properties.
    pub meta_properties: bool,
    /// Callers may choose vertex ids.
    ///
    /// Reported as `false` for compatibility with existing clients, although
    /// [`super::Graph::add_vertex`] accepts a caller id.
    pub user_supplied_ids: bool,
    /// Properties can be added.
    pub add_property: bool,
    /// Properties can be removed.
    ///
    /// Reported as `true` for compatibility with existing clients;
    /// [`super::Graph::remove_property`] still fails with `Unsupported`.
    pub remove_property: bool,
}

/// Edge capabilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EdgeFeatures {
    /// Edges can be added.
    pub add: bool,
    /// Edges can be removed.
    pub remove: bool,
    /// Edge properties can be written after creation.
    pub add_property: bool,
    /// Callers may choose edge ids.
    pub user_supplied_ids: bool,
}

/// Property value capabilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PropertyFeatures {
    /// String values.
    pub strings: bool,
    /// Numeric values.
    pub numbers: bool,
    /// Boolean values.
    pub booleans: bool,
    /// Byte array values.
    pub bytes: bool,
}

/// What a graph supports. Behavior never branches on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Features {
    /// Graph-wide capabilities.
    pub graph: GraphFeatures,
    /// Vertex capabilities.
    pub vertex: VertexFeatures,
    /// Edge capabilities.
    pub edge: EdgeFeatures,
    /// Property value capabilities.
    pub properties: PropertyFeatures,
}

/// Capabilities of every [`super::Graph`].
pub const FEATURES: Features = Features {
    graph: GraphFeatures {
        computer: false,
        persistence: false,
        concurrent_access: false,
        transactions: false,
        threaded_transactions: false,
    },
    vertex: VertexFeatures {
        add: true,
        remove: false,
        multi_properties: false,
        meta_properties: false,
        user_supplied_ids: false,
        add_property: true,
        remove_property: true,
    },
    edge: EdgeFeatures {
        add: true,
        remove: false,
        add_property: false,
        user_supplied_ids: false,
    },
    properties: PropertyFeatures {
        strings: true,
        numbers: false,
        booleans: false,
        bytes: false,
    },
};
