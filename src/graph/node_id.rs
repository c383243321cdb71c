use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Opaque, hashable key for a graph node.
/// Keeps the caller's label text (e.g. a GEOID with leading zeros) without repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self { Self(Arc::from(value)) }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self { Self(Arc::from(value)) }
}

macro_rules! node_id_from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for NodeId {
            fn from(value: $ty) -> Self { Self(Arc::from(value.to_string())) }
        }
    )*};
}

node_id_from_int!(u32, u64, usize, i32, i64);
