use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeSeq;
use std::cmp::Ordering;
use std::sync::Arc;

/// One step of a [`ResponsePath`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathSegment {
    Index(usize),

    /// A response key. `ordinal` is the position of the key within its
    /// compiled selection set and is used to order errors in response order.
    Key {
        name: Arc<str>,
        ordinal: usize,
    },
}
impl PathSegment {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(idx) => Some(*idx),
            Self::Key { .. } => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Key { name, .. } => Some(name),
        }
    }

    fn response_order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Index(a), Self::Index(b)) => a.cmp(b),
            (
                Self::Key { name: name_a, ordinal: ord_a },
                Self::Key { name: name_b, ordinal: ord_b },
            ) => ord_a.cmp(ord_b).then_with(|| name_a.cmp(name_b)),
            (Self::Key { .. }, Self::Index(_)) => Ordering::Less,
            (Self::Index(_), Self::Key { .. }) => Ordering::Greater,
        }
    }

    /// Segments match if they address the same response position,
    /// regardless of which selection produced the key.
    fn same_position(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Index(a), Self::Index(b)) => a == b,
            (Self::Key { name: a, .. }, Self::Key { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug)]
struct PathNode {
    len: usize,
    parent: ResponsePath,
    segment: PathSegment,
}

/// An immutable path into the response tree.
///
/// Every resolution frame owns its own `ResponsePath`; extending a path
/// shares the parent's nodes rather than copying them.
#[derive(Clone, Debug, Default)]
pub struct ResponsePath(Option<Arc<PathNode>>);
impl ResponsePath {
    pub fn root() -> Self {
        Self(None)
    }

    pub fn child_index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    pub fn child_key(&self, name: &str, ordinal: usize) -> Self {
        self.child(PathSegment::Key {
            name: Arc::from(name),
            ordinal,
        })
    }

    fn child(&self, segment: PathSegment) -> Self {
        Self(Some(Arc::new(PathNode {
            len: self.len() + 1,
            parent: self.clone(),
            segment,
        })))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.as_ref().map(|node| &node.segment)
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map(|node| node.len).unwrap_or(0)
    }

    /// Compare two paths by where they appear in the response: keys by their
    /// selection ordinal, list items by index, and ancestors before their
    /// descendants.
    pub fn response_order(&self, other: &Self) -> Ordering {
        let lhs = self.segments();
        let rhs = other.segments();
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            let ord = a.response_order(b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        lhs.len().cmp(&rhs.len())
    }

    /// Segments from the root down to this path's leaf.
    pub fn segments(&self) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(self.len());
        let mut cursor = self;
        while let Some(node) = &cursor.0 {
            segments.push(node.segment.clone());
            cursor = &node.parent;
        }
        segments.reverse();
        segments
    }

    /// Returns `true` if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &ResponsePath) -> bool {
        let mut cursor = self;
        while cursor.len() > prefix.len() {
            match &cursor.0 {
                Some(node) => cursor = &node.parent,
                None => return false,
            }
        }
        cursor == prefix
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.segments()
                .into_iter()
                .map(|segment| match segment {
                    PathSegment::Index(idx) => serde_json::Value::from(idx),
                    PathSegment::Key { name, .. } => serde_json::Value::from(name.as_ref()),
                })
                .collect(),
        )
    }
}
impl PartialEq for ResponsePath {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut lhs = self;
        let mut rhs = other;
        loop {
            match (&lhs.0, &rhs.0) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if Arc::ptr_eq(a, b) {
                        return true;
                    }
                    if !a.segment.same_position(&b.segment) {
                        return false;
                    }
                    lhs = &a.parent;
                    rhs = &b.parent;
                },
                _ => return false,
            }
        }
    }
}
impl Eq for ResponsePath {}
impl Serialize for ResponsePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let segments = self.segments();
        let mut seq = serializer.serialize_seq(Some(segments.len()))?;
        for segment in segments {
            match segment {
                PathSegment::Index(idx) => seq.serialize_element(&idx)?,
                PathSegment::Key { name, .. } => seq.serialize_element(name.as_ref())?,
            }
        }
        seq.end()
    }
}
impl std::fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, segment) in self.segments().iter().enumerate() {
            match segment {
                PathSegment::Index(item_idx) => write!(f, "[{item_idx}]")?,
                PathSegment::Key { name, .. } if idx == 0 => write!(f, "{name}")?,
                PathSegment::Key { name, .. } => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}
