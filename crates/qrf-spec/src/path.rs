use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One step of a structural path.
///
/// Paths address locations in both the form state and a response tree. A
/// `Key` names an item by linkId, an `Index` selects one instance of a
/// repeating group, and `Items` is the structural separator between a group
/// entry and its children (spelled `items` in serialized form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
    Items,
}

impl Segment {
    pub fn key(link_id: impl Into<String>) -> Self {
        Segment::Key(link_id.into())
    }
}

const ITEMS: &str = "items";

/// Ordered sequence of segments addressing a location in the item or
/// form-state tree.
///
/// This is the one implicit protocol between the enablement evaluator
/// (which produces paths) and the path resolver and form state (which
/// consume them); `Display` and `FromStr` round-trip exactly, and the type
/// serializes as its dotted string form (`group.items.0.question`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    /// Returns a new path with `segment` appended; the receiver is untouched.
    pub fn child(&self, segment: Segment) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Appends the `items` separator.
    pub fn items(&self) -> Self {
        self.child(Segment::Items)
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Key(key) => f.write_str(key)?,
                Segment::Index(index) => write!(f, "{index}")?,
                Segment::Items => f.write_str(ITEMS)?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.is_empty() {
            return Ok(Self::new());
        }
        Ok(text
            .split('.')
            .map(|token| {
                if token == ITEMS {
                    Segment::Items
                } else if let Ok(index) = token.parse::<usize>() {
                    Segment::Index(index)
                } else {
                    Segment::key(token)
                }
            })
            .collect())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
