use serde_derive::{Deserialize, Serialize};

/// A vertex attribute.
///
/// `Position` (the `xy` pair) is always present; the other attributes are
/// optional scalars with fixed default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semantics {
    Position,
    Z,
    M,
    Id,
}

impl Semantics {
    pub const ALL: [Semantics; 4] = [Semantics::Position, Semantics::Z, Semantics::M, Semantics::Id];

    /// Number of ordinates stored per vertex.
    #[inline]
    pub fn components(self) -> usize {
        match self {
            Semantics::Position => 2,
            _ => 1,
        }
    }

    /// Value of the attribute on a vertex that never had it set.
    #[inline]
    pub fn default_value(self) -> f64 {
        match self {
            Semantics::M => f64::NAN,
            _ => 0.,
        }
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, Semantics::Id)
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// The set of attributes carried by every vertex of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexDescription {
    bits: u8,
}

impl Default for VertexDescription {
    fn default() -> Self {
        VertexDescription {
            bits: Semantics::Position.bit(),
        }
    }
}

impl VertexDescription {
    /// Description with only `Position`.
    pub fn xy() -> Self {
        Self::default()
    }

    pub fn with(mut self, semantics: Semantics) -> Self {
        self.add_attribute(semantics);
        self
    }

    pub fn add_attribute(&mut self, semantics: Semantics) {
        self.bits |= semantics.bit();
    }

    #[inline]
    pub fn has_attribute(&self, semantics: Semantics) -> bool {
        self.bits & semantics.bit() != 0
    }

    /// Union of two descriptions.
    pub fn merge(&self, other: &VertexDescription) -> Self {
        VertexDescription {
            bits: self.bits | other.bits,
        }
    }

    /// Present attributes, `Position` first.
    pub fn attributes(&self) -> impl Iterator<Item = Semantics> + '_ {
        Semantics::ALL
            .iter()
            .copied()
            .filter(move |s| self.has_attribute(*s))
    }

    /// Present attributes other than `Position`.
    pub fn extra_attributes(&self) -> impl Iterator<Item = Semantics> + '_ {
        self.attributes().filter(|s| *s != Semantics::Position)
    }

    pub fn attribute_count(&self) -> usize {
        self.bits.count_ones() as usize
    }
}
