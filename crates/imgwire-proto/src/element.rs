use std::fmt;

/// The numeric kind of one array element.
///
/// A closed set: all dispatch in the transfer stack keys off this tag and
/// the size table below, never off a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Float32,
    Float64,
}

impl ElementType {
    /// Every supported element type, in wire-table order.
    pub const ALL: [ElementType; 6] = [
        ElementType::Int8,
        ElementType::UInt8,
        ElementType::Int16,
        ElementType::UInt16,
        ElementType::Float32,
        ElementType::Float64,
    ];

    /// Bytes occupied by one element.
    pub fn size_in_bytes(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Float32 => 4,
            ElementType::Float64 => 8,
        }
    }

    /// The canonical wire token for this element type.
    pub fn token(self) -> &'static str {
        match self {
            ElementType::Int8 => "ByteType",
            ElementType::UInt8 => "UnsignedByteType",
            ElementType::Int16 => "ShortType",
            ElementType::UInt16 => "UnsignedShortType",
            ElementType::Float32 => "FloatType",
            ElementType::Float64 => "DoubleType",
        }
    }

    /// Resolve a wire token back to an element type.
    pub fn from_token(token: &str) -> Option<ElementType> {
        Self::ALL.iter().copied().find(|ty| ty.token() == token)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
