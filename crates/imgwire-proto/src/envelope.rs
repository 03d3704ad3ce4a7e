use crate::element::ElementType;
use crate::error::{EnvelopeError, Result};
use crate::layout::Layout;

/// The protocol version this codec speaks. Checked before anything else is
/// parsed, so an incompatible header never gets its dimensions
/// misinterpreted.
pub const PROTOCOL_VERSION: &str = "v1";

const DIM_KEYWORD: &str = "dimNumber";

/// Everything the receiver needs to reconstruct an array: per-dimension
/// extents, element type, and storage layout.
///
/// Immutable once constructed; together with the fixed partition arithmetic
/// it fully determines how many payload frames follow a header and how to
/// reassemble them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDescriptor {
    /// Per-dimension extents, slowest-varying last. Rank ≥ 1.
    pub dims: Vec<u64>,
    /// The numeric kind of each element.
    pub element_type: ElementType,
    /// Storage layout of the transferred pixel data.
    pub layout: Layout,
}

impl TransferDescriptor {
    /// Create a descriptor.
    pub fn new(dims: Vec<u64>, element_type: ElementType, layout: Layout) -> Self {
        Self {
            dims,
            element_type,
            layout,
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements, or `None` when the product overflows or
    /// the descriptor has no dimensions.
    pub fn element_count(&self) -> Option<u64> {
        if self.dims.is_empty() {
            return None;
        }
        self.dims
            .iter()
            .try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
    }

    /// Elements per plane: the product of the first two extents (or the
    /// only extent, for rank 1).
    pub fn plane_len(&self) -> Option<u64> {
        match *self.dims.as_slice() {
            [] => None,
            [x] => Some(x),
            [x, y, ..] => x.checked_mul(y),
        }
    }

    /// Number of planes: the product of every extent beyond the second.
    pub fn plane_count(&self) -> Option<u64> {
        if self.dims.is_empty() {
            return None;
        }
        self.dims
            .iter()
            .skip(2)
            .try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
    }
}

/// Encode a descriptor as the header text.
///
/// Grammar (whitespace-tokenized, fixed order):
/// `"v1" "dimNumber" <rank> <extent_0> … <extent_rank-1> <elementType> <layout>`
pub fn encode(desc: &TransferDescriptor) -> String {
    let mut header = format!("{PROTOCOL_VERSION} {DIM_KEYWORD} {}", desc.rank());
    for extent in &desc.dims {
        header.push(' ');
        header.push_str(&extent.to_string());
    }
    header.push(' ');
    header.push_str(desc.element_type.token());
    header.push(' ');
    header.push_str(desc.layout.token());
    header
}

/// Decode header text into a descriptor.
///
/// Tokens are consumed strictly left to right. The version token is checked
/// first and mismatches fail before any further parsing. Tokens after the
/// layout are ignored: the reference tokenizer leaves them unread, and a
/// compatible sender may append hints there.
pub fn decode(header: &str) -> Result<TransferDescriptor> {
    let mut tokens = header.split_whitespace();

    let version = tokens.next().ok_or(EnvelopeError::Truncated)?;
    if version != PROTOCOL_VERSION {
        return Err(EnvelopeError::VersionMismatch {
            found: version.to_string(),
        });
    }

    let keyword = tokens.next().ok_or(EnvelopeError::Truncated)?;
    if keyword != DIM_KEYWORD {
        return Err(EnvelopeError::UnexpectedToken {
            expected: DIM_KEYWORD,
            found: keyword.to_string(),
        });
    }

    let rank_token = tokens.next().ok_or(EnvelopeError::Truncated)?;
    let rank: usize = rank_token
        .parse()
        .map_err(|_| EnvelopeError::InvalidDimension(format!("rank {rank_token:?}")))?;
    if rank == 0 {
        return Err(EnvelopeError::InvalidDimension("rank 0".to_string()));
    }

    // Capacity capped: the rank token is attacker-controlled, the header
    // length is not.
    let mut dims = Vec::with_capacity(rank.min(64));
    for _ in 0..rank {
        let extent_token = tokens.next().ok_or(EnvelopeError::Truncated)?;
        let extent: u64 = extent_token
            .parse()
            .map_err(|_| EnvelopeError::InvalidDimension(format!("extent {extent_token:?}")))?;
        dims.push(extent);
    }

    let type_token = tokens.next().ok_or(EnvelopeError::Truncated)?;
    let element_type = ElementType::from_token(type_token)
        .ok_or_else(|| EnvelopeError::UnsupportedElementType(type_token.to_string()))?;

    let layout_token = tokens.next().ok_or(EnvelopeError::Truncated)?;
    let layout = Layout::from_token(layout_token)
        .ok_or_else(|| EnvelopeError::UnsupportedLayout(layout_token.to_string()))?;

    Ok(TransferDescriptor {
        dims,
        element_type,
        layout,
    })
}
