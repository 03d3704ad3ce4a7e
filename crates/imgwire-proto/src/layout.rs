use std::fmt;

/// How an array's elements are organized for transfer.
///
/// `Flat` is one contiguous buffer; `Planar` is an ordered sequence of
/// per-plane buffers, each transferred independently and in order. The
/// reference protocol also names a chunked cell layout (`CellImg`); this
/// implementation cannot materialize it, so the token is rejected at decode
/// time and no payload is ever read for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Single contiguous buffer.
    Flat,
    /// Ordered sequence of plane buffers.
    Planar,
}

impl Layout {
    /// The canonical wire token for this layout.
    pub fn token(self) -> &'static str {
        match self {
            Layout::Flat => "ArrayImg",
            Layout::Planar => "PlanarImg",
        }
    }

    /// Resolve a wire token back to a layout.
    ///
    /// Returns `None` for unknown tokens and for recognized-but-unsupported
    /// layouts alike; the caller reports both as unsupported.
    pub fn from_token(token: &str) -> Option<Layout> {
        match token {
            "ArrayImg" => Some(Layout::Flat),
            "PlanarImg" => Some(Layout::Planar),
            _ => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
