//! Collage pieces: identity, content, and geometry.

use std::fmt;

use collage_core::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Stable identifier for a piece.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PieceId(u64);

impl PieceId {
    /// Lowest valid piece ID.
    pub const MIN: Self = Self(1);

    /// Create a new piece ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, PieceIdError> {
        if raw == 0 {
            return Err(PieceIdError::Zero);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, PieceIdError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(PieceIdError::Overflow { current: self });
        };
        Self::new(next)
    }
}

impl Default for PieceId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece#{}", self.0)
    }
}

impl TryFrom<u64> for PieceId {
    type Error = PieceIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<PieceId> for u64 {
    fn from(id: PieceId) -> Self {
        id.0
    }
}

/// Piece identifier failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceIdError {
    Zero,
    Overflow { current: PieceId },
}

impl fmt::Display for PieceIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "piece id 0 is reserved"),
            Self::Overflow { current } => {
                write!(f, "piece id overflow after {}", current.get())
            }
        }
    }
}

impl std::error::Error for PieceIdError {}

/// Opaque, renderable image reference (typically a `data:` URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque color value attached to a block piece (`#ff8800`, `tomato`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorValue(String);

impl ColorValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content variant of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Image,
    Color,
}

/// What a piece shows. Layout math never looks at this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PieceContent {
    Image { source: ImageRef },
    Color { value: ColorValue },
}

impl PieceContent {
    #[must_use]
    pub fn image(source: ImageRef) -> Self {
        Self::Image { source }
    }

    #[must_use]
    pub fn color(value: impl Into<String>) -> Self {
        Self::Color {
            value: ColorValue::new(value),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        match self {
            Self::Image { .. } => PieceKind::Image,
            Self::Color { .. } => PieceKind::Color,
        }
    }
}

/// Unit of layout: identity, content, and the rectangle it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub content: PieceContent,
    pub rect: Rect,
}

impl Piece {
    #[must_use]
    pub fn new(id: PieceId, content: PieceContent, rect: Rect) -> Self {
        Self { id, content, rect }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.content.kind()
    }

    #[must_use]
    pub const fn left(&self) -> u32 {
        self.rect.x
    }

    #[must_use]
    pub const fn top(&self) -> u32 {
        self.rect.y
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.rect.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.rect.height
    }
}

/// Position of the piece with `id`, if present.
#[must_use]
pub fn index_of(pieces: &[Piece], id: PieceId) -> Option<usize> {
    pieces.iter().position(|piece| piece.id == id)
}

/// Move the piece with `id` to the end of the sequence (draw on top).
///
/// Returns `false` when the piece is missing. The relative order of every
/// other piece is unchanged.
pub fn bring_to_front(pieces: &mut Vec<Piece>, id: PieceId) -> bool {
    let Some(index) = index_of(pieces, id) else {
        return false;
    };
    let piece = pieces.remove(index);
    pieces.push(piece);
    true
}
