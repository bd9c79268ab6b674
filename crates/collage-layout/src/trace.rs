//! Replayable board command traces.
//!
//! A trace is a schema-versioned list of board commands with strictly
//! increasing sequence numbers and an FNV-1a checksum over the payload.
//! Replaying a trace on a fresh [`Board`] with the same config reproduces the
//! same layout exactly.

use std::fmt;

use collage_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Piece, PieceContent, PieceId};
use crate::resolve::ResolveReport;
use crate::session::{
    CancelReason, InteractionEvent, PointerPosition, ResizeEdge, SessionTransition,
};

/// Current trace schema version.
pub const INTERACTION_TRACE_SCHEMA_VERSION: u16 = 1;

/// One board-level command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BoardCommand {
    /// Insert a piece. With `at`, that is the provisional top-left;
    /// otherwise a spawn position is drawn.
    Add {
        content: PieceContent,
        width: u32,
        height: u32,
        #[serde(default)]
        at: Option<[u32; 2]>,
    },
    Delete {
        piece: PieceId,
    },
    ReplaceContent {
        piece: PieceId,
        content: PieceContent,
    },
    BringToFront {
        piece: PieceId,
    },
    SetSnap {
        enabled: bool,
    },
    Resolve,
    Input {
        event: InteractionEvent,
    },
}

/// Result of executing one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Inserted {
        piece: PieceId,
        placement_exhausted: bool,
        resolve: ResolveReport,
    },
    IdSpaceExhausted,
    Deleted {
        piece: PieceId,
        removed: bool,
    },
    ContentReplaced {
        piece: PieceId,
        applied: bool,
    },
    BroughtToFront {
        piece: PieceId,
        applied: bool,
    },
    SnapSet {
        enabled: bool,
    },
    Resolved {
        resolve: ResolveReport,
    },
    Transition {
        transition: SessionTransition,
    },
}

impl Board {
    /// Execute one command against the board.
    pub fn execute(&mut self, command: &BoardCommand) -> CommandOutcome {
        match command {
            BoardCommand::Add {
                content,
                width,
                height,
                at,
            } => {
                let insertion = match at {
                    Some([x, y]) => {
                        self.add_piece_at(content.clone(), Rect::new(*x, *y, *width, *height))
                    }
                    None => self.add_piece(content.clone(), *width, *height),
                };
                match insertion {
                    Some(insertion) => CommandOutcome::Inserted {
                        piece: insertion.id,
                        placement_exhausted: insertion.placement_exhausted,
                        resolve: insertion.resolve,
                    },
                    None => CommandOutcome::IdSpaceExhausted,
                }
            }
            BoardCommand::Delete { piece } => CommandOutcome::Deleted {
                piece: *piece,
                removed: self.delete(*piece),
            },
            BoardCommand::ReplaceContent { piece, content } => CommandOutcome::ContentReplaced {
                piece: *piece,
                applied: self.replace_content(*piece, content.clone()),
            },
            BoardCommand::BringToFront { piece } => CommandOutcome::BroughtToFront {
                piece: *piece,
                applied: self.bring_to_front(*piece),
            },
            BoardCommand::SetSnap { enabled } => {
                self.set_snap_enabled(*enabled);
                CommandOutcome::SnapSet { enabled: *enabled }
            }
            BoardCommand::Resolve => CommandOutcome::Resolved {
                resolve: self.resolve(),
            },
            BoardCommand::Input { event } => CommandOutcome::Transition {
                transition: self.apply(event),
            },
        }
    }
}

/// One sequenced trace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub sequence: u64,
    pub command: BoardCommand,
}

/// Metadata carried alongside a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetadata {
    #[serde(default = "default_trace_schema_version")]
    pub schema_version: u16,
    #[serde(default)]
    pub label: String,
    pub checksum: u64,
}

fn default_trace_schema_version() -> u16 {
    INTERACTION_TRACE_SCHEMA_VERSION
}

/// Canonical replay trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTrace {
    pub metadata: TraceMetadata,
    #[serde(default)]
    pub entries: Vec<TraceEntry>,
}

impl InteractionTrace {
    /// Build a trace from commands, numbering them from 1, and compute its
    /// checksum.
    pub fn new(
        label: impl Into<String>,
        commands: impl IntoIterator<Item = BoardCommand>,
    ) -> Result<Self, TraceError> {
        let entries = commands
            .into_iter()
            .zip(1_u64..)
            .map(|(command, sequence)| TraceEntry { sequence, command })
            .collect();
        let mut trace = Self {
            metadata: TraceMetadata {
                schema_version: INTERACTION_TRACE_SCHEMA_VERSION,
                label: label.into(),
                checksum: 0,
            },
            entries,
        };
        trace.metadata.checksum = trace.recompute_checksum();
        trace.validate()?;
        Ok(trace)
    }

    /// Deterministically recompute the checksum over the trace payload.
    #[must_use]
    pub fn recompute_checksum(&self) -> u64 {
        let mut hasher = Fnv1a::new();
        hasher.u16(self.metadata.schema_version);
        hasher.str(&self.metadata.label);
        hasher.u64(self.entries.len() as u64);
        for entry in &self.entries {
            hasher.u64(entry.sequence);
            hasher.command(&entry.command);
        }
        hasher.finish()
    }

    /// Check that this build can replay the trace as recorded.
    ///
    /// Sequence numbers must strictly increase and the recorded checksum must
    /// match the commands.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.metadata.schema_version != INTERACTION_TRACE_SCHEMA_VERSION {
            return Err(TraceError::SchemaVersion {
                found: self.metadata.schema_version,
                supported: INTERACTION_TRACE_SCHEMA_VERSION,
            });
        }
        if self.entries.is_empty() {
            return Err(TraceError::NoCommands);
        }

        if let Some((index, pair)) = self
            .entries
            .windows(2)
            .enumerate()
            .find(|(_, pair)| pair[1].sequence <= pair[0].sequence)
        {
            return Err(TraceError::NonIncreasingSequence {
                index: index + 1,
                previous: pair[0].sequence,
                current: pair[1].sequence,
            });
        }

        let computed = self.recompute_checksum();
        if self.metadata.checksum != computed {
            return Err(TraceError::ChecksumMismatch {
                recorded: self.metadata.checksum,
                computed,
            });
        }

        Ok(())
    }

    /// Replay every entry through `board`.
    pub fn replay(&self, board: &mut Board) -> Result<ReplayOutcome, TraceError> {
        self.validate()?;
        let outcomes = self
            .entries
            .iter()
            .map(|entry| board.execute(&entry.command))
            .collect();
        Ok(ReplayOutcome {
            trace_checksum: self.metadata.checksum,
            outcomes,
            pieces: board.pieces().to_vec(),
        })
    }
}

/// Replay output: per-entry outcomes plus the final layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub trace_checksum: u64,
    pub outcomes: Vec<CommandOutcome>,
    pub pieces: Vec<Piece>,
}

/// Reasons a collage trace is refused before any command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// Recorded under a schema this build does not replay.
    SchemaVersion { found: u16, supported: u16 },
    NoCommands,
    /// The command at `index` does not come after its predecessor.
    NonIncreasingSequence {
        index: usize,
        previous: u64,
        current: u64,
    },
    /// The commands were edited after the checksum was recorded.
    ChecksumMismatch { recorded: u64, computed: u64 },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaVersion { found, supported } => write!(
                f,
                "collage trace was recorded with schema v{found}; this build replays v{supported}"
            ),
            Self::NoCommands => write!(f, "collage trace has no board commands to replay"),
            Self::NonIncreasingSequence {
                index,
                previous,
                current,
            } => write!(
                f,
                "collage trace command #{index} has sequence {current}, which does not follow {previous}"
            ),
            Self::ChecksumMismatch { recorded, computed } => write!(
                f,
                "collage trace checksum {recorded:#018x} does not match its commands ({computed:#018x})"
            ),
        }
    }
}

impl std::error::Error for TraceError {}

struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0001_0000_01b3;

    fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    fn finish(&self) -> u64 {
        self.0
    }

    fn bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn u8(&mut self, value: u8) {
        self.bytes(&[value]);
    }

    fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.bytes(&value.to_le_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.bytes(&value.to_le_bytes());
    }

    fn str(&mut self, value: &str) {
        self.u64(value.len() as u64);
        self.bytes(value.as_bytes());
    }

    fn position(&mut self, position: PointerPosition) {
        self.i32(position.x);
        self.i32(position.y);
    }

    fn content(&mut self, content: &PieceContent) {
        match content {
            PieceContent::Image { source } => {
                self.u8(0);
                self.str(source.as_str());
            }
            PieceContent::Color { value } => {
                self.u8(1);
                self.str(value.as_str());
            }
        }
    }

    fn command(&mut self, command: &BoardCommand) {
        match command {
            BoardCommand::Add {
                content,
                width,
                height,
                at,
            } => {
                self.u8(0);
                self.content(content);
                self.u32(*width);
                self.u32(*height);
                match at {
                    Some([x, y]) => {
                        self.u8(1);
                        self.u32(*x);
                        self.u32(*y);
                    }
                    None => self.u8(0),
                }
            }
            BoardCommand::Delete { piece } => {
                self.u8(1);
                self.u64(piece.get());
            }
            BoardCommand::ReplaceContent { piece, content } => {
                self.u8(2);
                self.u64(piece.get());
                self.content(content);
            }
            BoardCommand::BringToFront { piece } => {
                self.u8(3);
                self.u64(piece.get());
            }
            BoardCommand::SetSnap { enabled } => {
                self.u8(4);
                self.u8(u8::from(*enabled));
            }
            BoardCommand::Resolve => self.u8(5),
            BoardCommand::Input { event } => {
                self.u8(6);
                self.event(event);
            }
        }
    }

    fn event(&mut self, event: &InteractionEvent) {
        match event {
            InteractionEvent::PointerDown {
                piece,
                edge,
                position,
            } => {
                self.u8(0);
                self.u64(piece.get());
                self.u8(edge.map_or(0, edge_code));
                self.position(*position);
            }
            InteractionEvent::PointerMove { position } => {
                self.u8(1);
                self.position(*position);
            }
            InteractionEvent::PointerUp { position } => {
                self.u8(2);
                self.position(*position);
            }
            InteractionEvent::Cancel { reason } => {
                self.u8(3);
                self.u8(match reason {
                    CancelReason::EscapeKey => 0,
                    CancelReason::PointerCancel => 1,
                    CancelReason::FocusLost => 2,
                    CancelReason::Programmatic => 3,
                });
            }
        }
    }
}

const fn edge_code(edge: ResizeEdge) -> u8 {
    match edge {
        ResizeEdge::Left => 1,
        ResizeEdge::Right => 2,
        ResizeEdge::Top => 3,
        ResizeEdge::Bottom => 4,
        ResizeEdge::TopLeft => 5,
        ResizeEdge::TopRight => 6,
        ResizeEdge::BottomLeft => 7,
        ResizeEdge::BottomRight => 8,
    }
}
