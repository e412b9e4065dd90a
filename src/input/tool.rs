//! Tool identification.

/// The closed set of interactive tools an overlay session owns.
///
/// One instance of each tool exists per session; the coordinator's active-tool
/// slot holds one of these values, so "is this the active tool" is a plain
/// equality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    /// Crop selection mirrored into a hole cut out of the overlay group
    CropSelect,
    /// Selection mirrored into an even-odd clip outline on the overlay
    MaskSelect,
    /// Rectangle annotations
    Rectangle,
    /// Arrow annotations
    Arrow,
    /// Zoomed preview that follows the pointer
    Magnifier,
}

impl ToolKind {
    /// Every tool, in registration order.
    pub const ALL: [ToolKind; 5] = [
        ToolKind::CropSelect,
        ToolKind::MaskSelect,
        ToolKind::Rectangle,
        ToolKind::Arrow,
        ToolKind::Magnifier,
    ];

    /// Human-readable tool name used in log output.
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::CropSelect => "crop",
            ToolKind::MaskSelect => "mask",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Arrow => "arrow",
            ToolKind::Magnifier => "magnifier",
        }
    }

    /// Whether this tool drags out a selection mirrored into the mask.
    pub fn is_selection(&self) -> bool {
        matches!(self, ToolKind::CropSelect | ToolKind::MaskSelect)
    }
}
