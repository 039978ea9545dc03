//! Table-related types and enums

/// Vertical merge type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VMerge {
    /// Start of a new vertical merge group
    Restart,
    /// Continuation of a vertical merge
    Continue,
}

impl VMerge {
    /// Parse the `w:val` of `w:vMerge`; a missing value means continue
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("restart") => VMerge::Restart,
            _ => VMerge::Continue,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VMerge::Restart => "restart",
            VMerge::Continue => "continue",
        }
    }
}

/// Table width or indentation (`w:w` + `w:type`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableWidth {
    /// Automatic width
    #[default]
    Auto,
    /// Width in twips (1/20 of a point)
    Dxa(i32),
    /// Width in fiftieths of a percent (5000 = 100%)
    Pct(i32),
}

impl TableWidth {
    /// Build from the `w:w` and `w:type` attributes
    pub fn from_parts(value: i32, kind: Option<&str>) -> Self {
        match kind {
            Some("auto") | Some("nil") => TableWidth::Auto,
            Some("pct") => TableWidth::Pct(value),
            Some(_) => TableWidth::Dxa(value),
            None if value > 0 => TableWidth::Dxa(value),
            None => TableWidth::Auto,
        }
    }

    /// The `w:w` value; auto writes 0
    pub fn value(&self) -> i32 {
        match self {
            TableWidth::Auto => 0,
            TableWidth::Dxa(v) | TableWidth::Pct(v) => *v,
        }
    }

    /// The `w:type` value
    pub fn kind(&self) -> &'static str {
        match self {
            TableWidth::Auto => "auto",
            TableWidth::Dxa(_) => "dxa",
            TableWidth::Pct(_) => "pct",
        }
    }
}

/// Table alignment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableAlignment {
    /// Left aligned (default)
    #[default]
    Left,
    /// Center aligned
    Center,
    /// Right aligned
    Right,
}

impl TableAlignment {
    /// Parse from OOXML string value
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => TableAlignment::Center,
            "right" | "end" => TableAlignment::Right,
            _ => TableAlignment::Left,
        }
    }

    /// Convert to OOXML string value
    pub fn as_str(&self) -> &'static str {
        match self {
            TableAlignment::Left => "left",
            TableAlignment::Center => "center",
            TableAlignment::Right => "right",
        }
    }
}

/// Vertical alignment for table cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    /// Top aligned (default)
    #[default]
    Top,
    /// Center aligned
    Center,
    /// Bottom aligned
    Bottom,
}

impl VerticalAlignment {
    /// Parse from OOXML string value
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => VerticalAlignment::Center,
            "bottom" => VerticalAlignment::Bottom,
            _ => VerticalAlignment::Top,
        }
    }

    /// Convert to OOXML string value
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
        }
    }
}

/// Border side of a table or cell, in output order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableBorderSide {
    Top,
    Left,
    Bottom,
    Right,
    InsideH,
    InsideV,
}

impl TableBorderSide {
    pub const ALL: [TableBorderSide; 6] = [
        TableBorderSide::Top,
        TableBorderSide::Left,
        TableBorderSide::Bottom,
        TableBorderSide::Right,
        TableBorderSide::InsideH,
        TableBorderSide::InsideV,
    ];

    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"top" => Some(TableBorderSide::Top),
            b"left" | b"start" => Some(TableBorderSide::Left),
            b"bottom" => Some(TableBorderSide::Bottom),
            b"right" | b"end" => Some(TableBorderSide::Right),
            b"insideH" => Some(TableBorderSide::InsideH),
            b"insideV" => Some(TableBorderSide::InsideV),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TableBorderSide::Top => "w:top",
            TableBorderSide::Left => "w:left",
            TableBorderSide::Bottom => "w:bottom",
            TableBorderSide::Right => "w:right",
            TableBorderSide::InsideH => "w:insideH",
            TableBorderSide::InsideV => "w:insideV",
        }
    }
}

/// Table layout algorithm (w:tblLayout)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableLayout {
    Fixed,
    Autofit,
}

impl TableLayout {
    pub fn parse(s: &str) -> Self {
        match s {
            "fixed" => TableLayout::Fixed,
            _ => TableLayout::Autofit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableLayout::Fixed => "fixed",
            TableLayout::Autofit => "autofit",
        }
    }
}

/// Conditional formatting flags of the table style (w:tblLook)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableLook {
    /// Hex bitmask kept for older consumers
    pub val: String,
    pub first_row: bool,
    pub last_row: bool,
    pub first_column: bool,
    pub last_column: bool,
    pub no_h_band: bool,
    pub no_v_band: bool,
}

/// Default cell margins (w:tblCellMar) in twips
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellMargins {
    pub top: Option<i32>,
    pub left: Option<i32>,
    pub bottom: Option<i32>,
    pub right: Option<i32>,
}

impl CellMargins {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.left.is_none() && self.bottom.is_none() && self.right.is_none()
    }
}
