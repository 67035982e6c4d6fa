//! Normalization parameters.
//!
//! Contains NormalizeParams for controlling how heterogeneous label records
//! are merged into one section tree.

/// Default number of digits per tree-index segment.
pub const DEFAULT_INDEX_WIDTH: usize = 2;

/// Default tolerance (slide units) for detecting shapes over table rows/columns.
pub const DEFAULT_OVERLAY_TOLERANCE: f64 = 5.0;

/// Parameters for section normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    /// Minimum number of digits in every tree-index segment. A sibling group
    /// with more members than fits gets wider segments.
    pub index_width: usize,

    /// If overlaid shapes should also be placed under custom row/column
    /// groups, not only under single rows and columns.
    pub duplicate_into_groups: bool,

    /// Shapes lying inside a row or column expanded by this margin count as
    /// overlaid on it. None only uses overlaid ids supplied with the labels.
    pub overlay_tolerance: Option<f64>,

    /// If root-level sections whose members are all nested elsewhere should
    /// be dropped after assembly.
    pub trim_redundant_roots: bool,

    /// If sections with identical member sets should be collapsed, keeping
    /// the one with the longer label.
    pub dedupe: bool,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            index_width: DEFAULT_INDEX_WIDTH,
            duplicate_into_groups: false,
            overlay_tolerance: Some(DEFAULT_OVERLAY_TOLERANCE),
            trim_redundant_roots: false,
            dedupe: true,
        }
    }
}

impl NormalizeParams {
    /// Creates new normalization parameters with the specified values.
    ///
    /// # Panics
    /// Panics if index_width is zero or overlay_tolerance is negative.
    pub fn new(
        index_width: usize,
        duplicate_into_groups: bool,
        overlay_tolerance: Option<f64>,
        trim_redundant_roots: bool,
        dedupe: bool,
    ) -> Self {
        assert!(index_width > 0, "index_width must be at least 1");
        if let Some(tol) = overlay_tolerance {
            assert!(
                tol >= 0.0 && tol.is_finite(),
                "overlay_tolerance should be None, or a non-negative number"
            );
        }

        Self {
            index_width,
            duplicate_into_groups,
            overlay_tolerance,
            trim_redundant_roots,
            dedupe,
        }
    }
}
