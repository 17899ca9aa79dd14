//! Refinement parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SubdivideError, SubdivideResult};

/// Subdivision depth used when a scene does not specify one.
pub const DEFAULT_LEVELS: u32 = 3;

/// Parameters for Loop refinement.
///
/// # Example
///
/// ```
/// use mesh_loop_subdiv::SubdivideParams;
///
/// let params = SubdivideParams::new()
///     .with_levels(2)
///     .with_strict_manifold(true);
///
/// assert_eq!(params.levels, 2);
/// assert_eq!(params.expected_faces(20), 320);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubdivideParams {
    /// Number of subdivision levels. Zero passes the control mesh through.
    pub levels: u32,

    /// Fail on non-manifold edges and winding conflicts instead of
    /// leaving the offending faces unlinked.
    pub strict_manifold: bool,

    /// Reject control faces with zero area.
    ///
    /// Faces that repeat a vertex index are always rejected.
    pub reject_degenerate_faces: bool,

    /// Maximum faces allowed in result (prevents memory issues).
    pub max_faces: usize,

    /// Refine independent shapes on the rayon pool in
    /// [`refine_batch`](crate::refine_batch).
    pub parallel: bool,
}

impl Default for SubdivideParams {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            strict_manifold: false,
            reject_degenerate_faces: true,
            max_faces: 10_000_000, // 10M faces max
            parallel: true,
        }
    }
}

impl SubdivideParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters that fail on any non-manifold or mis-wound input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_manifold: true,
            ..Self::default()
        }
    }

    /// Parameters that return the control mesh unchanged.
    #[must_use]
    pub fn pass_through() -> Self {
        Self {
            levels: 0,
            ..Self::default()
        }
    }

    /// Build parameters from the signed level count a scene description carries.
    ///
    /// # Errors
    ///
    /// Returns [`SubdivideError::InvalidDepth`] if `levels` is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_loop_subdiv::{SubdivideError, SubdivideParams};
    ///
    /// let params = SubdivideParams::from_scene_levels(4)?;
    /// assert_eq!(params.levels, 4);
    ///
    /// assert!(matches!(
    ///     SubdivideParams::from_scene_levels(-1),
    ///     Err(SubdivideError::InvalidDepth(-1))
    /// ));
    /// # Ok::<(), SubdivideError>(())
    /// ```
    pub fn from_scene_levels(levels: i64) -> SubdivideResult<Self> {
        Self::default().try_with_depth(levels)
    }

    /// Set the number of levels from a signed depth.
    ///
    /// # Errors
    ///
    /// Returns [`SubdivideError::InvalidDepth`] if `depth` is negative or does
    /// not fit in a `u32`.
    pub fn try_with_depth(self, depth: i64) -> SubdivideResult<Self> {
        let levels = u32::try_from(depth).map_err(|_| SubdivideError::InvalidDepth(depth))?;
        Ok(self.with_levels(levels))
    }

    /// Set number of subdivision levels.
    #[must_use]
    pub const fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    /// Set whether non-manifold input is an error.
    #[must_use]
    pub const fn with_strict_manifold(mut self, strict: bool) -> Self {
        self.strict_manifold = strict;
        self
    }

    /// Set whether zero-area faces are rejected.
    #[must_use]
    pub const fn with_reject_degenerate_faces(mut self, reject: bool) -> Self {
        self.reject_degenerate_faces = reject;
        self
    }

    /// Set maximum faces allowed.
    #[must_use]
    pub const fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Set whether batches are refined in parallel.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Calculate expected face count after refinement.
    ///
    /// Each level multiplies the face count by 4. Saturates at `usize::MAX`.
    #[must_use]
    pub const fn expected_faces(&self, current_faces: usize) -> usize {
        let mut faces = current_faces;
        let mut i = 0;
        while i < self.levels {
            faces = faces.saturating_mul(4);
            i += 1;
        }
        faces
    }
}
