/// Determinant magnitude below which two segments are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-4;

/// Interior margin on the intersection parameters; keeps shared or nearly
/// shared endpoints from registering as proper crossings.
pub const CROSSING_MARGIN: f64 = 1e-3;

/// Fractional deadzone at each end of an edge where splits are rejected.
pub const SPLIT_DEADZONE: f64 = 0.15;

/// Offset applied to duplicated and pasted vertices.
pub const DUPLICATE_OFFSET: f64 = 20.0;
