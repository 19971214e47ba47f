pub mod curve;
pub mod incidence;
pub mod pool;

pub use curve::{Curve, CurveKind};
pub use incidence::{IncidenceMatrix, build_incidence};
pub use pool::{Pool, PoolSpec, pools_from_specs};
