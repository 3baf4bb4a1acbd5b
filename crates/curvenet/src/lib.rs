#![warn(missing_docs)]

//! Planar curve network maintenance.
//!
//! A [`PlanarCurveDatabase`] tracks a set of 3D curves, reduces each to a
//! planar projection on a canonical placement, and keeps a consistent
//! decomposition of every curve into fragments split at each mutual
//! intersection. Edits cascade: removing a curve re-trims everything it
//! transitively touched, and the registry can be snapshotted for undo.
//!
//! # Example
//!
//! ```
//! use curvenet::PlanarCurveDatabase;
//! use curvenet_geom::LineSegment3;
//! use curvenet_math::Point3;
//! use curvenet_store::{GeometryStore, Origin};
//!
//! let mut store = GeometryStore::new();
//! let mut db = PlanarCurveDatabase::new();
//!
//! let a = store.add_curve(
//!     Box::new(LineSegment3::from_points(
//!         Point3::new(-1.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!     )),
//!     Origin::User,
//! );
//! let b = store.add_curve(
//!     Box::new(LineSegment3::from_points(
//!         Point3::new(0.0, -1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     )),
//!     Origin::User,
//! );
//! db.add(&mut store, a)?;
//! db.add(&mut store, b)?;
//!
//! // Both segments split at the crossing into two fragments each.
//! assert_eq!(db.fragments(a).unwrap().len(), 2);
//! assert_eq!(db.fragments(b).unwrap().len(), 2);
//! # Ok::<(), curvenet::CurveNetError>(())
//! ```

use curvenet_store::ItemId;
use thiserror::Error;

mod database;
mod info;
mod memento;
mod transaction;

pub use database::PlanarCurveDatabase;
pub use info::{CurveInfo, Joint, Joints, PlanarCurveId, PointOnCurve};
pub use memento::CurveMemento;
pub use transaction::Transaction;

pub use curvenet_geom as geom;
pub use curvenet_math as math;
pub use curvenet_store as store;

/// Errors from curve network maintenance.
#[derive(Debug, Clone, Error)]
pub enum CurveNetError {
    /// The curve is not tracked by the database.
    #[error("curve {0} is not tracked by the curve network")]
    UnknownCurve(ItemId),

    /// The item is a generated fragment; only source curves are tracked.
    #[error("item {0} is a generated fragment, not a source curve")]
    NotASourceCurve(ItemId),

    /// A curve projected onto its best-fit plane but not onto the
    /// canonical placement that plane normalized to.
    #[error("curve {0} lost its planar form during placement normalization")]
    ProjectionFailed(ItemId),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] curvenet_store::StoreError),
}
