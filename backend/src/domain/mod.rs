//! Domain primitives, ranking and import services.
//!
//! Purpose: define the POI entities, the name-ranking engine and the import
//! commit protocol independently of HTTP and storage. Adapters reach the
//! domain through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - PointOfInterest / NewPoi: stored and candidate POIs.
//! - PoiQueryService / PoiImportService: use-case implementations.

pub mod error;
pub mod poi;
pub mod poi_import;
pub mod poi_import_service;
pub mod poi_query_service;
pub mod ports;
pub mod ranking;
pub mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::poi::{NewPoi, PoiId, PoiValidationError, PointOfInterest};
pub use self::poi_import::{ImportBatch, RejectionReason, RowRejection};
pub use self::poi_import_service::{IMPORT_CHUNK_SIZE, PoiImportService};
pub use self::poi_query_service::{MAX_SUGGESTION_LIMIT, PoiQueryService};
pub use self::ranking::ScoredMatch;
pub use self::trace_id::TraceId;
