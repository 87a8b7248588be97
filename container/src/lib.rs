//! Access to the raw contents of recorded episode containers.
//!
//! The rest of the workspace only ever sees [`RawEpisode`]; how the arrays and
//! attributes are pulled out of a file is the business of a
//! [`ContainerReader`] implementation.

mod error;
#[cfg(feature = "hdf5")]
mod hdf5_backend;
mod raw;
mod reader;

pub use error::ContainerError;
pub use raw::AttributeValue;
pub use raw::RawEpisode;
pub use raw::SegmentBound;
pub use reader::ContainerReader;
pub use reader::DEFAULT_CONTAINER_EXTENSIONS;
pub use reader::Hdf5Reader;
pub use reader::has_container_extension;
