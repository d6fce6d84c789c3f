//! Conversion of a host's native data into [`Series`].

use crate::error::Result;
use crate::model::Series;

/// Turns a host's tabular or query result into named series.
///
/// Column pairing and name resolution are the adapter's job; the pipeline
/// only ever sees [`Series`].
pub trait SeriesAdapter {
    fn load(&self) -> Result<Vec<Series>>;

    /// Short description of the source, for logs
    fn describe(&self) -> String;
}
