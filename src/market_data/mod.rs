// Market data: canonical daily bars and the sources that produce them.

pub mod bars;
pub mod csv_loader;
pub mod source;

pub use bars::{normalize_bars, Bar, NormalizeWarning, RawBar};
pub use csv_loader::CsvBarSource;
pub use source::BarSource;
