pub mod errors;
pub mod formats;
pub mod headers;
pub mod model;
mod registry;
pub mod units;

pub use errors::ParserError;
pub use headers::{parse_header, parse_headers, strip_instrument_suffix};
pub use model::{HeaderDescriptor, LoadOutcome, RawTable};
pub use registry::{load_table, parse_table, reader_for_extension, TableReader};
pub use units::UnitTable;
