// Per-listing transforms: cleaning, date/time parsing, value splitting, location
// resolution and classification.

pub mod classify;
pub mod clean;
pub mod dates;
pub mod location;
pub mod split;

pub use classify::{classify, RoutedRecords};
pub use clean::FieldCleaner;
pub use dates::{parse_time, split_time, DateSpan, DateTimeParser};
pub use location::LocationResolver;
pub use split::{split_values, ValueSplitter};
