//! Built-in lookup data used when no configuration file overrides it.

/// Month names mapped to their two-digit numeric codes
pub const MONTHS: [(&str, &str); 12] = [
    ("January", "01"),
    ("February", "02"),
    ("March", "03"),
    ("April", "04"),
    ("May", "05"),
    ("June", "06"),
    ("July", "07"),
    ("August", "08"),
    ("September", "09"),
    ("October", "10"),
    ("November", "11"),
    ("December", "12"),
];

/// Weekday names. Listing pages abbreviate these ("Sat", "Tues", "Thurs"), so matching
/// accepts any prefix of at least `WEEKDAY_MIN_PREFIX` characters.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const WEEKDAY_MIN_PREFIX: usize = 3;

/// Replacement for the "and More >>" marker on truncated performer lists
pub const OTHERS_SUFFIX: &str = "others";

/// Labels the listing pages print in front of each table cell
pub const PERFORMER_LABEL: &str = "Performer";
pub const VENUE_LABEL: &str = "Venue";
pub const DATE_LABEL: &str = "Date";
pub const GENRE_LABEL: &str = "Genre";

/// Trailing country boilerplate on venue addresses
pub const COUNTRY_SUFFIX: &str = "United States";

// Join strings used when collapsing multi-line cells
pub const PERFORMER_JOIN: &str = ", ";
pub const GENRE_JOIN: &str = "";
pub const DATE_JOIN: &str = "";

// Date formats
pub const SLASH_DATE_FORMAT: &str = "%m/%d/%Y";
pub const SLASH_DATE_LEN: usize = 10;

// Output file prefixes
pub const RAW_LISTINGS_PREFIX: &str = "raw_listings";
pub const CONCERTS_PREFIX: &str = "cleaned_concerts";
pub const FESTIVALS_PREFIX: &str = "cleaned_festivals";
pub const QUARANTINE_PREFIX: &str = "quarantined_listings";

/// Area index the URL discovery crawl starts from
pub const DEFAULT_AREA_URL: &str = "https://concertful.com/area/united-states/";
pub const EVENT_URLS_PREFIX: &str = "event_urls";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
