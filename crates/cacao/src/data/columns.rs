//! Column names of the cleaned chocolate-bar schema.

pub const COMPANY: &str = "company";
pub const BAR_ORIGIN: &str = "bar_origin";
/// Review reference number. Present in the raw file, dropped by cleaning.
pub const REF: &str = "REF";
pub const REVIEW_YEAR: &str = "review_year";
pub const COCOA_PERCENT: &str = "cocoa_percent";
pub const COMPANY_LOCATION: &str = "company_location";
pub const BEAN_TYPE: &str = "bean_type";
pub const BEAN_ORIGIN: &str = "bean_origin";
/// Target column.
pub const RATING: &str = "Rating";
