/// Default items-per-page for the ad listing (overridable via ADS_PAGE_SIZE)
pub const DEFAULT_PAGE_SIZE: i64 = 10;
