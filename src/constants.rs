/// Source name constants to ensure consistency across the codebase.
/// These define the mapping between CLI source names and museum display names.

// Source names (used in CLI and tallies), in harvest priority order
pub const SONGSHAN_SOURCE: &str = "songshan";
pub const NPM_SOURCE: &str = "npm";
pub const MOCA_SOURCE: &str = "moca";
pub const HUASHAN_SOURCE: &str = "huashan";
pub const FUBON_SOURCE: &str = "fubon";
pub const TFAM_SOURCE: &str = "tfam";
pub const NTNU_SOURCE: &str = "ntnu";

// Museum display names as they appear in the exported records
pub const SONGSHAN_MUSEUM_NAME: &str = "松山文創園區";
pub const NPM_MUSEUM_NAME: &str = "國立故宮博物院";
pub const MOCA_MUSEUM_NAME: &str = "台北當代藝術館";
pub const HUASHAN_MUSEUM_NAME: &str = "華山1914文創園區";
pub const FUBON_MUSEUM_NAME: &str = "富邦美術館";
pub const TFAM_MUSEUM_NAME: &str = "臺北市立美術館";
pub const NTNU_MUSEUM_NAME: &str = "師大美術館";

/// All supported source names, in the fixed harvest priority order.
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![
        SONGSHAN_SOURCE,
        NPM_SOURCE,
        MOCA_SOURCE,
        HUASHAN_SOURCE,
        FUBON_SOURCE,
        TFAM_SOURCE,
        NTNU_SOURCE,
    ]
}
