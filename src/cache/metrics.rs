//! Counter names emitted by the query cache.

pub const HIT_TOTAL: &str = "recipebox_cache_hit_total";
pub const MISS_TOTAL: &str = "recipebox_cache_miss_total";
pub const DEDUP_TOTAL: &str = "recipebox_cache_dedup_total";
pub const INVALIDATED_TOTAL: &str = "recipebox_cache_invalidated_total";
pub const FETCH_ERROR_TOTAL: &str = "recipebox_cache_fetch_error_total";
pub const MUTATION_TOTAL: &str = "recipebox_cache_mutation_total";
