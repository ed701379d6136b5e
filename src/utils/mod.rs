pub mod certificate;
pub mod leave_filter;
pub mod leave_stats;
pub mod seed;
