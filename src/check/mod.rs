//! Checks built on the query core.
//!
//! A check opens a session, runs its query and turns normalized rows into its
//! own typed output.

pub mod dates;
pub mod hypervguest;
pub mod status;

pub use dates::{parse_wmi_date, WMI_DATE_FORMAT};
pub use hypervguest::{check_hypervguest, guest_query, GuestCheckResult, GuestRow};
