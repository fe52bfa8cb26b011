pub mod istates;
pub mod isignals;
pub mod ievents;

pub use istates::*;
pub use isignals::*;
pub use ievents::*;

use chrono::{Local, NaiveDateTime};

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
