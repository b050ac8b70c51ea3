//! Router modules mounted into the application.

pub mod user;

use crate::app::Mount;

/// Every router module this process serves, in mount order.
pub fn all() -> Vec<Mount> {
    vec![user::mount()]
}
