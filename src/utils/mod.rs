//! The `utils` module provides the pieces shared by every other module of
//! `gps_transport`: the error taxonomy and the logging bootstrap.

pub mod error;
pub mod logging;
