//! Request-processing behaviours installed ahead of application routes.

pub mod access_log;
pub mod recovery;

pub use access_log::AccessLog;
pub use recovery::recovery_layer;
