pub mod clock;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod message;
pub mod report;
pub mod transport;


// Re-export the driver entry points for easy access
pub use device::{RadarOptions, S3KM1110};
pub use error::RadarError;
