// Adapters layer: concrete implementations of the domain ports (files, browser, host).

pub mod csv_sink;
pub mod fingerprint;
pub mod link_store;
pub mod status;
pub mod webdriver;

pub use csv_sink::CsvProfileSink;
pub use fingerprint::{ConfiguredFingerprint, StaticFingerprint, SysinfoFingerprint};
pub use link_store::LinkStore;
pub use status::StatusLog;
pub use webdriver::{WebDriverClient, WebDriverSessions};
