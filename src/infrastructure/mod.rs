//! Infrastructure: configuration, logging, HTTP fetching, and the external
//! collaborator seams (page renderer, archive uploader).

pub mod config;
pub mod http_client;
pub mod logging;
pub mod renderer;
pub mod uploader;

pub use config::{AppConfig, HttpConfig, PipelineConfig, UploaderConfig};
pub use http_client::HttpClient;
pub use logging::init_logging;
pub use renderer::{HttpPageRenderer, PageRenderer};
pub use uploader::{ArchiveUploader, UnavailableUploader, UploadSession};
