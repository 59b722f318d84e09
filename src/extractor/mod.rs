pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::ToolOutput;
pub use traits::MediaTool;
pub use ytdlp::{locate_ytdlp, YtDlpTool};
