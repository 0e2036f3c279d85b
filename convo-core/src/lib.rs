pub mod error;
pub mod extract;
pub mod model;
pub mod query;
pub mod render;
pub mod service;
pub mod source;
pub mod wrap;

pub use error::{ConvoError, Result};
pub use extract::{ExtractOptions, extract_assistant_message, extract_user_message};
pub use model::{
    AssistantResponse, DisplayBlock, MessageRole, OptionItem, Recommendation, Record, UserInput,
};
pub use query::{PsqlRunner, QueryOutput, QueryRunner, SessionQuery};
pub use render::{Layout, render_transcript};
pub use service::render_source;
pub use source::LineSource;
pub use source::database::{DatabaseConfig, DatabaseSource};
pub use source::file::FileSource;
pub use wrap::wrap_text;
