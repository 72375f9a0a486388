pub mod metrics;
pub mod providers;
pub mod query;
pub mod session_store;

pub use self::metrics::{get_metrics, init_metrics};
pub use query::{ConversationSettings, ConversationalQueryProcessor, QueryProcessor};
pub use session_store::{InMemorySessionStore, MongoSessionStore, SessionStore};
