mod default_value;
mod key;
mod record;
mod value;

pub use default_value::{DefaultValue, LazyContextFn, LazyFn};
pub use key::{CACHE_SIGIL, TranslationKey, cached};
pub use record::{CaseView, ContentView, RecordContent, RecordView, TranslationRecord};
pub use value::Value;
