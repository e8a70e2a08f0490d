pub mod flatten;
pub mod inject;
pub mod lock;
pub mod order;
pub mod root_key;
pub mod text_file;

pub use flatten::FlattenStage;
pub use inject::InjectLocaleStage;
pub use lock::LockedKeysStage;
pub use order::SortByOriginalStage;
pub use root_key::RootKeyStage;
pub use text_file::{TextFileStage, LOCALE_PLACEHOLDER};
