/// Icon cache `index.json` lookup
#[cfg(feature = "json")]
pub mod cache_index;
/// Item database and preset catalogs
pub mod catalog;
/// Item category ids with special handling
pub mod categories;
/// Error definitions
pub mod error;
/// The icon cache fingerprint algorithm
pub mod hash;

pub use catalog::Catalog;
pub use hash::{ItemHasher, string_hash};

#[cfg(feature = "arc")]
pub type Rc<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub type Rc<T> = std::rc::Rc<T>;
