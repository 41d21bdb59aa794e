//! Internal implementation details.

pub(crate) mod cache;
pub(crate) mod dispose_bag;

pub(crate) use cache::InstanceCache;
pub(crate) use dispose_bag::DisposeBag;

#[cfg(feature = "performance")]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "performance"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
