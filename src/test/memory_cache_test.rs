use crate::{
    cache::Cache,
    memory_cache::MemoryCache,
    test::{item, placeholder},
};

#[test]
fn test_get_set() {
    let cache = MemoryCache::new();
    assert!(cache.get(&1).is_none());

    cache.set(1, item(1));
    assert_eq!(cache.get(&1), Some(item(1)));
    assert!(cache.get(&2).is_none());
}

#[test]
fn test_set_is_idempotent_and_last_write_wins() {
    let cache = MemoryCache::new();

    cache.set(1, item(1));
    cache.set(1, item(1));
    assert_eq!(cache.get(&1), Some(item(1)));
    assert_eq!(cache.len(), 1);

    cache.set(1, placeholder(1));
    assert_eq!(cache.get(&1), Some(placeholder(1)));
}

#[test]
fn test_del() {
    let cache = MemoryCache::new();
    cache.set(1, item(1));
    cache.set(2, item(2));

    cache.del(&1);
    assert!(cache.get(&1).is_none());
    assert_eq!(cache.get(&2), Some(item(2)));

    // deleting a missing key is a no-op
    cache.del(&42);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.name(), "memorycache");
}
