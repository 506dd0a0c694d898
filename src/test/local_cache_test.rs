use futures::FutureExt;

use crate::{
    autobatch::AutoBatch,
    cache::Cache,
    local_cache::{LocalCache, LocalCacheOption},
    test::{init_tracing, item, Calls},
};

#[test]
fn test_get_set_del() {
    let cache = LocalCache::new(LocalCacheOption {
        segments: 2,
        max_capacity: 64,
        ..Default::default()
    });

    assert!(cache.get(&1u32).is_none());
    cache.set(1, item(1));
    assert_eq!(cache.get(&1), Some(item(1)));

    cache.set(1, item(2));
    assert_eq!(cache.get(&1), Some(item(2)));

    cache.del(&1);
    assert!(cache.get(&1).is_none());
}

#[tokio::test]
async fn test_builder() {
    init_tracing();

    let calls = Calls::default();
    let recorder = calls.clone();

    let ab = AutoBatch::builder()
        .cache(LocalCache::new(LocalCacheOption {
            segments: 8,
            max_capacity: 64,
            ..Default::default()
        }))
        .debounce(std::time::Duration::from_millis(10))
        .loader(move |ids: Vec<u32>| {
            recorder.record(&ids);
            async move { Ok(ids.into_iter().map(|id| (id, item(id))).collect()) }.boxed()
        })
        .build()
        .unwrap();

    assert_eq!(ab.lookup(1).await.unwrap(), Some(item(1)));
    assert_eq!(ab.lookup(1).await.unwrap(), Some(item(1)));
    assert_eq!(calls.keys(), vec![vec![1]]);

    ab.with_cache(|c| assert_eq!(c.get(&1), Some(item(1))));
}
