pub trait Cache {
    type Key;
    type Value;

    // must not block, it is called on every lookup
    fn get(&self, key: &Self::Key) -> Option<Self::Value>;

    fn set(&self, key: Self::Key, value: Self::Value);

    fn del(&self, key: &Self::Key);

    fn name(&self) -> &'static str;
}
