#[derive(Default)]
pub struct Options {
    pub source_first: Option<bool>,
}
