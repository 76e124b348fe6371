/// What an unmounted element holds besides its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    #[default]
    None,
    /// A single text node.
    Text(String),
    Children(Vec<super::Element>),
}
