//! Generic document tree
//!
//! This module provides the `Node` and `Element` types that sit between raw XML text
//! and the merge engine. The shape follows what a generic XML-to-object converter
//! produces:
//!
//! - An element with no attributes and no child elements collapses to [`Node::Text`]
//! - Attributes are stored as fields with an [`ATTRIBUTE_PREFIX`] (`@lat`, `@lon`)
//! - Text mixed with attributes or children is stored under [`TEXT_KEY`]
//! - A child name that appears once is a bare node, a repeated one becomes a [`Node::List`]
//!
//! The last rule is why consumers must not assume sequences: a file with a single
//! `<trk>` yields a bare element where a file with two yields a list. [`Node::items`]
//! and [`Node::into_items`] normalize both cases.

use indexmap::IndexMap;

/// Prefix marking attribute fields inside an [`Element`]
pub const ATTRIBUTE_PREFIX: char = '@';

/// Field holding the character data of an element that also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// A node of the document tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Scalar character data (also used for empty elements without attributes)
    Text(String),
    /// Ordered mapping of field names to nodes
    Element(Element),
    /// Repeated sibling elements sharing one name
    List(Vec<Node>),
}

/// Ordered mapping of field names to child nodes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    fields: IndexMap<String, Node>,
}

impl Node {
    /// Scalar text of this node.
    ///
    /// Elements answer with their `#text` field, so `<name lang="en">Foo</name>`
    /// still reads as `Foo`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(element) => element.text(TEXT_KEY),
            Node::List(_) => None,
        }
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// View this node as a sequence: lists yield their items, anything else is a
    /// one-element sequence.
    pub fn items(&self) -> &[Node] {
        match self {
            Node::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Owned counterpart of [`Node::items`]
    pub fn into_items(self) -> Vec<Node> {
        match self {
            Node::List(items) => items,
            other => vec![other],
        }
    }

    /// True for text nodes that carry no characters (e.g. `<trk/>`)
    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, replacing any previous value under `key`
    pub fn with(mut self, key: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(key, node);
        self
    }

    /// Builder-style attribute insert (`lat` is stored as `@lat`)
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(attribute_key(name), Node::Text(value.into()));
        self
    }

    /// Insert a field, replacing any previous value under `key`
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) {
        self.fields.insert(key.into(), node.into());
    }

    /// Append a child, turning a repeated key into a [`Node::List`].
    ///
    /// This is how sibling elements with the same name accumulate while parsing.
    pub fn append(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.fields.get_mut(&key) {
            Some(Node::List(items)) => items.push(node),
            Some(existing) => {
                let first = std::mem::replace(existing, Node::List(Vec::with_capacity(2)));
                if let Node::List(items) = existing {
                    items.push(first);
                    items.push(node);
                }
            }
            None => {
                self.fields.insert(key, node);
            }
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    /// Remove and return a field, keeping the order of the remaining ones
    pub fn take(&mut self, key: &str) -> Option<Node> {
        self.fields.shift_remove(key)
    }

    /// Scalar text of a child field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_text)
    }

    /// Value of an attribute, looked up without its prefix
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.text(&attribute_key(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field name used to store the attribute `name`
pub fn attribute_key(name: &str) -> String {
    format!("{ATTRIBUTE_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_promotes_repeated_keys_to_list() {
        let mut element = Element::new();
        element.append("trkpt", Node::from("a"));
        assert_eq!(element.get("trkpt"), Some(&Node::from("a")));

        element.append("trkpt", Node::from("b"));
        element.append("trkpt", Node::from("c"));
        let items = element.get("trkpt").unwrap().items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].as_text(), Some("c"));
    }

    #[test]
    fn test_items_wraps_bare_nodes() {
        let bare = Node::from(Element::new().with("name", "Morning run"));
        assert_eq!(bare.items().len(), 1);

        let list = Node::List(vec![Node::from("x"), Node::from("y")]);
        assert_eq!(list.items().len(), 2);
        assert_eq!(list.into_items().len(), 2);
    }

    #[test]
    fn test_text_reads_through_elements() {
        let name = Element::new()
            .with_attribute("lang", "en")
            .with(TEXT_KEY, "Summit");
        let wpt = Element::new().with("name", name);

        assert_eq!(wpt.text("name"), Some("Summit"));
        assert_eq!(wpt.get("name").unwrap().as_element().unwrap().attribute("lang"), Some("en"));
    }

    #[test]
    fn test_attribute_lookup_uses_prefix() {
        let wpt = Element::new().with_attribute("lat", "51.5");
        assert_eq!(wpt.attribute("lat"), Some("51.5"));
        assert_eq!(wpt.text("@lat"), Some("51.5"));
        assert_eq!(wpt.attribute("lon"), None);
    }

    #[test]
    fn test_take_preserves_order() {
        let mut element = Element::new().with("a", "1").with("b", "2").with("c", "3");
        assert_eq!(element.take("b"), Some(Node::from("2")));
        let keys: Vec<&str> = element.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_is_blank() {
        assert!(Node::from("").is_blank());
        assert!(Node::from("  \n").is_blank());
        assert!(!Node::from("x").is_blank());
        assert!(!Node::from(Element::new()).is_blank());
    }
}
