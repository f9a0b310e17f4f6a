use serde::Serialize;

/// A generic XML tree node.
///
/// Attributes keep their document order so that flattened columns come out
/// in the order a reader sees them in the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlNode {
    /// Element tag name.
    pub tag: String,
    /// XML attributes as `(name, value)` pairs in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<XmlNode>,
    /// Optional text content.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a new XML node with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Return the raw value of an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Return an attribute value with surrounding whitespace removed, or an
    /// empty string when the attribute is missing.
    pub fn attr_trimmed(&self, key: &str) -> &str {
        self.attr(key).map(str::trim).unwrap_or("")
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Return all children with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.tag == tag)
            .collect()
    }

    /// Iterate over this node and all of its descendants in document
    /// pre-order.
    pub fn iter(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Iterate over this node and its descendants whose tag matches `tag`,
    /// in document pre-order.
    pub fn iter_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.iter().filter(move |node| node.tag == tag)
    }
}

/// Pre-order iterator returned by [`XmlNode::iter`].
pub struct Descendants<'a> {
    stack: Vec<&'a XmlNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn iter_visits_in_document_preorder() {
        let root = parse(b"<a><b><c/></b><d/></a>").expect("parse");
        let tags: Vec<&str> = root.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn iter_tag_reaches_nested_matches() {
        let root = parse(br#"<a><host name="x"/><b><host name=" y "/></b></a>"#).expect("parse");
        let names: Vec<&str> = root.iter_tag("host").map(|n| n.attr_trimmed("name")).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(root.attr_trimmed("missing"), "");
    }
}
