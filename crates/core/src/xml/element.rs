use std::mem;

const DEFAULT_INDENT_UNIT: &str = "  ";

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl XmlNode {
    fn is_whitespace(&self) -> bool {
        matches!(self, XmlNode::Text(text) if text.trim().is_empty())
    }
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Leaf element holding a single text node
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    /// Builder: append an unformatted child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Element children in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.elements_mut().filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Follow a `/` separated path of child names
    pub fn descendant(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .try_fold(self, |element, name| element.child(name))
    }

    pub fn descendant_mut(&mut self, path: &str) -> Option<&mut Element> {
        let mut current = self;
        for name in path.split('/') {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Concatenated text and CDATA content, trimmed
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => text.push_str(t),
                _ => {}
            }
        }
        text.trim().to_string()
    }

    /// Replace all content with a single text node
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.children = vec![XmlNode::Text(value.into())];
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    /// Set the text of child `name`, creating it when missing
    pub fn set_child_text(&mut self, name: &str, value: impl Into<String>) {
        match self.child_mut(name) {
            Some(child) => child.set_text(value),
            None => self.append_child(Element::with_text(name, value)),
        }
    }

    pub fn get_or_create_child(&mut self, name: &str) -> &mut Element {
        let position = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == name));

        let index = match position {
            Some(index) => index,
            None => {
                let indent = self.insert_formatted(Element::new(name));
                let index = self
                    .children
                    .iter()
                    .rposition(|n| matches!(n, XmlNode::Element(e) if e.name == name))
                    .unwrap_or(self.children.len() - 1);
                if let XmlNode::Element(created) = &mut self.children[index] {
                    if !indent.is_empty() {
                        created.children.push(XmlNode::Text(indent));
                    }
                }
                index
            }
        };

        match &mut self.children[index] {
            XmlNode::Element(element) => element,
            _ => unreachable!("index always points at an element"),
        }
    }

    /// Append `child`, indenting it like its future siblings
    pub fn append_child(&mut self, child: Element) {
        self.insert_formatted(child);
    }

    /// Insert `child` directly after the first child element called `after`,
    /// falling back to appending when there is none
    pub fn insert_child_after(&mut self, after: &str, child: Element) {
        let Some(anchor) = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == after))
        else {
            self.insert_formatted(child);
            return;
        };

        let (indent, unit) = self.layout();
        let mut child = child;
        if !indent.is_empty() {
            reindent(&mut child, &indent, &unit);
            self.children.insert(anchor + 1, XmlNode::Element(child));
            self.children.insert(anchor + 1, XmlNode::Text(indent));
        } else {
            self.children.insert(anchor + 1, XmlNode::Element(child));
        }
    }

    /// Remove every child element called `name` together with its leading
    /// whitespace. Returns the removed elements.
    pub fn remove_children_named(&mut self, name: &str) -> Vec<Element> {
        self.remove_elements_where(|e| e.name == name)
    }

    /// Remove child elements matching `predicate` together with their leading whitespace
    pub fn remove_elements_where<F>(&mut self, mut predicate: F) -> Vec<Element>
    where
        F: FnMut(&Element) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept: Vec<XmlNode> = Vec::with_capacity(self.children.len());

        for node in mem::take(&mut self.children) {
            match node {
                XmlNode::Element(element) if predicate(&element) => {
                    if kept.last().is_some_and(XmlNode::is_whitespace) {
                        kept.pop();
                    }
                    removed.push(element);
                }
                other => kept.push(other),
            }
        }

        self.children = kept;
        removed
    }

    /// Indentation for a new child and the detected indentation unit. The
    /// indentation is empty when the element carries no layout.
    fn layout(&self) -> (String, String) {
        let closing = self.closing_indent();
        let sibling = self
            .children
            .windows(2)
            .find_map(|pair| match (&pair[0], &pair[1]) {
                (XmlNode::Text(text), XmlNode::Element(_)) if text.trim().is_empty() => {
                    Some(normalize_indent(text))
                }
                _ => None,
            });

        let unit = match (&sibling, &closing) {
            (Some(sibling), Some(closing))
                if sibling.len() > closing.len() && sibling.starts_with(closing.as_str()) =>
            {
                sibling[closing.len()..].to_string()
            }
            _ => DEFAULT_INDENT_UNIT.to_string(),
        };

        let indent = match (sibling, closing) {
            (Some(sibling), _) => sibling,
            (None, Some(closing)) => format!("{closing}{unit}"),
            (None, None) => String::new(),
        };
        (indent, unit)
    }

    fn closing_indent(&self) -> Option<String> {
        match self.children.last() {
            Some(XmlNode::Text(text)) if text.trim().is_empty() => Some(normalize_indent(text)),
            _ => None,
        }
    }

    /// Insert `child` before the closing whitespace. Returns the indentation
    /// used for the child.
    fn insert_formatted(&mut self, mut child: Element) -> String {
        let (indent, unit) = self.layout();
        if !indent.is_empty() {
            reindent(&mut child, &indent, &unit);
        }

        let insert_at = if self.closing_indent().is_some() {
            self.children.len() - 1
        } else {
            self.children.len()
        };

        self.children.insert(insert_at, XmlNode::Element(child));
        if !indent.is_empty() {
            self.children.insert(insert_at, XmlNode::Text(indent.clone()));
        }
        indent
    }
}

/// Keep only the last line of a whitespace run, so blank lines are not copied
fn normalize_indent(text: &str) -> String {
    match text.rfind('\n') {
        Some(pos) => text[pos..].to_string(),
        None => text.to_string(),
    }
}

/// Re-layout an element subtree so that its children sit one `unit` deeper
/// than `indent`
fn reindent(element: &mut Element, indent: &str, unit: &str) {
    let has_structure = element
        .children
        .iter()
        .any(|n| matches!(n, XmlNode::Element(_) | XmlNode::Comment(_)));
    if !has_structure {
        return;
    }

    let inner = format!("{indent}{unit}");
    let mut laid_out = Vec::with_capacity(element.children.len() * 2 + 1);
    for mut node in mem::take(&mut element.children) {
        if node.is_whitespace() {
            continue;
        }
        if let XmlNode::Element(child) = &mut node {
            reindent(child, &inner, unit);
        }
        laid_out.push(XmlNode::Text(inner.clone()));
        laid_out.push(node);
    }
    laid_out.push(XmlNode::Text(indent.to_string()));
    element.children = laid_out;
}
