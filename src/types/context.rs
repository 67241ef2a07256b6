use std::collections::BTreeMap;

use super::Value;

/// Input object handed to the bundled expression evaluator.
///
/// A tree of named fields. Fields are written by dot-separated paths like
/// `"person.age"` and reached from an expression through the input binding,
/// e.g. `input.person.age` or `input.person["age"]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    fields: BTreeMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Value(Value),
    Object(BTreeMap<String, Node>),
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path, creating intermediate objects.
    /// A value already sitting where an object is needed is replaced.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    pub fn insert(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            return;
        };

        let mut fields = &mut self.fields;
        for segment in segments {
            let node = fields
                .entry(segment.to_owned())
                .or_insert_with(|| Node::Object(BTreeMap::new()));
            if let Node::Value(_) = node {
                *node = Node::Object(BTreeMap::new());
            }
            fields = match node {
                Node::Object(children) => children,
                Node::Value(_) => return,
            };
        }
        fields.insert(leaf.to_owned(), Node::Value(value));
    }

    /// Value at a dot-separated path. `None` if the path is missing or ends
    /// at an object.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.lookup(path.split('.'))
    }

    /// Value at a path that is already split, as produced by the expression
    /// parser for `input.map["travelClass"]`.
    #[must_use]
    pub fn get_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        self.lookup(segments.iter().map(AsRef::as_ref))
    }

    /// Whether `key` names a top-level field, value or object.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn lookup<'p>(&self, mut segments: impl Iterator<Item = &'p str>) -> Option<&Value> {
        let mut node = self.fields.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                Node::Object(children) => children.get(segment)?,
                Node::Value(_) => return None,
            };
        }
        match node {
            Node::Value(value) => Some(value),
            Node::Object(_) => None,
        }
    }
}
