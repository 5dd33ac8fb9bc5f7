use indexmap::IndexMap;

/// Ordered mapping used for element children and attributes.
pub type Map = IndexMap<String, Value>;

/// A node of the document tree.
///
/// Parsed xml is represented as nested maps and lists with strings at the leaves:
///
/// ```text
/// <urlset xmlns="...">              {"urlset": {
///     <url>                             "$": {"xmlns": "..."},
///         <loc>https://a/</loc>         "url": [{"loc": ["https://a/"]}]
///     </url>                        }}
/// </urlset>
/// ```
///
/// Each parent exclusively owns its children, so a tree never has shared or cyclic nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Map(Map),
    List(Vec<Value>),
}

impl Value {
    /// Creates an empty mapping node.
    pub fn map() -> Value {
        Value::Map(Map::new())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Get the value of `key` if this is a mapping node.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Returns true if `key` appears in any mapping node of the tree, at any depth.
    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            Value::Text(_) => false,
            Value::Map(map) => {
                map.contains_key(key) || map.values().any(|child| child.contains_key(key))
            }
            Value::List(list) => list.iter().any(|child| child.contains_key(key)),
        }
    }

    /// Iterate over every string leaf, depth first, in document order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }
}

/// Iterator returned by [`Value::leaves`].
pub struct Leaves<'a> {
    stack: Vec<&'a Value>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(value) = self.stack.pop() {
            match value {
                Value::Text(text) => return Some(text),
                Value::Map(map) => self.stack.extend(map.values().rev()),
                Value::List(list) => self.stack.extend(list.iter().rev()),
            }
        }
        None
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Value {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Value {
        Value::Text(text)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Value {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Value {
        Value::List(list)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Value {
    fn from(entries: [(K, V); N]) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
