use crate::StoreError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Serialize `value` into canonical JSON bytes.
///
/// Object keys are sorted lexicographically at every depth, arrays keep their
/// element order, and output is compact. Two values with the same logical
/// content produce identical bytes regardless of key insertion order.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let tree = serde_json::to_value(value)?;
    let mut writer = CanonicalWriter {
        out: Vec::new(),
        open: OpenNodes::default(),
        path: Vec::new(),
    };
    writer.write_value(&tree)?;
    Ok(writer.out)
}

/// Container nodes currently on the depth-first stack, by address.
#[derive(Default)]
struct OpenNodes {
    nodes: HashSet<*const Value>,
}

impl OpenNodes {
    fn enter(&mut self, node: &Value, path: &[String]) -> Result<(), StoreError> {
        if !self.nodes.insert(std::ptr::from_ref(node)) {
            return Err(StoreError::CircularStructure {
                path: render_path(path),
            });
        }
        Ok(())
    }

    fn exit(&mut self, node: &Value) {
        self.nodes.remove(&std::ptr::from_ref(node));
    }
}

struct CanonicalWriter {
    out: Vec<u8>,
    open: OpenNodes,
    path: Vec<String>,
}

impl CanonicalWriter {
    fn write_value(&mut self, value: &Value) -> Result<(), StoreError> {
        match value {
            Value::Array(items) => {
                self.open.enter(value, &self.path)?;
                self.out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(b',');
                    }
                    self.path.push(format!("[{i}]"));
                    self.write_value(item)?;
                    self.path.pop();
                }
                self.out.push(b']');
                self.open.exit(value);
            }
            Value::Object(map) => {
                self.open.enter(value, &self.path)?;
                // Map iteration order depends on serde_json's `preserve_order`
                // feature, so keys are sorted explicitly.
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                self.out.push(b'{');
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        self.out.push(b',');
                    }
                    serde_json::to_writer(&mut self.out, key)?;
                    self.out.push(b':');
                    self.path.push(format!(".{key}"));
                    self.write_value(&map[key])?;
                    self.path.pop();
                }
                self.out.push(b'}');
                self.open.exit(value);
            }
            primitive => serde_json::to_writer(&mut self.out, primitive)?,
        }
        Ok(())
    }
}

fn render_path(path: &[String]) -> String {
    let mut rendered = String::from("$");
    for segment in path {
        rendered.push_str(segment);
    }
    rendered
}
