//! UnknownFields - variant の struct が知らないフィールドの木
//!
//! decode 時に「受信したサブツリー」と「variant を再 encode した結果」を
//! 比べて、再 encode に現れなかった部分だけを残す。既知のキーの下にある
//! オブジェクトや配列も再帰的に比べるので、ネストした未知フィールドも落ちない。
//!
//! encode 時は variant の出力に書き戻す。同じキーがあれば variant 側が勝つ。
//! 配列は添字で対応付ける（長さが変わっていれば短い方まで）。

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// 1 つのオブジェクトレベルでの未知フィールド
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownFields {
    /// このレベルで丸ごと未知のキー
    fields: Map<String, Value>,
    /// 既知のキーの下にある未知フィールド
    nested: BTreeMap<String, NestedUnknown>,
}

/// 既知のキーが持つ値の中の未知フィールド
#[derive(Debug, Clone, PartialEq)]
pub enum NestedUnknown {
    Object(UnknownFields),
    /// 添字ごと（未知フィールドの無い要素は `None`）
    Array(Vec<Option<NestedUnknown>>),
}

impl UnknownFields {
    /// `received` のうち `reencoded` に現れなかった部分
    pub(crate) fn diff(received: &Map<String, Value>, reencoded: &Map<String, Value>) -> Self {
        let mut out = Self::default();
        for (key, value) in received {
            match reencoded.get(key) {
                None => {
                    out.fields.insert(key.clone(), value.clone());
                }
                Some(known) => {
                    if let Some(nested) = diff_value(value, known) {
                        out.nested.insert(key.clone(), nested);
                    }
                }
            }
        }
        out
    }

    /// `target` に書き戻す（既にあるキーは上書きしない）
    pub(crate) fn merge_into(&self, target: &mut Map<String, Value>) {
        for (key, value) in &self.fields {
            if !target.contains_key(key) {
                target.insert(key.clone(), value.clone());
            }
        }
        for (key, nested) in &self.nested {
            if let Some(value) = target.get_mut(key) {
                nested.merge_into(value);
            }
        }
    }

    pub(crate) fn forget(&mut self, key: &str) {
        self.fields.shift_remove(key);
    }

    /// このレベルで丸ごと未知のキー
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn nested(&self, key: &str) -> Option<&NestedUnknown> {
        self.nested.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.nested.is_empty()
    }

    /// 未知フィールドのパス（`inputs[0].futureFlag` の形）
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for key in self.fields.keys() {
            out.push(join(prefix, key));
        }
        for (key, nested) in &self.nested {
            nested.collect_paths(&join(prefix, key), out);
        }
    }
}

impl NestedUnknown {
    fn merge_into(&self, target: &mut Value) {
        match (self, target) {
            (NestedUnknown::Object(unknown), Value::Object(map)) => unknown.merge_into(map),
            (NestedUnknown::Array(items), Value::Array(values)) => {
                for (item, value) in items.iter().zip(values.iter_mut()) {
                    if let Some(item) = item {
                        item.merge_into(value);
                    }
                }
            }
            // 形が変わっていたら書き戻さない
            _ => {}
        }
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            NestedUnknown::Object(unknown) => unknown.collect_paths(prefix, out),
            NestedUnknown::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if let Some(item) = item {
                        item.collect_paths(&format!("{prefix}[{i}]"), out);
                    }
                }
            }
        }
    }
}

fn diff_value(received: &Value, reencoded: &Value) -> Option<NestedUnknown> {
    match (received, reencoded) {
        (Value::Object(received), Value::Object(reencoded)) => {
            let unknown = UnknownFields::diff(received, reencoded);
            (!unknown.is_empty()).then_some(NestedUnknown::Object(unknown))
        }
        (Value::Array(received), Value::Array(reencoded)) if received.len() == reencoded.len() => {
            let items: Vec<Option<NestedUnknown>> = received
                .iter()
                .zip(reencoded)
                .map(|(r, e)| diff_value(r, e))
                .collect();
            items.iter().any(Option::is_some).then_some(NestedUnknown::Array(items))
        }
        _ => None,
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
