// src/core/collection.rs

//! Typed view of a Postman v2.1 collection document.
//!
//! Only the parts the synchronizer touches are modelled: names, nested items,
//! events with their script source, and raw request bodies. Every other field is
//! kept in an `extra` map so a read/write round trip leaves unknown data intact.
//!
//! Typed fields are declared in the order Postman exports them, and absent lists
//! stay absent. The request object is kept whole in a map so `body` does not move
//! relative to `method`, `header` and `url`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Collection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<Event>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Info {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node of the collection tree. Folders have an `item` array; everything else
/// is treated as a request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Item {
    Folder(Folder),
    Request(Request),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Folder {
    #[serde(default)]
    pub name: String,
    pub item: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<Event>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Request {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `request` is either a full object or a bare URL string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RequestField {
    Detailed(RequestDetail),
    Url(Value),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RequestDetail {
    /// The `body` object, if present and well-formed.
    pub fn body(&self) -> Option<Body> {
        let value = self.fields.get("body")?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Replaces `body` in place, or appends it when the request had none.
    pub fn set_body(&mut self, body: &Body) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(body)?;
        self.fields.insert("body".to_string(), value);
        Ok(())
    }
}

impl Body {
    /// A body Newman sends verbatim, i.e. `mode` is `raw` or absent.
    pub fn is_raw(&self) -> bool {
        matches!(self.mode.as_deref(), None | Some("raw"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Body {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Event {
    #[serde(default)]
    pub listen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ScriptSource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Script source is stored as an array of lines, though a single string is accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ScriptSource {
    Lines(Vec<String>),
    Text(String),
}

impl ScriptSource {
    /// The source as one newline-joined string.
    pub fn joined(&self) -> String {
        match self {
            Self::Lines(lines) => lines.join("\n"),
            Self::Text(text) => text.clone(),
        }
    }
}

impl Collection {
    pub fn items(&self) -> &[Item] {
        self.item.as_deref().unwrap_or_default()
    }

    pub fn items_mut(&mut self) -> &mut [Item] {
        self.item.as_deref_mut().unwrap_or_default()
    }

    /// Collection-level events.
    pub fn events(&self) -> &[Event] {
        self.event.as_deref().unwrap_or_default()
    }

    pub fn events_mut(&mut self) -> &mut [Event] {
        self.event.as_deref_mut().unwrap_or_default()
    }
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.name,
            Self::Request(request) => &request.name,
        }
    }

    pub fn events(&self) -> &[Event] {
        let events = match self {
            Self::Folder(folder) => &folder.event,
            Self::Request(request) => &request.event,
        };
        events.as_deref().unwrap_or_default()
    }

    pub fn events_mut(&mut self) -> &mut [Event] {
        let events = match self {
            Self::Folder(folder) => &mut folder.event,
            Self::Request(request) => &mut request.event,
        };
        events.as_deref_mut().unwrap_or_default()
    }
}

impl Request {
    /// The raw body when it is declared as one, i.e. `mode` is `raw` or absent.
    pub fn raw_body(&self) -> Option<String> {
        let Some(RequestField::Detailed(detail)) = &self.request else {
            return None;
        };
        let body = detail.body()?;
        if body.is_raw() { body.raw } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "info": {"name": "Users", "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"},
            "item": [
                {
                    "name": "Admin",
                    "item": [
                        {"name": "Create User", "request": {"method": "POST", "body": {"mode": "raw", "raw": "{\"a\":1}"}}}
                    ]
                },
                {"name": "Ping", "request": "https://example.com/ping"},
                {"name": "Upload", "request": {"method": "POST", "body": {"mode": "formdata", "formdata": []}}}
            ],
            "event": [{"listen": "prerequest", "script": {"exec": ["console.log(1);"], "type": "text/javascript"}}],
            "variable": [{"key": "base", "value": "x"}]
        })
    }

    #[test]
    fn test_tree_shape_is_recognised() {
        let collection: Collection = serde_json::from_value(sample()).unwrap();
        assert_eq!(collection.info.as_ref().and_then(|i| i.name.as_deref()), Some("Users"));
        assert_eq!(collection.events().len(), 1);

        let Some(Item::Folder(admin)) = collection.items().first() else {
            panic!("expected a folder first");
        };
        assert_eq!(admin.name, "Admin");
        let Some(Item::Request(create)) = admin.item.first() else {
            panic!("expected a request inside the folder");
        };
        assert_eq!(create.raw_body().as_deref(), Some("{\"a\":1}"));

        let Some(Item::Request(ping)) = collection.items().get(1) else {
            panic!("expected a request");
        };
        assert!(matches!(ping.request, Some(RequestField::Url(_))));
        assert_eq!(ping.raw_body(), None);

        let Some(Item::Request(upload)) = collection.items().get(2) else {
            panic!("expected a request");
        };
        assert_eq!(upload.raw_body(), None);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let original = sample();
        let collection: Collection = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&collection).unwrap(), original);
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_round_trip_keeps_key_order_and_empty_lists() {
        let original = json!({
            "info": {"name": "Orders"},
            "item": [
                {
                    "name": "Create",
                    "event": [],
                    "request": {"method": "POST", "header": [], "body": {"mode": "raw", "raw": "{}"}, "url": "{{base}}/orders"},
                    "response": []
                }
            ],
            "variable": []
        });
        let collection: Collection = serde_json::from_value(original.clone()).unwrap();
        let written = serde_json::to_value(&collection).unwrap();

        assert_eq!(keys(&written), vec!["info", "item", "variable"]);
        assert_eq!(keys(&written["item"][0]), vec!["name", "event", "request", "response"]);
        assert_eq!(keys(&written["item"][0]["request"]), vec!["method", "header", "body", "url"]);
        assert_eq!(written["item"][0]["event"], json!([]));

        let empty: Collection = serde_json::from_value(json!({"info": {"name": "Empty"}})).unwrap();
        assert!(empty.items().is_empty());
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"info": {"name": "Empty"}}));
    }

    #[test]
    fn test_set_body_keeps_position() {
        let mut detail: RequestDetail =
            serde_json::from_value(json!({"method": "PUT", "body": {"mode": "raw", "raw": "1"}, "url": "x"})).unwrap();
        let mut body = detail.body().unwrap();
        body.raw = Some("2".to_string());
        detail.set_body(&body).unwrap();
        assert_eq!(detail.fields.keys().map(String::as_str).collect::<Vec<_>>(), vec!["method", "body", "url"]);
        assert_eq!(detail.fields["body"]["raw"], "2");
    }

    #[test]
    fn test_script_source_accepts_text() {
        let event: Event =
            serde_json::from_value(json!({"listen": "test", "script": {"exec": "a\nb"}})).unwrap();
        let source = event.script.and_then(|s| s.exec).unwrap();
        assert_eq!(source, ScriptSource::Text("a\nb".to_string()));
        assert_eq!(source.joined(), "a\nb");
        assert_eq!(ScriptSource::Lines(vec!["a".into(), "b".into()]).joined(), "a\nb");
    }
}
