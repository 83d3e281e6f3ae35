use apidoc_core::model::HttpMethod;
use serde_json::Value;

use crate::emitters::escape_double;
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

/// `requests`.
pub struct PythonGenerator;

impl SnippetGenerator for PythonGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::Python
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let mut code = String::from("import requests\n\n");
        code.push_str(&format!("url = \"{}\"\n", escape_double(&request.url)));

        let mut args = vec!["url".to_string()];

        if !request.headers.is_empty() {
            code.push_str("headers = {\n");
            for (name, value) in &request.headers {
                code.push_str(&format!(
                    "    \"{}\": \"{}\",\n",
                    escape_double(name),
                    escape_double(value)
                ));
            }
            code.push_str("}\n");
            args.push("headers=headers".to_string());
        }

        match &request.body {
            Some(SnippetBody::Json(value)) => {
                code.push_str(&format!("payload = {}\n", python_literal(value, 0)));
                args.push("json=payload".to_string());
            }
            Some(SnippetBody::Form(fields)) => {
                code.push_str(&format!("data = {}\n", tuple_list(fields, quoted)));
                args.push("data=data".to_string());
            }
            Some(SnippetBody::Multipart(fields)) => {
                code.push_str(&format!(
                    "files = {}\n",
                    tuple_list(fields, |v| format!("(None, {})", quoted(v)))
                ));
                args.push("files=files".to_string());
            }
            Some(SnippetBody::Text(text)) => {
                code.push_str(&format!("data = {}\n", quoted(text)));
                args.push("data=data".to_string());
            }
            None => {}
        }

        if let Some(auth) = &request.basic_auth {
            args.push(format!(
                "auth=({}, {})",
                quoted(&auth.username),
                quoted(&auth.password)
            ));
        }

        let call = match request.method {
            HttpMethod::Trace => format!("requests.request(\"TRACE\", {})", args.join(", ")),
            method => format!("requests.{}({})", method.as_lower(), args.join(", ")),
        };
        code.push_str(&format!("\nresponse = {call}\n"));
        code.push_str("print(response.status_code)\n");
        if request.expects_json() {
            code.push_str("print(response.json())\n");
        } else {
            code.push_str("print(response.text)\n");
        }
        code
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_double(s))
}

fn tuple_list(fields: &[(String, String)], value: impl Fn(&str) -> String) -> String {
    let items: Vec<String> = fields
        .iter()
        .map(|(name, v)| format!("    ({}, {}),\n", quoted(name), value(v)))
        .collect();
    format!("[\n{}]", items.concat())
}

/// Python literal for a JSON value, four-space indented.
fn python_literal(value: &Value, depth: usize) -> String {
    let pad = "    ".repeat(depth + 1);
    let close = "    ".repeat(depth);
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quoted(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("{pad}{}", python_literal(item, depth + 1)))
                .collect();
            format!("[\n{}\n{close}]", lines.join(",\n"))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let lines: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{pad}{}: {}", quoted(k), python_literal(v, depth + 1)))
                .collect();
            format!("{{\n{}\n{close}}}", lines.join(",\n"))
        }
    }
}
