use heck::ToLowerCamelCase;

use crate::emitters::{escape_double, indent_tail};
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

/// `axios` on Node.js.
pub struct NodeGenerator;

impl SnippetGenerator for NodeGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::Node
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let name = request.endpoint.id.to_lower_camel_case();
        let mut code = String::from("const axios = require(\"axios\");\n\n");
        code.push_str(&format!("async function {name}() {{\n"));

        if let Some(SnippetBody::Multipart(fields)) = &request.body {
            code.push_str("  const form = new FormData();\n");
            for (field, value) in fields {
                code.push_str(&format!(
                    "  form.append(\"{}\", \"{}\");\n",
                    escape_double(field),
                    escape_double(value)
                ));
            }
            code.push('\n');
        }

        let mut entries = vec![
            format!("    method: \"{}\"", request.method.as_lower()),
            format!("    url: \"{}\"", escape_double(&request.url)),
        ];
        if !request.headers.is_empty() {
            let lines: Vec<String> = request
                .headers
                .iter()
                .map(|(k, v)| format!("      \"{}\": \"{}\"", escape_double(k), escape_double(v)))
                .collect();
            entries.push(format!("    headers: {{\n{}\n    }}", lines.join(",\n")));
        }
        if let Some(auth) = &request.basic_auth {
            entries.push(format!(
                "    auth: {{ username: \"{}\", password: \"{}\" }}",
                escape_double(&auth.username),
                escape_double(&auth.password)
            ));
        }
        if let Some(body) = &request.body {
            let data = match body {
                SnippetBody::Json(_) => indent_tail(&body.text().unwrap_or_default(), "    "),
                SnippetBody::Multipart(_) => "form".to_string(),
                SnippetBody::Form(_) | SnippetBody::Text(_) => {
                    format!("\"{}\"", escape_double(&body.text().unwrap_or_default()))
                }
            };
            entries.push(format!("    data: {data}"));
        }

        code.push_str(&format!(
            "  const response = await axios({{\n{}\n  }});\n",
            entries.join(",\n")
        ));
        code.push_str("  return response.data;\n");
        code.push_str("}\n\n");
        code.push_str(&format!("{name}().then(console.log).catch(console.error);\n"));
        code
    }
}
