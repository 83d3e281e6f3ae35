use crate::emitters::{escape_double, indent_tail};
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

/// Browser `fetch`.
pub struct JavaScriptGenerator;

impl SnippetGenerator for JavaScriptGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::JavaScript
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let mut code = form_data(request, "");
        code.push_str(&format!(
            "const response = await {};\n\n",
            fetch_call(request, "")
        ));
        if request.expects_json() {
            code.push_str("const data = await response.json();\n");
        } else {
            code.push_str("const data = await response.text();\n");
        }
        code.push_str("console.log(response.status, data);\n");
        code
    }
}

/// `const formData = ...` statements for multipart bodies, else nothing.
pub(crate) fn form_data(request: &SnippetRequest<'_>, pad: &str) -> String {
    let Some(SnippetBody::Multipart(fields)) = &request.body else {
        return String::new();
    };
    let mut code = format!("{pad}const formData = new FormData();\n");
    for (name, value) in fields {
        code.push_str(&format!(
            "{pad}formData.append(\"{}\", \"{}\");\n",
            escape_double(name),
            escape_double(value)
        ));
    }
    code.push('\n');
    code
}

/// A `fetch(url, init)` expression whose continuation lines start at `pad`.
pub(crate) fn fetch_call(request: &SnippetRequest<'_>, pad: &str) -> String {
    let inner = format!("{pad}  ");
    let mut entries = vec![format!("{inner}method: \"{}\"", request.method)];

    let mut headers: Vec<String> = request
        .headers
        .iter()
        .map(|(name, value)| format!("\"{}\": \"{}\"", escape_double(name), escape_double(value)))
        .collect();
    if let Some(auth) = &request.basic_auth {
        headers.push(format!(
            "\"Authorization\": \"Basic \" + btoa(\"{}:{}\")",
            escape_double(&auth.username),
            escape_double(&auth.password)
        ));
    }
    if !headers.is_empty() {
        let lines: Vec<String> = headers.iter().map(|h| format!("{inner}  {h}")).collect();
        entries.push(format!("{inner}headers: {{\n{}\n{inner}}}", lines.join(",\n")));
    }

    if let Some(body) = &request.body {
        let expr = match body {
            SnippetBody::Json(_) => format!(
                "JSON.stringify({})",
                indent_tail(&body.text().unwrap_or_default(), &inner)
            ),
            SnippetBody::Multipart(_) => "formData".to_string(),
            SnippetBody::Form(_) | SnippetBody::Text(_) => {
                format!("\"{}\"", escape_double(&body.text().unwrap_or_default()))
            }
        };
        entries.push(format!("{inner}body: {expr}"));
    }

    format!(
        "fetch(\"{}\", {{\n{}\n{pad}}})",
        escape_double(&request.url),
        entries.join(",\n")
    )
}
