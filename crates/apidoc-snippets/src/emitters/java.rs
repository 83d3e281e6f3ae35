use heck::ToUpperCamelCase;

use crate::emitters::escape_double;
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

const BOUNDARY: &str = "apidoc-boundary";

/// `java.net.http.HttpClient` (Java 11+).
pub struct JavaGenerator;

impl SnippetGenerator for JavaGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::Java
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let class = format!("{}Example", request.endpoint.id.to_upper_camel_case());

        let mut code = String::from("import java.net.URI;\n");
        code.push_str("import java.net.http.HttpClient;\n");
        code.push_str("import java.net.http.HttpRequest;\n");
        code.push_str("import java.net.http.HttpResponse;\n");
        if request.basic_auth.is_some() {
            code.push_str("import java.util.Base64;\n");
        }
        code.push('\n');

        code.push_str(&format!("public class {class} {{\n"));
        code.push_str("    public static void main(String[] args) throws Exception {\n");
        code.push_str("        HttpClient client = HttpClient.newHttpClient();\n\n");

        let publisher = match &request.body {
            Some(SnippetBody::Multipart(fields)) => {
                code.push_str(&multipart_body(fields));
                "HttpRequest.BodyPublishers.ofString(body)".to_string()
            }
            Some(body) => format!(
                "HttpRequest.BodyPublishers.ofString(\"{}\")",
                escape_double(&body.text().unwrap_or_default())
            ),
            None => "HttpRequest.BodyPublishers.noBody()".to_string(),
        };

        code.push_str("        HttpRequest request = HttpRequest.newBuilder()\n");
        code.push_str(&format!(
            "            .uri(URI.create(\"{}\"))\n",
            escape_double(&request.url)
        ));
        for (name, value) in &request.headers {
            code.push_str(&format!(
                "            .header(\"{}\", \"{}\")\n",
                escape_double(name),
                escape_double(value)
            ));
        }
        if matches!(request.body, Some(SnippetBody::Multipart(_))) {
            code.push_str(&format!(
                "            .header(\"Content-Type\", \"multipart/form-data; boundary={BOUNDARY}\")\n"
            ));
        }
        if let Some(auth) = &request.basic_auth {
            code.push_str(&format!(
                "            .header(\"Authorization\", \"Basic \" + Base64.getEncoder().encodeToString(\"{}:{}\".getBytes()))\n",
                escape_double(&auth.username),
                escape_double(&auth.password)
            ));
        }
        code.push_str(&format!(
            "            .method(\"{}\", {publisher})\n",
            request.method
        ));
        code.push_str("            .build();\n\n");

        code.push_str("        HttpResponse<String> response = client.send(request, HttpResponse.BodyHandlers.ofString());\n");
        code.push_str("        System.out.println(response.statusCode());\n");
        code.push_str("        System.out.println(response.body());\n");
        code.push_str("    }\n");
        code.push_str("}\n");
        code
    }
}

/// A `String body = ...;` statement holding a hand-built multipart payload.
fn multipart_body(fields: &[(String, String)]) -> String {
    let mut code = String::from("        String body = \"\"\n");
    for (name, value) in fields {
        code.push_str(&format!("            + \"--{BOUNDARY}\\r\\n\"\n"));
        code.push_str(&format!(
            "            + \"Content-Disposition: form-data; name=\\\"{}\\\"\\r\\n\\r\\n\"\n",
            escape_double(name)
        ));
        code.push_str(&format!("            + \"{}\\r\\n\"\n", escape_double(value)));
    }
    code.push_str(&format!("            + \"--{BOUNDARY}--\\r\\n\";\n\n"));
    code
}
