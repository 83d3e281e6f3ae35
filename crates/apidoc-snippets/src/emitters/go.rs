use crate::emitters::escape_double;
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

/// `net/http`.
pub struct GoGenerator;

impl SnippetGenerator for GoGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::Go
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let multipart = matches!(request.body, Some(SnippetBody::Multipart(_)));
        let text_body = request.body.as_ref().and_then(|b| b.text());

        let mut imports = Vec::new();
        if multipart {
            imports.push("bytes");
        }
        imports.extend(["fmt", "io"]);
        if multipart {
            imports.push("mime/multipart");
        }
        imports.push("net/http");
        if text_body.is_some() {
            imports.push("strings");
        }

        let mut code = String::from("package main\n\nimport (\n");
        for import in imports {
            code.push_str(&format!("\t\"{import}\"\n"));
        }
        code.push_str(")\n\nfunc main() {\n");

        let payload = if let Some(SnippetBody::Multipart(fields)) = &request.body {
            code.push_str("\tpayload := &bytes.Buffer{}\n");
            code.push_str("\twriter := multipart.NewWriter(payload)\n");
            for (name, value) in fields {
                code.push_str(&format!(
                    "\twriter.WriteField(\"{}\", \"{}\")\n",
                    escape_double(name),
                    escape_double(value)
                ));
            }
            code.push_str("\twriter.Close()\n\n");
            "payload"
        } else if let Some(text) = &text_body {
            code.push_str(&format!("\tpayload := strings.NewReader({})\n\n", go_string(text)));
            "payload"
        } else {
            "nil"
        };

        code.push_str(&format!(
            "\treq, err := http.NewRequest(\"{}\", \"{}\", {payload})\n",
            request.method,
            escape_double(&request.url)
        ));
        code.push_str("\tif err != nil {\n\t\tpanic(err)\n\t}\n");
        for (name, value) in &request.headers {
            code.push_str(&format!(
                "\treq.Header.Set(\"{}\", \"{}\")\n",
                escape_double(name),
                escape_double(value)
            ));
        }
        if multipart {
            code.push_str("\treq.Header.Set(\"Content-Type\", writer.FormDataContentType())\n");
        }
        if let Some(auth) = &request.basic_auth {
            code.push_str(&format!(
                "\treq.SetBasicAuth(\"{}\", \"{}\")\n",
                escape_double(&auth.username),
                escape_double(&auth.password)
            ));
        }

        code.push_str("\n\tresp, err := http.DefaultClient.Do(req)\n");
        code.push_str("\tif err != nil {\n\t\tpanic(err)\n\t}\n");
        code.push_str("\tdefer resp.Body.Close()\n\n");
        code.push_str("\tbody, _ := io.ReadAll(resp.Body)\n");
        code.push_str("\tfmt.Println(resp.StatusCode)\n");
        code.push_str("\tfmt.Println(string(body))\n");
        code.push_str("}\n");
        code
    }
}

/// Raw string literal unless the text itself contains a backtick.
fn go_string(text: &str) -> String {
    if text.contains('`') {
        format!("\"{}\"", escape_double(text))
    } else {
        format!("`{text}`")
    }
}
