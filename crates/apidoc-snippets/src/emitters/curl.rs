use crate::emitters::escape_double;
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

pub struct CurlGenerator;

impl SnippetGenerator for CurlGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::Curl
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let mut parts = vec![format!(
            "curl -X {} \"{}\"",
            request.method,
            escape_double(&request.url)
        )];

        for (name, value) in &request.headers {
            parts.push(format!(
                "-H \"{}: {}\"",
                escape_double(name),
                escape_double(value)
            ));
        }
        if let Some(auth) = &request.basic_auth {
            parts.push(format!(
                "-u \"{}:{}\"",
                escape_double(&auth.username),
                escape_double(&auth.password)
            ));
        }

        match &request.body {
            Some(SnippetBody::Multipart(fields)) => {
                for (name, value) in fields {
                    parts.push(format!("-F \"{}={}\"", escape_double(name), escape_double(value)));
                }
            }
            Some(body) => {
                if let Some(text) = body.text() {
                    parts.push(format!("-d '{}'", shell_quote(&text)));
                }
            }
            None => {}
        }

        let mut code = parts.join(" \\\n  ");
        code.push('\n');
        code
    }
}

/// Close the single-quoted string, emit an escaped quote, reopen.
fn shell_quote(s: &str) -> String {
    s.replace('\'', "'\\''")
}
