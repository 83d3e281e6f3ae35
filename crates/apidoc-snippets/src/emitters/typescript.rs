use heck::ToLowerCamelCase;

use crate::emitters::javascript::{fetch_call, form_data};
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::SnippetRequest;

/// Typed async function around `fetch`, named after the operation.
pub struct TypeScriptGenerator;

impl SnippetGenerator for TypeScriptGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::TypeScript
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let name = request.endpoint.id.to_lower_camel_case();
        let (result, read) = if request.expects_json() {
            ("unknown", "response.json()")
        } else {
            ("string", "response.text()")
        };

        let mut code = format!("async function {name}(): Promise<{result}> {{\n");
        code.push_str(&form_data(request, "  "));
        code.push_str(&format!(
            "  const response: Response = await {};\n",
            fetch_call(request, "  ")
        ));
        code.push_str("  if (!response.ok) {\n");
        code.push_str("    throw new Error(`Request failed with status ${response.status}`);\n");
        code.push_str("  }\n");
        code.push_str(&format!("  return {read};\n"));
        code.push_str("}\n\n");
        code.push_str(&format!("{name}().then(console.log);\n"));
        code
    }
}
