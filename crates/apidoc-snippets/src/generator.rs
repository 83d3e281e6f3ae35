use crate::emitters::curl::CurlGenerator;
use crate::emitters::go::GoGenerator;
use crate::emitters::java::JavaGenerator;
use crate::emitters::javascript::JavaScriptGenerator;
use crate::emitters::node::NodeGenerator;
use crate::emitters::php::PhpGenerator;
use crate::emitters::python::PythonGenerator;
use crate::emitters::typescript::TypeScriptGenerator;
use crate::language::SnippetLanguage;
use crate::request::SnippetRequest;

/// Renders a prepared request as source code in one language.
pub trait SnippetGenerator {
    fn language(&self) -> SnippetLanguage;

    fn render(&self, request: &SnippetRequest<'_>) -> String;
}

/// The generator for `language`.
pub fn generator_for(language: SnippetLanguage) -> &'static dyn SnippetGenerator {
    match language {
        SnippetLanguage::Curl => &CurlGenerator,
        SnippetLanguage::JavaScript => &JavaScriptGenerator,
        SnippetLanguage::TypeScript => &TypeScriptGenerator,
        SnippetLanguage::Python => &PythonGenerator,
        SnippetLanguage::Node => &NodeGenerator,
        SnippetLanguage::Php => &PhpGenerator,
        SnippetLanguage::Java => &JavaGenerator,
        SnippetLanguage::Go => &GoGenerator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_its_generator() {
        for language in SnippetLanguage::ALL {
            assert_eq!(generator_for(language).language(), language);
        }
    }
}
