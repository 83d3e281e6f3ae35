use crate::emitters::escape_single;
use crate::generator::SnippetGenerator;
use crate::language::SnippetLanguage;
use crate::request::{SnippetBody, SnippetRequest};

/// PHP's cURL extension.
pub struct PhpGenerator;

impl SnippetGenerator for PhpGenerator {
    fn language(&self) -> SnippetLanguage {
        SnippetLanguage::Php
    }

    fn render(&self, request: &SnippetRequest<'_>) -> String {
        let mut code = String::from("<?php\n\n$curl = curl_init();\n\n");
        code.push_str("curl_setopt_array($curl, [\n");
        code.push_str(&format!("    CURLOPT_URL => '{}',\n", escape_single(&request.url)));
        code.push_str("    CURLOPT_RETURNTRANSFER => true,\n");
        code.push_str(&format!("    CURLOPT_CUSTOMREQUEST => '{}',\n", request.method));

        if !request.headers.is_empty() {
            code.push_str("    CURLOPT_HTTPHEADER => [\n");
            for (name, value) in &request.headers {
                code.push_str(&format!(
                    "        '{}: {}',\n",
                    escape_single(name),
                    escape_single(value)
                ));
            }
            code.push_str("    ],\n");
        }
        if let Some(auth) = &request.basic_auth {
            code.push_str(&format!(
                "    CURLOPT_USERPWD => '{}:{}',\n",
                escape_single(&auth.username),
                escape_single(&auth.password)
            ));
        }

        match &request.body {
            // an array makes cURL send multipart/form-data
            Some(SnippetBody::Multipart(fields)) => {
                code.push_str("    CURLOPT_POSTFIELDS => [\n");
                for (name, value) in fields {
                    code.push_str(&format!(
                        "        '{}' => '{}',\n",
                        escape_single(name),
                        escape_single(value)
                    ));
                }
                code.push_str("    ],\n");
            }
            Some(body) => {
                if let Some(text) = body.text() {
                    code.push_str(&format!("    CURLOPT_POSTFIELDS => '{}',\n", escape_single(&text)));
                }
            }
            None => {}
        }
        code.push_str("]);\n\n");

        code.push_str("$response = curl_exec($curl);\n");
        code.push_str("$status = curl_getinfo($curl, CURLINFO_HTTP_CODE);\n");
        code.push_str("curl_close($curl);\n\n");
        code.push_str("echo \"Status: $status\\n\";\n");
        code.push_str("echo $response;\n");
        code
    }
}
