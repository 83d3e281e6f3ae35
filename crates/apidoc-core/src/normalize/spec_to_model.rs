use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{NormalizeError, ResolveError};
use crate::model::*;
use crate::parse::media_type::MediaType;
use crate::parse::operation::Operation;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Header, Response, ResponseOrRef};
use crate::parse::security::SecurityRequirement;
use crate::parse::spec::OpenApiSpec;

use super::endpoint_id::endpoint_id;
use super::schema_normalizer::SchemaNormalizer;

/// Builds a [`ParsedApiSpec`] from a typed document and the raw value its
/// references point into.
pub struct SpecNormalizer<'a> {
    spec: &'a OpenApiSpec,
    resolver: RefResolver<'a>,
    schemas: SchemaNormalizer<'a>,
}

impl<'a> SpecNormalizer<'a> {
    pub fn new(spec: &'a OpenApiSpec, root: &'a Value) -> Self {
        let resolver = RefResolver::new(root);
        Self {
            spec,
            resolver,
            schemas: SchemaNormalizer::new(resolver),
        }
    }

    pub fn run(mut self) -> Result<ParsedApiSpec, NormalizeError> {
        // Phase 1: endpoints, in path order then fixed method order
        let endpoints = self.normalize_endpoints()?;

        // Phase 2: component schemas
        let schemas = self.normalize_component_schemas()?;

        // Phase 3: metadata
        let spec = self.spec;
        let info = ApiInfo {
            title: spec.info.title.clone(),
            version: spec.info.version.clone(),
            summary: spec.info.summary.clone(),
            description: spec.info.description.clone(),
            terms_of_service: spec.info.terms_of_service.clone(),
            contact: spec.info.contact.clone(),
            license: spec.info.license.clone(),
        };

        let servers = spec
            .servers
            .iter()
            .map(|s| ApiServer {
                url: s.resolved_url(),
                template: (!s.variables.is_empty()).then(|| s.url.clone()),
                description: s.description.clone(),
            })
            .collect();

        let tags = spec
            .tags
            .iter()
            .map(|t| ApiTag {
                name: t.name.clone(),
                description: t.description.clone(),
                external_docs: t.external_docs.clone(),
            })
            .collect();

        let security_schemes = spec
            .components
            .as_ref()
            .map(|c| c.security_schemes.clone())
            .unwrap_or_default();

        debug!(
            "normalized '{}': {} endpoints, {} schemas",
            info.title,
            endpoints.len(),
            schemas.len()
        );

        Ok(ParsedApiSpec {
            openapi: spec.openapi.clone(),
            info,
            servers,
            endpoints,
            schemas,
            tags,
            security_schemes,
            security: spec.security.clone().unwrap_or_default(),
            external_docs: spec.external_docs.clone(),
        })
    }

    fn normalize_endpoints(&mut self) -> Result<Vec<NormalizedEndpoint>, NormalizeError> {
        let spec = self.spec;
        let mut endpoints = Vec::with_capacity(spec.operation_count());
        let mut seen_ids: HashMap<String, String> = HashMap::new();

        for (path, item) in &spec.paths {
            let shared_params = self.resolve_parameters(&item.parameters)?;
            for (method, op) in item.operations() {
                let endpoint = self.build_endpoint(method, path, op, &shared_params)?;
                if let Some(first) = seen_ids.insert(endpoint.id.clone(), endpoint.label()) {
                    return Err(NormalizeError::DuplicateOperationId {
                        id: endpoint.id,
                        first,
                        second: format!("{method} {path}"),
                    });
                }
                endpoints.push(endpoint);
            }
        }

        Ok(endpoints)
    }

    fn build_endpoint(
        &mut self,
        method: HttpMethod,
        path: &str,
        op: &Operation,
        shared_params: &[Parameter],
    ) -> Result<NormalizedEndpoint, NormalizeError> {
        let own_params = self.resolve_parameters(&op.parameters)?;
        let parameters = merge_parameters(shared_params, own_params)
            .into_iter()
            .map(|p| self.normalize_parameter(p))
            .collect::<Result<Vec<_>, _>>()?;

        let request_body = match &op.request_body {
            Some(body) => Some(self.normalize_request_body(body)?),
            None => None,
        };

        let mut responses = Vec::with_capacity(op.responses.len());
        for (status, resp) in &op.responses {
            responses.push(self.normalize_response(status, resp)?);
        }

        let security: Vec<SecurityRequirement> = op
            .security
            .clone()
            .or_else(|| self.spec.security.clone())
            .unwrap_or_default();

        Ok(NormalizedEndpoint {
            id: endpoint_id(op.operation_id.as_deref(), method, path),
            operation_id: op.operation_id.clone(),
            method,
            path: path.to_string(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            deprecated: op.deprecated.unwrap_or(false),
            parameters,
            request_body,
            responses,
            security,
        })
    }

    fn resolve_parameters(
        &self,
        params: &[ParameterOrRef],
    ) -> Result<Vec<Parameter>, ResolveError> {
        params
            .iter()
            .map(|p| match p {
                ParameterOrRef::Parameter(param) => Ok(param.clone()),
                ParameterOrRef::Ref { ref_path } => self.resolver.resolve(ref_path),
            })
            .collect()
    }

    fn normalize_parameter(
        &mut self,
        param: Parameter,
    ) -> Result<NormalizedParameter, ResolveError> {
        let schema = match &param.schema {
            Some(s) => Some(self.schemas.normalize(s)?),
            None => None,
        };
        let example = match &param.example {
            Some(example) => Some(example.clone()),
            None => first_example_value(&self.resolver, &param.examples)?,
        };

        Ok(NormalizedParameter {
            // Path parameters are always required, whatever the document says.
            required: param.required || param.location == ParameterLocation::Path,
            deprecated: param.deprecated.unwrap_or(false),
            name: param.name,
            location: param.location,
            description: param.description,
            schema,
            example,
            style: param.style,
            explode: param.explode,
        })
    }

    fn normalize_request_body(
        &mut self,
        body: &RequestBodyOrRef,
    ) -> Result<NormalizedRequestBody, ResolveError> {
        let body = match body {
            RequestBodyOrRef::RequestBody(rb) => rb.clone(),
            RequestBodyOrRef::Ref { ref_path } => self.resolver.resolve::<RequestBody>(ref_path)?,
        };
        Ok(NormalizedRequestBody {
            description: body.description,
            required: body.required,
            content: self.normalize_content(&body.content)?,
        })
    }

    fn normalize_response(
        &mut self,
        status: &str,
        resp: &ResponseOrRef,
    ) -> Result<NormalizedResponse, ResolveError> {
        let resp = match resp {
            ResponseOrRef::Response(r) => r.clone(),
            ResponseOrRef::Ref { ref_path } => self.resolver.resolve::<Response>(ref_path)?,
        };

        let mut headers = Vec::with_capacity(resp.headers.len());
        for (name, raw) in &resp.headers {
            let node = self.resolver.resolve_value(raw)?;
            let header = Header::deserialize(node).map_err(|source| ResolveError::InvalidTarget {
                ref_path: format!("response header {name}"),
                source,
            })?;
            let schema = match &header.schema {
                Some(s) => Some(self.schemas.normalize(s)?),
                None => None,
            };
            headers.push(NormalizedHeader {
                name: name.clone(),
                description: header.description,
                required: header.required,
                schema,
            });
        }

        Ok(NormalizedResponse {
            status_code: status.to_string(),
            description: resp.description,
            content: self.normalize_content(&resp.content)?,
            headers,
        })
    }

    /// Flatten a `content` map into a list, keeping declaration order.
    fn normalize_content(
        &mut self,
        content: &IndexMap<String, MediaType>,
    ) -> Result<Vec<NormalizedMediaType>, ResolveError> {
        let mut out = Vec::with_capacity(content.len());
        for (media_type, mt) in content {
            let schema = match &mt.schema {
                Some(s) => Some(self.schemas.normalize(s)?),
                None => None,
            };
            let mut examples = IndexMap::with_capacity(mt.examples.len());
            for (name, example) in &mt.examples {
                examples.insert(name.clone(), self.resolver.resolve_value(example)?.clone());
            }
            out.push(NormalizedMediaType {
                media_type: media_type.clone(),
                schema,
                example: mt.example.clone(),
                examples,
                encoding: mt.encoding.keys().cloned().collect(),
            });
        }
        Ok(out)
    }

    fn normalize_component_schemas(
        &mut self,
    ) -> Result<IndexMap<String, NormalizedSchema>, ResolveError> {
        let spec = self.spec;
        let mut schemas = IndexMap::new();
        if let Some(components) = &spec.components {
            for (name, schema) in &components.schemas {
                let normalized = self.schemas.normalize_component(name, schema)?;
                schemas.insert(name.clone(), normalized);
            }
        }
        Ok(schemas)
    }
}

/// Path-level parameters first, then the operation's own. An operation parameter
/// with the same name and location replaces the shared one in place.
fn merge_parameters(shared: &[Parameter], own: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged = shared.to_vec();
    for param in own {
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(slot) => *slot = param,
            None => merged.push(param),
        }
    }
    merged
}

/// `value` of the first entry of an `examples` map, dereferencing example refs.
fn first_example_value(
    resolver: &RefResolver<'_>,
    examples: &IndexMap<String, Value>,
) -> Result<Option<Value>, ResolveError> {
    let Some((_, example)) = examples.first() else {
        return Ok(None);
    };
    let example = resolver.resolve_value(example)?;
    Ok(example.get("value").cloned())
}
