//! Built-in renderer for plain text report definitions
//!
//! A definition lists `parameters` and `docElements`. Text elements are
//! rendered one per line with `${name}` placeholders replaced by the value
//! from the data, or from the parameter's `testData` for sample renders.

use crate::error::{ConstructionError, GenerationError};
use crate::renderer::{Renderer, Report};
use crate::types::ReportError;
use crate::{pdf, xlsx};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for SimpleRenderer {
    fn new_report(
        &self,
        definition: &Value,
        data: &Value,
        is_sample: bool,
    ) -> Result<Box<dyn Report>, ConstructionError> {
        Ok(Box::new(SimpleReport::new(definition, data, is_sample)?))
    }
}

#[derive(Debug)]
struct Parameter {
    id: Value,
    name: String,
    test_data: Option<Value>,
}

#[derive(Debug)]
struct TextElement {
    id: Value,
    content: String,
}

#[derive(Debug)]
pub struct SimpleReport {
    parameters: Vec<Parameter>,
    elements: Vec<TextElement>,
    data: Map<String, Value>,
    is_sample: bool,
    errors: Vec<ReportError>,
}

impl SimpleReport {
    pub fn new(definition: &Value, data: &Value, is_sample: bool) -> Result<Self, ConstructionError> {
        let definition = definition.as_object().ok_or_else(|| {
            ConstructionError::InvalidDefinition("definition must be an object".to_string())
        })?;

        let data = match data {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => {
                return Err(ConstructionError::InvalidData(
                    "data must be an object".to_string(),
                ))
            }
        };

        let parameters = array_field(definition, "parameters")?
            .iter()
            .map(parse_parameter)
            .collect::<Result<Vec<_>, _>>()?;

        let elements = array_field(definition, "docElements")?
            .iter()
            .filter_map(|element| parse_element(element).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        let errors = validate_parameters(&parameters);

        Ok(Self {
            parameters,
            elements,
            data,
            is_sample,
            errors,
        })
    }

    /// Render every text element, resolving its placeholders
    fn lines(&self) -> Result<Vec<String>, GenerationError> {
        self.elements
            .iter()
            .map(|element| self.expand(element))
            .collect()
    }

    fn expand(&self, element: &TextElement) -> Result<String, GenerationError> {
        let mut out = String::with_capacity(element.content.len());
        let mut rest = element.content.as_str();

        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start + 2..].find('}') else {
                break;
            };
            out.push_str(&rest[..start]);
            let name = rest[start + 2..start + 2 + len].trim();
            out.push_str(&self.resolve(name, element)?);
            rest = &rest[start + 2 + len + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn resolve(&self, name: &str, element: &TextElement) -> Result<String, GenerationError> {
        let parameter = self
            .parameters
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| {
                GenerationError::new(
                    ReportError::new(element.id.clone(), "content", "errorMsgInvalidExpression")
                        .with_info(name),
                )
            })?;

        let value = match self.data.get(name) {
            Some(value) => Some(value),
            None if self.is_sample => parameter.test_data.as_ref(),
            None => None,
        };
        Ok(value.map(display_value).unwrap_or_default())
    }
}

impl Report for SimpleReport {
    fn validation_errors(&self) -> &[ReportError] {
        &self.errors
    }

    fn render_pdf(&self) -> Result<Vec<u8>, GenerationError> {
        let lines = self.lines()?;
        debug!(lines = lines.len(), "Rendering PDF");
        Ok(pdf::write_document(&lines))
    }

    fn render_spreadsheet(&self) -> Result<Vec<u8>, GenerationError> {
        let lines = self.lines()?;
        debug!(lines = lines.len(), "Rendering XLSX");
        Ok(xlsx::write_workbook(&lines))
    }
}

fn array_field<'a>(
    definition: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a [Value], ConstructionError> {
    match definition.get(field) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ConstructionError::InvalidDefinition(format!(
            "{} must be a list",
            field
        ))),
    }
}

fn parse_parameter(value: &Value) -> Result<Parameter, ConstructionError> {
    let object = value.as_object().ok_or_else(|| {
        ConstructionError::InvalidDefinition("parameter must be an object".to_string())
    })?;
    Ok(Parameter {
        id: object.get("id").cloned().unwrap_or(Value::Null),
        name: object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        test_data: object.get("testData").cloned(),
    })
}

/// Parse a doc element; only text elements are rendered, others are skipped
fn parse_element(value: &Value) -> Result<Option<TextElement>, ConstructionError> {
    let object = value.as_object().ok_or_else(|| {
        ConstructionError::InvalidDefinition("doc element must be an object".to_string())
    })?;
    if object.get("elementType").and_then(Value::as_str) != Some("text") {
        return Ok(None);
    }
    Ok(Some(TextElement {
        id: object.get("id").cloned().unwrap_or(Value::Null),
        content: object
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }))
}

fn validate_parameters(parameters: &[Parameter]) -> Vec<ReportError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for parameter in parameters {
        if parameter.name.is_empty() {
            errors.push(ReportError::new(
                parameter.id.clone(),
                "name",
                "errorMsgMissingParameterName",
            ));
        } else if !seen.insert(parameter.name.as_str()) {
            errors.push(ReportError::new(
                parameter.id.clone(),
                "name",
                "errorMsgDuplicateParameter",
            ));
        }
    }
    errors
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputFormat;
    use serde_json::json;

    fn definition() -> Value {
        json!({
            "parameters": [
                {"id": 1, "name": "x", "type": "number", "testData": "42"},
                {"id": 2, "name": "title", "type": "string"}
            ],
            "docElements": [
                {"id": 10, "elementType": "text", "content": "Title: ${title}"},
                {"id": 11, "elementType": "line"},
                {"id": 12, "elementType": "text", "content": "x = ${ x }"}
            ]
        })
    }

    fn lines(report: &SimpleReport) -> Vec<String> {
        report.lines().unwrap()
    }

    #[test]
    fn test_substitutes_data_values() {
        let report = SimpleReport::new(&definition(), &json!({"x": 1, "title": "Q3"}), false).unwrap();
        assert!(report.validation_errors().is_empty());
        assert_eq!(lines(&report), vec!["Title: Q3", "x = 1"]);
    }

    #[test]
    fn test_sample_render_falls_back_to_test_data() {
        let sample = SimpleReport::new(&definition(), &json!({}), true).unwrap();
        assert_eq!(lines(&sample), vec!["Title: ", "x = 42"]);

        let production = SimpleReport::new(&definition(), &json!({}), false).unwrap();
        assert_eq!(lines(&production), vec!["Title: ", "x = "]);
    }

    #[test]
    fn test_null_data_is_empty() {
        let report = SimpleReport::new(&definition(), &Value::Null, false).unwrap();
        assert_eq!(lines(&report), vec!["Title: ", "x = "]);
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        let def = json!({"docElements": [{"id": 1, "elementType": "text", "content": "cost ${"}]});
        let report = SimpleReport::new(&def, &json!({}), false).unwrap();
        assert_eq!(lines(&report), vec!["cost ${"]);
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            SimpleReport::new(&json!([1, 2]), &json!({}), false),
            Err(ConstructionError::InvalidDefinition(_))
        ));
        assert!(matches!(
            SimpleReport::new(&json!({"parameters": "x"}), &json!({}), false),
            Err(ConstructionError::InvalidDefinition(_))
        ));
        assert!(matches!(
            SimpleReport::new(&json!({}), &json!([1]), false),
            Err(ConstructionError::InvalidData(_))
        ));
    }

    #[test]
    fn test_duplicate_parameter_is_validation_error() {
        let def = json!({
            "parameters": [
                {"id": 1, "name": "x"},
                {"id": 2, "name": "x"},
                {"id": 3, "name": " "}
            ]
        });
        let report = SimpleReport::new(&def, &json!({}), false).unwrap();
        let errors = report.validation_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].object_id, json!(2));
        assert_eq!(errors[0].msg_key, "errorMsgDuplicateParameter");
        assert_eq!(errors[1].object_id, json!(3));
        assert_eq!(errors[1].msg_key, "errorMsgMissingParameterName");
    }

    #[test]
    fn test_unknown_parameter_is_generation_error() {
        let def = json!({"docElements": [{"id": 7, "elementType": "text", "content": "${missing}"}]});
        let report = SimpleReport::new(&def, &json!({}), false).unwrap();
        assert!(report.validation_errors().is_empty());

        let err = report.render_pdf().unwrap_err();
        assert_eq!(err.error.object_id, json!(7));
        assert_eq!(err.error.field, "content");
        assert_eq!(err.error.info.as_deref(), Some("missing"));
        assert!(report.render_spreadsheet().is_err());
    }

    #[test]
    fn test_renderer_produces_both_formats() {
        let report = SimpleRenderer::new()
            .new_report(&definition(), &json!({"x": 5}), false)
            .unwrap();

        let pdf = report.render(OutputFormat::Pdf).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let xlsx = report.render(OutputFormat::Xlsx).unwrap();
        assert!(xlsx.starts_with(b"PK\x03\x04"));
    }
}
