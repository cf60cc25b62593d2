//! Path expression evaluation.
//!
//! The index builder does not evaluate FHIRPath itself. It consumes a
//! [`PathEvaluator`], which turns a resource and an expression into zero or
//! more raw JSON values. [`SimplePathEvaluator`] covers the navigation
//! patterns used by the standard SearchParameter expressions; a full
//! FHIRPath engine can be plugged in through the same trait.

use serde_json::Value;

use super::errors::ExtractionError;

/// Evaluates a path expression against a resource.
///
/// Implementations must be side-effect free. An `Err` means the expression
/// could not be evaluated for this particular resource; the builder skips the
/// parameter for that resource only.
pub trait PathEvaluator: Send + Sync {
    /// Returns the values the expression selects from `resource`.
    fn evaluate(&self, resource: &Value, expression: &str) -> Result<Vec<Value>, ExtractionError>;
}

impl<F> PathEvaluator for F
where
    F: Fn(&Value, &str) -> Result<Vec<Value>, ExtractionError> + Send + Sync,
{
    fn evaluate(&self, resource: &Value, expression: &str) -> Result<Vec<Value>, ExtractionError> {
        self(resource, expression)
    }
}

/// Path navigator for the common SearchParameter expression shapes.
///
/// Supported:
/// - dotted navigation with an optional leading type (`Patient.name.family`)
/// - unions (`Observation.subject | Condition.subject`)
/// - choice types (`Observation.value.ofType(Quantity)`, `value.as(Quantity)`,
///   `(Observation.value as Quantity)`, and bare `value` resolving a single
///   `value[x]` element)
/// - `where(...)`, `exists(...)` and `resolve()`, passed through without filtering
/// - `first()`
#[derive(Debug, Default, Clone, Copy)]
pub struct SimplePathEvaluator;

impl SimplePathEvaluator {
    /// Creates a new evaluator.
    pub fn new() -> Self {
        Self
    }

    fn parse_branch(&self, branch: &str, expression: &str) -> Result<Vec<PathSegment>, ExtractionError> {
        let mut branch = branch.trim();
        while branch.starts_with('(') && closing_paren(branch) == Some(branch.len() - 1) {
            branch = branch[1..branch.len() - 1].trim();
        }

        // Infix `X as Type` is the same as `X.ofType(Type)`.
        let (path, infix_type) = match find_top_level(branch, " as ") {
            Some(pos) => (branch[..pos].trim(), Some(branch[pos + 4..].trim())),
            None => (branch, None),
        };

        let mut segments = Vec::new();
        for (index, token) in split_top_level(path, '.').into_iter().enumerate() {
            let token = token.trim();
            if token.is_empty() {
                return Err(fhirpath_error(expression, "empty path segment"));
            }

            let Some(paren) = token.find('(') else {
                if index == 0 && token.starts_with(|c: char| c.is_ascii_uppercase()) {
                    segments.push(PathSegment::TypeRoot(token.to_string()));
                } else {
                    segments.push(PathSegment::Field(token.to_string()));
                }
                continue;
            };

            if !token.ends_with(')') {
                return Err(fhirpath_error(expression, "unexpected text after function call"));
            }
            let name = &token[..paren];
            let arg = token[paren + 1..token.len() - 1].trim();
            match name {
                "ofType" | "as" => segments.push(PathSegment::TypeFilter(arg.to_string())),
                "first" => segments.push(PathSegment::First),
                "where" | "exists" | "resolve" => {}
                other => {
                    return Err(fhirpath_error(
                        expression,
                        &format!("unsupported function '{}'", other),
                    ));
                }
            }
        }

        if let Some(type_name) = infix_type {
            if type_name.is_empty() {
                return Err(fhirpath_error(expression, "missing type after 'as'"));
            }
            segments.push(PathSegment::TypeFilter(type_name.to_string()));
        }

        Ok(segments)
    }

    fn navigate(&self, values: Vec<&Value>, segments: &[PathSegment]) -> Vec<Value> {
        let Some((segment, remaining)) = segments.split_first() else {
            return values.into_iter().flat_map(flatten).cloned().collect();
        };

        let next: Vec<&Value> = match segment {
            PathSegment::TypeRoot(type_name) => values
                .into_iter()
                .filter(|v| {
                    let rt = v.get("resourceType").and_then(|t| t.as_str());
                    rt == Some(type_name.as_str())
                        || type_name == "Resource"
                        || type_name == "DomainResource"
                })
                .collect(),
            PathSegment::Field(name) => {
                let choice_type = match remaining.first() {
                    Some(PathSegment::TypeFilter(t)) => Some(t.as_str()),
                    _ => None,
                };
                values
                    .into_iter()
                    .flat_map(flatten)
                    .filter_map(|v| v.as_object())
                    .filter_map(|obj| lookup_field(obj, name, choice_type))
                    .collect()
            }
            PathSegment::TypeFilter(type_name) => values
                .into_iter()
                .flat_map(flatten)
                .filter(|v| match v.get("resourceType").and_then(|t| t.as_str()) {
                    Some(rt) => rt == type_name,
                    None => true,
                })
                .collect(),
            PathSegment::First => values.into_iter().flat_map(flatten).take(1).collect(),
        };

        if next.is_empty() {
            return Vec::new();
        }
        self.navigate(next, remaining)
    }
}

impl PathEvaluator for SimplePathEvaluator {
    fn evaluate(&self, resource: &Value, expression: &str) -> Result<Vec<Value>, ExtractionError> {
        if !resource.is_object() {
            return Err(ExtractionError::InvalidResource {
                message: "Resource must be a JSON object".to_string(),
            });
        }

        let expression = expression.trim();
        if expression.is_empty() {
            return Ok(Vec::new());
        }
        check_balanced(expression)?;

        let mut results = Vec::new();
        for branch in split_top_level(expression, '|') {
            if branch.trim().is_empty() {
                return Err(fhirpath_error(expression, "empty union branch"));
            }
            let segments = self.parse_branch(branch, expression)?;
            results.extend(self.navigate(vec![resource], &segments));
        }
        Ok(results)
    }
}

/// A segment of a parsed path expression.
#[derive(Debug, Clone, PartialEq)]
enum PathSegment {
    /// Leading resource type (`Patient` in `Patient.name`).
    TypeRoot(String),
    /// A field name to navigate to.
    Field(String),
    /// A type filter (`ofType()`, `as()`), also used to pick a choice element.
    TypeFilter(String),
    /// Keep only the first item.
    First,
}

fn flatten(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        other => Box::new(std::iter::once(other)),
    }
}

/// Looks up a field, resolving choice elements (`value` -> `valueQuantity`).
fn lookup_field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    name: &str,
    choice_type: Option<&str>,
) -> Option<&'a Value> {
    if let Some(type_name) = choice_type {
        if let Some(v) = obj.get(&format!("{}{}", name, type_name)) {
            return Some(v);
        }
    }
    if let Some(v) = obj.get(name) {
        return Some(v);
    }
    if choice_type.is_some() {
        return None;
    }

    let mut candidates = obj.iter().filter(|(k, _)| {
        k.strip_prefix(name)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
    });
    match (candidates.next(), candidates.next()) {
        (Some((_, v)), None) => Some(v),
        _ => None,
    }
}

fn fhirpath_error(expression: &str, message: &str) -> ExtractionError {
    ExtractionError::FhirPathError {
        expression: expression.to_string(),
        message: message.to_string(),
    }
}

fn check_balanced(expression: &str) -> Result<(), ExtractionError> {
    let mut depth: i32 = 0;
    let mut in_quote = false;
    for c in expression.chars() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth < 0 {
                    return Err(fhirpath_error(expression, "unbalanced parentheses"));
                }
            }
            _ => {}
        }
    }
    if in_quote {
        return Err(fhirpath_error(expression, "unterminated string literal"));
    }
    if depth != 0 {
        return Err(fhirpath_error(expression, "unbalanced parentheses"));
    }
    Ok(())
}

/// Splits on `sep` occurrences outside parentheses and string literals.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 && !in_quote => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Finds `needle` outside parentheses and string literals.
fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote = false;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            _ if depth == 0 && !in_quote && s[i..].starts_with(needle) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Returns the byte index of the parenthesis closing the one at index 0.
fn closing_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
