//! Form runtime rules
//!
//! Validation, completion tracking, lookup auto-fill and submission building
//! for a form being filled in. Values are keyed by field id.

use erp_common::EntityId;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::warn;

use crate::domain::aggregates::{Form, FormField, FormRecord};
use crate::domain::value_objects::{FieldType, LookupSelection, RecordValue};
use crate::error::FormsError;

/// Current values of a form being filled, keyed by field id
pub type FormData = BTreeMap<EntityId, Value>;

/// Per-field error messages, keyed by field id
pub type FieldErrors = BTreeMap<EntityId, String>;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("static regex"))
}

/// True when a value counts as "not filled in"
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(_)) => false,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Validate one field's value
///
/// Checks run in order: required, type format, numeric bounds, length
/// bounds, custom pattern. The first failure is returned.
pub fn validate_field(field: &FormField, value: Option<&Value>) -> Option<String> {
    if is_empty_value(value) {
        if field.required {
            return Some(format!("{} is required", field.label));
        }
        return None;
    }
    let value = value?;
    let rules = field.validation.clone().unwrap_or_default();
    let text = as_text(value);

    match field.field_type {
        FieldType::Email => {
            if !text.as_deref().map(|t| email_regex().is_match(t.trim())).unwrap_or(false) {
                return Some("Please enter a valid email address".to_string());
            }
        }
        FieldType::Url => {
            if !text.as_deref().map(|t| url::Url::parse(t.trim()).is_ok()).unwrap_or(false) {
                return Some("Please enter a valid URL".to_string());
            }
        }
        FieldType::Phone => {
            let digits: Option<String> = text.as_deref().map(|t| {
                t.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect()
            });
            if !digits.as_deref().map(|d| phone_regex().is_match(d)).unwrap_or(false) {
                return Some("Please enter a valid phone number".to_string());
            }
        }
        t if t.is_numeric() => {
            let Some(n) = as_number(value) else {
                return Some("Please enter a valid number".to_string());
            };
            if let Some(min) = rules.min {
                if n < min {
                    return Some(format!("Value must be at least {}", min));
                }
            }
            if let Some(max) = rules.max {
                if n > max {
                    return Some(format!("Value must be at most {}", max));
                }
            }
        }
        _ => {}
    }

    if field.field_type.is_textual() {
        if let Some(t) = &text {
            let len = t.chars().count() as u32;
            if let Some(min) = rules.min_length {
                if len < min {
                    return Some(format!("Must be at least {} characters", min));
                }
            }
            if let Some(max) = rules.max_length {
                if len > max {
                    return Some(format!("Must be at most {} characters", max));
                }
            }
        }
    }

    if let (Some(pattern), Some(t)) = (rules.pattern.as_deref(), text.as_deref()) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(t) => {
                return Some(rules.custom_message.unwrap_or_else(|| "Invalid format".to_string()));
            }
            Ok(_) => {}
            Err(e) => warn!(field = %field.id, %pattern, error = %e, "ignoring invalid validation pattern"),
        }
    }

    None
}

/// Validate every field in the (nested) form tree
pub fn validate_form(form: &Form, data: &FormData) -> FieldErrors {
    form.all_fields()
        .into_iter()
        .filter_map(|f| validate_field(f, data.get(&f.id)).map(|msg| (f.id.clone(), msg)))
        .collect()
}

/// Percentage of required fields holding a non-empty value
///
/// Rounded to the nearest integer; 100 when nothing is required.
pub fn completion_percentage(form: &Form, data: &FormData) -> u8 {
    let required: Vec<&FormField> = form.all_fields().into_iter().filter(|f| f.required).collect();
    if required.is_empty() {
        return 100;
    }
    let filled = required
        .iter()
        .filter(|f| !is_empty_value(data.get(&f.id)))
        .count();
    ((filled as f64 / required.len() as f64) * 100.0).round() as u8
}

/// Apply a lookup selection and auto-fill sibling lookups
///
/// Every other lookup field sharing the source field's lookup source takes
/// the payload entry whose `field_label` equals its own label, compared
/// case-insensitively. Labels are not unique; the first payload match wins.
/// Returns the ids of the auto-filled fields.
pub fn apply_lookup_autofill(
    form: &Form,
    source_field_id: &EntityId,
    selection: &LookupSelection,
    data: &mut FormData,
) -> Vec<EntityId> {
    data.insert(source_field_id.clone(), selection.value.clone());

    let Some(source_lookup) = form.find_field(source_field_id).and_then(|f| f.lookup.as_ref())
    else {
        return vec![];
    };

    let mut filled = Vec::new();
    for field in form.all_fields() {
        if &field.id == source_field_id {
            continue;
        }
        let Some(lookup) = field.lookup.as_ref() else { continue };
        if !lookup.same_source(source_lookup) {
            continue;
        }
        let label = field.label.to_lowercase();
        if let Some(entry) = selection
            .fields
            .iter()
            .find(|p| p.field_label.to_lowercase() == label)
        {
            data.insert(field.id.clone(), entry.field_value.clone());
            filled.push(field.id.clone());
        }
    }
    filled
}

/// Build the flat record submitted for a form
///
/// Rejects forms that are not published and data that fails validation.
pub fn build_submission(form: &Form, data: &FormData) -> Result<FormRecord, FormsError> {
    if !form.is_published() {
        return Err(FormsError::NotPublished(form.id.clone()));
    }
    let errors = validate_form(form, data);
    if !errors.is_empty() {
        return Err(FormsError::Validation(errors));
    }

    let record_data = form
        .all_fields()
        .into_iter()
        .filter_map(|f| {
            let value = data.get(&f.id).filter(|v| !v.is_null())?;
            Some((
                f.id.to_string(),
                RecordValue { field_type: f.field_type, value: value.clone(), label: f.label.clone() },
            ))
        })
        .collect();

    Ok(FormRecord::create(form.id.clone(), record_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Container, FormField, Section};
    use crate::domain::value_objects::{
        FieldValidation, FormStatus, LookupConfig, LookupPayloadField, LookupSourceType,
    };
    use serde_json::json;

    fn text_field(label: &str, field_type: FieldType) -> FormField {
        FormField::new(label, field_type, Container::section("s1"))
    }

    #[test]
    fn test_required_empty_values() {
        let field = text_field("Name", FieldType::Text).required();
        assert_eq!(validate_field(&field, None).as_deref(), Some("Name is required"));
        assert!(validate_field(&field, Some(&json!("   "))).is_some());
        assert!(validate_field(&field, Some(&json!([]))).is_some());
        assert!(validate_field(&field, Some(&json!("Ada"))).is_none());
    }

    #[test]
    fn test_unchecked_required_checkbox_is_empty() {
        let field = text_field("Accept terms", FieldType::Checkbox).required();
        assert_eq!(validate_field(&field, Some(&json!(false))).as_deref(), Some("Accept terms is required"));
        assert!(validate_field(&field, Some(&json!(true))).is_none());
        assert!(validate_field(&text_field("Subscribe", FieldType::Checkbox), Some(&json!(false))).is_none());
    }

    #[test]
    fn test_optional_empty_skips_format_checks() {
        let field = text_field("Email", FieldType::Email);
        assert!(validate_field(&field, Some(&json!(""))).is_none());
    }

    #[test]
    fn test_email_format() {
        let field = text_field("Email", FieldType::Email);
        assert!(validate_field(&field, Some(&json!("ada@example.com"))).is_none());
        assert_eq!(
            validate_field(&field, Some(&json!("ada@example"))).as_deref(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_url_format() {
        let field = text_field("Site", FieldType::Url);
        assert!(validate_field(&field, Some(&json!("https://erp.example.com/x"))).is_none());
        assert!(validate_field(&field, Some(&json!("not a url"))).is_some());
    }

    #[test]
    fn test_phone_format() {
        let field = text_field("Phone", FieldType::Phone);
        assert!(validate_field(&field, Some(&json!("+1 (555) 123-4567"))).is_none());
        assert!(validate_field(&field, Some(&json!("0123"))).is_some());
        assert!(validate_field(&field, Some(&json!("call me"))).is_some());
    }

    #[test]
    fn test_number_bounds() {
        let field = text_field("Qty", FieldType::Number).with_validation(FieldValidation {
            min: Some(1.0),
            max: Some(10.0),
            ..Default::default()
        });
        assert!(validate_field(&field, Some(&json!(5))).is_none());
        assert!(validate_field(&field, Some(&json!("7"))).is_none());
        assert_eq!(validate_field(&field, Some(&json!(0))).as_deref(), Some("Value must be at least 1"));
        assert_eq!(validate_field(&field, Some(&json!(11))).as_deref(), Some("Value must be at most 10"));
        assert_eq!(
            validate_field(&field, Some(&json!("abc"))).as_deref(),
            Some("Please enter a valid number")
        );
    }

    #[test]
    fn test_length_bounds() {
        let field = text_field("Code", FieldType::Text).with_validation(FieldValidation {
            min_length: Some(3),
            max_length: Some(5),
            ..Default::default()
        });
        assert_eq!(validate_field(&field, Some(&json!("ab"))).as_deref(), Some("Must be at least 3 characters"));
        assert_eq!(validate_field(&field, Some(&json!("abcdef"))).as_deref(), Some("Must be at most 5 characters"));
        assert!(validate_field(&field, Some(&json!("abcd"))).is_none());
    }

    #[test]
    fn test_custom_pattern_runs_last() {
        let field = text_field("Code", FieldType::Text).with_validation(FieldValidation {
            min_length: Some(4),
            pattern: Some(r"^[A-Z]{2}\d+$".into()),
            custom_message: Some("Use two capitals then digits".into()),
            ..Default::default()
        });
        // length fails first
        assert_eq!(validate_field(&field, Some(&json!("ab"))).as_deref(), Some("Must be at least 4 characters"));
        assert_eq!(
            validate_field(&field, Some(&json!("abcd"))).as_deref(),
            Some("Use two capitals then digits")
        );
        assert!(validate_field(&field, Some(&json!("AB12"))).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let field = text_field("Code", FieldType::Text).with_validation(FieldValidation {
            pattern: Some("([".into()),
            ..Default::default()
        });
        assert!(validate_field(&field, Some(&json!("anything"))).is_none());
    }

    fn form_with(fields: Vec<FormField>) -> Form {
        let mut form = Form::create("Runtime");
        let mut section = Section::new("S");
        section.id = EntityId::from("s1");
        section.fields = fields;
        form.sections = vec![section];
        form.status = FormStatus::Published;
        form
    }

    #[test]
    fn test_completion_with_no_required_fields_is_full() {
        let form = form_with(vec![text_field("A", FieldType::Text)]);
        assert_eq!(completion_percentage(&form, &FormData::new()), 100);
        assert_eq!(completion_percentage(&Form::create("empty"), &FormData::new()), 100);
    }

    #[test]
    fn test_completion_rounds_to_nearest() {
        let a = text_field("A", FieldType::Text).required();
        let b = text_field("B", FieldType::Text).required();
        let c = text_field("C", FieldType::Text).required();
        let mut data = FormData::new();
        data.insert(a.id.clone(), json!("x"));
        data.insert(b.id.clone(), json!("y"));
        let form = form_with(vec![a, b, c]);
        assert_eq!(completion_percentage(&form, &data), 67);
    }

    #[test]
    fn test_completion_counts_nested_subform_fields() {
        let mut form = crate::domain::aggregates::form::fixtures::sample_form();
        form.find_subform_mut(&EntityId::from("sf1")).unwrap().fields[0].required = true;
        let mut data = FormData::new();
        assert_eq!(completion_percentage(&form, &data), 0);
        data.insert(EntityId::from("x"), json!("filled"));
        assert_eq!(completion_percentage(&form, &data), 100);
    }

    fn customers() -> LookupConfig {
        LookupConfig {
            source_type: LookupSourceType::Form,
            source_id: EntityId::from("customers"),
            display_field: None,
            value_field: None,
            multiple: false,
        }
    }

    #[test]
    fn test_lookup_autofill_matches_labels_case_insensitively() {
        let name = text_field("Customer Name", FieldType::Lookup).with_lookup(customers());
        let phone = text_field("phone", FieldType::Lookup).with_lookup(customers());
        let mut other_source = customers();
        other_source.source_id = EntityId::from("vendors");
        let vendor_phone = text_field("Phone", FieldType::Lookup).with_lookup(other_source);
        let plain_phone = text_field("Phone", FieldType::Phone);

        let (name_id, phone_id) = (name.id.clone(), phone.id.clone());
        let (vendor_id, plain_id) = (vendor_phone.id.clone(), plain_phone.id.clone());
        let form = form_with(vec![name, phone, vendor_phone, plain_phone]);

        let selection = LookupSelection {
            value: json!("rec-9"),
            label: "ACME".into(),
            record_id: Some(EntityId::from("rec-9")),
            fields: vec![LookupPayloadField {
                field_id: None,
                field_label: "Phone".into(),
                field_value: json!("555-1234"),
            }],
        };

        let mut data = FormData::new();
        let filled = apply_lookup_autofill(&form, &name_id, &selection, &mut data);

        assert_eq!(filled, vec![phone_id.clone()]);
        assert_eq!(data.get(&name_id), Some(&json!("rec-9")));
        assert_eq!(data.get(&phone_id), Some(&json!("555-1234")));
        assert!(data.get(&vendor_id).is_none());
        assert!(data.get(&plain_id).is_none());
    }

    #[test]
    fn test_submission_requires_published_form() {
        let mut form = form_with(vec![text_field("A", FieldType::Text)]);
        form.status = FormStatus::Draft;
        assert!(matches!(build_submission(&form, &FormData::new()), Err(FormsError::NotPublished(_))));
    }

    #[test]
    fn test_submission_rejects_invalid_data() {
        let form = form_with(vec![text_field("A", FieldType::Text).required()]);
        match build_submission(&form, &FormData::new()) {
            Err(FormsError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_required_hidden_field_blocks_submission_and_completion() {
        let token = text_field("Token", FieldType::Hidden).required();
        let token_id = token.id.clone();
        let form = form_with(vec![token]);

        assert_eq!(completion_percentage(&form, &FormData::new()), 0);
        assert!(validate_form(&form, &FormData::new()).contains_key(&token_id));
        assert!(matches!(build_submission(&form, &FormData::new()), Err(FormsError::Validation(_))));

        let mut data = FormData::new();
        data.insert(token_id, json!("abc"));
        assert_eq!(completion_percentage(&form, &data), 100);
        assert!(build_submission(&form, &data).is_ok());
    }

    #[test]
    fn test_submission_is_flat_map_keyed_by_field_id() {
        let a = text_field("Name", FieldType::Text).required();
        let b = text_field("Age", FieldType::Number);
        let mut data = FormData::new();
        data.insert(a.id.clone(), json!("Ada"));
        data.insert(b.id.clone(), Value::Null);
        data.insert(EntityId::from("stray"), json!("ignored"));
        let a_id = a.id.to_string();
        let form = form_with(vec![a, b]);

        let record = build_submission(&form, &data).unwrap();
        assert_eq!(record.record_data.len(), 1);
        let value = &record.record_data[&a_id];
        assert_eq!(value.label, "Name");
        assert_eq!(value.value, json!("Ada"));
        assert_eq!(value.field_type, FieldType::Text);
    }
}
