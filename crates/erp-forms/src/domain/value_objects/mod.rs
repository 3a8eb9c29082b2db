//! Forms value objects
//!
//! Immutable building blocks of the form tree: field kinds, validation rules,
//! lookup descriptors and the shape of submitted values.

use erp_common::EntityId;
use serde::{Deserialize, Serialize};

/// Input kind of a form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Currency,
    Email,
    #[serde(rename = "tel")]
    Phone,
    Url,
    Password,
    Date,
    Time,
    Datetime,
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    Radio,
    Checkbox,
    Switch,
    Slider,
    Rating,
    File,
    Image,
    Signature,
    Lookup,
    Hidden,
}

impl FieldType {
    /// Kinds whose value must parse as a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Currency | Self::Slider | Self::Rating)
    }

    /// Kinds whose value is free text subject to length bounds
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::Email | Self::Phone | Self::Url | Self::Password
        )
    }

    /// Default label for a field dropped from the palette
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Text => "Text Field",
            Self::Textarea => "Text Area",
            Self::Number => "Number",
            Self::Currency => "Amount",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Url => "Website",
            Self::Password => "Password",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Datetime => "Date & Time",
            Self::Select => "Dropdown",
            Self::MultiSelect => "Multi Select",
            Self::Radio => "Radio Group",
            Self::Checkbox => "Checkbox",
            Self::Switch => "Switch",
            Self::Slider => "Slider",
            Self::Rating => "Rating",
            Self::File => "File Upload",
            Self::Image => "Image Upload",
            Self::Signature => "Signature",
            Self::Lookup => "Lookup",
            Self::Hidden => "Hidden Field",
        }
    }
}

/// Validation rules attached to a field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// Where a lookup field sources its options from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSourceType {
    Form,
    Module,
    Static,
}

/// Lookup descriptor referencing another form or module as a data source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    pub source_type: LookupSourceType,
    pub source_id: EntityId,
    #[serde(default)]
    pub display_field: Option<String>,
    #[serde(default)]
    pub value_field: Option<String>,
    #[serde(default)]
    pub multiple: bool,
}

impl LookupConfig {
    /// Two lookups share a source when both kind and id match
    pub fn same_source(&self, other: &LookupConfig) -> bool {
        self.source_type == other.source_type && self.source_id == other.source_id
    }
}

/// One entry of the structured payload carried by a lookup selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookupPayloadField {
    #[serde(default)]
    pub field_id: Option<String>,
    pub field_label: String,
    pub field_value: serde_json::Value,
}

/// Value picked in a lookup field, with the referenced record's fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupSelection {
    pub value: serde_json::Value,
    pub label: String,
    #[serde(default)]
    pub record_id: Option<EntityId>,
    #[serde(default)]
    pub fields: Vec<LookupPayloadField>,
}

/// Submitted value of one field: `{type, value, label}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordValue {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub value: serde_json::Value,
    pub label: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Closed,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSettings {
    pub submit_button_text: String,
    pub success_message: String,
    pub redirect_url: Option<String>,
    pub show_progress: bool,
    pub allow_multiple_submissions: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            submit_button_text: "Submit".to_string(),
            success_message: "Thank you for your submission".to_string(),
            redirect_url: None,
            show_progress: true,
            allow_multiple_submissions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_wire_names() {
        assert_eq!(serde_json::to_string(&FieldType::Phone).unwrap(), "\"tel\"");
        assert_eq!(serde_json::to_string(&FieldType::MultiSelect).unwrap(), "\"multiselect\"");
        let t: FieldType = serde_json::from_str("\"lookup\"").unwrap();
        assert_eq!(t, FieldType::Lookup);
    }

    #[test]
    fn test_lookup_same_source() {
        let a = LookupConfig {
            source_type: LookupSourceType::Form,
            source_id: EntityId::from("customers"),
            display_field: None,
            value_field: None,
            multiple: false,
        };
        let mut b = a.clone();
        b.display_field = Some("Phone".into());
        assert!(a.same_source(&b));

        b.source_type = LookupSourceType::Module;
        assert!(!a.same_source(&b));
    }

    #[test]
    fn test_record_value_shape() {
        let v = RecordValue {
            field_type: FieldType::Email,
            value: serde_json::json!("a@b.co"),
            label: "Email".into(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["label"], "Email");
    }
}
