//! Form Aggregate
//!
//! A form is a tree: sections hold fields and root subforms; subforms hold
//! fields and child subforms. Vector position is the canonical sibling order;
//! the `order` attribute mirrors it after every resequence.

use erp_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    FieldOption, FieldType, FieldValidation, FormSettings, FormStatus, LookupConfig,
};

/// Form aggregate root
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module_id: Option<EntityId>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub is_user_form: bool,
    #[serde(default)]
    pub is_employee_form: bool,
    #[serde(default)]
    pub settings: FormSettings,
    #[serde(default)]
    pub status: FormStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub subforms: Vec<Subform>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subform {
    pub id: EntityId,
    pub name: String,
    pub section_id: EntityId,
    #[serde(default)]
    pub parent_subform_id: Option<EntityId>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub child_subforms: Vec<Subform>,
}

/// The single container that owns a field or a subform
///
/// On the wire a field carries either `sectionId` or `subformId`; when both
/// are present the subform wins, since subform fields also echo their section.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Container {
    Subform {
        #[serde(rename = "subformId")]
        subform_id: EntityId,
    },
    Section {
        #[serde(rename = "sectionId")]
        section_id: EntityId,
    },
}

impl Container {
    pub fn section(id: impl Into<EntityId>) -> Self {
        Self::Section { section_id: id.into() }
    }

    pub fn subform(id: impl Into<EntityId>) -> Self {
        Self::Subform { subform_id: id.into() }
    }

    pub fn section_id(&self) -> Option<&EntityId> {
        match self {
            Self::Section { section_id } => Some(section_id),
            Self::Subform { .. } => None,
        }
    }

    pub fn subform_id(&self) -> Option<&EntityId> {
        match self {
            Self::Subform { subform_id } => Some(subform_id),
            Self::Section { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: EntityId,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(flatten)]
    pub container: Container,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub validation: Option<FieldValidation>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

impl FormField {
    pub fn new(label: impl Into<String>, field_type: FieldType, container: Container) -> Self {
        Self {
            id: EntityId::new(),
            label: label.into(),
            field_type,
            container,
            order: 0,
            required: false,
            placeholder: None,
            help_text: None,
            validation: None,
            options: vec![],
            lookup: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_lookup(mut self, lookup: LookupConfig) -> Self {
        self.field_type = FieldType::Lookup;
        self.lookup = Some(lookup);
        self
    }
}

impl Subform {
    pub fn new(name: impl Into<String>, section_id: EntityId) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            section_id,
            parent_subform_id: None,
            level: 0,
            order: 0,
            fields: vec![],
            child_subforms: vec![],
        }
    }

    /// Container this subform lives in
    pub fn container(&self) -> Container {
        match &self.parent_subform_id {
            Some(parent) => Container::subform(parent.clone()),
            None => Container::section(self.section_id.clone()),
        }
    }

    pub fn find_subform(&self, id: &EntityId) -> Option<&Subform> {
        if &self.id == id {
            return Some(self);
        }
        self.child_subforms.iter().find_map(|c| c.find_subform(id))
    }

    pub fn find_subform_mut(&mut self, id: &EntityId) -> Option<&mut Subform> {
        if &self.id == id {
            return Some(self);
        }
        self.child_subforms.iter_mut().find_map(|c| c.find_subform_mut(id))
    }

    /// True when `id` names a strict descendant of this subform
    pub fn contains_descendant(&self, id: &EntityId) -> bool {
        self.child_subforms
            .iter()
            .any(|c| &c.id == id || c.contains_descendant(id))
    }

    /// Rewrite placement of this subtree after a re-parent
    pub fn set_placement(&mut self, section_id: &EntityId, parent: Option<EntityId>, level: u32) {
        self.section_id = section_id.clone();
        self.parent_subform_id = parent;
        self.level = level;
        let own_id = self.id.clone();
        for child in &mut self.child_subforms {
            child.set_placement(section_id, Some(own_id.clone()), level + 1);
        }
    }

    fn take_child(&mut self, id: &EntityId) -> Option<(Container, usize, Subform)> {
        if let Some(idx) = self.child_subforms.iter().position(|c| &c.id == id) {
            let sub = self.child_subforms.remove(idx);
            resequence_subforms(&mut self.child_subforms);
            return Some((Container::subform(self.id.clone()), idx, sub));
        }
        self.child_subforms.iter_mut().find_map(|c| c.take_child(id))
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a FormField>) {
        out.extend(self.fields.iter());
        for child in &self.child_subforms {
            child.collect_fields(out);
        }
    }

    fn sort_by_order(&mut self) {
        self.fields.sort_by_key(|f| f.order);
        self.child_subforms.sort_by_key(|s| s.order);
        for child in &mut self.child_subforms {
            child.sort_by_order();
        }
    }
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            description: None,
            order: 0,
            fields: vec![],
            subforms: vec![],
        }
    }
}

impl Form {
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: None,
            module_id: None,
            sections: vec![],
            is_user_form: false,
            is_employee_form: false,
            settings: FormSettings::default(),
            status: FormStatus::Draft,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == FormStatus::Published
    }

    /// Sort every sibling list by its `order` attribute (stable)
    ///
    /// Backend payloads are not guaranteed to arrive sorted.
    pub fn sort_by_order(&mut self) {
        self.sections.sort_by_key(|s| s.order);
        for section in &mut self.sections {
            section.fields.sort_by_key(|f| f.order);
            section.subforms.sort_by_key(|s| s.order);
            for sub in &mut section.subforms {
                sub.sort_by_order();
            }
        }
    }

    pub fn section(&self, id: &EntityId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn section_mut(&mut self, id: &EntityId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == id)
    }

    /// Recursive subform search across every section
    pub fn find_subform(&self, id: &EntityId) -> Option<&Subform> {
        self.sections
            .iter()
            .flat_map(|s| s.subforms.iter())
            .find_map(|sub| sub.find_subform(id))
    }

    pub fn find_subform_mut(&mut self, id: &EntityId) -> Option<&mut Subform> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.subforms.iter_mut())
            .find_map(|sub| sub.find_subform_mut(id))
    }

    pub fn find_field(&self, id: &EntityId) -> Option<&FormField> {
        self.all_fields().into_iter().find(|f| &f.id == id)
    }

    /// Every field, depth-first: section fields then its subform tree
    pub fn all_fields(&self) -> Vec<&FormField> {
        let mut out = Vec::new();
        for section in &self.sections {
            out.extend(section.fields.iter());
            for sub in &section.subforms {
                sub.collect_fields(&mut out);
            }
        }
        out
    }

    /// Section a container ultimately belongs to
    pub fn section_of(&self, container: &Container) -> Option<EntityId> {
        match container {
            Container::Section { section_id } => {
                self.section(section_id).map(|s| s.id.clone())
            }
            Container::Subform { subform_id } => {
                self.find_subform(subform_id).map(|s| s.section_id.clone())
            }
        }
    }

    pub fn fields_in(&self, container: &Container) -> Option<&Vec<FormField>> {
        match container {
            Container::Section { section_id } => self.section(section_id).map(|s| &s.fields),
            Container::Subform { subform_id } => self.find_subform(subform_id).map(|s| &s.fields),
        }
    }

    pub fn fields_in_mut(&mut self, container: &Container) -> Option<&mut Vec<FormField>> {
        match container {
            Container::Section { section_id } => {
                self.section_mut(section_id).map(|s| &mut s.fields)
            }
            Container::Subform { subform_id } => {
                self.find_subform_mut(subform_id).map(|s| &mut s.fields)
            }
        }
    }

    pub fn subforms_in(&self, container: &Container) -> Option<&Vec<Subform>> {
        match container {
            Container::Section { section_id } => self.section(section_id).map(|s| &s.subforms),
            Container::Subform { subform_id } => {
                self.find_subform(subform_id).map(|s| &s.child_subforms)
            }
        }
    }

    pub fn subforms_in_mut(&mut self, container: &Container) -> Option<&mut Vec<Subform>> {
        match container {
            Container::Section { section_id } => {
                self.section_mut(section_id).map(|s| &mut s.subforms)
            }
            Container::Subform { subform_id } => {
                self.find_subform_mut(subform_id).map(|s| &mut s.child_subforms)
            }
        }
    }

    /// Detach a field from wherever it lives
    ///
    /// Returns the former container and index. The container is resequenced.
    pub fn take_field(&mut self, id: &EntityId) -> Option<(Container, usize, FormField)> {
        let container = self.find_field(id)?.container.clone();
        let fields = self.fields_in_mut(&container)?;
        let idx = fields.iter().position(|f| &f.id == id)?;
        let field = fields.remove(idx);
        resequence_fields(fields);
        Some((container, idx, field))
    }

    /// Give a field a new id in place; false when `from` is unknown
    pub fn rename_field(&mut self, from: &EntityId, to: EntityId) -> bool {
        let Some(container) = self.find_field(from).map(|f| f.container.clone()) else {
            return false;
        };
        match self.fields_in_mut(&container).and_then(|fields| fields.iter_mut().find(|f| &f.id == from)) {
            Some(field) => {
                field.id = to;
                true
            }
            None => false,
        }
    }

    /// Insert a field at `position` (clamped; `None` appends), rewriting its owner
    pub fn insert_field(
        &mut self,
        container: &Container,
        position: Option<usize>,
        mut field: FormField,
    ) -> bool {
        let Some(fields) = self.fields_in_mut(container) else {
            return false;
        };
        field.container = container.clone();
        let idx = position.unwrap_or(fields.len()).min(fields.len());
        fields.insert(idx, field);
        resequence_fields(fields);
        true
    }

    /// Detach a subform (with its subtree); the former sibling list is resequenced
    pub fn take_subform(&mut self, id: &EntityId) -> Option<(Container, usize, Subform)> {
        for section in &mut self.sections {
            if let Some(idx) = section.subforms.iter().position(|s| &s.id == id) {
                let sub = section.subforms.remove(idx);
                resequence_subforms(&mut section.subforms);
                return Some((Container::section(section.id.clone()), idx, sub));
            }
            if let Some(taken) = section.subforms.iter_mut().find_map(|s| s.take_child(id)) {
                return Some(taken);
            }
        }
        None
    }

    /// Insert a subform under `container`, rewriting section, parent and levels
    pub fn insert_subform(
        &mut self,
        container: &Container,
        position: Option<usize>,
        mut subform: Subform,
    ) -> bool {
        let (section_id, parent, level) = match container {
            Container::Section { section_id } => {
                if self.section(section_id).is_none() {
                    return false;
                }
                (section_id.clone(), None, 0)
            }
            Container::Subform { subform_id } => match self.find_subform(subform_id) {
                Some(parent) => (
                    parent.section_id.clone(),
                    Some(parent.id.clone()),
                    parent.level + 1,
                ),
                None => return false,
            },
        };
        subform.set_placement(&section_id, parent, level);
        let Some(siblings) = self.subforms_in_mut(container) else {
            return false;
        };
        let idx = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(idx, subform);
        resequence_subforms(siblings);
        true
    }

    /// True when `candidate` is `ancestor` itself or lies beneath it
    pub fn is_self_or_descendant(&self, ancestor: &EntityId, candidate: &EntityId) -> bool {
        if ancestor == candidate {
            return true;
        }
        self.find_subform(ancestor)
            .map(|a| a.contains_descendant(candidate))
            .unwrap_or(false)
    }

    pub fn resequence_sections(&mut self) {
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.order = i as u32;
        }
    }
}

pub fn resequence_fields(fields: &mut [FormField]) {
    for (i, field) in fields.iter_mut().enumerate() {
        field.order = i as u32;
    }
}

pub fn resequence_subforms(subforms: &mut [Subform]) {
    for (i, sub) in subforms.iter_mut().enumerate() {
        sub.order = i as u32;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Section "s1" with fields a, b and subform tree:
    /// sf1 (fields x) -> [sf1a -> [sf1a1], sf1b]; sf2
    pub fn sample_form() -> Form {
        let s1 = EntityId::from("s1");
        let mut form = Form::create("Inspection");
        form.id = EntityId::from("form-1");

        let mut section = Section::new("General");
        section.id = s1.clone();
        section.fields = vec![
            field("a", "A", Container::section("s1"), 0),
            field("b", "B", Container::section("s1"), 1),
        ];

        let mut sf1 = subform("sf1", &s1, None, 0, 0);
        sf1.fields = vec![field("x", "X", Container::subform("sf1"), 0)];
        let mut sf1a = subform("sf1a", &s1, Some("sf1"), 1, 0);
        sf1a.child_subforms = vec![subform("sf1a1", &s1, Some("sf1a"), 2, 0)];
        let sf1b = subform("sf1b", &s1, Some("sf1"), 1, 1);
        sf1.child_subforms = vec![sf1a, sf1b];

        section.subforms = vec![sf1, subform("sf2", &s1, None, 0, 1)];

        let mut s2 = Section::new("Details");
        s2.id = EntityId::from("s2");
        s2.order = 1;

        form.sections = vec![section, s2];
        form
    }

    pub fn field(id: &str, label: &str, container: Container, order: u32) -> FormField {
        let mut f = FormField::new(label, FieldType::Text, container);
        f.id = EntityId::from(id);
        f.order = order;
        f
    }

    pub fn subform(
        id: &str,
        section_id: &EntityId,
        parent: Option<&str>,
        level: u32,
        order: u32,
    ) -> Subform {
        let mut s = Subform::new(id.to_uppercase(), section_id.clone());
        s.id = EntityId::from(id);
        s.parent_subform_id = parent.map(EntityId::from);
        s.level = level;
        s.order = order;
        s
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_rename_field_keeps_position() {
        let mut form = sample_form();
        assert!(form.rename_field(&EntityId::from("x"), EntityId::from("x2")));
        let sub = form.find_subform(&EntityId::from("sf1")).unwrap();
        assert_eq!(sub.fields[0].id, EntityId::from("x2"));
        assert_eq!(sub.fields[0].order, 0);
        assert!(!form.rename_field(&EntityId::from("x"), EntityId::from("x3")));
    }

    #[test]
    fn test_find_nested_subform() {
        let form = sample_form();
        let found = form.find_subform(&EntityId::from("sf1a1")).unwrap();
        assert_eq!(found.level, 2);
        assert!(form.find_subform(&EntityId::from("missing")).is_none());
    }

    #[test]
    fn test_all_fields_depth_first() {
        let form = sample_form();
        let ids: Vec<_> = form.all_fields().iter().map(|f| f.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "x"]);
    }

    #[test]
    fn test_take_and_insert_field_rewrites_owner() {
        let mut form = sample_form();
        let (from, idx, field) = form.take_field(&EntityId::from("a")).unwrap();
        assert_eq!(from, Container::section("s1"));
        assert_eq!(idx, 0);
        assert_eq!(form.section(&EntityId::from("s1")).unwrap().fields[0].order, 0);

        assert!(form.insert_field(&Container::subform("sf1a"), None, field));
        let moved = form.find_field(&EntityId::from("a")).unwrap();
        assert_eq!(moved.container, Container::subform("sf1a"));
    }

    #[test]
    fn test_take_nested_subform_resequences_siblings() {
        let mut form = sample_form();
        let (from, idx, sub) = form.take_subform(&EntityId::from("sf1a")).unwrap();
        assert_eq!(from, Container::subform("sf1"));
        assert_eq!(idx, 0);
        assert_eq!(sub.child_subforms.len(), 1);
        let remaining = form.find_subform(&EntityId::from("sf1b")).unwrap();
        assert_eq!(remaining.order, 0);
    }

    #[test]
    fn test_insert_subform_rewrites_levels() {
        let mut form = sample_form();
        let (_, _, sub) = form.take_subform(&EntityId::from("sf1a")).unwrap();
        assert!(form.insert_subform(&Container::subform("sf2"), None, sub));

        let moved = form.find_subform(&EntityId::from("sf1a")).unwrap();
        assert_eq!(moved.parent_subform_id, Some(EntityId::from("sf2")));
        assert_eq!(moved.level, 1);
        let grandchild = form.find_subform(&EntityId::from("sf1a1")).unwrap();
        assert_eq!(grandchild.level, 2);
        assert_eq!(grandchild.parent_subform_id, Some(EntityId::from("sf1a")));
    }

    #[test]
    fn test_descendant_check() {
        let form = sample_form();
        let sf1 = EntityId::from("sf1");
        assert!(form.is_self_or_descendant(&sf1, &sf1));
        assert!(form.is_self_or_descendant(&sf1, &EntityId::from("sf1a1")));
        assert!(!form.is_self_or_descendant(&sf1, &EntityId::from("sf2")));
    }

    #[test]
    fn test_field_container_wire_format() {
        let json = serde_json::json!({
            "id": "f1", "label": "Phone", "type": "tel",
            "sectionId": "s1", "subformId": null, "order": 3
        });
        let field: FormField = serde_json::from_value(json).unwrap();
        assert_eq!(field.container, Container::section("s1"));

        let json = serde_json::json!({
            "id": "f2", "label": "Qty", "type": "number",
            "sectionId": "s1", "subformId": "sf9"
        });
        let field: FormField = serde_json::from_value(json).unwrap();
        assert_eq!(field.container, Container::subform("sf9"));
    }

    #[test]
    fn test_sort_by_order() {
        let mut form = sample_form();
        form.sections[0].fields.reverse();
        form.sort_by_order();
        assert_eq!(form.sections[0].fields[0].id, EntityId::from("a"));
    }
}
