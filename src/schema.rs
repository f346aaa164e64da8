//! Schema model handed to the generation pipeline.
//!
//! These records are produced by an external introspection and customization
//! step. The pipeline only reads them, except for [`strip_relations`] which runs
//! once when related tables are excluded.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{GenerateError, Result};

/// One table or view after introspection and customization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Name of the table in the database
    pub sql_name: String,
    /// Canonical name used for every generated identifier
    pub tsc_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub relation_ids: Vec<RelationId>,
    #[serde(default)]
    pub indices: Vec<Index>,
}

/// One field of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub tsc_name: String,
    /// Logical TypeScript type (`string`, `number`, `boolean`, `Date`, ...)
    pub tsc_type: String,
    /// Underlying database type (`varchar`, `int`, `timestamp`, ...)
    #[serde(default, alias = "type")]
    pub db_type: String,
    #[serde(default)]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_generated: bool,
    /// `increment`, `uuid`, `rowid` or `identity` when generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_strategy: Option<String>,
    /// Default value already rendered as a TypeScript expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Column decorator options, emitted verbatim through the `json` helper
    #[serde(default)]
    pub options: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used_in_relation_as_owner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used_in_relation_as_referenced: Option<bool>,
}

/// Cardinality of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationKind {
    /// Whether the owning side holds a collection
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::ManyToMany)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::OneToOne => "OneToOne",
            RelationKind::OneToMany => "OneToMany",
            RelationKind::ManyToOne => "ManyToOne",
            RelationKind::ManyToMany => "ManyToMany",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OneToOne" => Ok(RelationKind::OneToOne),
            "OneToMany" => Ok(RelationKind::OneToMany),
            "ManyToOne" => Ok(RelationKind::ManyToOne),
            "ManyToMany" => Ok(RelationKind::ManyToMany),
            other => Err(GenerateError::Schema(format!("Unknown relation type '{}'", other))),
        }
    }
}

/// Directional association from the owning entity to `related_table`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub field_name: String,
    /// Canonical name of the referenced entity
    pub related_table: String,
    /// Inverse property on the referenced entity
    pub related_field: String,
    pub relation_type: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_column_options: Option<Vec<IndexMap<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table_options: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_options: Option<IndexMap<String, Value>>,
}

/// Scalar id property exposed alongside a relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationId {
    pub field_name: String,
    pub field_type: String,
    pub relation_field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
}

impl Entity {
    /// Create an entity with no columns or relations
    pub fn new(sql_name: impl Into<String>, tsc_name: impl Into<String>) -> Self {
        Self {
            sql_name: sql_name.into(),
            tsc_name: tsc_name.into(),
            database: None,
            schema: None,
            columns: Vec::new(),
            relations: Vec::new(),
            relation_ids: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Check the canonical-name invariant.
    ///
    /// The name must be non-empty and made of identifier characters plus the
    /// separators the case transforms understand (`_`, `-`, space).
    pub fn validate(&self) -> Result<()> {
        if self.tsc_name.trim().is_empty() {
            return Err(GenerateError::Schema(format!(
                "Entity for table '{}' has an empty name",
                self.sql_name
            )));
        }
        if !is_case_safe(&self.tsc_name) {
            return Err(GenerateError::Schema(format!(
                "Entity name '{}' contains characters that cannot form an identifier",
                self.tsc_name
            )));
        }
        if self.tsc_name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(GenerateError::Schema(format!(
                "Entity name '{}' must not start with a digit",
                self.tsc_name
            )));
        }
        Ok(())
    }

    /// First primary-key column, if any
    pub fn primary_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary)
    }

    pub fn has_relations(&self) -> bool {
        !self.relations.is_empty() || !self.relation_ids.is_empty()
    }
}

impl Column {
    /// Create a plain column with the given logical and database types
    pub fn new(
        tsc_name: impl Into<String>,
        tsc_type: impl Into<String>,
        db_type: impl Into<String>,
    ) -> Self {
        Self {
            tsc_name: tsc_name.into(),
            tsc_type: tsc_type.into(),
            db_type: db_type.into(),
            is_nullable: false,
            is_array: false,
            is_primary: false,
            is_generated: false,
            generation_strategy: None,
            default: None,
            comment: None,
            options: IndexMap::new(),
            is_used_in_relation_as_owner: None,
            is_used_in_relation_as_referenced: None,
        }
    }

    pub fn is_relation_member(&self) -> bool {
        self.is_used_in_relation_as_owner.is_some()
            || self.is_used_in_relation_as_referenced.is_some()
    }
}

fn is_case_safe(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
}

/// Remove relation data from every entity.
///
/// Clears `relations`, `relation_ids` and the relation-role markers on columns so
/// templates never see a column flagged as a relation member without a relation.
pub fn strip_relations(entities: &mut [Entity]) {
    for entity in entities.iter_mut() {
        for column in entity.columns.iter_mut() {
            column.is_used_in_relation_as_owner = None;
            column.is_used_in_relation_as_referenced = None;
        }
        entity.relation_ids.clear();
        entity.relations.clear();
    }
}

/// Apply table allow/deny lists.
///
/// Matching is on the database table name. An empty `only` list keeps every
/// table; `skip` is applied afterwards.
pub fn filter_tables(entities: Vec<Entity>, only: &[String], skip: &[String]) -> Vec<Entity> {
    let only: HashSet<&str> = only.iter().map(String::as_str).collect();
    let skip: HashSet<&str> = skip.iter().map(String::as_str).collect();

    entities
        .into_iter()
        .filter(|e| only.is_empty() || only.contains(e.sql_name.as_str()))
        .filter(|e| !skip.contains(e.sql_name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_with_relation() -> Entity {
        let mut user = Entity::new("user", "User");
        let mut id = Column::new("id", "number", "int");
        id.is_primary = true;
        id.is_used_in_relation_as_referenced = Some(true);
        user.columns.push(id);
        user.relations.push(Relation {
            field_name: "posts".to_string(),
            related_table: "Post".to_string(),
            related_field: "author".to_string(),
            relation_type: RelationKind::OneToMany,
            join_column_options: None,
            join_table_options: None,
            relation_options: None,
        });
        user.relation_ids.push(RelationId {
            field_name: "postIds".to_string(),
            field_type: "number[]".to_string(),
            relation_field: "posts".to_string(),
        });
        user
    }

    #[test]
    fn test_strip_relations_clears_all_relation_data() {
        let mut entities = vec![entity_with_relation()];
        assert!(entities[0].has_relations());

        strip_relations(&mut entities);

        assert!(entities[0].relations.is_empty());
        assert!(entities[0].relation_ids.is_empty());
        assert!(entities[0].columns.iter().all(|c| !c.is_relation_member()));
        // non-relation data survives
        assert!(entities[0].columns[0].is_primary);
    }

    #[test]
    fn test_stripped_markers_are_absent_from_serialized_column() {
        let mut entities = vec![entity_with_relation()];
        strip_relations(&mut entities);
        let value = serde_json::to_value(&entities[0].columns[0]).unwrap();
        assert!(value.get("isUsedInRelationAsReferenced").is_none());
        assert!(value.get("isUsedInRelationAsOwner").is_none());
    }

    #[test]
    fn test_validate_rejects_unsafe_names() {
        assert!(Entity::new("user_profile", "user_profile").validate().is_ok());
        assert!(Entity::new("x", "").validate().is_err());
        assert!(Entity::new("x", "user.profile").validate().is_err());
        assert!(Entity::new("x", "1user").validate().is_err());
    }

    #[test]
    fn test_relation_kind_parsing() {
        assert_eq!("ManyToMany".parse::<RelationKind>().unwrap(), RelationKind::ManyToMany);
        assert!(RelationKind::OneToMany.is_to_many());
        assert!(!RelationKind::ManyToOne.is_to_many());
        assert!("HasMany".parse::<RelationKind>().is_err());
    }

    #[test]
    fn test_filter_tables() {
        let entities = vec![
            Entity::new("users", "User"),
            Entity::new("posts", "Post"),
            Entity::new("migrations", "Migration"),
        ];

        let kept = filter_tables(entities.clone(), &[], &["migrations".to_string()]);
        assert_eq!(kept.len(), 2);

        let kept = filter_tables(entities, &["posts".to_string()], &[]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].tsc_name, "Post");
    }

    #[test]
    fn test_column_accepts_type_alias() {
        let column: Column =
            serde_json::from_str(r#"{"tscName": "age", "tscType": "number", "type": "int"}"#)
                .unwrap();
        assert_eq!(column.db_type, "int");
        assert!(!column.is_nullable);
    }
}
